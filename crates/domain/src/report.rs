//! Customer reports: complaints, claims and other feedback tied to a user
//! and optionally to one of their orders.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use common::{OrderId, ReportId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const TITLE_MIN_CHARS: usize = 3;
const TITLE_MAX_CHARS: usize = 150;
const DESCRIPTION_MAX_CHARS: usize = 2000;

/// Errors raised while validating report input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("Report title must be between 3 and 150 characters (got {length})")]
    InvalidTitle { length: usize },

    #[error("Report description must be at most 2000 characters (got {length})")]
    DescriptionTooLong { length: usize },

    /// The referenced order was placed by someone else.
    #[error("Order {order_id} does not belong to user {user_id}")]
    ForeignOrder { order_id: OrderId, user_id: UserId },
}

/// What a report is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    #[serde(alias = "ventas")]
    Sales,
    #[serde(alias = "inventario")]
    Inventory,
    #[serde(alias = "logistica")]
    Logistics,
    #[serde(alias = "calidad")]
    Quality,
    #[serde(alias = "financiero")]
    Financial,
    #[serde(alias = "operaciones")]
    Operations,
    #[serde(alias = "queja")]
    Complaint,
    #[serde(alias = "sugerencia")]
    Suggestion,
    #[serde(alias = "reclamo")]
    Claim,
    #[serde(alias = "incidencia")]
    Incident,
    #[serde(alias = "mejora")]
    Improvement,
    #[serde(alias = "problema_tecnico")]
    TechnicalIssue,
    #[serde(alias = "soporte")]
    Support,
    #[serde(alias = "capacitacion")]
    Training,
    #[serde(alias = "seguridad")]
    Security,
    #[serde(alias = "mantenimiento")]
    Maintenance,
    #[serde(alias = "otro")]
    Other,
}

impl ReportType {
    pub const ALL: [ReportType; 17] = [
        ReportType::Sales,
        ReportType::Inventory,
        ReportType::Logistics,
        ReportType::Quality,
        ReportType::Financial,
        ReportType::Operations,
        ReportType::Complaint,
        ReportType::Suggestion,
        ReportType::Claim,
        ReportType::Incident,
        ReportType::Improvement,
        ReportType::TechnicalIssue,
        ReportType::Support,
        ReportType::Training,
        ReportType::Security,
        ReportType::Maintenance,
        ReportType::Other,
    ];

    /// Wire name and legacy name, wire name first.
    pub fn names(&self) -> [&'static str; 2] {
        match self {
            ReportType::Sales => ["sales", "ventas"],
            ReportType::Inventory => ["inventory", "inventario"],
            ReportType::Logistics => ["logistics", "logistica"],
            ReportType::Quality => ["quality", "calidad"],
            ReportType::Financial => ["financial", "financiero"],
            ReportType::Operations => ["operations", "operaciones"],
            ReportType::Complaint => ["complaint", "queja"],
            ReportType::Suggestion => ["suggestion", "sugerencia"],
            ReportType::Claim => ["claim", "reclamo"],
            ReportType::Incident => ["incident", "incidencia"],
            ReportType::Improvement => ["improvement", "mejora"],
            ReportType::TechnicalIssue => ["technical_issue", "problema_tecnico"],
            ReportType::Support => ["support", "soporte"],
            ReportType::Training => ["training", "capacitacion"],
            ReportType::Security => ["security", "seguridad"],
            ReportType::Maintenance => ["maintenance", "mantenimiento"],
            ReportType::Other => ["other", "otro"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.names()[0]
    }
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when a string is not a known report type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown report type: {0}")]
pub struct ParseReportTypeError(pub String);

impl FromStr for ReportType {
    type Err = ParseReportTypeError;

    /// Accepts either name in any case, with spaces for underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(' ', "_");
        ReportType::ALL
            .into_iter()
            .find(|kind| kind.names().contains(&wanted.as_str()))
            .ok_or_else(|| ParseReportTypeError(s.to_string()))
    }
}

/// A report. Reports are deactivated, never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub id: ReportId,
    pub user_id: UserId,
    pub order_id: Option<OrderId>,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub report_type: Option<ReportType>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for filing a report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewReport {
    #[serde(alias = "userId")]
    pub user_id: UserId,
    #[serde(default, alias = "orderId")]
    pub order_id: Option<OrderId>,
    #[serde(alias = "titulo")]
    pub title: String,
    #[serde(default, alias = "descripcion")]
    pub description: Option<String>,
    #[serde(default, rename = "type", alias = "tipo")]
    pub report_type: Option<ReportType>,
}

impl NewReport {
    /// Trims and validates the text fields.
    pub fn validate(self) -> Result<Self, ReportError> {
        Ok(Self {
            title: validate_title(&self.title)?,
            description: validate_description(self.description)?,
            ..self
        })
    }
}

/// Editable fields of an existing report. Owner and order never change.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReportChanges {
    #[serde(alias = "titulo")]
    pub title: String,
    #[serde(default, alias = "descripcion")]
    pub description: Option<String>,
    #[serde(default, rename = "type", alias = "tipo")]
    pub report_type: Option<ReportType>,
}

impl ReportChanges {
    pub fn validate(self) -> Result<Self, ReportError> {
        Ok(Self {
            title: validate_title(&self.title)?,
            description: validate_description(self.description)?,
            report_type: self.report_type,
        })
    }
}

fn validate_title(raw: &str) -> Result<String, ReportError> {
    let title = raw.trim();
    let length = title.chars().count();
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&length) {
        return Err(ReportError::InvalidTitle { length });
    }
    Ok(title.to_string())
}

fn validate_description(raw: Option<String>) -> Result<Option<String>, ReportError> {
    let Some(description) = raw else {
        return Ok(None);
    };
    let description = description.trim();
    if description.is_empty() {
        return Ok(None);
    }
    let length = description.chars().count();
    if length > DESCRIPTION_MAX_CHARS {
        return Err(ReportError::DescriptionTooLong { length });
    }
    Ok(Some(description.to_string()))
}
