//! Report listing rows and the role catalog.

use domain::{Report, ReportType, Role, User};
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::search::{SearchTerm, matches};

/// Filters for the report listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportListQuery {
    #[serde(rename = "type", alias = "tipo", deserialize_with = "type_filter")]
    pub report_type: Option<ReportType>,
    /// Also list withdrawn reports.
    #[serde(alias = "includeInactive")]
    pub include_inactive: bool,
    pub search: Option<String>,
    pub page: Option<usize>,
}

impl ReportListQuery {
    pub(crate) fn search_term(&self) -> Option<SearchTerm> {
        SearchTerm::parse(self.search.as_deref())
    }

    pub(crate) fn keeps(&self, report: &Report) -> bool {
        (self.include_inactive || report.active)
            && self
                .report_type
                .is_none_or(|wanted| report.report_type == Some(wanted))
    }
}

fn type_filter<'de, D>(deserializer: D) -> Result<Option<ReportType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(name) => name.parse().map(Some).map_err(de::Error::custom),
    }
}

/// A report with its author's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportView {
    #[serde(flatten)]
    pub report: Report,
    pub user_name: String,
}

impl ReportView {
    pub fn new(report: Report, author: Option<&User>) -> Self {
        let user_name = match author {
            Some(user) => user.name.clone(),
            None => format!("User #{}", report.user_id),
        };
        Self { report, user_name }
    }

    /// Free-text match over title, description and author.
    pub fn matches(&self, term: Option<&SearchTerm>) -> bool {
        matches(
            term,
            &[
                &self.report.title,
                self.report.description.as_deref().unwrap_or_default(),
                &self.user_name,
            ],
        )
    }
}

/// One entry of the role catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoleView {
    pub id: i64,
    pub name: Role,
    pub label: &'static str,
}

impl From<Role> for RoleView {
    fn from(role: Role) -> Self {
        Self {
            id: role.id(),
            name: role,
            label: role.label(),
        }
    }
}
