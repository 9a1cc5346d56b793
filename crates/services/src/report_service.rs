//! Report service: customers file reports about their experience, staff
//! reads and follows up on all of them.

use common::ReportId;
use domain::{Actor, NewReport, Report, ReportChanges, ReportError};
use store::Store;

use crate::error::{Result, ServiceError};

/// Service for filing and maintaining reports.
///
/// Customers only ever touch their own reports; staff may touch any.
pub struct ReportService<S: Store> {
    store: S,
}

impl<S: Store> ReportService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Files a report for an active user, optionally about one of their orders.
    #[tracing::instrument(skip(self, input), fields(actor = %actor.user_id, user_id = %input.user_id))]
    pub async fn create_report(&self, actor: Actor, input: NewReport) -> Result<Report> {
        if !actor.can_access_report(input.user_id) {
            return Err(ServiceError::forbidden("file reports for other users"));
        }
        let input = input.validate()?;

        let user = self
            .store
            .get_user(input.user_id)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "User",
                id: input.user_id.as_i64(),
            })?;
        if !user.active {
            return Err(ServiceError::Inactive {
                entity: "User",
                id: user.id.as_i64(),
            });
        }

        if let Some(order_id) = input.order_id {
            let order = self
                .store
                .get_order(order_id)
                .await?
                .ok_or(ServiceError::NotFound {
                    entity: "Order",
                    id: order_id.as_i64(),
                })?;
            if order.user_id() != input.user_id {
                return Err(ReportError::ForeignOrder {
                    order_id,
                    user_id: input.user_id,
                }
                .into());
            }
        }

        let report = self.store.insert_report(input).await?;
        metrics::counter!("reports_filed_total").increment(1);
        tracing::info!(report_id = %report.id, "report filed");
        Ok(report)
    }

    /// Loads a report the actor is allowed to see.
    pub async fn get_report(&self, actor: Actor, id: ReportId) -> Result<Report> {
        let report = self
            .store
            .get_report(id)
            .await?
            .ok_or(ServiceError::NotFound {
                entity: "Report",
                id: id.as_i64(),
            })?;
        if !actor.can_access_report(report.user_id) {
            return Err(ServiceError::forbidden("view this report"));
        }
        Ok(report)
    }

    /// Edits title, description and type of an active report.
    #[tracing::instrument(skip(self, changes), fields(actor = %actor.user_id))]
    pub async fn update_report(
        &self,
        actor: Actor,
        id: ReportId,
        changes: ReportChanges,
    ) -> Result<Report> {
        let report = self.get_report(actor, id).await?;
        if !report.active {
            return Err(ServiceError::Inactive {
                entity: "Report",
                id: id.as_i64(),
            });
        }
        Ok(self.store.update_report(id, changes.validate()?).await?)
    }

    /// Withdraws a report. It stays stored but leaves the default listing.
    #[tracing::instrument(skip(self), fields(actor = %actor.user_id))]
    pub async fn deactivate_report(&self, actor: Actor, id: ReportId) -> Result<Report> {
        self.get_report(actor, id).await?;
        let report = self.store.deactivate_report(id).await?;
        tracing::info!(report_id = %id, "report deactivated");
        Ok(report)
    }
}
