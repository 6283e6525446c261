use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{PriorityTier, RecordKind};
use super::intake::{LeadForm, LeadValidationError};
use super::notifications::{
    Channel, ChannelOutcome, NotificationDispatcher, NotificationRequest,
};
use super::repository::{CrmError, CrmGateway, LeadRecordDraft, RoutingUpdate};
use super::routing::{BoundRouting, RoutingConfig, RoutingEngine, RoutingResult};

/// Service composing form validation, the routing engine, the CRM, and notification fan-out.
pub struct LeadIntakeService<C> {
    crm: Arc<C>,
    engine: Arc<RoutingEngine>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl<C> LeadIntakeService<C>
where
    C: CrmGateway + 'static,
{
    pub fn new(crm: Arc<C>, config: RoutingConfig, dispatcher: NotificationDispatcher) -> Self {
        Self {
            crm,
            engine: Arc::new(RoutingEngine::new(config)),
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn engine(&self) -> &RoutingEngine {
        &self.engine
    }

    /// Route a form without touching the CRM or sending anything.
    pub fn preview(&self, form: LeadForm) -> Result<RoutingResult, IntakeError> {
        let (_, submission) = form.into_parts()?;
        Ok(self.engine.process_lead(&submission))
    }

    /// Capture a lead: the CRM write is the only step whose failure fails the call.
    pub async fn submit(
        &self,
        kind: RecordKind,
        form: LeadForm,
    ) -> Result<IntakeOutcome, IntakeError> {
        let (contact, submission) = form.into_parts()?;
        let routing = self.engine.process_lead(&submission);

        let draft = LeadRecordDraft::new(contact.clone(), submission.clone(), &routing, Utc::now());
        let record_id = self.crm.create_record(kind, draft).await?;

        info!(
            record_kind = kind.label(),
            record_id = %record_id,
            priority = %routing.priority,
            score = routing.score,
            assigned_rep = routing.assigned_rep.label(),
            "lead captured"
        );

        let bound = routing.bind(kind, record_id);
        let request = NotificationRequest::from_bound(&bound, &contact, &submission);

        let notifications = match self.dispatcher.dispatch(&request).await {
            Ok(report) => NotificationSummary {
                sent: report.sent(),
                outcomes: report.outcomes,
                error: None,
            },
            Err(err) => {
                warn!(record_id = %bound.record.id, error = %err, "notification dispatch rejected");
                NotificationSummary {
                    sent: Vec::new(),
                    outcomes: Vec::new(),
                    error: Some(err.to_string()),
                }
            }
        };

        if notifications.sent.is_empty() && bound.routing.priority >= PriorityTier::High {
            warn!(
                record_id = %bound.record.id,
                priority = %bound.routing.priority,
                "urgent lead reached no notification channel"
            );
        }

        let update = RoutingUpdate {
            priority: bound.routing.priority,
            lead_score: bound.routing.score,
            assigned_rep: bound.routing.assigned_rep.rep().map(str::to_string),
            notification_sent: !notifications.sent.is_empty(),
        };

        let crm_sync = match self.crm.update_routing(&bound.record.id, update).await {
            Ok(()) => CrmSyncStatus::Synced,
            Err(err) => {
                warn!(record_id = %bound.record.id, error = %err, "routing write-back failed");
                CrmSyncStatus::Failed {
                    reason: err.to_string(),
                }
            }
        };

        Ok(IntakeOutcome {
            lead: bound,
            notifications,
            crm_sync,
        })
    }
}

/// Combined response for a captured lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeOutcome {
    #[serde(flatten)]
    pub lead: BoundRouting,
    pub notifications: NotificationSummary,
    pub crm_sync: CrmSyncStatus,
}

/// Notification side of an intake; informational, never fails the intake.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NotificationSummary {
    pub sent: Vec<Channel>,
    pub outcomes: Vec<ChannelOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Whether the routing outcome made it back onto the CRM record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CrmSyncStatus {
    Synced,
    Failed { reason: String },
}

/// Error raised by the intake service.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    Validation(#[from] LeadValidationError),
    #[error(transparent)]
    Crm(#[from] CrmError),
}
