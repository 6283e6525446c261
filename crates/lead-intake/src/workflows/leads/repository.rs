use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{ContactDetails, LeadSubmission, PriorityTier, RecordId, RecordKind};
use super::routing::RoutingResult;

/// Record written to the CRM when a lead arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRecordDraft {
    pub contact: ContactDetails,
    pub submission: LeadSubmission,
    pub priority: PriorityTier,
    pub lead_score: u32,
    pub assigned_rep: Option<String>,
    pub workflows_triggered: Vec<String>,
    pub received_at: DateTime<Utc>,
}

impl LeadRecordDraft {
    pub fn new(
        contact: ContactDetails,
        submission: LeadSubmission,
        routing: &RoutingResult,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            contact,
            submission,
            priority: routing.priority,
            lead_score: routing.score,
            assigned_rep: routing.assigned_rep.rep().map(str::to_string),
            workflows_triggered: routing.workflows_triggered.clone(),
            received_at,
        }
    }

    /// Deal/ticket title shown in the CRM pipeline.
    pub fn title(&self, kind: RecordKind) -> String {
        let subject = match self.submission.services.first() {
            Some(service) => service.replace('-', " "),
            None => "general inquiry".to_string(),
        };
        match kind {
            RecordKind::Deal => format!("{} - {}", self.contact.name, subject),
            RecordKind::Ticket => format!(
                "[{}] {} - {}",
                self.priority.label(),
                self.contact.name,
                subject
            ),
        }
    }
}

/// Routing outcome written back onto an existing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingUpdate {
    pub priority: PriorityTier,
    pub lead_score: u32,
    pub assigned_rep: Option<String>,
    pub notification_sent: bool,
}

/// CRM abstraction so the intake pipeline can be exercised without HubSpot.
#[async_trait]
pub trait CrmGateway: Send + Sync {
    async fn create_record(
        &self,
        kind: RecordKind,
        draft: LeadRecordDraft,
    ) -> Result<RecordId, CrmError>;

    async fn update_routing(&self, id: &RecordId, update: RoutingUpdate) -> Result<(), CrmError>;
}

/// Error enumeration for CRM failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CrmError {
    #[error("record not found")]
    NotFound,
    #[error("crm rejected the record: {0}")]
    Rejected(String),
    #[error("crm unavailable: {0}")]
    Unavailable(String),
}
