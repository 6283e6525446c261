mod config;
mod policy;
mod rules;

pub use config::{
    PriorityThresholds, RosterEntry, RoutingConfig, ScoringWeights, WorkflowTriggerTable,
};
#[cfg(test)]
pub(crate) use policy::UNASSIGNED_REVIEW_TRIGGER;

use super::domain::{LeadSubmission, PriorityTier, RecordId, RecordKind, RecordRef};
use serde::{Deserialize, Serialize};

/// Stateless scorer that applies the routing configuration to a lead.
#[derive(Debug, Clone)]
pub struct RoutingEngine {
    config: RoutingConfig,
}

impl RoutingEngine {
    pub fn new(config: RoutingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Score, prioritize, and assign a lead. Never fails: malformed numbers are clamped upstream.
    pub fn process_lead(&self, submission: &LeadSubmission) -> RoutingResult {
        let (components, score) = rules::score_submission(submission, &self.config.weights);
        let priority =
            policy::decide_priority(score, submission.is_emergency, &self.config.thresholds);
        let assigned_rep = policy::assign_rep(priority, submission, &self.config.roster);
        let workflows_triggered =
            policy::workflow_triggers(priority, submission, &assigned_rep, &self.config.triggers);

        RoutingResult {
            priority,
            score,
            is_emergency: submission.is_emergency,
            assigned_rep,
            workflows_triggered,
            components,
        }
    }
}

/// Signals that contribute points to a lead score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    EstimateRange,
    ServiceCount,
    PropertyType,
    Timeline,
    DamageReport,
    Emergency,
}

/// Discrete contribution to a lead score, kept for CRM notes and audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub points: u32,
    pub notes: String,
}

/// Which roster rule produced an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentBasis {
    ServiceSpecialist,
    TierGeneralist,
    TierFallback,
}

/// Rep ownership decision. `Unassigned` is explicit so callers never guess a default owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RepAssignment {
    Assigned { rep: String, basis: AssignmentBasis },
    Unassigned,
}

impl RepAssignment {
    pub fn rep(&self) -> Option<&str> {
        match self {
            RepAssignment::Assigned { rep, .. } => Some(rep.as_str()),
            RepAssignment::Unassigned => None,
        }
    }

    pub fn label(&self) -> &str {
        self.rep().unwrap_or("unassigned")
    }
}

/// Routing decision for a lead, independent of any CRM record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingResult {
    pub priority: PriorityTier,
    pub score: u32,
    pub is_emergency: bool,
    pub assigned_rep: RepAssignment,
    pub workflows_triggered: Vec<String>,
    pub components: Vec<ScoreComponent>,
}

impl RoutingResult {
    /// Pair the decision with the CRM record it was made for.
    pub fn bind(self, kind: RecordKind, id: RecordId) -> BoundRouting {
        BoundRouting {
            record: RecordRef { kind, id },
            routing: self,
        }
    }
}

/// Routing decision attached to the record created for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundRouting {
    pub record: RecordRef,
    pub routing: RoutingResult,
}
