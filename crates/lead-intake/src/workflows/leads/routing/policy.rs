use super::super::domain::{LeadSubmission, PriorityTier};
use super::config::{PriorityThresholds, RosterEntry, WorkflowTriggerTable};
use super::{AssignmentBasis, RepAssignment};

pub(crate) const UNASSIGNED_REVIEW_TRIGGER: &str = "unassigned-lead-review";

/// Emergency flag overrides the score; everything else is a threshold walk.
pub(crate) fn decide_priority(
    score: u32,
    is_emergency: bool,
    thresholds: &PriorityThresholds,
) -> PriorityTier {
    if is_emergency {
        return PriorityTier::Emergency;
    }

    if score >= thresholds.high {
        PriorityTier::High
    } else if score >= thresholds.medium {
        PriorityTier::Medium
    } else {
        PriorityTier::Low
    }
}

pub(crate) fn assign_rep(
    tier: PriorityTier,
    submission: &LeadSubmission,
    roster: &[RosterEntry],
) -> RepAssignment {
    let candidates: Vec<&RosterEntry> = roster.iter().filter(|entry| entry.covers(tier)).collect();

    if let Some(entry) = candidates
        .iter()
        .find(|entry| !entry.is_generalist() && entry.specializes_in(&submission.services))
    {
        return RepAssignment::Assigned {
            rep: entry.rep.clone(),
            basis: AssignmentBasis::ServiceSpecialist,
        };
    }

    if let Some(entry) = candidates.iter().find(|entry| entry.is_generalist()) {
        return RepAssignment::Assigned {
            rep: entry.rep.clone(),
            basis: AssignmentBasis::TierGeneralist,
        };
    }

    match candidates.first() {
        Some(entry) => RepAssignment::Assigned {
            rep: entry.rep.clone(),
            basis: AssignmentBasis::TierFallback,
        },
        None => RepAssignment::Unassigned,
    }
}

pub(crate) fn workflow_triggers(
    tier: PriorityTier,
    submission: &LeadSubmission,
    assignment: &RepAssignment,
    table: &WorkflowTriggerTable,
) -> Vec<String> {
    let mut triggers: Vec<String> = Vec::new();
    let mut push = |tag: &str| {
        if !tag.is_empty() && !triggers.iter().any(|existing| existing == tag) {
            triggers.push(tag.to_string());
        }
    };

    for tag in table.for_priority(tier) {
        push(tag);
    }

    for service in &submission.services {
        for tag in table.for_service(service) {
            push(tag);
        }
    }

    if matches!(assignment, RepAssignment::Unassigned) {
        push(UNASSIGNED_REVIEW_TRIGGER);
    }

    triggers
}
