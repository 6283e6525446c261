use super::common::*;
use crate::workflows::leads::domain::{PriorityTier, PropertyType, RecordId, RecordKind};
use crate::workflows::leads::routing::{
    AssignmentBasis, RepAssignment, RoutingConfig, RoutingEngine, ScoreFactor,
    UNASSIGNED_REVIEW_TRIGGER,
};

#[test]
fn emergency_flag_forces_emergency_priority_with_zero_inputs() {
    let engine = engine();
    let mut lead = submission(0.0, 0.0, &[]);
    lead.is_emergency = true;

    let result = engine.process_lead(&lead);

    assert_eq!(result.priority, PriorityTier::Emergency);
    assert!(result.is_emergency);
    assert_eq!(result.score, routing_config().weights.emergency_bonus);
    assert_eq!(result.assigned_rep.rep(), Some("storm-response-team"));
    assert!(result
        .workflows_triggered
        .contains(&"urgent-sms".to_string()));
}

#[test]
fn emergency_overrides_thresholds_even_when_score_is_low() {
    let mut config = routing_config();
    config.thresholds.high = 500;
    config.thresholds.medium = 400;
    config.weights.emergency_bonus = 0;
    let engine = RoutingEngine::new(config);
    let mut lead = submission(1_000.0, 2_000.0, &["gutters"]);
    lead.is_emergency = true;

    let result = engine.process_lead(&lead);

    assert_eq!(result.priority, PriorityTier::Emergency);
}

#[test]
fn modest_single_service_estimate_lands_in_lower_tiers() {
    let result = engine().process_lead(&submission(5_000.0, 8_000.0, &["roofing"]));

    assert!(
        matches!(result.priority, PriorityTier::Low | PriorityTier::Medium),
        "unexpected priority {:?}",
        result.priority
    );
    assert_eq!(result.score, 16);
    assert_eq!(
        result.assigned_rep,
        RepAssignment::Assigned {
            rep: "inside-sales".to_string(),
            basis: AssignmentBasis::TierGeneralist,
        }
    );
    assert_eq!(result.workflows_triggered, vec!["nurture-sequence".to_string()]);
}

#[test]
fn five_services_with_large_estimate_is_at_least_high() {
    let lead = submission(
        40_000.0,
        90_000.0,
        &["roofing", "siding", "gutters", "windows", "skylights"],
    );

    let result = engine().process_lead(&lead);

    assert!(result.priority >= PriorityTier::High);
    assert!(!result.is_emergency);
    assert_eq!(result.assigned_rep.rep(), Some("senior-estimator"));
}

#[test]
fn score_never_decreases_as_estimate_midpoint_grows() {
    let engine = engine();
    let mut previous = 0;
    for step in 0..120 {
        let amount = f64::from(step) * 750.0;
        let result = engine.process_lead(&submission(amount, amount + 500.0, &["roofing"]));
        assert!(
            result.score >= previous,
            "score dropped from {previous} to {} at {amount}",
            result.score
        );
        previous = result.score;
    }
}

#[test]
fn score_never_decreases_as_services_are_added() {
    let engine = engine();
    let catalog = [
        "roofing",
        "siding",
        "gutters",
        "windows",
        "skylights",
        "insulation",
        "decking",
    ];
    let mut previous = 0;
    for count in 0..=catalog.len() {
        let result = engine.process_lead(&submission(12_000.0, 15_000.0, &catalog[..count]));
        assert!(result.score >= previous);
        previous = result.score;
    }
}

#[test]
fn identical_input_yields_identical_result() {
    let engine = engine();
    let mut lead = submission(18_000.0, 26_000.0, &["roof-replacement", "gutters"]);
    lead.property_type = PropertyType::MultiFamily;
    lead.timeline = Some("ASAP please".to_string());

    let first = engine.process_lead(&lead);
    let second = engine.process_lead(&lead);

    assert_eq!(first, second);
}

#[test]
fn service_specialist_is_preferred_over_generalist() {
    let result = engine().process_lead(&submission(2_000.0, 3_000.0, &["gutters"]));

    assert_eq!(result.priority, PriorityTier::Low);
    assert_eq!(
        result.assigned_rep,
        RepAssignment::Assigned {
            rep: "exteriors-estimator".to_string(),
            basis: AssignmentBasis::ServiceSpecialist,
        }
    );
}

#[test]
fn specialist_covers_tier_when_no_generalist_exists() {
    let config = RoutingConfig {
        roster: vec![roster_entry(
            "coatings-specialist",
            &[PriorityTier::Low],
            &["coatings"],
        )],
        ..routing_config()
    };

    let engine = RoutingEngine::new(config);
    let result = engine.process_lead(&submission(1_000.0, 1_500.0, &["roofing"]));

    assert_eq!(
        result.assigned_rep,
        RepAssignment::Assigned {
            rep: "coatings-specialist".to_string(),
            basis: AssignmentBasis::TierFallback,
        }
    );
}

#[test]
fn tier_without_roster_entry_is_explicitly_unassigned() {
    let config = RoutingConfig {
        roster: vec![roster_entry("senior-estimator", &[PriorityTier::High], &[])],
        ..routing_config()
    };

    let engine = RoutingEngine::new(config);
    let result = engine.process_lead(&submission(1_000.0, 1_500.0, &["roofing"]));

    assert_eq!(result.priority, PriorityTier::Low);
    assert_eq!(result.assigned_rep, RepAssignment::Unassigned);
    assert_eq!(result.assigned_rep.label(), "unassigned");
    assert_eq!(
        result.workflows_triggered.last().map(String::as_str),
        Some(UNASSIGNED_REVIEW_TRIGGER)
    );
}

#[test]
fn bonuses_are_recorded_as_components() {
    let mut lead = submission(10_000.0, 10_000.0, &["storm-damage"]);
    lead.property_type = PropertyType::Commercial;
    lead.timeline = Some("Need this done immediately".to_string());
    lead.description = Some("Hail dented the panels".to_string());

    let result = engine().process_lead(&lead);
    let factors: Vec<ScoreFactor> = result
        .components
        .iter()
        .map(|component| component.factor)
        .collect();

    assert_eq!(
        factors,
        vec![
            ScoreFactor::EstimateRange,
            ScoreFactor::ServiceCount,
            ScoreFactor::PropertyType,
            ScoreFactor::Timeline,
            ScoreFactor::DamageReport,
        ]
    );
    // 10 estimate + 10 service + 15 commercial + 10 timeline + 5 damage
    assert_eq!(result.score, 50);
    assert_eq!(result.priority, PriorityTier::Medium);
    assert!(result
        .workflows_triggered
        .contains(&"insurance-claim-review".to_string()));
}

#[test]
fn keyword_bonuses_apply_once_per_field() {
    let mut lead = submission(0.0, 0.0, &[]);
    lead.timeline = Some("ASAP, urgent, this week if possible".to_string());
    lead.description = Some("hail storm caused a leak, filing insurance".to_string());
    let weights = routing_config().weights;

    let result = engine().process_lead(&lead);

    let timeline: Vec<u32> = result
        .components
        .iter()
        .filter(|component| component.factor == ScoreFactor::Timeline)
        .map(|component| component.points)
        .collect();
    let damage: Vec<u32> = result
        .components
        .iter()
        .filter(|component| component.factor == ScoreFactor::DamageReport)
        .map(|component| component.points)
        .collect();

    assert_eq!(timeline, vec![weights.urgent_timeline_bonus]);
    assert_eq!(damage, vec![weights.damage_bonus]);
    assert_eq!(
        result.score,
        weights.urgent_timeline_bonus + weights.damage_bonus
    );
}

#[test]
fn estimate_and_service_points_are_capped() {
    let lead = submission(
        5_000_000.0,
        9_000_000.0,
        &["a", "b", "c", "d", "e", "f", "g", "h"],
    );
    let config = routing_config();

    let result = engine().process_lead(&lead);

    assert_eq!(
        result.score,
        config.weights.estimate_cap + config.weights.services_cap
    );
}

#[test]
fn workflow_triggers_are_deduplicated() {
    let mut config = routing_config();
    config
        .triggers
        .by_service
        .insert("roofing".to_string(), vec!["nurture-sequence".to_string()]);

    let engine = RoutingEngine::new(config);
    let result = engine.process_lead(&submission(500.0, 900.0, &["roofing"]));

    assert_eq!(result.workflows_triggered, vec!["nurture-sequence".to_string()]);
}

#[test]
fn binding_attaches_record_without_changing_routing() {
    let routing = engine().process_lead(&submission(5_000.0, 8_000.0, &["roofing"]));

    let bound = routing
        .clone()
        .bind(RecordKind::Ticket, RecordId("ticket-000007".to_string()));

    assert_eq!(bound.routing, routing);
    assert_eq!(bound.record.kind, RecordKind::Ticket);
    assert_eq!(bound.record.id.0, "ticket-000007");
}
