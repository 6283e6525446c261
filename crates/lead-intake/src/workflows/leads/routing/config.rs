use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::domain::{PriorityTier, PropertyType};

/// Scoring weights, thresholds, roster, and trigger tables read by the routing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub weights: ScoringWeights,
    pub thresholds: PriorityThresholds,
    pub roster: Vec<RosterEntry>,
    pub triggers: WorkflowTriggerTable,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            thresholds: PriorityThresholds::default(),
            roster: vec![
                RosterEntry {
                    rep: "storm-response-team".to_string(),
                    tiers: vec![PriorityTier::Emergency],
                    services: Vec::new(),
                },
                RosterEntry {
                    rep: "commercial-estimator".to_string(),
                    tiers: vec![PriorityTier::Emergency, PriorityTier::High],
                    services: vec!["commercial-roofing".to_string(), "coatings".to_string()],
                },
                RosterEntry {
                    rep: "senior-estimator".to_string(),
                    tiers: vec![PriorityTier::High],
                    services: Vec::new(),
                },
                RosterEntry {
                    rep: "exteriors-estimator".to_string(),
                    tiers: vec![PriorityTier::Medium, PriorityTier::Low],
                    services: vec![
                        "siding".to_string(),
                        "gutters".to_string(),
                        "windows".to_string(),
                    ],
                },
                RosterEntry {
                    rep: "inside-sales".to_string(),
                    tiers: vec![PriorityTier::Medium, PriorityTier::Low],
                    services: Vec::new(),
                },
            ],
            triggers: WorkflowTriggerTable::default(),
        }
    }
}

/// Point weights for each scoring signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub points_per_thousand: f64,
    pub estimate_cap: u32,
    pub points_per_service: u32,
    pub services_cap: u32,
    pub emergency_bonus: u32,
    pub property_type_bonus: BTreeMap<PropertyType, u32>,
    pub urgent_timeline_keywords: Vec<String>,
    pub urgent_timeline_bonus: u32,
    pub damage_keywords: Vec<String>,
    pub damage_bonus: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        let mut property_type_bonus = BTreeMap::new();
        property_type_bonus.insert(PropertyType::Commercial, 15);
        property_type_bonus.insert(PropertyType::Industrial, 15);
        property_type_bonus.insert(PropertyType::MultiFamily, 10);

        Self {
            points_per_thousand: 1.0,
            estimate_cap: 40,
            points_per_service: 10,
            services_cap: 50,
            emergency_bonus: 30,
            property_type_bonus,
            urgent_timeline_keywords: vec![
                "asap".to_string(),
                "immediately".to_string(),
                "this week".to_string(),
                "urgent".to_string(),
            ],
            urgent_timeline_bonus: 10,
            damage_keywords: vec![
                "leak".to_string(),
                "storm".to_string(),
                "hail".to_string(),
                "insurance".to_string(),
            ],
            damage_bonus: 5,
        }
    }
}

/// Minimum scores for the non-emergency tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityThresholds {
    pub high: u32,
    pub medium: u32,
}

impl Default for PriorityThresholds {
    fn default() -> Self {
        Self {
            high: 60,
            medium: 30,
        }
    }
}

/// A sales rep (or team queue) and the leads they may own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub rep: String,
    pub tiers: Vec<PriorityTier>,
    /// Empty means the rep takes any service mix.
    #[serde(default)]
    pub services: Vec<String>,
}

impl RosterEntry {
    pub fn covers(&self, tier: PriorityTier) -> bool {
        self.tiers.contains(&tier)
    }

    pub fn is_generalist(&self) -> bool {
        self.services.is_empty()
    }

    pub fn specializes_in(&self, services: &[String]) -> bool {
        self.services
            .iter()
            .any(|specialty| services.iter().any(|service| specialty.eq_ignore_ascii_case(service)))
    }
}

/// Follow-up automation tags keyed by priority and by requested service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowTriggerTable {
    pub by_priority: BTreeMap<PriorityTier, Vec<String>>,
    pub by_service: BTreeMap<String, Vec<String>>,
}

impl WorkflowTriggerTable {
    pub fn for_priority(&self, tier: PriorityTier) -> &[String] {
        self.by_priority
            .get(&tier)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Keys match the way roster specialties do: trimmed, ASCII case-insensitive.
    pub fn for_service(&self, service: &str) -> &[String] {
        let service = service.trim();
        self.by_service
            .iter()
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(service))
            .map(|(_, tags)| tags.as_slice())
            .unwrap_or_default()
    }
}

impl Default for WorkflowTriggerTable {
    fn default() -> Self {
        let tags = |values: &[&str]| values.iter().map(|tag| tag.to_string()).collect::<Vec<_>>();

        let mut by_priority = BTreeMap::new();
        by_priority.insert(
            PriorityTier::Emergency,
            tags(&["urgent-sms", "manager-alert", "same-day-inspection"]),
        );
        by_priority.insert(
            PriorityTier::High,
            tags(&["manager-alert", "priority-follow-up"]),
        );
        by_priority.insert(
            PriorityTier::Medium,
            tags(&["standard-follow-up"]),
        );
        by_priority.insert(
            PriorityTier::Low,
            tags(&["nurture-sequence"]),
        );

        let mut by_service = BTreeMap::new();
        by_service.insert(
            "storm-damage".to_string(),
            tags(&["insurance-claim-review"]),
        );
        by_service.insert(
            "roof-replacement".to_string(),
            tags(&["financing-offer"]),
        );
        by_service.insert(
            "commercial-roofing".to_string(),
            tags(&["commercial-site-survey"]),
        );

        Self {
            by_priority,
            by_service,
        }
    }
}
