use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Estimates above this ceiling are treated as data-entry mistakes and clamped.
pub const ESTIMATE_CEILING: f64 = 10_000_000.0;

/// Dollar range quoted (or requested) for the project.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EstimateRange {
    pub min: f64,
    pub max: f64,
}

impl EstimateRange {
    /// Builds a range from optional bounds, clamping anything out of range.
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        let min = clamp_amount(min.unwrap_or(0.0));
        let max = clamp_amount(max.unwrap_or(0.0));
        Self {
            min,
            max: max.max(min),
        }
    }

    pub fn midpoint(&self) -> f64 {
        let normalized = Self::new(Some(self.min), Some(self.max));
        (normalized.min + normalized.max) / 2.0
    }

    pub fn is_unknown(&self) -> bool {
        self.midpoint() <= 0.0
    }

    /// Human readable label used in notifications and CRM notes.
    pub fn label(&self) -> String {
        let normalized = Self::new(Some(self.min), Some(self.max));
        if normalized.is_unknown() {
            "estimate pending".to_string()
        } else if (normalized.max - normalized.min).abs() < f64::EPSILON {
            format_dollars(normalized.min)
        } else {
            format!(
                "{} - {}",
                format_dollars(normalized.min),
                format_dollars(normalized.max)
            )
        }
    }
}

fn clamp_amount(raw: f64) -> f64 {
    if raw.is_nan() || raw <= 0.0 {
        0.0
    } else {
        raw.min(ESTIMATE_CEILING)
    }
}

fn format_dollars(amount: f64) -> String {
    let whole = amount.round() as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${grouped}")
}

/// Property categories offered on the estimate form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    #[default]
    SingleFamily,
    MultiFamily,
    Townhome,
    Commercial,
    Industrial,
    Other,
}

impl PropertyType {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "single_family" | "residential" | "house" => Self::SingleFamily,
            "multi_family" | "apartment" | "duplex" => Self::MultiFamily,
            "townhome" | "townhouse" | "condo" => Self::Townhome,
            "commercial" | "retail" | "office" => Self::Commercial,
            "industrial" | "warehouse" => Self::Industrial,
            _ => Self::Other,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PropertyType::SingleFamily => "single_family",
            PropertyType::MultiFamily => "multi_family",
            PropertyType::Townhome => "townhome",
            PropertyType::Commercial => "commercial",
            PropertyType::Industrial => "industrial",
            PropertyType::Other => "other",
        }
    }
}

/// Validated input to the routing engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LeadSubmission {
    pub estimate: EstimateRange,
    pub property_type: PropertyType,
    pub services: Vec<String>,
    pub timeline: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub is_emergency: bool,
}

impl LeadSubmission {
    /// Lowercases, trims, and de-duplicates requested services, keeping first-seen order.
    pub fn normalize_services<I, S>(raw: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut services: Vec<String> = Vec::new();
        for service in raw {
            let normalized = service.as_ref().trim().to_ascii_lowercase();
            if normalized.is_empty() || services.contains(&normalized) {
                continue;
            }
            services.push(normalized);
        }
        services
    }
}

/// Contact block captured alongside the lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Urgency tier driving notification fan-out and rep assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    Emergency,
    High,
    Medium,
    Low,
}

impl PriorityTier {
    pub const ALL: [PriorityTier; 4] = [
        PriorityTier::Emergency,
        PriorityTier::High,
        PriorityTier::Medium,
        PriorityTier::Low,
    ];

    const fn rank(self) -> u8 {
        match self {
            PriorityTier::Low => 0,
            PriorityTier::Medium => 1,
            PriorityTier::High => 2,
            PriorityTier::Emergency => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PriorityTier::Emergency => "emergency",
            PriorityTier::High => "high",
            PriorityTier::Medium => "medium",
            PriorityTier::Low => "low",
        }
    }
}

impl PartialOrd for PriorityTier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriorityTier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// CRM object the lead is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Estimate requests become sales deals.
    Deal,
    /// Service and emergency requests become support tickets.
    Ticket,
}

impl RecordKind {
    pub const fn label(self) -> &'static str {
        match self {
            RecordKind::Deal => "deal",
            RecordKind::Ticket => "ticket",
        }
    }
}

/// Identifier assigned by the CRM once a record exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pointer to a created CRM record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRef {
    pub kind: RecordKind,
    pub id: RecordId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_clamps_negative_and_non_finite_bounds() {
        let range = EstimateRange::new(Some(-50.0), Some(f64::NAN));
        assert_eq!(range, EstimateRange { min: 0.0, max: 0.0 });
        assert!(range.is_unknown());

        let range = EstimateRange::new(Some(5_000.0), Some(f64::INFINITY));
        assert_eq!(range.max, ESTIMATE_CEILING);
    }

    #[test]
    fn estimate_normalizes_inverted_bounds() {
        let range = EstimateRange::new(Some(8_000.0), Some(5_000.0));
        assert_eq!(range.min, 8_000.0);
        assert_eq!(range.max, 8_000.0);
        assert_eq!(range.midpoint(), 8_000.0);
    }

    #[test]
    fn estimate_label_groups_thousands() {
        let range = EstimateRange::new(Some(5_000.0), Some(12_500.0));
        assert_eq!(range.label(), "$5,000 - $12,500");
        assert_eq!(EstimateRange::default().label(), "estimate pending");
        assert_eq!(
            EstimateRange::new(Some(950.0), None).label(),
            "$950",
            "single bound collapses to one amount"
        );
    }

    #[test]
    fn services_are_normalized_in_first_seen_order() {
        let services = LeadSubmission::normalize_services([" Roofing", "gutters", "", "ROOFING"]);
        assert_eq!(services, vec!["roofing".to_string(), "gutters".to_string()]);
    }

    #[test]
    fn priority_tiers_order_by_urgency() {
        assert!(PriorityTier::Emergency > PriorityTier::High);
        assert!(PriorityTier::High > PriorityTier::Medium);
        assert!(PriorityTier::Medium > PriorityTier::Low);
    }

    #[test]
    fn property_type_parses_form_values() {
        assert_eq!(PropertyType::parse("Single Family"), PropertyType::SingleFamily);
        assert_eq!(PropertyType::parse("commercial"), PropertyType::Commercial);
        assert_eq!(PropertyType::parse("boathouse"), PropertyType::Other);
    }
}
