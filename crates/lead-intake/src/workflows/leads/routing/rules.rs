use super::super::domain::LeadSubmission;
use super::config::ScoringWeights;
use super::{ScoreComponent, ScoreFactor};

pub(crate) fn score_submission(
    submission: &LeadSubmission,
    weights: &ScoringWeights,
) -> (Vec<ScoreComponent>, u32) {
    let mut components = Vec::new();

    let midpoint = submission.estimate.midpoint();
    let rate = weights.points_per_thousand;
    let estimate_points = if rate.is_finite() && rate > 0.0 {
        let raw = (midpoint / 1_000.0 * rate).floor();
        (raw.min(weights.estimate_cap as f64)) as u32
    } else {
        0
    };
    components.push(ScoreComponent {
        factor: ScoreFactor::EstimateRange,
        points: estimate_points,
        notes: format!(
            "estimate {} (midpoint ${midpoint:.0}), cap {}",
            submission.estimate.label(),
            weights.estimate_cap
        ),
    });

    let service_count = u32::try_from(submission.services.len()).unwrap_or(u32::MAX);
    let service_points = service_count
        .saturating_mul(weights.points_per_service)
        .min(weights.services_cap);
    components.push(ScoreComponent {
        factor: ScoreFactor::ServiceCount,
        points: service_points,
        notes: format!("{service_count} service(s) requested"),
    });

    if let Some(bonus) = weights
        .property_type_bonus
        .get(&submission.property_type)
        .copied()
        .filter(|bonus| *bonus > 0)
    {
        components.push(ScoreComponent {
            factor: ScoreFactor::PropertyType,
            points: bonus,
            notes: format!("{} property", submission.property_type.label()),
        });
    }

    if let Some(keyword) = submission
        .timeline
        .as_deref()
        .and_then(|timeline| find_keyword(timeline, &weights.urgent_timeline_keywords))
    {
        components.push(ScoreComponent {
            factor: ScoreFactor::Timeline,
            points: weights.urgent_timeline_bonus,
            notes: format!("timeline mentions '{keyword}'"),
        });
    }

    if let Some(keyword) = submission
        .description
        .as_deref()
        .and_then(|description| find_keyword(description, &weights.damage_keywords))
    {
        components.push(ScoreComponent {
            factor: ScoreFactor::DamageReport,
            points: weights.damage_bonus,
            notes: format!("description mentions '{keyword}'"),
        });
    }

    if submission.is_emergency {
        components.push(ScoreComponent {
            factor: ScoreFactor::Emergency,
            points: weights.emergency_bonus,
            notes: "flagged as emergency".to_string(),
        });
    }

    let total = components
        .iter()
        .fold(0u32, |total, component| total.saturating_add(component.points));

    (components, total)
}

fn find_keyword<'a>(text: &str, keywords: &'a [String]) -> Option<&'a str> {
    let haystack = text.to_ascii_lowercase();
    keywords
        .iter()
        .map(String::as_str)
        .find(|keyword| !keyword.is_empty() && haystack.contains(&keyword.to_ascii_lowercase()))
}
