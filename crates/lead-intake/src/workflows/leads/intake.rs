use serde::{Deserialize, Serialize};

use super::domain::{ContactDetails, EstimateRange, LeadSubmission, PropertyType};

/// Validation errors raised while turning a web form into a lead submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeadValidationError {
    #[error("contact name is required")]
    MissingName,
    #[error("contact email '{0}' is not a valid address")]
    InvalidEmail(String),
    #[error("{field} must be a dollar amount (found '{value}')")]
    InvalidEstimate { field: &'static str, value: String },
    #[error("{field} must be true or false (found '{value}')")]
    InvalidFlag { field: &'static str, value: String },
}

/// Estimate bound as posted by the site: a JSON number or a display string such as
/// `"$5,000"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EstimateInput {
    Amount(f64),
    Text(String),
}

impl EstimateInput {
    fn resolve(&self, field: &'static str) -> Result<Option<f64>, LeadValidationError> {
        match self {
            EstimateInput::Amount(amount) => Ok(Some(*amount)),
            EstimateInput::Text(raw) => parse_dollars(raw).map_err(|_| {
                LeadValidationError::InvalidEstimate {
                    field,
                    value: raw.clone(),
                }
            }),
        }
    }
}

/// Checkbox value as posted by the site: a JSON boolean or a string such as `"true"` or `"on"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagInput {
    Flag(bool),
    Text(String),
}

impl FlagInput {
    fn resolve(&self, field: &'static str) -> Result<bool, LeadValidationError> {
        let raw = match self {
            FlagInput::Flag(flag) => return Ok(*flag),
            FlagInput::Text(raw) => raw,
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" | "" => Ok(false),
            _ => Err(LeadValidationError::InvalidFlag {
                field,
                value: raw.clone(),
            }),
        }
    }
}

fn parse_dollars(raw: &str) -> Result<Option<f64>, std::num::ParseFloatError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' ' | '_'))
        .collect::<String>()
        .to_ascii_lowercase();

    if cleaned.is_empty() {
        return Ok(None);
    }

    let (digits, multiplier) = match cleaned.strip_suffix('k') {
        Some(digits) => (digits, 1_000.0),
        None => (cleaned.as_str(), 1.0),
    };

    digits.parse::<f64>().map(|value| Some(value * multiplier))
}

/// Raw estimate/service-request form body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub estimate_min: Option<EstimateInput>,
    #[serde(default)]
    pub estimate_max: Option<EstimateInput>,
    #[serde(default)]
    pub timeline: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_emergency: Option<FlagInput>,
}

impl LeadForm {
    /// Split the form into validated contact details and the routing engine input.
    pub fn into_parts(self) -> Result<(ContactDetails, LeadSubmission), LeadValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(LeadValidationError::MissingName);
        }

        let email = self.email.trim().to_string();
        if !looks_like_email(&email) {
            return Err(LeadValidationError::InvalidEmail(email));
        }

        let estimate_min = match &self.estimate_min {
            Some(input) => input.resolve("estimate_min")?,
            None => None,
        };
        let estimate_max = match &self.estimate_max {
            Some(input) => input.resolve("estimate_max")?,
            None => None,
        };
        let is_emergency = match &self.is_emergency {
            Some(input) => input.resolve("is_emergency")?,
            None => false,
        };

        let contact = ContactDetails {
            name,
            email,
            phone: non_empty(self.phone),
        };

        let submission = LeadSubmission {
            estimate: EstimateRange::new(estimate_min, estimate_max),
            property_type: self
                .property_type
                .as_deref()
                .map(PropertyType::parse)
                .unwrap_or_default(),
            services: LeadSubmission::normalize_services(&self.services),
            timeline: non_empty(self.timeline),
            address: non_empty(self.address),
            description: non_empty(self.description),
            is_emergency,
        };

        Ok((contact, submission))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

pub(crate) fn looks_like_email(raw: &str) -> bool {
    match raw.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}
