//! Best-effort notification fan-out for routed leads.
//!
//! Every channel eligible for the lead's priority is sent from its own task with its own
//! timeout. Failures and timeouts are folded into a [`DispatchReport`]; only a malformed
//! request is reported as an error. Delivery tasks are detached from the caller, so a
//! dropped request future does not interrupt sends that are already in flight.

mod channel;
mod transport;

pub use channel::Channel;
pub use transport::{HttpTransport, NotificationMessage, NotificationTransport, TransportError};

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{ContactDetails, LeadSubmission, PriorityTier, RecordId};
use super::intake::looks_like_email;
use super::routing::BoundRouting;

pub const DEFAULT_CHANNEL_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything a channel needs to describe a routed lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub priority: PriorityTier,
    pub record_id: RecordId,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub address: Option<String>,
    pub estimate: String,
    pub services: Vec<String>,
    pub lead_score: u32,
    pub assigned_rep: Option<String>,
}

impl NotificationRequest {
    pub fn from_bound(
        bound: &BoundRouting,
        contact: &ContactDetails,
        submission: &LeadSubmission,
    ) -> Self {
        Self {
            priority: bound.routing.priority,
            record_id: bound.record.id.clone(),
            customer_name: contact.name.clone(),
            customer_email: contact.email.clone(),
            customer_phone: contact.phone.clone(),
            address: submission.address.clone(),
            estimate: submission.estimate.label(),
            services: submission.services.clone(),
            lead_score: bound.routing.score,
            assigned_rep: bound.routing.assigned_rep.rep().map(str::to_string),
        }
    }

    fn validate(&self) -> Result<(), NotificationError> {
        if self.record_id.0.trim().is_empty() {
            return Err(NotificationError::MissingRecordId);
        }
        if self.customer_name.trim().is_empty() {
            return Err(NotificationError::MissingCustomerName);
        }
        if !looks_like_email(self.customer_email.trim()) {
            return Err(NotificationError::InvalidCustomerEmail(
                self.customer_email.clone(),
            ));
        }
        Ok(())
    }
}

/// Raised only when the request itself cannot be rendered into any message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationError {
    #[error("notification request is missing a record id")]
    MissingRecordId,
    #[error("notification request is missing a customer name")]
    MissingCustomerName,
    #[error("notification request has an invalid customer email '{0}'")]
    InvalidCustomerEmail(String),
}

/// Result of a single channel attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ChannelOutcome {
    Sent { channel: Channel, elapsed_ms: u64 },
    Failed { channel: Channel, reason: String },
    TimedOut { channel: Channel, after_ms: u64 },
    Skipped { channel: Channel, reason: String },
}

impl ChannelOutcome {
    pub fn channel(&self) -> Channel {
        match self {
            ChannelOutcome::Sent { channel, .. }
            | ChannelOutcome::Failed { channel, .. }
            | ChannelOutcome::TimedOut { channel, .. }
            | ChannelOutcome::Skipped { channel, .. } => *channel,
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, ChannelOutcome::Sent { .. })
    }
}

/// Per-channel outcomes for one dispatch, ordered by channel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DispatchReport {
    pub outcomes: Vec<ChannelOutcome>,
}

impl DispatchReport {
    pub fn sent(&self) -> Vec<Channel> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.is_sent())
            .map(ChannelOutcome::channel)
            .collect()
    }

    pub fn not_sent(&self) -> Vec<Channel> {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.is_sent())
            .map(ChannelOutcome::channel)
            .collect()
    }
}

/// Channel selection, fan-out, and aggregation over the registered transports.
#[derive(Clone)]
pub struct NotificationDispatcher {
    transports: BTreeMap<Channel, Arc<dyn NotificationTransport>>,
    channel_timeout: Duration,
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_TIMEOUT)
    }
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("channels", &self.transports.keys().collect::<Vec<_>>())
            .field("channel_timeout", &self.channel_timeout)
            .finish()
    }
}

impl NotificationDispatcher {
    pub fn new(channel_timeout: Duration) -> Self {
        Self {
            transports: BTreeMap::new(),
            channel_timeout,
        }
    }

    /// Register a transport under the channel it reports; replaces any earlier one.
    pub fn with_transport(mut self, transport: Arc<dyn NotificationTransport>) -> Self {
        self.transports.insert(transport.channel(), transport);
        self
    }

    pub fn channel_timeout(&self) -> Duration {
        self.channel_timeout
    }

    pub fn configured_channels(&self) -> Vec<Channel> {
        self.transports.keys().copied().collect()
    }

    /// Channels that were notified successfully.
    pub async fn send_notifications(
        &self,
        request: &NotificationRequest,
    ) -> Result<Vec<Channel>, NotificationError> {
        Ok(self.dispatch(request).await?.sent())
    }

    /// Attempt every eligible channel concurrently and report each outcome.
    pub async fn dispatch(
        &self,
        request: &NotificationRequest,
    ) -> Result<DispatchReport, NotificationError> {
        request.validate()?;

        let mut outcomes = Vec::new();
        let mut in_flight = Vec::new();

        for &channel in Channel::eligible_for(request.priority) {
            let Some(transport) = self.transports.get(&channel).cloned() else {
                debug!(%channel, record_id = %request.record_id, "no transport configured");
                outcomes.push(ChannelOutcome::Skipped {
                    channel,
                    reason: "no transport configured".to_string(),
                });
                continue;
            };

            let Some(message) = render_message(channel, request) else {
                outcomes.push(ChannelOutcome::Skipped {
                    channel,
                    reason: "customer phone not provided".to_string(),
                });
                continue;
            };

            let timeout = self.channel_timeout;
            let handle = tokio::spawn(deliver(transport, message, timeout));
            in_flight.push((channel, handle));
        }

        let joined = join_all(in_flight.into_iter().map(|(channel, handle)| async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(%channel, error = %err, "notification task did not complete");
                    ChannelOutcome::Failed {
                        channel,
                        reason: format!("delivery task aborted: {err}"),
                    }
                }
            }
        }))
        .await;

        outcomes.extend(joined);
        outcomes.sort_by_key(ChannelOutcome::channel);

        Ok(DispatchReport { outcomes })
    }
}

async fn deliver(
    transport: Arc<dyn NotificationTransport>,
    message: NotificationMessage,
    timeout: Duration,
) -> ChannelOutcome {
    let channel = message.channel;
    let started = Instant::now();

    match tokio::time::timeout(timeout, transport.send(&message)).await {
        Ok(Ok(())) => {
            let elapsed_ms = elapsed_millis(started);
            debug!(%channel, record_id = %message.record_id, elapsed_ms, "notification sent");
            ChannelOutcome::Sent {
                channel,
                elapsed_ms,
            }
        }
        Ok(Err(err)) => {
            warn!(%channel, record_id = %message.record_id, error = %err, "notification failed");
            ChannelOutcome::Failed {
                channel,
                reason: err.to_string(),
            }
        }
        Err(_) => {
            let after_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            warn!(%channel, record_id = %message.record_id, after_ms, "notification timed out");
            ChannelOutcome::TimedOut { channel, after_ms }
        }
    }
}

fn elapsed_millis(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn render_message(channel: Channel, request: &NotificationRequest) -> Option<NotificationMessage> {
    let (recipient, subject, body) = match channel {
        Channel::Email => (
            Some(request.customer_email.trim().to_string()),
            email_subject(request.priority),
            render_customer_email(request),
        ),
        Channel::Sms => {
            let phone = request
                .customer_phone
                .as_deref()
                .map(str::trim)
                .filter(|phone| !phone.is_empty())?;
            (
                Some(phone.to_string()),
                format!("Request {}", request.record_id),
                render_customer_sms(request),
            )
        }
        Channel::InternalAlert => (
            None,
            format!(
                "[{}] New lead {} (score {})",
                request.priority.label().to_ascii_uppercase(),
                request.record_id,
                request.lead_score
            ),
            render_staff_alert(request),
        ),
    };

    Some(NotificationMessage {
        channel,
        priority: request.priority,
        record_id: request.record_id.clone(),
        recipient,
        subject,
        body,
    })
}

fn email_subject(priority: PriorityTier) -> String {
    match priority {
        PriorityTier::Emergency => "We received your emergency service request".to_string(),
        _ => "We received your estimate request".to_string(),
    }
}

fn first_name(full_name: &str) -> &str {
    full_name.split_whitespace().next().unwrap_or(full_name)
}

fn services_label(services: &[String]) -> String {
    if services.is_empty() {
        "general inquiry".to_string()
    } else {
        services.join(", ")
    }
}

fn render_customer_email(request: &NotificationRequest) -> String {
    let mut body = String::new();
    writeln!(body, "Hi {},", first_name(&request.customer_name)).expect("write greeting");
    body.push('\n');
    writeln!(
        body,
        "Thanks for reaching out. Your request has been logged as reference {}.",
        request.record_id
    )
    .expect("write reference");
    writeln!(
        body,
        "Services requested: {}",
        services_label(&request.services)
    )
    .expect("write services");
    if let Some(address) = &request.address {
        writeln!(body, "Property: {address}").expect("write address");
    }

    let follow_up = match request.priority {
        PriorityTier::Emergency => {
            "Our emergency crew is being dispatched and will call you shortly."
        }
        PriorityTier::High => "A senior estimator will contact you within one business day.",
        PriorityTier::Medium => "An estimator will contact you within two business days.",
        PriorityTier::Low => "A member of our team will follow up with next steps soon.",
    };
    body.push('\n');
    writeln!(body, "{follow_up}").expect("write follow up");
    body
}

fn render_customer_sms(request: &NotificationRequest) -> String {
    match request.priority {
        PriorityTier::Emergency => format!(
            "Hi {}, we got your emergency request (ref {}). \
             A crew lead will call you within the hour.",
            first_name(&request.customer_name),
            request.record_id
        ),
        _ => format!(
            "Hi {}, thanks for your request (ref {}). An estimator will call you soon.",
            first_name(&request.customer_name),
            request.record_id
        ),
    }
}

fn render_staff_alert(request: &NotificationRequest) -> String {
    let mut body = String::new();
    writeln!(
        body,
        "Priority: {} | Score: {} | Owner: {}",
        request.priority,
        request.lead_score,
        request.assigned_rep.as_deref().unwrap_or("UNASSIGNED")
    )
    .expect("write summary");
    writeln!(body, "Customer: {}", request.customer_name).expect("write customer");
    writeln!(body, "Email: {}", request.customer_email).expect("write email");
    if let Some(phone) = &request.customer_phone {
        writeln!(body, "Phone: {phone}").expect("write phone");
    }
    writeln!(
        body,
        "Address: {}",
        request.address.as_deref().unwrap_or("not provided")
    )
    .expect("write address");
    writeln!(body, "Estimate: {}", request.estimate).expect("write estimate");
    writeln!(body, "Services: {}", services_label(&request.services)).expect("write services");
    body
}
