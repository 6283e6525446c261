use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::workflows::leads::domain::{
    EstimateRange, LeadSubmission, PriorityTier, PropertyType, RecordId, RecordKind,
};
use crate::workflows::leads::intake::{EstimateInput, FlagInput, LeadForm};
use crate::workflows::leads::notifications::{
    Channel, NotificationDispatcher, NotificationMessage, NotificationRequest,
    NotificationTransport, TransportError,
};
use crate::workflows::leads::repository::{
    CrmError, CrmGateway, LeadRecordDraft, RoutingUpdate,
};
use crate::workflows::leads::routing::{RosterEntry, RoutingConfig, RoutingEngine};
use crate::workflows::leads::service::LeadIntakeService;

pub(super) fn routing_config() -> RoutingConfig {
    RoutingConfig::default()
}

pub(super) fn engine() -> RoutingEngine {
    RoutingEngine::new(routing_config())
}

pub(super) fn submission(min: f64, max: f64, services: &[&str]) -> LeadSubmission {
    LeadSubmission {
        estimate: EstimateRange::new(Some(min), Some(max)),
        property_type: PropertyType::SingleFamily,
        services: LeadSubmission::normalize_services(services),
        timeline: None,
        address: Some("1200 Grand Ave, Des Moines, IA".to_string()),
        description: None,
        is_emergency: false,
    }
}

pub(super) fn roster_entry(rep: &str, tiers: &[PriorityTier], services: &[&str]) -> RosterEntry {
    RosterEntry {
        rep: rep.to_string(),
        tiers: tiers.to_vec(),
        services: services.iter().map(|service| service.to_string()).collect(),
    }
}

pub(super) fn form() -> LeadForm {
    LeadForm {
        name: "Dana Whitfield".to_string(),
        email: "dana@example.com".to_string(),
        phone: Some("515-555-0142".to_string()),
        address: Some("1200 Grand Ave, Des Moines, IA".to_string()),
        property_type: Some("single_family".to_string()),
        services: vec!["roofing".to_string()],
        estimate_min: Some(EstimateInput::Amount(5_000.0)),
        estimate_max: Some(EstimateInput::Text("$8,000".to_string())),
        timeline: Some("next month".to_string()),
        description: Some("Shingles curling near the chimney".to_string()),
        is_emergency: None,
    }
}

pub(super) fn emergency_form() -> LeadForm {
    LeadForm {
        services: vec!["storm-damage".to_string(), "roofing".to_string()],
        timeline: Some("ASAP".to_string()),
        description: Some("Tree limb punched through the roof, active leak".to_string()),
        is_emergency: Some(FlagInput::Flag(true)),
        ..form()
    }
}

pub(super) fn notification_request(priority: PriorityTier) -> NotificationRequest {
    NotificationRequest {
        priority,
        record_id: RecordId("deal-000042".to_string()),
        customer_name: "Dana Whitfield".to_string(),
        customer_email: "dana@example.com".to_string(),
        customer_phone: Some("515-555-0142".to_string()),
        address: Some("1200 Grand Ave, Des Moines, IA".to_string()),
        estimate: "$5,000 - $8,000".to_string(),
        services: vec!["roofing".to_string()],
        lead_score: 16,
        assigned_rep: Some("inside-sales".to_string()),
    }
}

pub(super) fn recording_dispatcher() -> (NotificationDispatcher, Vec<Arc<RecordingTransport>>) {
    let transports: Vec<Arc<RecordingTransport>> = Channel::ALL
        .iter()
        .map(|channel| Arc::new(RecordingTransport::new(*channel)))
        .collect();
    let dispatcher = transports.iter().fold(
        NotificationDispatcher::new(Duration::from_millis(200)),
        |dispatcher, transport| dispatcher.with_transport(transport.clone()),
    );
    (dispatcher, transports)
}

pub(super) fn failing_dispatcher() -> NotificationDispatcher {
    Channel::ALL.iter().fold(
        NotificationDispatcher::new(Duration::from_millis(200)),
        |dispatcher, channel| dispatcher.with_transport(Arc::new(FailingTransport(*channel))),
    )
}

pub(super) fn build_service() -> (
    LeadIntakeService<MemoryCrm>,
    Arc<MemoryCrm>,
    Vec<Arc<RecordingTransport>>,
) {
    let crm = Arc::new(MemoryCrm::default());
    let (dispatcher, transports) = recording_dispatcher();
    let service = LeadIntakeService::new(crm.clone(), routing_config(), dispatcher);
    (service, crm, transports)
}

pub(super) fn messages_for(
    transports: &[Arc<RecordingTransport>],
    channel: Channel,
) -> Vec<NotificationMessage> {
    transports
        .iter()
        .filter(|transport| transport.channel == channel)
        .flat_map(|transport| transport.messages())
        .collect()
}

#[derive(Debug)]
pub(super) struct RecordingTransport {
    channel: Channel,
    messages: Mutex<Vec<NotificationMessage>>,
}

impl RecordingTransport {
    pub(super) fn new(channel: Channel) -> Self {
        Self {
            channel,
            messages: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn messages(&self) -> Vec<NotificationMessage> {
        self.messages.lock().expect("transport mutex poisoned").clone()
    }
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn send(&self, message: &NotificationMessage) -> Result<(), TransportError> {
        self.messages
            .lock()
            .expect("transport mutex poisoned")
            .push(message.clone());
        Ok(())
    }
}

pub(super) struct FailingTransport(pub(super) Channel);

#[async_trait]
impl NotificationTransport for FailingTransport {
    fn channel(&self) -> Channel {
        self.0
    }

    async fn send(&self, _message: &NotificationMessage) -> Result<(), TransportError> {
        Err(TransportError::Unavailable("gateway offline".to_string()))
    }
}

pub(super) struct SlowTransport {
    pub(super) channel: Channel,
    pub(super) delay: Duration,
}

#[async_trait]
impl NotificationTransport for SlowTransport {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn send(&self, _message: &NotificationMessage) -> Result<(), TransportError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct StoredRecord {
    pub(super) kind: RecordKind,
    pub(super) draft: LeadRecordDraft,
    pub(super) routing: Option<RoutingUpdate>,
}

#[derive(Default)]
pub(super) struct MemoryCrm {
    sequence: AtomicU64,
    pub(super) records: Mutex<HashMap<RecordId, StoredRecord>>,
}

impl MemoryCrm {
    pub(super) fn record(&self, id: &RecordId) -> Option<StoredRecord> {
        self.records
            .lock()
            .expect("crm mutex poisoned")
            .get(id)
            .cloned()
    }
}

#[async_trait]
impl CrmGateway for MemoryCrm {
    async fn create_record(
        &self,
        kind: RecordKind,
        draft: LeadRecordDraft,
    ) -> Result<RecordId, CrmError> {
        let next = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let id = RecordId(format!("{}-{next:06}", kind.label()));
        self.records.lock().expect("crm mutex poisoned").insert(
            id.clone(),
            StoredRecord {
                kind,
                draft,
                routing: None,
            },
        );
        Ok(id)
    }

    async fn update_routing(&self, id: &RecordId, update: RoutingUpdate) -> Result<(), CrmError> {
        let mut guard = self.records.lock().expect("crm mutex poisoned");
        let record = guard.get_mut(id).ok_or(CrmError::NotFound)?;
        record.routing = Some(update);
        Ok(())
    }
}

pub(super) struct UnavailableCrm;

#[async_trait]
impl CrmGateway for UnavailableCrm {
    async fn create_record(
        &self,
        _kind: RecordKind,
        _draft: LeadRecordDraft,
    ) -> Result<RecordId, CrmError> {
        Err(CrmError::Unavailable("hubspot offline".to_string()))
    }

    async fn update_routing(&self, _id: &RecordId, _update: RoutingUpdate) -> Result<(), CrmError> {
        Err(CrmError::Unavailable("hubspot offline".to_string()))
    }
}

/// Accepts record creation but rejects routing write-back.
#[derive(Default)]
pub(super) struct WriteOnceCrm {
    inner: MemoryCrm,
}

#[async_trait]
impl CrmGateway for WriteOnceCrm {
    async fn create_record(
        &self,
        kind: RecordKind,
        draft: LeadRecordDraft,
    ) -> Result<RecordId, CrmError> {
        self.inner.create_record(kind, draft).await
    }

    async fn update_routing(&self, _id: &RecordId, _update: RoutingUpdate) -> Result<(), CrmError> {
        Err(CrmError::Rejected("property lead_score is read only".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
