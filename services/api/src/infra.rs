use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lead_intake::config::NotificationConfig;
use lead_intake::workflows::leads::{
    Channel, CrmError, CrmGateway, HttpTransport, LeadRecordDraft, NotificationDispatcher,
    NotificationMessage, NotificationTransport, RecordId, RecordKind, RoutingUpdate,
    TransportError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Clone)]
pub(crate) struct CrmRecord {
    pub(crate) kind: RecordKind,
    pub(crate) draft: LeadRecordDraft,
    pub(crate) routing: Option<RoutingUpdate>,
    pub(crate) last_modified: DateTime<Utc>,
}

/// Process-local CRM used until a HubSpot gateway is wired in.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCrm {
    sequence: Arc<AtomicU64>,
    records: Arc<Mutex<HashMap<RecordId, CrmRecord>>>,
}

impl InMemoryCrm {
    pub(crate) fn fetch(&self, id: &RecordId) -> Option<CrmRecord> {
        self.records
            .lock()
            .expect("crm mutex poisoned")
            .get(id)
            .cloned()
    }
}

#[async_trait]
impl CrmGateway for InMemoryCrm {
    async fn create_record(
        &self,
        kind: RecordKind,
        draft: LeadRecordDraft,
    ) -> Result<RecordId, CrmError> {
        let next = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let id = RecordId(format!("{}-{next:06}", kind.label()));
        let record = CrmRecord {
            kind,
            last_modified: draft.received_at,
            draft,
            routing: None,
        };
        self.records
            .lock()
            .expect("crm mutex poisoned")
            .insert(id.clone(), record);
        Ok(id)
    }

    async fn update_routing(&self, id: &RecordId, update: RoutingUpdate) -> Result<(), CrmError> {
        let mut guard = self.records.lock().expect("crm mutex poisoned");
        let record = guard.get_mut(id).ok_or(CrmError::NotFound)?;
        record.routing = Some(update);
        record.last_modified = Utc::now();
        Ok(())
    }
}

/// Keeps rendered messages in memory so demos can show what would have been sent.
#[derive(Clone)]
pub(crate) struct RecordingTransport {
    channel: Channel,
    sent: Arc<Mutex<Vec<NotificationMessage>>>,
}

impl RecordingTransport {
    pub(crate) fn new(channel: Channel) -> Self {
        Self {
            channel,
            sent: Arc::default(),
        }
    }

    pub(crate) fn messages(&self) -> Vec<NotificationMessage> {
        self.sent.lock().expect("transport mutex poisoned").clone()
    }
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn send(&self, message: &NotificationMessage) -> Result<(), TransportError> {
        self.sent
            .lock()
            .expect("transport mutex poisoned")
            .push(message.clone());
        Ok(())
    }
}

/// Wire an HTTP relay for every channel that has a configured endpoint.
pub(crate) fn build_dispatcher(config: &NotificationConfig) -> NotificationDispatcher {
    let endpoints = [
        (Channel::Email, config.email_url.as_deref()),
        (Channel::InternalAlert, config.alert_url.as_deref()),
        (Channel::Sms, config.sms_url.as_deref()),
    ];

    let mut dispatcher = NotificationDispatcher::new(config.channel_timeout);
    for (channel, endpoint) in endpoints {
        match endpoint {
            Some(url) => {
                info!(%channel, endpoint = url, "notification relay configured");
                dispatcher = dispatcher.with_transport(Arc::new(HttpTransport::new(
                    channel,
                    url,
                    config.auth_token.clone(),
                )));
            }
            None => warn!(%channel, "no relay configured; channel will be skipped"),
        }
    }
    dispatcher
}
