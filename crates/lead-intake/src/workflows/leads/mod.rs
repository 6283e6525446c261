//! Lead intake for estimate and service-request forms.
//!
//! A form is validated into a [`LeadSubmission`], scored and routed by the [`RoutingEngine`],
//! written to the CRM, and fanned out to the notification channels its priority allows.

pub mod domain;
pub mod intake;
pub mod notifications;
pub mod repository;
pub mod router;
pub mod routing;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ContactDetails, EstimateRange, LeadSubmission, PriorityTier, PropertyType, RecordId,
    RecordKind, RecordRef,
};
pub use intake::{EstimateInput, FlagInput, LeadForm, LeadValidationError};
pub use notifications::{
    Channel, ChannelOutcome, DispatchReport, HttpTransport, NotificationDispatcher,
    NotificationError, NotificationMessage, NotificationRequest, NotificationTransport,
    TransportError,
};
pub use repository::{CrmError, CrmGateway, LeadRecordDraft, RoutingUpdate};
pub use router::lead_router;
pub use routing::{
    AssignmentBasis, BoundRouting, RepAssignment, RosterEntry, RoutingConfig, RoutingEngine,
    RoutingResult, ScoreComponent, ScoreFactor,
};
pub use service::{
    CrmSyncStatus, IntakeError, IntakeOutcome, LeadIntakeService, NotificationSummary,
};
