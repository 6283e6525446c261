use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};

use super::domain::RecordKind;
use super::intake::LeadForm;
use super::repository::CrmGateway;
use super::service::LeadIntakeService;
use crate::error::AppError;

/// Router builder exposing the estimate, service-request, and routing preview endpoints.
pub fn lead_router<C>(service: Arc<LeadIntakeService<C>>) -> Router
where
    C: CrmGateway + 'static,
{
    Router::new()
        .route("/api/v1/leads/estimates", post(estimate_handler::<C>))
        .route(
            "/api/v1/leads/service-requests",
            post(service_request_handler::<C>),
        )
        .route("/api/v1/leads/routing-preview", post(preview_handler::<C>))
        .with_state(service)
}

pub(crate) async fn estimate_handler<C>(
    State(service): State<Arc<LeadIntakeService<C>>>,
    axum::Json(form): axum::Json<LeadForm>,
) -> Result<Response, AppError>
where
    C: CrmGateway + 'static,
{
    submit(service, RecordKind::Deal, form).await
}

pub(crate) async fn service_request_handler<C>(
    State(service): State<Arc<LeadIntakeService<C>>>,
    axum::Json(form): axum::Json<LeadForm>,
) -> Result<Response, AppError>
where
    C: CrmGateway + 'static,
{
    submit(service, RecordKind::Ticket, form).await
}

pub(crate) async fn preview_handler<C>(
    State(service): State<Arc<LeadIntakeService<C>>>,
    axum::Json(form): axum::Json<LeadForm>,
) -> Result<Response, AppError>
where
    C: CrmGateway + 'static,
{
    let routing = service.preview(form)?;
    Ok((StatusCode::OK, axum::Json(routing)).into_response())
}

async fn submit<C>(
    service: Arc<LeadIntakeService<C>>,
    kind: RecordKind,
    form: LeadForm,
) -> Result<Response, AppError>
where
    C: CrmGateway + 'static,
{
    let outcome = service.submit(kind, form).await?;
    Ok((StatusCode::CREATED, axum::Json(outcome)).into_response())
}
