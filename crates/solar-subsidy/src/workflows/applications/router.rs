use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::access::Caller;
use crate::error::AppError;

use super::domain::{
    AgentAssignment, ApplicationFilter, ApplicationId, ApplicationSubmission, InstallationId,
    InstallationUpdate, SchemeDraft,
};
use super::repository::{
    ApplicationRecord, InstallationRecord, LifecycleStore, NotificationPublisher,
};
use super::service::{ApplicationLifecycleService, ApplicationServiceError};

type SharedService<S, N> = Arc<ApplicationLifecycleService<S, N>>;

#[derive(Debug, Clone, Deserialize)]
pub struct RejectionRequest {
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemeQuery {
    #[serde(default)]
    pub active: Option<bool>,
}

/// Paired rows returned when an operation touches both records.
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleView {
    pub application: ApplicationRecord,
    pub installation: InstallationRecord,
}

/// Router builder exposing application, installation, and scheme endpoints.
pub fn application_router<S, N>(service: SharedService<S, N>) -> Router
where
    S: LifecycleStore + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/applications",
            post(submit_handler::<S, N>).get(list_handler::<S, N>),
        )
        .route("/api/v1/applications/stats", get(statistics_handler::<S, N>))
        .route(
            "/api/v1/applications/:application_id",
            get(get_handler::<S, N>),
        )
        .route(
            "/api/v1/applications/:application_id/approve",
            post(approve_handler::<S, N>),
        )
        .route(
            "/api/v1/applications/:application_id/reject",
            post(reject_handler::<S, N>),
        )
        .route(
            "/api/v1/applications/:application_id/assign",
            post(assign_handler::<S, N>),
        )
        .route(
            "/api/v1/installations/:installation_id",
            get(installation_handler::<S, N>),
        )
        .route(
            "/api/v1/installations/:installation_id/status",
            patch(installation_status_handler::<S, N>),
        )
        .route(
            "/api/v1/schemes",
            get(list_schemes_handler::<S, N>).post(create_scheme_handler::<S, N>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    headers: HeaderMap,
    axum::Json(submission): axum::Json<ApplicationSubmission>,
) -> Response
where
    S: LifecycleStore + 'static,
    N: NotificationPublisher + 'static,
{
    let caller = match authenticate(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    respond(StatusCode::CREATED, service.submit(&caller, submission))
}

pub(crate) async fn list_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    headers: HeaderMap,
    Query(filter): Query<ApplicationFilter>,
) -> Response
where
    S: LifecycleStore + 'static,
    N: NotificationPublisher + 'static,
{
    let caller = match authenticate(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    respond(StatusCode::OK, service.list(&caller, filter))
}

pub(crate) async fn statistics_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    headers: HeaderMap,
) -> Response
where
    S: LifecycleStore + 'static,
    N: NotificationPublisher + 'static,
{
    let caller = match authenticate(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    respond(StatusCode::OK, service.statistics(&caller))
}

pub(crate) async fn get_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    Path(application_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: LifecycleStore + 'static,
    N: NotificationPublisher + 'static,
{
    let caller = match authenticate(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        service.get(&caller, &ApplicationId(application_id)),
    )
}

pub(crate) async fn approve_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    Path(application_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: LifecycleStore + 'static,
    N: NotificationPublisher + 'static,
{
    let caller = match authenticate(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        service.approve(&caller, &ApplicationId(application_id)),
    )
}

pub(crate) async fn reject_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    Path(application_id): Path<String>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<RejectionRequest>,
) -> Response
where
    S: LifecycleStore + 'static,
    N: NotificationPublisher + 'static,
{
    let caller = match authenticate(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        service.reject(&caller, &ApplicationId(application_id), &request.reason),
    )
}

pub(crate) async fn assign_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    Path(application_id): Path<String>,
    headers: HeaderMap,
    axum::Json(assignment): axum::Json<AgentAssignment>,
) -> Response
where
    S: LifecycleStore + 'static,
    N: NotificationPublisher + 'static,
{
    let caller = match authenticate(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    let result = service
        .assign_agent(&caller, &ApplicationId(application_id), assignment)
        .map(|(application, installation)| LifecycleView {
            application,
            installation,
        });
    respond(StatusCode::OK, result)
}

pub(crate) async fn installation_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    Path(installation_id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: LifecycleStore + 'static,
    N: NotificationPublisher + 'static,
{
    let caller = match authenticate(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    respond(
        StatusCode::OK,
        service.get_installation(&caller, &InstallationId(installation_id)),
    )
}

pub(crate) async fn installation_status_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    Path(installation_id): Path<String>,
    headers: HeaderMap,
    axum::Json(update): axum::Json<InstallationUpdate>,
) -> Response
where
    S: LifecycleStore + 'static,
    N: NotificationPublisher + 'static,
{
    let caller = match authenticate(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    let result = service
        .update_installation_status(&caller, &InstallationId(installation_id), update)
        .map(|(installation, application)| LifecycleView {
            application,
            installation,
        });
    respond(StatusCode::OK, result)
}

pub(crate) async fn list_schemes_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    Query(query): Query<SchemeQuery>,
) -> Response
where
    S: LifecycleStore + 'static,
    N: NotificationPublisher + 'static,
{
    respond(
        StatusCode::OK,
        service.list_schemes(query.active.unwrap_or(false)),
    )
}

pub(crate) async fn create_scheme_handler<S, N>(
    State(service): State<SharedService<S, N>>,
    headers: HeaderMap,
    axum::Json(draft): axum::Json<SchemeDraft>,
) -> Response
where
    S: LifecycleStore + 'static,
    N: NotificationPublisher + 'static,
{
    let caller = match authenticate(&headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    respond(StatusCode::CREATED, service.create_scheme(&caller, draft))
}

fn authenticate(headers: &HeaderMap) -> Result<Caller, Response> {
    Caller::from_headers(headers).map_err(|error| {
        let payload = json!({ "error": error.to_string() });
        (StatusCode::UNAUTHORIZED, axum::Json(payload)).into_response()
    })
}

fn respond<T: Serialize>(success: StatusCode, result: Result<T, ApplicationServiceError>) -> Response {
    match result {
        Ok(body) => (success, axum::Json(body)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}
