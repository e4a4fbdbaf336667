use super::models::{HealthCheck, ServiceInfo};
use crate::common::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use utoipa_axum::{router::OpenApiRouter, routes};

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(healthz))
        .routes(routes!(get_service_info))
        .with_state(state.clone())
}

#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (
            status = OK,
            description = "Kubernetes health check",
            body = HealthCheck,
        )
    )
)]
pub async fn healthz() -> (StatusCode, Json<HealthCheck>) {
    (
        StatusCode::OK,
        Json(HealthCheck {
            status: "ok".to_string(),
        }),
    )
}

#[utoipa::path(
    get,
    path = "/api/config",
    responses(
        (
            status = OK,
            description = "Service configuration for upload clients",
            body = ServiceInfo,
        )
    )
)]
pub async fn get_service_info(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo::from(&state.config))
}
