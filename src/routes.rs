use crate::common::state::AppState;
use crate::config::Config;
use crate::{readings, sheets};
use axum::{Router, extract::DefaultBodyLimit};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

pub fn build_router(config: &Config) -> Router {
    #[derive(OpenApi)]
    #[openapi(
        info(
            title = "IoT energy sheets",
            description = "Normalize Excel worksheets and extract energy-consumption readings"
        ),
        tags(
            (name = "workbooks", description = "Worksheet listing and normalized views"),
            (name = "readings", description = "IoT reading extraction and aggregation"),
        )
    )]
    struct ApiDoc;

    let app_state: AppState = AppState::new(config.clone());

    // Build the router with OpenAPI documentation
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(crate::common::views::router(&app_state)) // Root routes
        .nest("/api/workbooks", sheets::views::router(&app_state))
        .nest("/api/readings", readings::views::router(&app_state))
        .split_for_parts();

    router
        .merge(Scalar::with_url("/api/docs", api))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
}
