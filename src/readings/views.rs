use axum::{
    Json,
    extract::{Multipart, Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::dataset::{ConsumptionSummary, Dataset, PointFilter};
use super::models::DatasetResult;
use super::services::parse_workbook;
use crate::common::errors::AppResult;
use crate::common::state::AppState;
use crate::common::upload::read_workbook_upload;
use crate::validation_error;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ParseQuery {
    /// Worksheet holding the readings; the configured target sheet when omitted
    pub sheet: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryQuery {
    pub sheet: Option<String>,
    pub plant: Option<String>,
    pub sensor: Option<String>,
    /// Inclusive RFC 3339 lower bound
    pub from: Option<DateTime<Utc>>,
    /// Inclusive RFC 3339 upper bound
    pub to: Option<DateTime<Utc>>,
}

impl SummaryQuery {
    fn filter(&self) -> AppResult<PointFilter> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(validation_error!("from", "must not be later than 'to'"));
            }
        }

        Ok(PointFilter {
            plant: self.plant.clone(),
            sensor: self.sensor.clone(),
            from: self.from,
            to: self.to,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ParseResponse {
    /// Name of the uploaded file
    pub file_name: String,
    /// Actual name of the worksheet that was parsed
    pub sheet: String,
    #[serde(flatten)]
    pub result: DatasetResult,
    pub processing_time_ms: u128,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SummaryResponse {
    pub file_name: String,
    pub sheet: String,
    pub plants: Vec<String>,
    pub sensors: Vec<String>,
    pub summary: ConsumptionSummary,
}

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(parse_readings))
        .routes(routes!(summarize_readings))
        .with_state(state.clone())
}

fn target_sheet(requested: Option<&str>, state: &AppState) -> String {
    requested
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(&state.config.target_sheet)
        .to_string()
}

/// Upload a workbook and extract IoT readings from its readings worksheet
#[utoipa::path(
    post,
    path = "/parse",
    params(ParseQuery),
    request_body(content = String, description = "Excel file as multipart/form-data", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Parsed readings and per-row errors", body = ParseResponse),
        (status = 400, description = "Missing or non-Excel upload"),
        (status = 404, description = "Worksheet not found"),
        (status = 422, description = "Workbook could not be decoded"),
    ),
    tag = "readings"
)]
pub async fn parse_readings(
    State(state): State<AppState>,
    Query(query): Query<ParseQuery>,
    multipart: Multipart,
) -> AppResult<Json<ParseResponse>> {
    let upload = read_workbook_upload(multipart).await?;
    let sheet = target_sheet(query.sheet.as_deref(), &state);
    let file_data = upload.file_data;
    let parsed =
        tokio::task::spawn_blocking(move || parse_workbook(file_data, &sheet)).await??;

    Ok(Json(ParseResponse {
        file_name: upload.file_name,
        sheet: parsed.sheet,
        result: parsed.result,
        processing_time_ms: parsed.processing_time_ms,
    }))
}

/// Upload a workbook and aggregate its readings
#[utoipa::path(
    post,
    path = "/summary",
    params(SummaryQuery),
    request_body(content = String, description = "Excel file as multipart/form-data", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Consumption totals for the selected readings", body = SummaryResponse),
        (status = 400, description = "Missing or non-Excel upload, or invalid filter"),
        (status = 404, description = "Worksheet not found"),
        (status = 422, description = "Workbook could not be decoded"),
    ),
    tag = "readings"
)]
pub async fn summarize_readings(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
    multipart: Multipart,
) -> AppResult<Json<SummaryResponse>> {
    let filter = query.filter()?;
    let upload = read_workbook_upload(multipart).await?;
    let sheet = target_sheet(query.sheet.as_deref(), &state);
    let file_data = upload.file_data;
    let parsed =
        tokio::task::spawn_blocking(move || parse_workbook(file_data, &sheet)).await??;

    let dataset = Dataset::from_result(parsed.result);
    Ok(Json(SummaryResponse {
        file_name: upload.file_name,
        sheet: parsed.sheet,
        plants: dataset.plants().into_iter().map(ToString::to_string).collect(),
        sensors: dataset
            .sensors(filter.plant.as_deref().map(str::trim))
            .into_iter()
            .map(ToString::to_string)
            .collect(),
        summary: dataset.summarize(&filter),
    }))
}
