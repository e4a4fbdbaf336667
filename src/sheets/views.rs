use axum::{
    Json,
    extract::{Multipart, Query, State},
    response::Html,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::normalizer::normalize;
use super::render::{SheetView, render_html_table};
use super::workbook::{SheetError, Workbook, sheet_names_match};
use crate::common::errors::AppResult;
use crate::common::state::AppState;
use crate::common::upload::read_workbook_upload;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SheetQuery {
    /// Worksheet name, matched ignoring case, spacing and punctuation; first sheet when omitted
    pub sheet: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SheetList {
    pub sheets: Vec<String>,
    /// Name of the worksheet matching the configured readings sheet, if any
    pub target_sheet: Option<String>,
}

pub fn router(state: &AppState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_sheets))
        .routes(routes!(sheet_grid))
        .routes(routes!(sheet_table))
        .with_state(state.clone())
}

/// List the worksheets of an uploaded workbook
#[utoipa::path(
    post,
    path = "/sheets",
    request_body(content = String, description = "Excel file as multipart/form-data", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Worksheet names in workbook order", body = SheetList),
        (status = 400, description = "Missing or non-Excel upload"),
        (status = 422, description = "Workbook could not be decoded"),
    ),
    tag = "workbooks"
)]
pub async fn list_sheets(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<SheetList>> {
    let upload = read_workbook_upload(multipart).await?;
    let sheets = tokio::task::spawn_blocking(move || {
        Workbook::from_bytes(upload.file_data).map(|workbook| {
            workbook
                .sheet_names()
                .into_iter()
                .map(ToString::to_string)
                .collect::<Vec<String>>()
        })
    })
    .await??;

    let target_sheet = sheets
        .iter()
        .find(|name| sheet_names_match(name, &state.config.target_sheet))
        .cloned();

    Ok(Json(SheetList {
        sheets,
        target_sheet,
    }))
}

/// Normalized worksheet as a JSON tree
#[utoipa::path(
    post,
    path = "/grid",
    params(SheetQuery),
    request_body(content = String, description = "Excel file as multipart/form-data", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Normalized worksheet", body = SheetView),
        (status = 400, description = "Missing or non-Excel upload"),
        (status = 404, description = "Worksheet not found"),
        (status = 422, description = "Workbook could not be decoded"),
    ),
    tag = "workbooks"
)]
pub async fn sheet_grid(
    Query(query): Query<SheetQuery>,
    multipart: Multipart,
) -> AppResult<Json<SheetView>> {
    let upload = read_workbook_upload(multipart).await?;
    let view = tokio::task::spawn_blocking(move || {
        let workbook = Workbook::from_bytes(upload.file_data)?;
        let named = workbook.sheet_or_first(query.sheet.as_deref())?;
        Ok::<_, SheetError>(SheetView::from_sheet(named))
    })
    .await??;

    Ok(Json(view))
}

/// Normalized worksheet as an HTML table with merged cells spanned
#[utoipa::path(
    post,
    path = "/table",
    params(SheetQuery),
    request_body(content = String, description = "Excel file as multipart/form-data", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "HTML table", body = String, content_type = "text/html"),
        (status = 400, description = "Missing or non-Excel upload"),
        (status = 404, description = "Worksheet not found"),
        (status = 422, description = "Workbook could not be decoded"),
    ),
    tag = "workbooks"
)]
pub async fn sheet_table(
    Query(query): Query<SheetQuery>,
    multipart: Multipart,
) -> AppResult<Html<String>> {
    let upload = read_workbook_upload(multipart).await?;
    let html = tokio::task::spawn_blocking(move || {
        let workbook = Workbook::from_bytes(upload.file_data)?;
        let named = workbook.sheet_or_first(query.sheet.as_deref())?;
        let grid = normalize(&named.sheet);
        Ok::<_, SheetError>(render_html_table(&grid, named.sheet.merges()))
    })
    .await??;

    Ok(Html(html))
}
