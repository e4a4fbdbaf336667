//! Shared test helpers: in-memory workbooks and multipart requests against the router
//!
//! Workbooks are built with `rust_xlsxwriter` so every test runs against a
//! real `.xlsx` container decoded by calamine.
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use rust_xlsxwriter::{Format, Workbook};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::config::Config;
use crate::routes::build_router;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Value written into a fixture cell
#[derive(Debug, Clone, Copy)]
pub enum XlsxCell {
    Text(&'static str),
    Number(f64),
    Bool(bool),
    Blank,
}

/// `(first_row, first_col, last_row, last_col)`
pub type MergeSpec = (u32, u16, u32, u16);

/// Build an `.xlsx` file with one worksheet per `(name, rows, merges)` entry
pub fn xlsx_bytes(sheets: &[(&str, Vec<Vec<XlsxCell>>, Vec<MergeSpec>)]) -> Vec<u8> {
    let mut workbook = Workbook::new();

    for (name, rows, merges) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).unwrap();

        for (row_idx, row) in rows.iter().enumerate() {
            let row_num = u32::try_from(row_idx).unwrap();
            for (col_idx, cell) in row.iter().enumerate() {
                let col_num = u16::try_from(col_idx).unwrap();
                match cell {
                    XlsxCell::Text(text) => {
                        worksheet.write_string(row_num, col_num, *text).unwrap();
                    }
                    XlsxCell::Number(number) => {
                        worksheet.write_number(row_num, col_num, *number).unwrap();
                    }
                    XlsxCell::Bool(value) => {
                        worksheet.write_boolean(row_num, col_num, *value).unwrap();
                    }
                    XlsxCell::Blank => {}
                }
            }
        }

        for &(first_row, first_col, last_row, last_col) in merges {
            let anchor_text = rows
                .get(first_row as usize)
                .and_then(|row| row.get(first_col as usize))
                .map_or("", |cell| match cell {
                    XlsxCell::Text(text) => *text,
                    _ => "",
                });
            worksheet
                .merge_range(
                    first_row,
                    first_col,
                    last_row,
                    last_col,
                    anchor_text,
                    &Format::new(),
                )
                .unwrap();
        }
    }

    workbook.save_to_buffer().unwrap()
}

pub fn readings_header() -> Vec<XlsxCell> {
    vec![
        XlsxCell::Text("Plant"),
        XlsxCell::Text("Date"),
        XlsxCell::Text("Hour Range"),
        XlsxCell::Text("Sensor"),
        XlsxCell::Text("Consumed KW"),
    ]
}

/// Readings workbook used by the HTTP tests: two good rows, a blank row and a
/// row with a bad consumption value
pub fn readings_workbook(sheet_name: &str) -> Vec<u8> {
    xlsx_bytes(&[
        (
            "Cover",
            vec![vec![XlsxCell::Text("Monthly energy report")]],
            vec![(0, 0, 0, 2)],
        ),
        (
            sheet_name,
            vec![
                readings_header(),
                vec![
                    XlsxCell::Text("North Plant"),
                    XlsxCell::Number(45000.0),
                    XlsxCell::Text("0-1"),
                    XlsxCell::Text("Meter A"),
                    XlsxCell::Number(10.0),
                ],
                vec![
                    XlsxCell::Blank,
                    XlsxCell::Number(45001.0),
                    XlsxCell::Text("1-2"),
                    XlsxCell::Text("Meter B"),
                    XlsxCell::Number(2.5),
                ],
                vec![XlsxCell::Blank; 5],
                vec![
                    XlsxCell::Text("South Plant"),
                    XlsxCell::Number(45002.0),
                    XlsxCell::Text("2-3"),
                    XlsxCell::Text("Meter C"),
                    XlsxCell::Text("n/a"),
                ],
            ],
            vec![(1, 0, 2, 0)],
        ),
    ])
}

pub fn setup_test_app() -> Router {
    build_router(&Config::for_tests())
}

/// Build a `multipart/form-data` body carrying one file part
pub fn multipart_body(field_name: &str, file_name: &str, data: &[u8]) -> (String, Vec<u8>) {
    let boundary = "----formdata-test-boundary-123456789";
    let mut body = Vec::new();

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{file_name}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {XLSX_CONTENT_TYPE}\r\n").as_bytes());
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={boundary}"), body)
}

/// POST an uploaded file and return status plus raw body text
pub async fn upload(app: &Router, uri: &str, file_name: &str, data: &[u8]) -> (StatusCode, String) {
    let (content_type, body) = multipart_body("file", file_name, data);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    (status, String::from_utf8_lossy(&bytes).to_string())
}

/// Same as [`upload`] with the body parsed as JSON
pub async fn upload_json(app: &Router, uri: &str, file_name: &str, data: &[u8]) -> (StatusCode, Value) {
    let (status, body) = upload(app, uri, file_name, data).await;
    let json: Value =
        serde_json::from_str(&body).unwrap_or_else(|_| json!({"error": "Invalid JSON response"}));
    (status, json)
}
