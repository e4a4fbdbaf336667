use axum::extract::Multipart;
use std::path::Path;

use super::errors::{AppError, AppResult};
use crate::validation_error;

/// Workbook file pulled out of a multipart request
#[derive(Debug, Clone)]
pub struct UploadedWorkbook {
    pub file_name: String,
    pub file_data: Vec<u8>,
}

const ACCEPTED_EXTENSIONS: [&str; 2] = ["xlsx", "xlsm"];

/// Read the first `file`/`excel_file` part of the request and check it looks
/// like an Excel workbook
pub async fn read_workbook_upload(mut multipart: Multipart) -> AppResult<UploadedWorkbook> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| validation_error!("file", format!("Multipart error: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == "excel_file" || field_name == "file" {
            file_name = field.file_name().map(std::string::ToString::to_string);
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| {
                        validation_error!("file", format!("Failed to read file data: {e}"))
                    })?
                    .to_vec(),
            );
            break;
        }
    }

    let file_data = file_data.ok_or_else(|| validation_error!("file", "No Excel file found in request"))?;
    let file_name = file_name.unwrap_or_else(|| "uploaded_file.xlsx".to_string());

    if !has_excel_extension(&file_name) {
        return Err(AppError::ValidationError {
            field: "file".to_string(),
            message: "File must be an Excel file (.xlsx or .xlsm)".to_string(),
        });
    }

    tracing::info!("Received workbook '{file_name}' ({} bytes)", file_data.len());
    Ok(UploadedWorkbook {
        file_name,
        file_data,
    })
}

fn has_excel_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
}
