use crate::sheets::normalizer::normalize;
use crate::sheets::workbook::{SheetError, Workbook};

use super::models::DatasetResult;
use super::parser::parse_dataset;

/// Readings parsed from one worksheet of an uploaded workbook
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedWorksheet {
    pub sheet: String,
    pub result: DatasetResult,
    pub processing_time_ms: u128,
}

/// Decode the workbook, resolve `target_sheet` and parse its readings.
///
/// Failing to find the worksheet is a hard error; bad rows end up in
/// `result.errors`.
pub fn parse_workbook(file_data: Vec<u8>, target_sheet: &str) -> Result<ParsedWorksheet, SheetError> {
    let start_time = std::time::Instant::now();

    let workbook = Workbook::from_bytes(file_data)?;
    let named = workbook.find_sheet(target_sheet)?;
    tracing::info!(
        "Parsing readings from worksheet '{}' (requested '{target_sheet}')",
        named.name
    );

    let grid = normalize(&named.sheet);
    let result = parse_dataset(&grid);

    let processing_time_ms = start_time.elapsed().as_millis();
    if result.has_errors() {
        tracing::warn!(
            "Worksheet '{}' had {} rows that could not be parsed",
            named.name,
            result.errors.len()
        );
    }

    Ok(ParsedWorksheet {
        sheet: named.name.clone(),
        result,
        processing_time_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readings::models::ParseErrorKind;
    use crate::test_helpers::{XlsxCell, readings_header, xlsx_bytes};

    #[test]
    fn test_parse_workbook_end_to_end() {
        let bytes = xlsx_bytes(&[
            ("Notes", vec![vec![XlsxCell::Text("ignore me")]], Vec::new()),
            (
                "Master Data",
                vec![
                    readings_header(),
                    vec![
                        XlsxCell::Text("  Plant1 "),
                        XlsxCell::Number(45000.0),
                        XlsxCell::Text("0-1"),
                        XlsxCell::Text("SensorA"),
                        XlsxCell::Number(10.0),
                    ],
                    vec![
                        XlsxCell::Blank,
                        XlsxCell::Number(45000.0),
                        XlsxCell::Text("1-2"),
                        XlsxCell::Text("SensorB"),
                        XlsxCell::Number(4.0),
                    ],
                    vec![
                        XlsxCell::Text("Plant2"),
                        XlsxCell::Text("yesterday"),
                        XlsxCell::Text("2-3"),
                        XlsxCell::Text("SensorC"),
                        XlsxCell::Number(1.0),
                    ],
                ],
                // Plant1 spans the first two data rows
                vec![(1, 0, 2, 0)],
            ),
        ]);

        let parsed = parse_workbook(bytes, "master_data").unwrap();

        assert_eq!(parsed.sheet, "Master Data");
        assert_eq!(parsed.result.points.len(), 2);
        assert!(parsed.result.points.iter().all(|p| p.plant == "Plant1"));
        assert_eq!(parsed.result.points[1].sensor_name, "SensorB");
        assert_eq!(parsed.result.errors.len(), 1);
        assert_eq!(parsed.result.errors[0].row, 3);
        assert_eq!(parsed.result.errors[0].kind, ParseErrorKind::InvalidDate);
    }

    #[test]
    fn test_parse_workbook_missing_sheet_is_hard_failure() {
        let bytes = xlsx_bytes(&[("MasterData2", vec![readings_header()], Vec::new())]);

        let err = parse_workbook(bytes, "Master_Data").unwrap_err();

        assert!(matches!(err, SheetError::WorksheetNotFound { .. }));
    }
}
