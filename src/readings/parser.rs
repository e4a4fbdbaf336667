//! Row-by-row extraction of IoT readings from a normalized grid
//!
//! Expected column layout: plant, date serial, hour range, sensor name,
//! consumed kW. Extra columns are ignored.

use crate::sheets::models::{CellValue, Grid};

use super::dates::{is_valid_serial, to_date};
use super::models::{DatasetResult, IotDataPoint, ParseError, ParseErrorKind};

const PLANT_COL: usize = 0;
const DATE_COL: usize = 1;
const HOUR_RANGE_COL: usize = 2;
const SENSOR_COL: usize = 3;
const CONSUMPTION_COL: usize = 4;

/// Parse every data row of `grid`; the first row is the header.
///
/// A failing row adds one error and no point, and never stops the rows after it.
pub fn parse_dataset(grid: &Grid) -> DatasetResult {
    let mut result = DatasetResult::default();

    for (idx, row) in grid.data_rows().iter().enumerate() {
        match parse_row(idx + 1, row) {
            Ok(point) => result.points.push(point),
            Err(e) => {
                tracing::debug!("{e}");
                result.errors.push(e);
            }
        }
    }

    tracing::info!(
        "Parsed {} data points with {} row errors",
        result.points.len(),
        result.errors.len()
    );
    result
}

/// Validate one row; checks run in a fixed order and the first failure wins
pub fn parse_row(row_number: usize, row: &[CellValue]) -> Result<IotDataPoint, ParseError> {
    if row.iter().all(CellValue::is_blank) {
        return Err(ParseError::new(
            row_number,
            ParseErrorKind::MissingData,
            "Row has insufficient data",
        ));
    }

    let field = |col: usize| row.get(col);

    let date = field(DATE_COL)
        .and_then(|cell| match cell {
            CellValue::Number(serial) if is_valid_serial(*serial) => to_date(*serial),
            _ => None,
        })
        .ok_or_else(|| {
            ParseError::new(
                row_number,
                ParseErrorKind::InvalidDate,
                format!("Invalid date value: {}", describe(field(DATE_COL))),
            )
        })?;

    let plant = required_text(row_number, field(PLANT_COL), "Invalid plant name")?;
    let hour_range = required_text(row_number, field(HOUR_RANGE_COL), "Invalid hour range")?;
    let sensor_name = required_text(row_number, field(SENSOR_COL), "Invalid sensor name")?;

    let consumed_kw = field(CONSUMPTION_COL)
        .and_then(coerce_number)
        .ok_or_else(|| {
            ParseError::new(
                row_number,
                ParseErrorKind::InvalidConsumption,
                format!(
                    "Invalid consumption value: {}",
                    describe(field(CONSUMPTION_COL))
                ),
            )
        })?;

    Ok(IotDataPoint {
        plant,
        date,
        hour_range,
        sensor_name,
        consumed_kw,
    })
}

fn required_text(
    row_number: usize,
    cell: Option<&CellValue>,
    message: &str,
) -> Result<String, ParseError> {
    cell.and_then(CellValue::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ParseError::new(row_number, ParseErrorKind::InvalidData, message))
}

/// Numeric coercion as spreadsheets do it: blank text is zero, booleans are
/// 0/1, anything not finite is rejected.
pub fn coerce_number(cell: &CellValue) -> Option<f64> {
    let value = match cell {
        CellValue::Number(n) => *n,
        CellValue::Bool(b) => f64::from(u8::from(*b)),
        CellValue::String(s) => {
            let text = s.trim();
            if text.is_empty() {
                0.0
            } else {
                text.parse::<f64>().ok()?
            }
        }
    };
    value.is_finite().then_some(value)
}

fn describe(cell: Option<&CellValue>) -> String {
    cell.map_or_else(|| "(missing)".to_string(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::normalizer::normalize;
    use crate::sheets::models::Sheet;
    use rstest::rstest;

    fn text(value: &str) -> CellValue {
        CellValue::from(value)
    }

    fn num(value: f64) -> CellValue {
        CellValue::Number(value)
    }

    fn header() -> Vec<CellValue> {
        ["Plant", "Date", "Hour", "Sensor", "Consumed KW"]
            .into_iter()
            .map(text)
            .collect()
    }

    fn grid(data_rows: Vec<Vec<CellValue>>) -> Grid {
        let mut rows = vec![header()];
        rows.extend(data_rows);
        normalize(&Sheet::from_rows(&rows))
    }

    #[test]
    fn test_partial_failure_isolation() {
        let grid = grid(vec![
            vec![text("Plant1"), num(45000.0), text("0-1"), text("SensorA"), num(10.0)],
            vec![text(""), text(""), text(""), text(""), text("")],
            vec![text("Plant2"), text("not-a-date"), text("1-2"), text("SensorB"), num(5.0)],
        ]);

        let result = parse_dataset(&grid);

        assert_eq!(result.points.len(), 1);
        assert_eq!(result.points[0].plant, "Plant1");
        assert_eq!(result.points[0].sensor_name, "SensorA");
        assert!((result.points[0].consumed_kw - 10.0).abs() < f64::EPSILON);

        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].row, 2);
        assert_eq!(result.errors[0].kind, ParseErrorKind::MissingData);
        assert_eq!(result.errors[0].message, "Row has insufficient data");
        assert_eq!(result.errors[1].row, 3);
        assert_eq!(result.errors[1].kind, ParseErrorKind::InvalidDate);
        assert!(result.errors[1].message.contains("not-a-date"));
    }

    #[test]
    fn test_non_numeric_consumption() {
        let grid = grid(vec![vec![
            text("Plant1"),
            num(45000.0),
            text("0-1"),
            text("SensorA"),
            text("abc"),
        ]]);

        let result = parse_dataset(&grid);

        assert!(result.points.is_empty());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ParseErrorKind::InvalidConsumption);
        assert_eq!(result.errors[0].message, "Invalid consumption value: abc");
    }

    #[test]
    fn test_successful_row_is_trimmed_and_dated() {
        let point = parse_row(
            1,
            &[
                text("  Plant A "),
                num(45000.5),
                text(" 12-13 "),
                text(" Meter 7"),
                text(" 12.5 "),
                text("ignored extra column"),
            ],
        )
        .unwrap();

        assert_eq!(point.plant, "Plant A");
        assert_eq!(point.hour_range, "12-13");
        assert_eq!(point.sensor_name, "Meter 7");
        assert!((point.consumed_kw - 12.5).abs() < f64::EPSILON);
        assert_eq!(point.date.to_rfc3339(), "2023-03-15T12:00:00+00:00");
    }

    #[test]
    fn test_date_is_checked_before_text_fields() {
        let err = parse_row(1, &[text(""), text("2023-01-01"), text(""), text(""), num(1.0)])
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidDate);
    }

    #[rstest]
    #[case(vec![text(""), num(45000.0), text("0-1"), text("S"), num(1.0)], "Invalid plant name")]
    #[case(vec![num(7.0), num(45000.0), text("0-1"), text("S"), num(1.0)], "Invalid plant name")]
    #[case(vec![text("P"), num(45000.0), text("  "), text("S"), num(1.0)], "Invalid hour range")]
    #[case(vec![text("P"), num(45000.0), text("0-1"), CellValue::Bool(true), num(1.0)], "Invalid sensor name")]
    #[case(vec![text("P"), num(45000.0), text("0-1")], "Invalid sensor name")]
    fn test_invalid_text_fields(#[case] row: Vec<CellValue>, #[case] message: &str) {
        let err = parse_row(4, &row).unwrap_err();
        assert_eq!(err.row, 4);
        assert_eq!(err.kind, ParseErrorKind::InvalidData);
        assert_eq!(err.message, message);
    }

    #[rstest]
    #[case(vec![text("P"), text("45000"), text("0-1"), text("S"), num(1.0)])]
    #[case(vec![text("P"), num(f64::NAN), text("0-1"), text("S"), num(1.0)])]
    #[case(vec![text("P"), num(1e12), text("0-1"), text("S"), num(1.0)])]
    #[case(vec![text("P"), CellValue::Bool(true), text("0-1"), text("S"), num(1.0)])]
    #[case(vec![text("P")])]
    fn test_invalid_dates(#[case] row: Vec<CellValue>) {
        let err = parse_row(1, &row).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidDate);
    }

    #[test]
    fn test_missing_date_message_names_missing_value() {
        let err = parse_row(1, &[text("P")]).unwrap_err();
        assert_eq!(err.message, "Invalid date value: (missing)");
    }

    #[test]
    fn test_missing_consumption_column() {
        let err = parse_row(1, &[text("P"), num(45000.0), text("0-1"), text("S")]).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidConsumption);
    }

    #[test]
    fn test_blank_row_with_whitespace_only() {
        let err = parse_row(9, &[text("   "), text("\t")]).unwrap_err();
        assert_eq!(err.row, 9);
        assert_eq!(err.kind, ParseErrorKind::MissingData);

        let err = parse_row(1, &[]).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingData);
    }

    #[rstest]
    #[case(num(3.5), Some(3.5))]
    #[case(text(" 42 "), Some(42.0))]
    #[case(text("1e3"), Some(1000.0))]
    #[case(text(""), Some(0.0))]
    #[case(CellValue::Bool(true), Some(1.0))]
    #[case(CellValue::Bool(false), Some(0.0))]
    #[case(text("abc"), None)]
    #[case(text("inf"), None)]
    #[case(text("NaN"), None)]
    #[case(num(f64::INFINITY), None)]
    fn test_coerce_number(#[case] cell: CellValue, #[case] expected: Option<f64>) {
        assert_eq!(coerce_number(&cell), expected);
    }

    #[test]
    fn test_header_only_grid_yields_nothing() {
        let result = parse_dataset(&grid(Vec::new()));
        assert!(result.points.is_empty());
        assert!(result.errors.is_empty());

        let result = parse_dataset(&Grid::empty());
        assert!(result.points.is_empty());
    }

    #[test]
    fn test_merged_plant_column_feeds_every_row() {
        use crate::sheets::models::{MergeRect, UsedRange};
        use std::collections::BTreeMap;

        let mut cells = BTreeMap::new();
        for (col, value) in header().into_iter().enumerate() {
            cells.insert((0, u32::try_from(col).unwrap()), value);
        }
        cells.insert((1, 0), text(" Plant M "));
        for row in 1..=2 {
            cells.insert((row, 1), num(45000.0));
            cells.insert((row, 2), text("0-1"));
            cells.insert((row, 3), text("S1"));
            cells.insert((row, 4), num(2.0));
        }
        let sheet = Sheet::new(
            cells,
            Some(UsedRange::new((0, 0), (2, 4))),
            vec![MergeRect::new((1, 0), (2, 0))],
        );

        let result = parse_dataset(&normalize(&sheet));

        assert!(result.errors.is_empty());
        assert_eq!(result.points.len(), 2);
        assert!(result.points.iter().all(|p| p.plant == "Plant M"));
    }
}
