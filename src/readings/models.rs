use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// One validated energy-consumption reading taken from a worksheet row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IotDataPoint {
    pub plant: String,
    pub date: DateTime<Utc>,
    pub hour_range: String,
    pub sensor_name: String,
    #[serde(rename = "consumedKW")]
    pub consumed_kw: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ParseErrorKind {
    /// The row is blank
    MissingData,
    InvalidDate,
    /// A required text field is missing or blank
    InvalidData,
    InvalidConsumption,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParseErrorKind::MissingData => "MissingData",
            ParseErrorKind::InvalidDate => "InvalidDate",
            ParseErrorKind::InvalidData => "InvalidData",
            ParseErrorKind::InvalidConsumption => "InvalidConsumption",
        };
        write!(f, "{name}")
    }
}

/// A row that could not be turned into a data point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ParseError {
    /// 1-based index among the data rows, header excluded
    pub row: usize,
    #[serde(rename = "type")]
    pub kind: ParseErrorKind,
    pub message: String,
}

impl ParseError {
    pub fn new(row: usize, kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            row,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row {} {}: {}", self.row, self.kind, self.message)
    }
}

/// Outcome of parsing one worksheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DatasetResult {
    pub points: Vec<IotDataPoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ParseError>,
}

impl DatasetResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
