use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

/// A single cell value as delivered by the workbook loader.
///
/// Absent cells are not represented here; a sheet simply has no entry for
/// them. After normalization an absent cell becomes `String("")`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum CellValue {
    String(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn empty() -> Self {
        Self::String(String::new())
    }

    /// Strings lose surrounding whitespace, everything else is kept as is
    #[must_use]
    pub fn trimmed(&self) -> Self {
        match self {
            Self::String(s) => Self::String(s.trim().to_string()),
            other => other.clone(),
        }
    }

    /// True for whitespace-only strings
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::String(s) if s.trim().is_empty())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Inclusive rectangle of 0-based coordinates bounding the data of a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UsedRange {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl UsedRange {
    pub fn new(start: (u32, u32), end: (u32, u32)) -> Self {
        Self {
            start_row: start.0.min(end.0),
            start_col: start.1.min(end.1),
            end_row: start.0.max(end.0),
            end_col: start.1.max(end.1),
        }
    }

    pub fn rows(&self) -> usize {
        (self.end_row - self.start_row) as usize + 1
    }

    pub fn cols(&self) -> usize {
        (self.end_col - self.start_col) as usize + 1
    }

}

/// A merged region; the logical value lives in its top-left cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MergeRect {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
}

impl MergeRect {
    pub fn new(start: (u32, u32), end: (u32, u32)) -> Self {
        Self {
            start_row: start.0.min(end.0),
            start_col: start.1.min(end.1),
            end_row: start.0.max(end.0),
            end_col: start.1.max(end.1),
        }
    }

    pub fn anchor(&self) -> (u32, u32) {
        (self.start_row, self.start_col)
    }

    pub fn row_span(&self) -> usize {
        (self.end_row - self.start_row) as usize + 1
    }

    pub fn col_span(&self) -> usize {
        (self.end_col - self.start_col) as usize + 1
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_row <= other.end_row
            && other.start_row <= self.end_row
            && self.start_col <= other.end_col
            && other.start_col <= self.end_col
    }
}

/// Raw worksheet: sparse cells, declared used range and merge rectangles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    cells: BTreeMap<(u32, u32), CellValue>,
    used_range: Option<UsedRange>,
    merges: Vec<MergeRect>,
}

impl Sheet {
    pub fn new(
        cells: BTreeMap<(u32, u32), CellValue>,
        used_range: Option<UsedRange>,
        merges: Vec<MergeRect>,
    ) -> Self {
        Self {
            cells,
            used_range,
            merges,
        }
    }

    /// Dense rows starting at A1, no merges
    #[cfg(test)]
    pub fn from_rows(rows: &[Vec<CellValue>]) -> Self {
        let mut cells = BTreeMap::new();
        let mut max_col = 0;
        for (row_idx, row) in rows.iter().enumerate() {
            max_col = max_col.max(row.len());
            for (col_idx, value) in row.iter().enumerate() {
                cells.insert((to_u32(row_idx), to_u32(col_idx)), value.clone());
            }
        }

        let used_range = (!rows.is_empty() && max_col > 0)
            .then(|| UsedRange::new((0, 0), (to_u32(rows.len() - 1), to_u32(max_col - 1))));

        Self::new(cells, used_range, Vec::new())
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    pub fn used_range(&self) -> Option<UsedRange> {
        self.used_range
    }

    pub fn merges(&self) -> &[MergeRect] {
        &self.merges
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

/// Complete rectangular grid produced by the normalizer
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// Sheet coordinate of `rows[0][0]`
    origin: (u32, u32),
    rows: Vec<Vec<CellValue>>,
}

impl Grid {
    pub fn new(origin: (u32, u32), rows: Vec<Vec<CellValue>>) -> Self {
        Self { origin, rows }
    }

    pub fn empty() -> Self {
        Self::new((0, 0), Vec::new())
    }

    pub fn origin(&self) -> (u32, u32) {
        self.origin
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<CellValue>> {
        self.rows
    }

    /// Rows below the header row
    pub fn data_rows(&self) -> &[Vec<CellValue>] {
        self.rows.get(1..).unwrap_or_default()
    }
}

#[cfg(test)]
fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
