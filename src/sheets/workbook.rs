//! Decoding uploaded `.xlsx` buffers into [`Sheet`]s and resolving sheet names

use calamine::{Data, Dimensions, Range, Reader, Xlsx, open_workbook_from_rs};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Cursor;

use super::models::{CellValue, MergeRect, Sheet, UsedRange};

/// Failures that prevent any data from being read out of a workbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    /// The buffer is not a readable workbook
    Decode { message: String },
    /// The workbook contains no worksheets at all
    NoWorksheets,
    /// No worksheet name matched the requested one
    WorksheetNotFound {
        requested: String,
        available: Vec<String>,
    },
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetError::Decode { message } => {
                write!(f, "Failed to open Excel workbook: {message}")
            }
            SheetError::NoWorksheets => write!(f, "No worksheets found in Excel file"),
            SheetError::WorksheetNotFound {
                requested,
                available,
            } => write!(
                f,
                "Worksheet '{requested}' not found (available: {})",
                available.join(", ")
            ),
        }
    }
}

impl std::error::Error for SheetError {}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedSheet {
    pub name: String,
    pub sheet: Sheet,
}

/// Every worksheet of an uploaded workbook, in workbook order
#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    sheets: Vec<NamedSheet>,
}

impl Workbook {
    #[cfg(test)]
    pub fn new(sheets: Vec<NamedSheet>) -> Self {
        Self { sheets }
    }

    /// Decode an `.xlsx` buffer, reading every worksheet and its merge rectangles
    pub fn from_bytes(file_data: Vec<u8>) -> Result<Self, SheetError> {
        let cursor = Cursor::new(file_data);
        let mut workbook = open_workbook_from_rs::<Xlsx<_>, _>(cursor).map_err(|e| {
            SheetError::Decode {
                message: e.to_string(),
            }
        })?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| SheetError::Decode {
                    message: format!("worksheet '{name}': {e}"),
                })?;
            let merges = match workbook.worksheet_merge_cells(&name) {
                Some(Ok(dimensions)) => dimensions,
                Some(Err(e)) => {
                    return Err(SheetError::Decode {
                        message: format!("merged cells of '{name}': {e}"),
                    });
                }
                None => Vec::new(),
            };

            let sheet = sheet_from_calamine(&range, &merges);
            tracing::debug!(
                "Loaded worksheet '{name}' with {} cells and {} merges",
                sheet.cell_count(),
                sheet.merges().len()
            );
            sheets.push(NamedSheet { name, sheet });
        }

        tracing::info!("Decoded workbook with {} worksheets", sheets.len());
        Ok(Self { sheets })
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn first_sheet(&self) -> Result<&NamedSheet, SheetError> {
        self.sheets.first().ok_or(SheetError::NoWorksheets)
    }

    /// Resolve a human-typed sheet name, ignoring case, spacing and punctuation
    pub fn find_sheet(&self, requested: &str) -> Result<&NamedSheet, SheetError> {
        if self.sheets.is_empty() {
            return Err(SheetError::NoWorksheets);
        }

        self.sheets
            .iter()
            .find(|candidate| sheet_names_match(&candidate.name, requested))
            .ok_or_else(|| SheetError::WorksheetNotFound {
                requested: requested.to_string(),
                available: self.sheets.iter().map(|s| s.name.clone()).collect(),
            })
    }

    /// `find_sheet` when a name is given, otherwise the first worksheet
    pub fn sheet_or_first(&self, requested: Option<&str>) -> Result<&NamedSheet, SheetError> {
        match requested.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => self.find_sheet(name),
            None => self.first_sheet(),
        }
    }
}

/// Lowercase, trim, and collapse every run of non-alphanumeric characters
/// into one space, so `"Master_Data"` and `"  master data  "` compare equal.
pub fn normalize_sheet_name(name: &str) -> String {
    name.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn sheet_names_match(actual: &str, requested: &str) -> bool {
    normalize_sheet_name(actual) == normalize_sheet_name(requested)
}

fn sheet_from_calamine(range: &Range<Data>, merges: &[Dimensions]) -> Sheet {
    let merges: Vec<MergeRect> = merges
        .iter()
        .map(|dim| MergeRect::new(dim.start, dim.end))
        .collect();

    let mut cells = BTreeMap::new();
    let mut used_range = None;

    // Merges never widen the range; the normalizer clips them to it
    if let (Some(start), Some(end)) = (range.start(), range.end()) {
        used_range = Some(UsedRange::new(start, end));
        for (row, col, data) in range.cells() {
            if let Some(value) = cell_from_data(data) {
                let row = start.0 + u32::try_from(row).unwrap_or(u32::MAX - start.0);
                let col = start.1 + u32::try_from(col).unwrap_or(u32::MAX - start.1);
                cells.insert((row, col), value);
            }
        }
    }

    Sheet::new(cells, used_range, merges)
}

/// Convert a calamine cell; `None` means the cell is absent
pub fn cell_from_data(data: &Data) -> Option<CellValue> {
    match data {
        Data::Empty => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            Some(CellValue::String(s.clone()))
        }
        #[allow(clippy::cast_precision_loss)]
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        // Dates stay as spreadsheet serials; the readings parser converts them
        Data::DateTime(excel_dt) => Some(CellValue::Number(excel_dt.as_f64())),
        Data::Error(e) => Some(CellValue::String(e.to_string())),
    }
}
