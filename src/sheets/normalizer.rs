//! Worksheet normalization
//!
//! Spreadsheet decoders hand back merged regions as a single populated
//! top-left cell plus holes for the rest of the region. Row-based parsing
//! needs every column populated, so the normalizer expands merges, trims
//! strings and materializes missing cells before any row is read by position.

use std::collections::HashMap;

use super::models::{CellValue, Grid, MergeRect, Sheet, UsedRange};

/// Maps every covered coordinate to the coordinate whose value it displays
#[derive(Debug, Default)]
struct MergeIndex {
    sources: HashMap<(u32, u32), (u32, u32)>,
}

impl MergeIndex {
    /// Applies rectangles in declaration order, clipped to the used range.
    ///
    /// A later rectangle overwrites the cells of an earlier one it overlaps;
    /// if its own top-left lies inside an earlier rectangle it inherits that
    /// rectangle's value.
    fn build(merges: &[MergeRect], range: &UsedRange) -> Self {
        let mut index = Self::default();

        for (position, rect) in merges.iter().enumerate() {
            if let Some(earlier) = merges[..position].iter().find(|m| m.overlaps(rect)) {
                tracing::warn!(
                    "Overlapping merge rectangles {earlier:?} and {rect:?}; later one wins"
                );
            }

            let source = index.source_of(rect.start_row, rect.start_col);
            let rows = rect.start_row.max(range.start_row)..=rect.end_row.min(range.end_row);
            for row in rows {
                let cols = rect.start_col.max(range.start_col)..=rect.end_col.min(range.end_col);
                for col in cols {
                    index.sources.insert((row, col), source);
                }
            }
        }

        index
    }

    fn source_of(&self, row: u32, col: u32) -> (u32, u32) {
        self.sources.get(&(row, col)).copied().unwrap_or((row, col))
    }
}

/// Expand a raw sheet into a complete rectangular grid.
///
/// The grid has one row per used-range row and one value per used-range
/// column. Cells covered by a merge rectangle hold the rectangle's top-left
/// value (empty when that cell is absent), strings are trimmed and absent cells
/// become empty strings. A sheet without a used range yields an empty grid.
pub fn normalize(sheet: &Sheet) -> Grid {
    let Some(range) = sheet.used_range() else {
        return Grid::empty();
    };

    let merges = MergeIndex::build(sheet.merges(), &range);

    let rows = (range.start_row..=range.end_row)
        .map(|row| {
            (range.start_col..=range.end_col)
                .map(|col| {
                    let (source_row, source_col) = merges.source_of(row, col);
                    sheet
                        .cell(source_row, source_col)
                        .map_or_else(CellValue::empty, CellValue::trimmed)
                })
                .collect()
        })
        .collect();

    tracing::debug!(
        "Normalized sheet into {} rows x {} columns ({} merges)",
        range.rows(),
        range.cols(),
        sheet.merges().len()
    );

    Grid::new((range.start_row, range.start_col), rows)
}
