//! Presentation of a normalized worksheet as an HTML table or a JSON tree

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use utoipa::ToSchema;

use super::models::{CellValue, Grid, MergeRect, UsedRange};
use super::normalizer::normalize;
use super::workbook::NamedSheet;

/// JSON tree of one worksheet
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SheetView {
    pub name: String,
    pub used_range: Option<UsedRange>,
    pub merges: Vec<MergeRect>,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetView {
    pub fn from_sheet(named: &NamedSheet) -> Self {
        Self {
            name: named.name.clone(),
            used_range: named.sheet.used_range(),
            merges: named.sheet.merges().to_vec(),
            rows: normalize(&named.sheet).into_rows(),
        }
    }
}

/// Render the grid as a `<table>`, spanning merge anchors over the cells they cover
pub fn render_html_table(grid: &Grid, merges: &[MergeRect]) -> String {
    let (origin_row, origin_col) = grid.origin();

    let mut spans: HashMap<(u32, u32), (usize, usize)> = HashMap::new();
    let mut covered: HashSet<(u32, u32)> = HashSet::new();
    for rect in merges {
        if spans.contains_key(&rect.anchor()) || covered.contains(&rect.anchor()) {
            continue;
        }
        spans.insert(rect.anchor(), (rect.row_span(), rect.col_span()));
        for row in rect.start_row..=rect.end_row {
            for col in rect.start_col..=rect.end_col {
                if (row, col) != rect.anchor() {
                    covered.insert((row, col));
                }
            }
        }
    }

    let mut html = String::from("<table>\n");
    for (row_offset, row) in (0u32..).zip(grid.rows()) {
        html.push_str("  <tr>");
        for (col_offset, cell) in (0u32..).zip(row) {
            let coord = (origin_row + row_offset, origin_col + col_offset);
            if covered.contains(&coord) {
                continue;
            }
            html.push_str("<td");
            if let Some(&(rowspan, colspan)) = spans.get(&coord) {
                if rowspan > 1 {
                    let _ = write!(html, " rowspan=\"{rowspan}\"");
                }
                if colspan > 1 {
                    let _ = write!(html, " colspan=\"{colspan}\"");
                }
            }
            let _ = write!(html, ">{}</td>", escape_html(&cell.to_string()));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");
    html
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
