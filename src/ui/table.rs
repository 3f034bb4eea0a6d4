use chrono::NaiveDate;
use serde_json::Value;

use crate::domain::entities::column::ColumnSpec;
use crate::domain::entities::entity::EntityKind;
use crate::ui::format::{cell_text, column_alignment, format_cell_value};

/// Formatted cells of the loaded page, restricted to `columns` in order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grid {
    pub headers: Vec<String>,
    pub alignments: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

pub fn build_grid(columns: &[&ColumnSpec], items: &[Value]) -> Grid {
    Grid {
        headers: columns.iter().map(|column| column.title.clone()).collect(),
        alignments: columns
            .iter()
            .map(|column| column_alignment(column.kind))
            .collect(),
        rows: items
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| format_cell_value(column.kind, &cell_text(record, &column.id)))
                    .collect()
            })
            .collect(),
    }
}

pub fn export_file_name(kind: EntityKind, date: NaiveDate) -> String {
    format!("{}-{}.csv", kind.slug().replace('_', "-"), date.format("%Y%m%d"))
}

pub fn page_summary(page: u32, total_pages: u32, total_items: u64) -> String {
    format!("Page {page} of {} ({total_items} records)", total_pages.max(1))
}
