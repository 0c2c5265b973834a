//! Text table of the displayed rows.

use crate::row_set::RowSet;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct TableRow {
    #[tabled(rename = "Year")]
    year: i32,
    #[tabled(rename = "CHIRPS (mm)")]
    accumulated: String,
}

/// Boxed `Year | CHIRPS (mm)` table followed by a one-line summary.
pub fn render_table(rows: &RowSet) -> String {
    let mut table = Table::new(rows.iter().map(|record| TableRow {
        year: record.year,
        accumulated: format!("{:.2}", record.accumulated),
    }));
    table.with(Style::rounded());
    let mut rendered = table.to_string();
    rendered.push('\n');
    match rows.summary() {
        Some(summary) => rendered.push_str(&format!(
            "{} years | mean {:.2} mm | max {:.2} mm ({}) | min {:.2} mm ({})",
            summary.count,
            summary.mean,
            summary.max.accumulated,
            summary.max.year,
            summary.min.accumulated,
            summary.min.year
        )),
        None => rendered.push_str("no year with positive precipitation"),
    }
    rendered
}
