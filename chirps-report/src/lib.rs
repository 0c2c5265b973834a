//! Report generation for CHIRPS point precipitation.
//!
//! [`driver::generate_report`] runs one query per year against an
//! [`AggregationService`](chirps_core::AggregationService) and returns a
//! [`driver::Report`]. Everything downstream (table, spreadsheet, chart) works
//! on the filtered [`row_set::RowSet`] and never talks to the service.

pub mod chart;
pub mod driver;
pub mod error;
pub mod export;
pub mod row_set;
pub mod table;

pub use driver::{generate_report, FailurePolicy, Progress, Report, ReportOptions, ReportParams};
pub use error::{ChartError, ExportError, ReportError};
pub use row_set::{RowSet, Summary};
