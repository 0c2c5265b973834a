/// Error types for report generation and presentation
use chirps_core::QueryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    /// A year exhausted its attempts while running with `FailurePolicy::Abort`
    #[error("query for {year} failed: {source}")]
    YearFailed { year: i32, source: QueryError },

    /// Every year failed while running with `FailurePolicy::Isolate`
    #[error("all {attempted} yearly queries failed")]
    NoData { attempted: usize },
}

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("nothing to chart: no year has positive precipitation")]
    Empty,

    #[error("unsupported chart format {0:?}: use .svg or .png")]
    UnsupportedFormat(String),

    /// PNG text needs a font backend, enabled with the `ttf` feature
    #[error("cannot draw {0:?}: PNG charts need the `ttf` feature, use .svg instead")]
    FontsUnavailable(String),

    #[error("failed to draw chart: {0}")]
    Draw(String),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write spreadsheet: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}
