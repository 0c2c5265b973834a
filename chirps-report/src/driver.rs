//! The per-year report loop.
//!
//! Years are queried one after another, oldest first. Each year is retried with
//! exponential backoff; what happens once a year runs out of attempts depends
//! on the [`FailurePolicy`].

use crate::{error::ReportError, row_set::RowSet};
use chirps_core::{
    query::annual_record, AggregationService, AnnualRecord, Point, QueryError, SeasonWindow,
    YearRange,
};
use log::{info, warn};
use std::time::Duration;

/// Maximum number of attempts per year
pub const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Initial sleep duration in milliseconds before retrying
pub const INITIAL_RETRY_DELAY_MS: u64 = 1000;

/// What one report covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportParams {
    pub point: Point,
    pub window: SeasonWindow,
    pub years: YearRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// The first failed year ends the run and nothing is returned.
    #[default]
    Abort,
    /// Failed years are recorded and the remaining years still run.
    Isolate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub failure_policy: FailurePolicy,
    pub max_attempts: u32,
    pub initial_retry_delay: Duration,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            failure_policy: FailurePolicy::default(),
            max_attempts: MAX_RETRY_ATTEMPTS,
            initial_retry_delay: Duration::from_millis(INITIAL_RETRY_DELAY_MS),
        }
    }
}

/// Handed to the progress callback after every finished year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Zero-based position of the year in the range
    pub index: usize,
    pub total: usize,
    pub year: i32,
}

impl Progress {
    /// `(index + 1) / total`, capped at 1.0
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        ((self.index + 1) as f64 / self.total as f64).min(1.0)
    }
}

#[derive(Debug)]
pub struct YearFailure {
    pub year: i32,
    pub error: QueryError,
}

/// Outcome of one report run.
#[derive(Debug)]
pub struct Report {
    pub params: ReportParams,
    /// One record per successfully queried year, zeros included
    pub attempted: Vec<AnnualRecord>,
    /// Years that failed; only ever non-empty with `FailurePolicy::Isolate`
    pub failures: Vec<YearFailure>,
}

impl Report {
    /// Rows for display: positive values only.
    pub fn rows(&self) -> RowSet {
        RowSet::from_records(&self.attempted)
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Query every year in `params.years` and collect the results.
pub async fn generate_report<S, F>(
    service: &S,
    params: &ReportParams,
    options: &ReportOptions,
    mut progress: F,
) -> Result<Report, ReportError>
where
    S: AggregationService,
    F: FnMut(Progress),
{
    let total = params.years.len();
    info!(
        "Querying {} years ({}..={}) at {} for {}",
        total,
        params.years.first(),
        params.years.last(),
        params.point,
        params.window
    );

    let mut attempted = Vec::with_capacity(total);
    let mut failures = Vec::new();

    for (index, year) in params.years.years().enumerate() {
        match query_with_retry(service, params, options, year).await {
            Ok(record) => attempted.push(record),
            Err(error) => match options.failure_policy {
                FailurePolicy::Abort => {
                    warn!("Aborting report: {} failed", year);
                    return Err(ReportError::YearFailed {
                        year,
                        source: error,
                    });
                }
                FailurePolicy::Isolate => {
                    warn!("Skipping {}: {}", year, error);
                    failures.push(YearFailure { year, error });
                }
            },
        }
        progress(Progress { index, total, year });
    }

    if attempted.is_empty() && !failures.is_empty() {
        return Err(ReportError::NoData {
            attempted: failures.len(),
        });
    }

    info!(
        "Report complete: {} years queried, {} failed",
        attempted.len(),
        failures.len()
    );
    Ok(Report {
        params: *params,
        attempted,
        failures,
    })
}

async fn query_with_retry<S: AggregationService>(
    service: &S,
    params: &ReportParams,
    options: &ReportOptions,
    year: i32,
) -> Result<AnnualRecord, QueryError> {
    let max_attempts = options.max_attempts.max(1);
    let mut delay = options.initial_retry_delay;
    let mut attempt = 1;
    loop {
        match annual_record(service, params.point, year, &params.window).await {
            Ok(record) => return Ok(record),
            Err(e) => {
                warn!(
                    "Attempt {}/{}: query for {} failed: {}",
                    attempt, max_attempts, year, e
                );
                if attempt >= max_attempts || !e.is_retryable() {
                    return Err(e);
                }
            }
        }
        info!(
            "Sleeping for {} milliseconds before retrying {}",
            delay.as_millis(),
            year
        );
        tokio::time::sleep(delay).await;
        delay *= 2;
        attempt += 1;
    }
}
