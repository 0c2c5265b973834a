//! Command implementations for the CHIRPS CLI.
//!
//! Provides subcommands for building a per-year precipitation report at a
//! point and for querying a single year.

use chirps_core::{
    earth_engine::{Credentials, Session, SessionOptions, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS},
    InitError, MonthDay, Point, SeasonWindow,
};
use clap::{Args, Subcommand};
use std::time::Duration;

pub mod report;
pub mod year;

pub use report::ReportArgs;
pub use year::YearArgs;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Query every year from 1981 (or --first-year) and print, export and chart the results
    Report(ReportArgs),

    /// Query a single year and print its accumulated precipitation
    Year(YearArgs),
}

/// Where and when to aggregate.
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Latitude in degrees
    #[arg(long, default_value_t = -15.0, allow_negative_numbers = true)]
    pub latitude: f64,

    /// Longitude in degrees
    #[arg(long, default_value_t = -47.0, allow_negative_numbers = true)]
    pub longitude: f64,

    /// Start of the season window, MM-DD (or a YYYY-MM-DD date; the year is ignored)
    #[arg(long, default_value = "01-01")]
    pub start: MonthDay,

    /// End of the season window (exclusive), MM-DD
    #[arg(long, default_value = "12-31")]
    pub end: MonthDay,
}

impl QueryArgs {
    pub fn point(&self) -> anyhow::Result<Point> {
        Ok(Point::new(self.latitude, self.longitude)?)
    }

    pub fn window(&self) -> anyhow::Result<SeasonWindow> {
        Ok(SeasonWindow::new(self.start, self.end)?)
    }
}

/// Earth Engine connection settings.
#[derive(Args, Debug, Clone)]
pub struct ServiceArgs {
    /// Google Cloud project registered for Earth Engine
    #[arg(long, env = "EARTHENGINE_PROJECT")]
    pub project: Option<String>,

    /// OAuth access token, e.g. the output of `gcloud auth print-access-token`
    #[arg(long, env = "EARTHENGINE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, env = "EARTHENGINE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl ServiceArgs {
    pub fn connect(&self) -> Result<Session, InitError> {
        let credentials = Credentials::new(
            self.project.clone().unwrap_or_default(),
            self.token.clone().unwrap_or_default(),
        );
        let options = SessionOptions {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        };
        Session::connect(&credentials, &options)
    }
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Report(args) => report::run_report(args).await,
        Command::Year(args) => year::run_year(args).await,
    }
}
