use crate::{QueryArgs, ServiceArgs};
use anyhow::Context;
use chirps_core::{window::FIRST_CHIRPS_YEAR, AggregationService, Thresholds, YearRange};
use chirps_report::{
    chart::{self, ChartLayout},
    export::{export_path, write_csv, write_xlsx},
    generate_report,
    table::render_table,
    FailurePolicy, Report, ReportOptions, ReportParams,
};
use chirps_utils::dates::current_year;
use clap::Args;
use log::{info, warn};
use std::{path::PathBuf, time::Duration};

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    #[command(flatten)]
    pub service: ServiceArgs,

    /// First year to query
    #[arg(long, default_value_t = FIRST_CHIRPS_YEAR)]
    pub first_year: i32,

    /// Last year to query (defaults to the current year)
    #[arg(long)]
    pub last_year: Option<i32>,

    /// Strike threshold in mm
    #[arg(long, default_value_t = 230.0)]
    pub strike: f64,

    /// Exit threshold in mm
    #[arg(long, default_value_t = 1000.0)]
    pub exit: f64,

    /// Directory for CHIRPS_<lat>_<lon>.xlsx; no spreadsheet is written without it
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Also write the rows as CSV to this path
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Render the bar chart to this path (.svg or .png)
    #[arg(long)]
    pub chart: Option<PathBuf>,

    /// Keep going when a year fails and report the failed years at the end
    #[arg(long)]
    pub isolate_failures: bool,

    /// Attempts per year before giving up
    #[arg(long, default_value_t = chirps_report::driver::MAX_RETRY_ATTEMPTS)]
    pub max_attempts: u32,

    /// Delay before the first retry, doubled on every further attempt
    #[arg(long, default_value_t = chirps_report::driver::INITIAL_RETRY_DELAY_MS)]
    pub retry_delay_ms: u64,
}

impl ReportArgs {
    pub fn params(&self) -> anyhow::Result<ReportParams> {
        let last = self.last_year.unwrap_or_else(current_year);
        Ok(ReportParams {
            point: self.query.point()?,
            window: self.query.window()?,
            years: YearRange::new(self.first_year, last)?,
        })
    }

    pub fn thresholds(&self) -> anyhow::Result<Thresholds> {
        Ok(Thresholds::new(self.strike, self.exit)?)
    }

    pub fn options(&self) -> ReportOptions {
        ReportOptions {
            failure_policy: if self.isolate_failures {
                FailurePolicy::Isolate
            } else {
                FailurePolicy::Abort
            },
            max_attempts: self.max_attempts.max(1),
            initial_retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

pub async fn run_report(args: ReportArgs) -> anyhow::Result<()> {
    // validate everything before opening a session
    args.params()?;
    args.thresholds()?;
    let session = args
        .service
        .connect()
        .context("Failed to initialize the Earth Engine session")?;
    let output = produce_report(&session, &args).await?;
    println!("{output}");
    Ok(())
}

/// Run the report against `service`, write the requested files and return
/// the text shown to the user.
///
/// Query failures are errors. Export and chart failures are not: they end up
/// as status lines in the returned text.
pub async fn produce_report<S: AggregationService>(
    service: &S,
    args: &ReportArgs,
) -> anyhow::Result<String> {
    let params = args.params()?;
    let thresholds = args.thresholds()?;
    let report = generate_report(service, &params, &args.options(), |progress| {
        info!(
            "[{:>3.0}%] {} done ({}/{})",
            progress.fraction() * 100.0,
            progress.year,
            progress.index + 1,
            progress.total
        );
    })
    .await
    .context("Failed to generate the CHIRPS report")?;

    let mut lines = vec![
        format!(
            "CHIRPS accumulated precipitation at {} for {}",
            params.point, params.window
        ),
        render_table(&report.rows()),
    ];
    lines.extend(write_outputs(&report, &thresholds, args));
    if report.is_partial() {
        lines.push(partial_notice(&report));
    }
    Ok(lines.join("\n"))
}

fn write_outputs(report: &Report, thresholds: &Thresholds, args: &ReportArgs) -> Vec<String> {
    let rows = report.rows();
    let mut status = Vec::new();

    if let Some(dir) = &args.output_dir {
        let path = export_path(dir, &report.params.point);
        match write_xlsx(&rows, &path) {
            Ok(()) => status.push(format!("Spreadsheet saved to {}", path.display())),
            Err(e) => {
                warn!("Spreadsheet export failed: {}", e);
                status.push(format!("Could not save spreadsheet: {e}"));
            }
        }
    }

    if let Some(path) = &args.csv {
        match write_csv(&rows, path) {
            Ok(()) => status.push(format!("CSV saved to {}", path.display())),
            Err(e) => {
                warn!("CSV export failed: {}", e);
                status.push(format!("Could not save CSV: {e}"));
            }
        }
    }

    if let Some(path) = &args.chart {
        match ChartLayout::new(&rows, thresholds).and_then(|layout| chart::render(&layout, path))
        {
            Ok(()) => status.push(format!("Chart saved to {}", path.display())),
            Err(e) => {
                warn!("Chart rendering failed: {}", e);
                status.push(format!("Could not render chart: {e}"));
            }
        }
    }

    status
}

fn partial_notice(report: &Report) -> String {
    let years = report
        .failures
        .iter()
        .map(|failure| failure.year.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Partial report: {} of {} years failed ({})",
        report.failures.len(),
        report.params.years.len(),
        years
    )
}
