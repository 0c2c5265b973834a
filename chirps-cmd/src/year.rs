use crate::{QueryArgs, ServiceArgs};
use anyhow::Context;
use chirps_core::{query::annual_record, AggregationService, AnnualRecord};
use clap::Args;
use log::info;

#[derive(Args, Debug, Clone)]
pub struct YearArgs {
    /// Year to query
    pub year: i32,

    #[command(flatten)]
    pub query: QueryArgs,

    #[command(flatten)]
    pub service: ServiceArgs,
}

pub async fn run_year(args: YearArgs) -> anyhow::Result<()> {
    args.query.point()?;
    args.query.window()?;
    let session = args
        .service
        .connect()
        .context("Failed to initialize the Earth Engine session")?;
    let record = query_year(&session, &args).await?;
    println!("{}", describe(&record));
    Ok(())
}

pub async fn query_year<S: AggregationService>(
    service: &S,
    args: &YearArgs,
) -> anyhow::Result<AnnualRecord> {
    let point = args.query.point()?;
    let window = args.query.window()?;
    info!("Querying {} at {} for {}", args.year, point, window);
    annual_record(service, point, args.year, &window)
        .await
        .with_context(|| format!("Failed to query {}", args.year))
}

fn describe(record: &AnnualRecord) -> String {
    if record.is_positive() {
        format!("{}: {:.2} mm", record.year, record.accumulated)
    } else {
        format!("{}: no precipitation recorded", record.year)
    }
}
