//! CHIRPS CLI - accumulated precipitation at a point, year by year.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "chirps-cli",
    version,
    about = "CHIRPS annual precipitation reports from Earth Engine"
)]
struct Cli {
    #[command(subcommand)]
    command: chirps_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    chirps_cmd::run(cli.command).await
}
