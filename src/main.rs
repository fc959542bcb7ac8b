use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rusty_labor::{
    chartplotter::ChartPlotter, mysql_db::Database, BlsClient, Config, MemoryStore, Metric, Pipeline, RunReport,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "rusty-labor")]
#[command(about = "Year-over-year change of unemployment and worker compensation", long_about = None)]
struct Cli {
    /// Output filename of the chart
    #[arg(short, long, default_value = "charts/change.png")]
    output: PathBuf,

    /// Number of data points drawn per series
    #[arg(short, long, default_value_t = 50)]
    count: usize,

    /// Path to the config file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Keep observations in memory instead of mysql
    #[arg(long, default_value_t = false)]
    memory: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    let config = Config::read_config(&cli.config)?;
    info!(
        start = config.years.start(),
        end = config.years.end(),
        memory = cli.memory,
        "Loaded config"
    );

    let client = BlsClient::from_config(&config)?;
    let report = if cli.memory {
        Pipeline::from_config(&config, client, MemoryStore::new()).run()
    } else {
        let database = Database::from_config(&config)?;
        Pipeline::from_config(&config, client, database).run()
    };
    log_report(&report);

    ChartPlotter::from_config(&config, cli.count).plot_changes(&report, &cli.output)?;

    if report.failures().len() == 2 {
        anyhow::bail!("No metric could be processed");
    }
    Ok(())
}

fn log_report(report: &RunReport) {
    let labels = report.labels();
    for metric in Metric::ALL.iter() {
        match report.get(*metric) {
            Ok(metric_report) => {
                for (label, change) in labels.iter().skip(1).zip(metric_report.changes.values()) {
                    match change {
                        Some(percent) => info!(%metric, year = %label, "{:.2}%", percent),
                        None => warn!(%metric, year = %label, "No change available"),
                    }
                }
            }
            Err(e) => warn!(%metric, "Skipped: {}", e),
        }
    }
}
