//! CLI entry point for the BRT ridership data pipeline.
//!
//! Provides subcommands for fetching Census metrics per system, fetching the
//! yearly NTD archives, processing the cached data into merged per-system
//! tables, and building the final dataset.

use anyhow::Result;
use brt_ridership::brt::{BrtStore, CensusTable};
use brt_ridership::fetch::BasicClient;
use brt_ridership::ntd::{ArchiveSource, NtdStore};
use brt_ridership::output::{print_pretty, print_table};
use brt_ridership::process::{build_dataset, process_system};
use brt_ridership::systems::SystemRegistry;
use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "brt_ridership")]
#[command(about = "Collects Census and NTD data for bus rapid transit systems", long_about = None)]
struct Cli {
    /// Root of the raw/processed data directory
    #[arg(long, global = true, env = "BRT_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// JSON file listing the configured systems
    #[arg(long, global = true, env = "BRT_SYSTEMS_FILE", default_value = "systems.json")]
    systems: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch Census metrics for one system and cache them as CSVs
    FetchCensus {
        /// System name as configured in the registry
        #[arg(short, long)]
        system: String,

        /// Metric families to fetch (all when omitted)
        #[arg(short, long, value_enum)]
        metric: Vec<Family>,

        /// Pause after each year's batch of requests, in seconds
        #[arg(short, long, env = "BRT_REQUEST_DELAY_SECS", default_value_t = 5)]
        delay_secs: u64,
    },
    /// Download NTD archives and cache the bus rapid transit rows per year
    FetchNtd {
        /// A single year to fetch instead of every supported year
        #[arg(short, long)]
        year: Option<u16>,
    },
    /// Print a cached metric table for one system
    Show {
        #[arg(short, long)]
        system: String,

        /// Metric name (income, pop, age, house_married, ...)
        #[arg(short, long)]
        table: String,
    },
    /// Merge cached Census and NTD data into one table per system
    Process {
        /// Systems to process (all when omitted)
        #[arg(short, long)]
        system: Vec<String>,
    },
    /// Concatenate the merged tables into the final dataset
    Dataset {
        /// Systems to include (all when omitted)
        #[arg(short, long)]
        system: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Family {
    Income,
    PopulationAge,
    Household,
    CarOwnership,
    BusinessCount,
}

impl Family {
    const ALL: [Family; 5] = [
        Family::Income,
        Family::PopulationAge,
        Family::Household,
        Family::CarOwnership,
        Family::BusinessCount,
    ];

    fn table(self) -> CensusTable {
        match self {
            Family::Income => CensusTable::Income,
            Family::PopulationAge => CensusTable::AgeAndSex,
            Family::Household => CensusTable::Occupancy,
            Family::CarOwnership => CensusTable::Commuting,
            Family::BusinessCount => CensusTable::BusinessPatterns,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/brt_ridership.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("brt_ridership.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let registry = SystemRegistry::load(&cli.systems)?;

    if let Err(e) = run(cli, &registry).await {
        error!(error = %e, "Run failed");
        return Err(e);
    }
    Ok(())
}

async fn run(cli: Cli, registry: &SystemRegistry) -> Result<()> {
    let data_dir = cli.data_dir;

    match cli.command {
        Commands::FetchCensus {
            system,
            metric,
            delay_secs,
        } => {
            let system = registry.get(&system)?;
            let client = BasicClient::new();
            let mut store = BrtStore::new(system, &data_dir)?
                .with_request_delay(Duration::from_secs(delay_secs));

            let families = if metric.is_empty() {
                Family::ALL.to_vec()
            } else {
                metric
            };

            info!(
                system = %system.name,
                zip_codes = system.zip_codes.len(),
                families = families.len(),
                "Fetching Census metrics"
            );
            for family in families {
                store.fetch_table(&client, family.table()).await?;
            }
        }
        Commands::FetchNtd { year } => {
            let client = BasicClient::new();
            let mut store = NtdStore::new(&data_dir)?;

            match year {
                Some(year) => {
                    let source = ArchiveSource::for_year(year)
                        .ok_or_else(|| anyhow::anyhow!("no NTD archive is known for {year}"))?;
                    store.fetch_year(&client, year, &source.member).await?;
                }
                None => store.fetch_all(&client).await?,
            }
        }
        Commands::Show { system, table } => {
            let system = registry.get(&system)?;
            let mut store = BrtStore::new(system, &data_dir)?;
            store.load_existing()?;
            let metric_table = store.get(&table)?;
            print_pretty(metric_table);
            print_table(&table, metric_table);
        }
        Commands::Process { system } => {
            let systems = registry.select(&system)?;
            let mut ntd = NtdStore::new(&data_dir)?;
            ntd.load_existing()?;

            for system in systems {
                let mut brt = BrtStore::new(system, &data_dir)?;
                brt.load_existing()?;
                let records = process_system(&data_dir, &brt, &ntd, system)?;
                info!(system = %system.name, rows = records.len(), "System processed");
            }
        }
        Commands::Dataset { system } => {
            let systems = registry.select(&system)?;
            let rows = build_dataset(&data_dir, &systems)?;
            info!(rows = rows.len(), "Dataset built");
        }
    }

    Ok(())
}
