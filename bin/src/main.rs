//! CLI for calendar seasonality statistics.
//!
//! This binary lists the available aggregations and computes seasonality
//! tables for tickers read from a directory of `<TICKER>.csv` files, printing
//! chart records as JSON.

use clap::{Args, Parser, Subcommand, ValueEnum};
use seasonality::{
    AggregationRegistry, CsvDirectorySource, DateWindow, OutputShape, Report, SeasonalityConfig,
    SeasonalityEngine,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "seasonality")]
#[command(about = "Calendar seasonality statistics for tickers", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding `<TICKER>.csv` files
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct WindowArgs {
    /// Ticker symbol
    ticker: String,
    /// First year (inclusive)
    #[arg(long)]
    start_year: Option<i32>,
    /// Last year (inclusive)
    #[arg(long)]
    end_year: Option<i32>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Shape {
    /// Every year plus the mean
    Full,
    /// Mean only
    Mean,
    /// Mean plus the most recent years
    Top,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List all available aggregations
    List,
    /// Show information about a specific aggregation
    Info {
        /// Aggregation name
        aggregation: String,
    },
    #[command(flatten)]
    Data(DataCommand),
}

/// Subcommands that load a ticker and print JSON.
#[derive(Debug, Subcommand)]
enum DataCommand {
    /// Price change from Jan-1 by calendar day
    Price {
        #[command(flatten)]
        window: WindowArgs,
        /// Output shape
        #[arg(long, value_enum, default_value = "full")]
        shape: Shape,
        /// Number of recent years for `--shape top`
        #[arg(long)]
        top: Option<usize>,
    },
    /// Mean monthly volume relative to January
    Volume {
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Standard deviation of the close within each month
    Volatility {
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Year-to-date volume by calendar day
    CumulativeVolume {
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Return and risk statistics
    Risk {
        #[command(flatten)]
        window: WindowArgs,
        /// Annual risk-free rate as a decimal
        #[arg(long, default_value_t = 0.0)]
        risk_free_rate: f64,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> seasonality::Result<()> {
    let registry = AggregationRegistry::with_defaults();

    match cli.command {
        Commands::List => {
            list_aggregations(&registry);
            Ok(())
        }
        Commands::Info { aggregation } => show_aggregation_info(&registry, &aggregation),
        Commands::Data(command) => {
            let config = match &cli.config {
                Some(path) => SeasonalityConfig::from_json_file(path)?,
                None => SeasonalityConfig::default(),
            };
            let engine = SeasonalityEngine::new(CsvDirectorySource::new(cli.data_dir), config)?;
            let output = compute(&engine, command)?;
            println!("{output}");
            Ok(())
        }
    }
}

/// List all available aggregations.
fn list_aggregations(registry: &AggregationRegistry) {
    println!("Available Aggregations ({} total)\n", registry.len());
    for info in registry.all_info() {
        println!("  {} ({}) - {}", info.name, info.granularity, info.description);
    }
}

/// Show detailed information about a specific aggregation.
fn show_aggregation_info(registry: &AggregationRegistry, name: &str) -> seasonality::Result<()> {
    let all_info = registry.all_info();
    let Some(info) = all_info.iter().find(|a| a.name == name) else {
        eprintln!("Available aggregations:");
        for info in &all_info {
            eprintln!("  {}", info.name);
        }
        return Err(seasonality::SeasonalityError::NotFound(name.to_string()));
    };

    println!("Aggregation: {}", info.name);
    println!("Description: {}", info.description);
    println!("Granularity: {}", info.granularity);
    println!("Required columns:");
    for col in &info.required_columns {
        println!("  - {col}");
    }
    Ok(())
}

/// Compute a data command and render it as pretty JSON.
fn compute(
    engine: &SeasonalityEngine<CsvDirectorySource>,
    command: DataCommand,
) -> seasonality::Result<String> {
    let (args, report) = match command {
        DataCommand::Price { window, shape, top } => {
            let shape = output_shape(shape, top, engine.config());
            (window, Report::Price(shape))
        }
        DataCommand::Volume { window } => (window, Report::Volume),
        DataCommand::Volatility { window } => (window, Report::Volatility),
        DataCommand::CumulativeVolume { window } => (window, Report::CumulativeVolume),
        DataCommand::Risk {
            window,
            risk_free_rate,
        } => {
            let range = request_window(engine.config(), &window)?;
            let summary = engine.risk_summary(&window.ticker, range, risk_free_rate)?;
            return Ok(serde_json::to_string_pretty(&summary)?);
        }
    };

    let range = request_window(engine.config(), &args)?;
    let records = engine.records(&args.ticker, range, report)?;
    Ok(serde_json::to_string_pretty(&records)?)
}

fn request_window(config: &SeasonalityConfig, args: &WindowArgs) -> seasonality::Result<DateWindow> {
    config.window(args.start_year, args.end_year)
}

const fn output_shape(shape: Shape, top: Option<usize>, config: &SeasonalityConfig) -> OutputShape {
    match shape {
        Shape::Full => OutputShape::Full,
        Shape::Mean => OutputShape::MeanOnly,
        Shape::Top => OutputShape::TopRecent(match top {
            Some(n) => n,
            None => config.top_years,
        }),
    }
}
