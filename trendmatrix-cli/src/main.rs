//! TrendMatrix CLI: analyze and resample commands.
//!
//! Commands:
//! - `analyze`: run the trend matrix over a daily bar file and print the report
//! - `resample`: print a daily bar file resampled to one timeframe, as CSV

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use trendmatrix_core::data::{load_bars, write_csv};
use trendmatrix_core::domain::{split_timeframe_list, Timeframe};
use trendmatrix_core::resample::resample;
use trendmatrix_core::{JitterSource, MatrixConfig, TrendMatrix, TrendMatrixReport};

#[derive(Parser)]
#[command(
    name = "trendmatrix",
    about = "TrendMatrix CLI: multi-timeframe trend bias from daily bars"
)]
struct Cli {
    /// Log filter when RUST_LOG is unset (e.g. info, debug, trendmatrix_core=debug).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the trend matrix and print the JSON report.
    Analyze {
        /// Daily bar file (.csv or .json).
        #[arg(long)]
        bars: PathBuf,

        /// Symbol label. Defaults to the bar file's name.
        #[arg(long)]
        symbol: Option<String>,

        /// Comma-separated timeframes, e.g. "15min,1hour,1day".
        #[arg(long)]
        timeframes: Option<String>,

        /// TOML config file (timeframes, seed, [indicators], ...).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Seed for the synthetic sub-daily jitter.
        #[arg(long)]
        seed: Option<u64>,

        /// Indicator override, e.g. --set emaLength=20. Repeatable.
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,

        /// Reject unknown timeframes instead of using daily bars.
        #[arg(long, default_value_t = false)]
        strict: bool,

        /// Evaluate timeframes on the current thread.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Pretty-print the JSON report.
        #[arg(long, default_value_t = false)]
        pretty: bool,

        /// Print a human-readable summary instead of JSON.
        #[arg(long, default_value_t = false)]
        summary: bool,
    },
    /// Resample a daily bar file and print it as CSV, newest first.
    Resample {
        /// Daily bar file (.csv or .json).
        #[arg(long)]
        bars: PathBuf,

        /// Target timeframe: 15min, 1hour, 4hours, 1day or 1week.
        #[arg(long)]
        timeframe: String,

        /// Symbol label, used to derive the jitter stream. Defaults to the file name.
        #[arg(long)]
        symbol: Option<String>,

        /// Seed for the synthetic sub-daily jitter.
        #[arg(long)]
        seed: Option<u64>,
    },
}

struct AnalyzeArgs {
    bars: PathBuf,
    symbol: Option<String>,
    timeframes: Option<String>,
    config: Option<PathBuf>,
    seed: Option<u64>,
    overrides: Vec<String>,
    strict: bool,
    sequential: bool,
    pretty: bool,
    summary: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Analyze {
            bars,
            symbol,
            timeframes,
            config,
            seed,
            overrides,
            strict,
            sequential,
            pretty,
            summary,
        } => run_analyze(AnalyzeArgs {
            bars,
            symbol,
            timeframes,
            config,
            seed,
            overrides,
            strict,
            sequential,
            pretty,
            summary,
        }),
        Commands::Resample {
            bars,
            timeframe,
            symbol,
            seed,
        } => run_resample(&bars, &timeframe, symbol, seed),
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log level '{level}'"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => MatrixConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => MatrixConfig::default(),
    };
    if let Some(list) = &args.timeframes {
        config.timeframes = split_timeframe_list(list);
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.strict_timeframes |= args.strict;
    if args.sequential {
        config.parallel = false;
    }
    let overrides = args
        .overrides
        .iter()
        .map(|kv| parse_override(kv))
        .collect::<Result<Vec<_>>>()?;
    config.indicators = config.indicators.with_params(overrides);

    if config.timeframes.is_empty() {
        bail!("no timeframes requested");
    }

    let symbol = symbol_or_file_stem(args.symbol, &args.bars)?;
    let daily = load_bars(&args.bars)
        .with_context(|| format!("failed to load bars from {}", args.bars.display()))?;

    let matrix = TrendMatrix::from_config(&config)?;
    let result = matrix.analyze(&symbol, &daily, &config.timeframes)?;
    let report = TrendMatrixReport::new(&symbol, &daily, config.indicators, result, Utc::now());

    if args.summary {
        print_summary(&report);
    } else {
        println!("{}", report.to_json(args.pretty)?);
    }
    Ok(())
}

fn run_resample(bars: &Path, timeframe: &str, symbol: Option<String>, seed: Option<u64>) -> Result<()> {
    let timeframe: Timeframe = timeframe.parse()?;
    let symbol = symbol_or_file_stem(symbol, bars)?;
    let daily = load_bars(bars)
        .with_context(|| format!("failed to load bars from {}", bars.display()))?;

    let mut rng = JitterSource::from_seed(seed).rng_for(&symbol, timeframe.label());
    let series = resample(&daily, timeframe, &mut rng);
    tracing::info!(%timeframe, bars = series.len(), "resampled");

    write_csv(&series, std::io::stdout().lock())?;
    Ok(())
}

/// Split `key=value`.
fn parse_override(kv: &str) -> Result<(String, String)> {
    match kv.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => bail!("invalid --set '{kv}', expected KEY=VALUE"),
    }
}

fn symbol_or_file_stem(symbol: Option<String>, bars: &Path) -> Result<String> {
    let symbol = match symbol {
        Some(s) => s,
        None => bars
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .context("cannot derive a symbol from the bar file name; pass --symbol")?,
    };
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        bail!("symbol must not be empty");
    }
    Ok(symbol)
}

fn print_summary(report: &TrendMatrixReport) {
    println!();
    println!("=== Trend Matrix: {} ===", report.symbol);
    println!("Daily bars:     {}", report.data_points);
    println!("Updated:        {}", report.last_updated.format("%Y-%m-%d %H:%M:%S UTC"));
    println!();
    println!("{:<10} {:>6} {:>6} {:>5} {:>5} {:>5} {:>5}", "Timeframe", "Score", "Conf", "EMA", "RSI", "MACD", "ST");
    for tf in &report.timeframes {
        let a = &tf.analysis;
        println!(
            "{:<10} {:>6} {:>6.2} {:>5} {:>5} {:>5} {:>5}",
            tf.timeframe,
            a.score,
            a.confidence,
            a.ema.value(),
            a.rsi.value(),
            a.macd.value(),
            a.supertrend.value()
        );
    }
    println!();
    println!("--- Aggregate ---");
    println!("Score:          {}", report.aggregate.score);
    println!("Confidence:     {:.2}", report.aggregate.confidence);
    println!("Bias:           {}", report.aggregate.bias);
    println!("Grade:          {}", report.aggregate.grade);
    println!("In agreement:   {}", report.aggregate.timeframes_in_agreement.join(", "));
    if report.alert.triggered {
        if let Some(kind) = report.alert.kind {
            println!();
            println!("ALERT: {kind}");
        }
    }
    println!();
}
