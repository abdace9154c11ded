//! ma-core: marketing analytics CLI.
//!
//! # Commands
//!
//! - `analyze`: run predictions, anomaly detection, trends and recommendations
//! - `datasets`: summarize the synthetic dashboard datasets
//! - `config show` / `config validate`: inspect configuration
//! - `schema`: print the JSON Schema of the analytics result
//! - `completions`: generate shell completions

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use ma_common::{AnalyticsResult, Error, OutputFormat};
use ma_config::{resolve_config, AnalyticsConfig, ConfigPaths, ResolvedConfig, ValidationError};
use ma_core::backend::HttpPredictionSource;
use ma_core::history::SyntheticDatasets;
use ma_core::logging::{self, LogFormat};
use ma_core::{AnalyticsEngine, ExitCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// Marketing analytics engine
#[derive(Parser)]
#[command(name = "ma-core")]
#[command(version)]
#[command(about = "Predictions, anomalies, trends and recommendations for marketing metrics")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to analytics.json (overrides MA_CONFIG and the XDG location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one analytics pass
    Analyze(AnalyzeArgs),
    /// Summarize synthetic datasets
    Datasets {
        /// Generator seed
        #[arg(long)]
        seed: Option<u64>,
        /// Only this metric
        #[arg(long)]
        metric: Option<String>,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
    /// Print the JSON Schema of the analytics result
    Schema,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
struct AnalyzeArgs {
    /// JSON object of metric name to current value
    #[arg(long)]
    metrics: Option<PathBuf>,

    /// JSON object of metric name to historical values (oldest first)
    #[arg(long)]
    history: Option<PathBuf>,

    /// Use synthetic datasets as the history provider
    #[arg(long)]
    synthetic: bool,

    /// Do not contact the prediction service
    #[arg(long)]
    offline: bool,

    /// Prediction service base URL
    #[arg(long)]
    backend_url: Option<String>,

    /// Seed for forecast noise and synthetic data
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the resolved configuration
    Show,
    /// Validate a config file (or the resolved configuration)
    Validate {
        path: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct ErrorReport {
    status: &'static str,
    code: i32,
    error: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_format);

    let code = match cli.command {
        Commands::Analyze(ref args) => run_analyze(&cli, args).await,
        Commands::Datasets { seed, ref metric } => run_datasets(&cli, seed, metric.as_deref()),
        Commands::Config { ref action } => run_config(&cli, action),
        Commands::Schema => {
            print_value(&ma_common::schema::analytics_result_schema(), OutputFormat::Pretty);
            ExitCode::Clean
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "ma-core", &mut std::io::stdout());
            ExitCode::Clean
        }
    };
    std::process::exit(code.as_i32());
}

fn report_error(code: ExitCode, message: impl std::fmt::Display) -> ExitCode {
    let report = ErrorReport {
        status: "error",
        code: code.as_i32(),
        error: message.to_string(),
    };
    match serde_json::to_string(&report) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!("error: {message}"),
    }
    code
}

fn print_value<T: Serialize>(value: &T, format: OutputFormat) {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string(value),
        OutputFormat::Pretty | OutputFormat::Text => serde_json::to_string_pretty(value),
    };
    match rendered {
        Ok(s) => println!("{s}"),
        Err(e) => warn!(error = %e, "failed to serialize output"),
    }
}

fn load_config(cli: &Cli) -> Result<ResolvedConfig, ExitCode> {
    let paths = ConfigPaths::discover(cli.config.clone());
    resolve_config(&paths).map_err(|e| report_error(ExitCode::from(&e), e))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> ma_common::Result<T> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw)
        .map_err(|e| Error::InvalidInput(format!("{}: {}", path.display(), e)))
}

fn read_metrics(path: &Path) -> ma_common::Result<BTreeMap<String, f64>> {
    let metrics: BTreeMap<String, f64> = read_json(path)?;
    if let Some((name, value)) = metrics.iter().find(|(_, v)| **v < 0.0) {
        return Err(Error::InvalidInput(format!(
            "metric {name} has negative value {value}"
        )));
    }
    Ok(metrics)
}

fn apply_analyze_overrides(
    config: &mut AnalyticsConfig,
    args: &AnalyzeArgs,
) -> Result<(), ValidationError> {
    if args.offline {
        config.backend.enabled = false;
    }
    if let Some(url) = &args.backend_url {
        config.backend.base_url = url.clone();
    }
    if let Some(seed) = args.seed {
        config.noise.seed = Some(seed);
    }
    config.validate()
}

async fn run_analyze(cli: &Cli, args: &AnalyzeArgs) -> ExitCode {
    let mut config = match load_config(cli) {
        Ok(resolved) => resolved.config,
        Err(code) => return code,
    };
    if let Err(e) = apply_analyze_overrides(&mut config, args) {
        return report_error(ExitCode::from(&e), e);
    }

    let synthetic = args.synthetic.then(|| {
        let seed = config.noise.seed.unwrap_or_else(rand::random);
        SyntheticDatasets::generate(seed, Utc::now())
    });

    let current = match (&args.metrics, &synthetic) {
        (Some(path), _) => match read_metrics(path) {
            Ok(m) => m,
            Err(e) => return report_error(ExitCode::for_error(&e), e),
        },
        (None, Some(data)) => data.current_values(),
        (None, None) => {
            return report_error(
                ExitCode::InputError,
                "either --metrics or --synthetic is required",
            )
        }
    };

    let historical: Option<BTreeMap<String, Vec<f64>>> = match &args.history {
        Some(path) => match read_json(path) {
            Ok(h) => Some(h),
            Err(e) => return report_error(ExitCode::for_error(&e), e),
        },
        None => None,
    };

    let mut engine = AnalyticsEngine::new(config.clone());
    if config.backend.enabled {
        match HttpPredictionSource::new(&config.backend) {
            Ok(source) => {
                debug!(url = source.url(), "prediction service configured");
                engine = engine.with_prediction_source(Arc::new(source));
            }
            Err(e) => warn!(error = %e, "prediction service unavailable, predicting locally"),
        }
    }
    if let Some(data) = synthetic {
        engine = engine.with_history_provider(Arc::new(data));
    }

    let result = engine.run_analytics(&current, historical.as_ref()).await;
    match cli.format {
        OutputFormat::Text => print!("{}", render_text(&result)),
        format => print_value(&result, format),
    }
    ExitCode::for_result(&result)
}

fn render_text(result: &AnalyticsResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "run {}{}",
        result.run_id,
        if result.degraded { " (degraded)" } else { "" }
    );

    let _ = writeln!(out, "\npredictions:");
    for (metric, p) in &result.predictions {
        let _ = writeln!(
            out,
            "  {metric:<20} current {:>10.2}  next hour {:>10.2}  next day {:>10.2}  {} {:+.1}%  conf {:.2}  [{:?}]",
            p.current,
            p.next_hour_prediction,
            p.next_day_prediction,
            p.trend,
            p.change_percent,
            p.confidence,
            p.source
        );
    }

    if !result.anomalies.is_empty() {
        let _ = writeln!(out, "\nanomalies:");
        for a in &result.anomalies {
            let _ = writeln!(out, "  [{}] {} (z={:.2})", a.severity, a.description, a.deviation);
        }
    }

    if !result.trends.is_empty() {
        let _ = writeln!(out, "\ntrends:");
        for t in &result.trends {
            let _ = writeln!(
                out,
                "  {:<20} {:<10} strength {:.2}  r2 {:.2}  seasonal {}",
                t.metric,
                t.trend.to_string(),
                t.strength,
                t.r2,
                if t.seasonality { "yes" } else { "no" }
            );
        }
    }

    if !result.recommendations.is_empty() {
        let _ = writeln!(out, "\nrecommendations:");
        for r in &result.recommendations {
            let _ = writeln!(out, "  [{}] {} ({:.2})", r.priority, r.title, r.confidence);
            for action in &r.actions {
                let _ = writeln!(out, "      - {action}");
            }
        }
    }

    let _ = writeln!(out, "\ninsights:");
    for insight in &result.insights {
        let _ = writeln!(out, "  - {insight}");
    }
    out
}

#[derive(Serialize)]
struct DatasetSummary<'a> {
    name: &'a str,
    description: &'a str,
    unit: &'a str,
    points: usize,
    current: f64,
    baseline: ma_core::history::DatasetBaseline,
    has_seasonality: bool,
}

fn run_datasets(cli: &Cli, seed: Option<u64>, metric: Option<&str>) -> ExitCode {
    let seed = seed.unwrap_or_else(rand::random);
    let data = SyntheticDatasets::generate(seed, Utc::now());

    let summaries: Vec<DatasetSummary<'_>> = data
        .iter()
        .filter(|ds| metric.is_none_or(|m| m == ds.name))
        .map(|ds| DatasetSummary {
            name: &ds.name,
            description: &ds.description,
            unit: &ds.unit,
            points: ds.series.len(),
            current: ds.current(),
            baseline: ds.baseline,
            has_seasonality: ds.has_seasonality,
        })
        .collect();

    if let (Some(m), true) = (metric, summaries.is_empty()) {
        return report_error(ExitCode::InputError, format!("unknown metric: {m}"));
    }

    match cli.format {
        OutputFormat::Text => {
            for s in &summaries {
                println!(
                    "{:<20} {:>4} points  current {:>8.1} {:<5}  mean {:>8.1}  std {:>7.1}  range [{:.0}, {:.0}]",
                    s.name,
                    s.points,
                    s.current,
                    s.unit,
                    s.baseline.mean,
                    s.baseline.std_dev,
                    s.baseline.normal_range.0,
                    s.baseline.normal_range.1
                );
            }
        }
        format => print_value(&summaries, format),
    }
    ExitCode::Clean
}

#[derive(Serialize)]
struct ValidateReport {
    status: &'static str,
    schema_version: String,
}

fn run_config(cli: &Cli, action: &ConfigCommands) -> ExitCode {
    match action {
        ConfigCommands::Show => match load_config(cli) {
            Ok(resolved) => {
                print_value(&resolved, cli.format);
                ExitCode::Clean
            }
            Err(code) => code,
        },
        ConfigCommands::Validate { path: Some(path) } => {
            let checked = AnalyticsConfig::from_file(path).and_then(|c| c.validate().map(|_| c));
            match checked {
                Ok(config) => {
                    print_value(
                        &ValidateReport {
                            status: "ok",
                            schema_version: config.schema_version,
                        },
                        cli.format,
                    );
                    ExitCode::Clean
                }
                Err(e) => report_error(ExitCode::from(&e), e),
            }
        }
        ConfigCommands::Validate { path: None } => match load_config(cli) {
            Ok(resolved) => {
                print_value(
                    &ValidateReport {
                        status: "ok",
                        schema_version: resolved.config.schema_version,
                    },
                    cli.format,
                );
                ExitCode::Clean
            }
            Err(code) => code,
        },
    }
}
