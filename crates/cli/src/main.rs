//! mswyw: Microservice Worth Your Weight
//!
//! Scores a set of microservices by weighing what they cost (memory, CPU,
//! errors) against what they deliver (apdex, traffic, endpoints).

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::Parser;
use mswyw_lib::{RunRequest, DEFAULT_COEFFICIENTS, KIBANA_PROVIDER};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::{LogFormat, Settings};

/// Status reported for any failed run (`-1` as an unsigned byte)
const PROBLEM_EXIT_CODE: u8 = 255;

/// Microservice Worth Your Weight
#[derive(Parser)]
#[command(name = "mswyw")]
#[command(author, version, about = "Microservice worth-your-weight score", long_about = None)]
pub struct Cli {
    /// Code info descriptor (file, URL, JSON literal or provider name)
    #[arg(long = "codeInfoProvider", env = "MSWYW_CODE_INFO_PROVIDER")]
    pub code_info_provider: String,

    /// Provider params descriptor, passed to the runtime and code info providers
    #[arg(long = "providerParams", env = "MSWYW_PROVIDER_PARAMS", default_value = "{}")]
    pub provider_params: String,

    /// Runtime metrics descriptor
    #[arg(long = "runtimeProvider", env = "MSWYW_RUNTIME_PROVIDER", default_value = KIBANA_PROVIDER)]
    pub runtime_provider: String,

    /// Coefficient table descriptor
    #[arg(long, env = "MSWYW_COEFFICIENTS", default_value = DEFAULT_COEFFICIENTS)]
    pub coefficients: String,

    /// Metric overrides descriptor, e.g. '{"apdex": 1}'
    #[arg(long, env = "MSWYW_OVERRIDES", default_value = "{}")]
    pub overrides: String,

    /// Value used for metrics a record leaves out
    #[arg(long = "defaultMetricValue", env = "MSWYW_DEFAULT_METRIC_VALUE", default_value_t = 0.0)]
    pub default_metric_value: f64,

    /// Output format (defaults to the configured one, else table)
    #[arg(long, short, env = "MSWYW_FORMAT")]
    pub format: Option<output::OutputFormat>,

    /// Write run metrics in Prometheus text format to this file
    #[arg(long, env = "MSWYW_METRICS_FILE")]
    pub metrics_file: Option<PathBuf>,

    /// Config file (defaults to ~/.config/mswyw/config.json)
    #[arg(long, env = "MSWYW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    fn run_request(&self) -> RunRequest {
        RunRequest {
            code_info_provider: self.code_info_provider.clone(),
            provider_params: self.provider_params.clone(),
            runtime_provider: self.runtime_provider.clone(),
            coefficients: self.coefficients.clone(),
            overrides: self.overrides.clone(),
            default_metric_value: self.default_metric_value,
        }
    }
}

fn init_tracing(verbose: bool, log_format: LogFormat) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let registry = tracing_subscriber::registry().with(filter);

    match log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    init_tracing(cli.verbose, settings.log_format);

    let format = cli.format.unwrap_or(settings.default_format);
    commands::score::run_score(
        cli.run_request(),
        &settings,
        cli.metrics_file.as_deref(),
        format,
    )
    .await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_problem(&e);
            ExitCode::from(PROBLEM_EXIT_CODE)
        }
    }
}
