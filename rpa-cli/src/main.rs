use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{debug, info};

use rpa_cli::batch;
use rpa_cli::config::Config;
use rpa_cli::logging::init_logging;
use rpa_cli::output::{self, OutputFormat};
use rpa_cli::utils::parse_amount;
use rpa_core::{InversionRequest, TaxEngine, TaxInput};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Withholding calculator for independent-contractor payments (RPA).
///
/// Computes INSS, IRRF and ISS for a gross payment, or finds the gross
/// payment that leaves a desired net amount.
#[derive(Debug, Parser)]
#[command(name = "rpa", version, about)]
struct Cli {
    /// TOML settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter (e.g. `debug` or `rpa_core=trace`). `RUST_LOG` wins.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Output format for results.
    #[arg(long, value_enum, default_value_t, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Withholdings and net amount for a gross payment.
    Summary {
        /// Gross amount, e.g. `5000` or `5,000.00`.
        #[arg(value_parser = parse_amount)]
        gross: Decimal,

        #[command(flatten)]
        payment: PaymentArgs,
    },

    /// Gross payment needed for a target net amount.
    Solve {
        /// Desired net amount.
        #[arg(value_parser = parse_amount)]
        net: Decimal,

        #[command(flatten)]
        payment: PaymentArgs,

        /// Accepted distance from the target; overrides the config file.
        #[arg(long, value_parser = parse_amount)]
        tolerance: Option<Decimal>,

        /// Iteration budget; overrides the config file.
        #[arg(long)]
        max_iterations: Option<u32>,
    },

    /// Computes every row of a CSV file and prints totals.
    Batch {
        /// Input CSV (`gross_amount,dependents[,service_tax_rate,include_service_tax]`).
        file: PathBuf,

        /// Write the per-row CSV here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Prints the rate schedule in use.
    Rates,
}

#[derive(Debug, Args)]
struct PaymentArgs {
    /// Declared dependents (0-20).
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    dependents: i32,

    /// Municipal service tax rate in percent.
    #[arg(short = 'r', long, default_value = "5", value_parser = parse_amount)]
    service_tax_rate: Decimal,

    /// The payment is not subject to service tax.
    #[arg(long)]
    no_service_tax: bool,
}

// ─── commands ────────────────────────────────────────────────────────────────

fn run_summary(
    engine: &TaxEngine,
    gross: Decimal,
    payment: &PaymentArgs,
    format: OutputFormat,
) -> Result<()> {
    let input = TaxInput::new(
        gross,
        payment.dependents,
        payment.service_tax_rate,
        !payment.no_service_tax,
    )?;
    let summary = engine.compute_summary(&input)?;
    print!("{}", output::render_summary(&summary, format)?);
    Ok(())
}

fn run_solve(
    engine: &TaxEngine,
    config: &Config,
    net: Decimal,
    payment: &PaymentArgs,
    tolerance: Option<Decimal>,
    max_iterations: Option<u32>,
    format: OutputFormat,
) -> Result<()> {
    let request = InversionRequest::new(
        net,
        payment.dependents,
        payment.service_tax_rate,
        !payment.no_service_tax,
    )?
    .with_tolerance(tolerance.unwrap_or(config.solver.tolerance))?
    .with_max_iterations(max_iterations.unwrap_or(config.solver.max_iterations))?;

    let result = engine.solve_gross_from_net(&request)?;
    print!("{}", output::render_inversion(&result, format)?);
    Ok(())
}

fn run_batch(
    engine: &TaxEngine,
    file: &Path,
    output_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let inputs = batch::load_from_file(file)
        .with_context(|| format!("Failed to load batch: {}", file.display()))?;
    let report = batch::compute(engine, &inputs)?;

    if let Some(path) = output_path {
        let out = File::create(path)
            .with_context(|| format!("Failed to create: {}", path.display()))?;
        batch::write_records(out, &report.records)
            .with_context(|| format!("Failed to write: {}", path.display()))?;
        info!(path = %path.display(), rows = report.records.len(), "batch results written");
    }

    match (format, output_path) {
        (OutputFormat::Json, _) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        (OutputFormat::Text, Some(_)) => {
            print!("{}", output::render_totals(&report.totals, format)?);
        }
        (OutputFormat::Text, None) => {
            batch::write_records(io::stdout().lock(), &report.records)
                .context("Failed to write results")?;
            // stdout carries only the CSV.
            eprint!("{}", output::render_totals(&report.totals, format)?);
        }
    }
    Ok(())
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    init_logging(cli.log_level.as_deref(), config.log_level.as_deref())?;
    debug!(?config, "configuration loaded");

    let engine = TaxEngine::with_cache_capacity(config.engine.cache_capacity);

    match &cli.command {
        Command::Summary { gross, payment } => run_summary(&engine, *gross, payment, cli.format),
        Command::Solve {
            net,
            payment,
            tolerance,
            max_iterations,
        } => run_solve(
            &engine,
            &config,
            *net,
            payment,
            *tolerance,
            *max_iterations,
            cli.format,
        ),
        Command::Batch { file, output } => run_batch(&engine, file, output.as_deref(), cli.format),
        Command::Rates => {
            print!(
                "{}",
                output::render_schedule(engine.schedule(), cli.format)?
            );
            Ok(())
        }
    }?;

    io::stdout().flush().context("Failed to flush stdout")?;
    Ok(())
}
