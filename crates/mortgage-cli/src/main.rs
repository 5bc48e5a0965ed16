mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::prelude::*;

use commands::arm::ArmArgs;
use commands::borrower::{AffordabilityArgs, RefinanceArgs};
use commands::housing::{PropertyTaxArgs, RentVsBuyArgs};
use commands::loan::{PaymentArgs, ScheduleArgs};

/// Residential mortgage calculations
#[derive(Parser)]
#[command(
    name = "mtg",
    version,
    about = "Residential mortgage calculations",
    long_about = "A CLI for residential mortgage calculations with decimal precision. \
                  Supports monthly payments, amortization schedules, affordability, \
                  refinance break-even, ARM worst cases, property tax and rent vs buy."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Market defaults file (TOML, YAML or JSON)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Full monthly payment (P&I, tax, insurance, PMI, HOA)
    Payment(PaymentArgs),
    /// Month-by-month amortization schedule
    Schedule(ScheduleArgs),
    /// Maximum affordable home price from income and debts
    Affordability(AffordabilityArgs),
    /// Refinance savings and break-even
    Refinance(RefinanceArgs),
    /// Worst-case adjustable-rate projection
    Arm(ArmArgs),
    /// Property tax with homeowner exemptions
    PropertyTax(PropertyTaxArgs),
    /// Multi-year rent vs buy comparison
    RentVsBuy(RentVsBuyArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<Option<serde_json::Value>, Box<dyn std::error::Error>> {
    let defaults = input::config::load_defaults(cli.config.as_deref())?;

    let value = match cli.command {
        Commands::Payment(args) => commands::loan::run_payment(args, &defaults)?,
        Commands::Schedule(args) => commands::loan::run_schedule(args)?,
        Commands::Affordability(args) => commands::borrower::run_affordability(args, &defaults)?,
        Commands::Refinance(args) => commands::borrower::run_refinance(args)?,
        Commands::Arm(args) => commands::arm::run_arm(args)?,
        Commands::PropertyTax(args) => commands::housing::run_property_tax(args, &defaults)?,
        Commands::RentVsBuy(args) => commands::housing::run_rent_vs_buy(args, &defaults)?,
        Commands::Version => {
            println!("mtg {}", env!("CARGO_PKG_VERSION"));
            return Ok(None);
        }
    };
    Ok(Some(value))
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let format = cli.output.clone();
    match run(cli) {
        Ok(Some(value)) => {
            output::format_output(&format, &value);
            process::exit(0);
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
