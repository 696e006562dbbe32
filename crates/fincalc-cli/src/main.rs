mod commands;
mod input;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::batch::BatchArgs;
use commands::eligibility::EligibilityArgs;
use commands::growth::GrowthArgs;
use commands::loan::LoanArgs;
use commands::sip::SipArgs;

/// Compound growth, loan EMI and loan eligibility calculations
#[derive(Parser)]
#[command(
    name = "fincalc",
    version,
    about = "Compound growth, loan EMI and loan eligibility calculations",
    long_about = "A CLI for investment growth and loan calculations with decimal \
                  precision. Projects compound growth with contributions and \
                  inflation, builds EMI amortization schedules, sizes eligible \
                  loans from income, and runs SIP and batch scenario sweeps."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (defaults to table, or json for batch)
    #[arg(long, global = true)]
    output: Option<OutputFormat>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Project compound growth with monthly contributions and inflation
    Growth(GrowthArgs),
    /// Calculate a loan EMI and its amortization schedule
    Loan(LoanArgs),
    /// Size the largest serviceable loan across rate/tenure scenarios
    Eligibility(EligibilityArgs),
    /// Simulate a systematic investment plan with annual step-up
    Sip(SipArgs),
    /// Evaluate many parameter sets in parallel from a JSON file
    Batch(BatchArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
    Yaml,
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let default_format = match cli.command {
        Commands::Batch(_) => OutputFormat::Json,
        _ => OutputFormat::Table,
    };
    let format = cli.output.unwrap_or(default_format);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Growth(args) => commands::growth::run_growth(args),
        Commands::Loan(args) => commands::loan::run_loan(args),
        Commands::Eligibility(args) => commands::eligibility::run_eligibility(args),
        Commands::Sip(args) => commands::sip::run_sip(args),
        Commands::Batch(args) => commands::batch::run_batch(args),
        Commands::Version => {
            println!("fincalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&format, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
