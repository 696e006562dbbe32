use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::lending::emi::{self, LoanParameters};

use super::ExportArgs;
use crate::input;

/// Arguments for an EMI calculation
#[derive(Args)]
pub struct LoanArgs {
    /// Loan amount
    #[arg(allow_negative_numbers = true)]
    pub principal: Option<Decimal>,

    /// Annual interest rate as a decimal (e.g. 0.12 for 12%)
    #[arg(allow_negative_numbers = true)]
    pub rate: Option<Decimal>,

    /// Loan tenure in years
    #[arg(allow_negative_numbers = true)]
    pub years: Option<i32>,

    /// Additional months of tenure
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub months: i32,

    /// Path to JSON input file (overrides positional arguments)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub export: ExportArgs,
}

fn resolve(args: &LoanArgs) -> Result<LoanParameters, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_json(path);
    }
    if let (Some(principal), Some(annual_rate), Some(tenure_years)) =
        (args.principal, args.rate, args.years)
    {
        return Ok(LoanParameters {
            principal,
            annual_rate,
            tenure_years,
            tenure_months: args.months,
        });
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }
    Err("<PRINCIPAL> <RATE> <YEARS> are required (or provide --input)".into())
}

pub fn run_loan(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = resolve(&args)?;
    let output = emi::compute_emi(&params)?;
    args.export.write(&output)?;
    Ok(serde_json::to_value(output)?)
}
