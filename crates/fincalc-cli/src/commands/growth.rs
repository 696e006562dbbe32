use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::growth::compound::{self, GrowthParameters};

use super::ExportArgs;
use crate::input;

/// Arguments for a compound growth projection
#[derive(Args)]
pub struct GrowthArgs {
    /// Initial investment amount
    #[arg(allow_negative_numbers = true)]
    pub principal: Option<Decimal>,

    /// Annual interest rate as a decimal (e.g. 0.07 for 7%)
    #[arg(allow_negative_numbers = true)]
    pub rate: Option<Decimal>,

    /// Investment period in years
    #[arg(allow_negative_numbers = true)]
    pub years: Option<i32>,

    /// Compounding periods per year
    #[arg(long, default_value_t = 12, allow_negative_numbers = true)]
    pub frequency: i32,

    /// Monthly contribution amount
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub monthly: Decimal,

    /// Annual inflation rate as a decimal
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub inflation: Decimal,

    /// Path to JSON input file (overrides positional arguments)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub export: ExportArgs,
}

fn resolve(args: &GrowthArgs) -> Result<GrowthParameters, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_json(path);
    }
    if let (Some(principal), Some(annual_rate), Some(years)) =
        (args.principal, args.rate, args.years)
    {
        return Ok(GrowthParameters {
            principal,
            annual_rate,
            years,
            compounding_frequency: args.frequency,
            monthly_contribution: args.monthly,
            inflation_rate: args.inflation,
        });
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }
    Err("<PRINCIPAL> <RATE> <YEARS> are required (or provide --input)".into())
}

pub fn run_growth(args: GrowthArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = resolve(&args)?;
    let output = compound::compute_growth(&params)?;
    args.export.write(&output)?;
    Ok(serde_json::to_value(output)?)
}
