use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::export::SipMonthlyBreakdown;
use fincalc_core::growth::sip::{self, SipParameters};

use super::ExportArgs;
use crate::input;

/// Which breakdown `--export-csv` writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Breakdown {
    Yearly,
    Monthly,
}

/// Arguments for a systematic investment plan
#[derive(Args)]
pub struct SipArgs {
    /// Monthly instalment
    #[arg(allow_negative_numbers = true)]
    pub monthly_investment: Option<Decimal>,

    /// Expected annual return as a decimal (e.g. 0.12 for 12%)
    #[arg(allow_negative_numbers = true)]
    pub rate: Option<Decimal>,

    /// Investment period in years
    #[arg(allow_negative_numbers = true)]
    pub years: Option<i32>,

    /// One-time initial investment
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub initial: Decimal,

    /// Annual step-up of the instalment as a decimal (e.g. 0.10)
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub step_up: Decimal,

    /// Annual inflation rate as a decimal
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub inflation: Decimal,

    /// Path to JSON input file (overrides positional arguments)
    #[arg(long)]
    pub input: Option<String>,

    /// Breakdown written by --export-csv
    #[arg(long, value_enum, default_value_t = Breakdown::Yearly)]
    pub breakdown: Breakdown,

    #[command(flatten)]
    pub export: ExportArgs,
}

fn resolve(args: &SipArgs) -> Result<SipParameters, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_json(path);
    }
    if let (Some(monthly_investment), Some(annual_return_rate), Some(years)) =
        (args.monthly_investment, args.rate, args.years)
    {
        return Ok(SipParameters {
            monthly_investment,
            annual_return_rate,
            years,
            initial_investment: args.initial,
            step_up_rate: args.step_up,
            inflation_rate: args.inflation,
        });
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }
    Err("<MONTHLY_INVESTMENT> <RATE> <YEARS> are required (or provide --input)".into())
}

pub fn run_sip(args: SipArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = resolve(&args)?;
    let output = sip::compute_sip(&params)?;
    args.export.write_json(&output)?;
    match args.breakdown {
        Breakdown::Yearly => args.export.write_csv(&output.result)?,
        Breakdown::Monthly => args.export.write_csv(&SipMonthlyBreakdown(&output.result))?,
    }
    Ok(serde_json::to_value(output)?)
}
