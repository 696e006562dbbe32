use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::lending::eligibility::{self, EligibilityGrid, EligibilityParameters};

use super::ExportArgs;
use crate::input;

/// Arguments for loan eligibility sizing
#[derive(Args)]
pub struct EligibilityArgs {
    /// Gross monthly income
    #[arg(allow_negative_numbers = true)]
    pub monthly_income: Option<Decimal>,

    /// Existing monthly EMI obligations
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub obligations: Decimal,

    /// Share of income available for EMIs as a decimal (e.g. 0.5)
    #[arg(long, default_value = "0.5", allow_negative_numbers = true)]
    pub max_emi_pct: Decimal,

    /// Candidate annual rates, comma separated (e.g. 0.08,0.1)
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub rates: Vec<Decimal>,

    /// Candidate tenures in years, comma separated (e.g. 5,10,20)
    #[arg(long, value_delimiter = ',')]
    pub tenures: Vec<u32>,

    /// Path to JSON input file (overrides positional arguments)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub export: ExportArgs,
}

fn grid(args: &EligibilityArgs) -> EligibilityGrid {
    let default = EligibilityGrid::default();
    EligibilityGrid {
        rates: if args.rates.is_empty() {
            default.rates
        } else {
            args.rates.clone()
        },
        tenures: if args.tenures.is_empty() {
            default.tenures
        } else {
            args.tenures.clone()
        },
    }
}

fn resolve(args: &EligibilityArgs) -> Result<EligibilityParameters, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_json(path);
    }
    if let Some(monthly_income) = args.monthly_income {
        return Ok(EligibilityParameters {
            monthly_income,
            existing_obligations: args.obligations,
            max_emi_percentage: args.max_emi_pct,
            grid: grid(args),
        });
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }
    Err("<MONTHLY_INCOME> is required (or provide --input)".into())
}

pub fn run_eligibility(args: EligibilityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = resolve(&args)?;
    let output = eligibility::compute_eligibility(&params)?;
    args.export.write(&output)?;
    Ok(serde_json::to_value(output)?)
}
