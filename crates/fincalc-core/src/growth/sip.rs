use log::debug;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::time_value::{checked_scale, checked_sum, compound};
use crate::types::{with_metadata, ComputationOutput, Money, Rate, MAX_YEARS, MONTHS_PER_YEAR};
use crate::FinCalcResult;

/// Input parameters for a systematic investment plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SipParameters {
    pub monthly_investment: Money,
    pub annual_return_rate: Rate,
    pub years: i32,
    /// One-time amount invested before the first instalment.
    #[serde(default)]
    pub initial_investment: Money,
    /// Annual increase applied to the monthly instalment after each year.
    #[serde(default)]
    pub step_up_rate: Rate,
    #[serde(default)]
    pub inflation_rate: Rate,
}

impl SipParameters {
    pub fn new(monthly_investment: Money, annual_return_rate: Rate, years: i32) -> Self {
        Self {
            monthly_investment,
            annual_return_rate,
            years,
            initial_investment: Decimal::ZERO,
            step_up_rate: Decimal::ZERO,
            inflation_rate: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SipResult {
    pub total_invested: Money,
    pub final_value: Money,
    pub total_returns: Money,
    pub total_return_percentage: Decimal,
    /// Compound annual growth of the portfolio over the amount invested.
    pub average_annual_return: Rate,
    pub final_monthly_investment: Money,
    pub inflation_adjusted_value: Money,
    pub yearly_breakdown: Vec<SipYear>,
    pub monthly_breakdown: Vec<SipMonth>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SipYear {
    pub year: u32,
    pub yearly_investment: Money,
    pub cumulative_investment: Money,
    pub portfolio_value: Money,
    pub yearly_return: Money,
    pub yearly_return_percentage: Decimal,
}

/// Portfolio state after one month's instalment and return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SipMonth {
    pub year: u32,
    /// Month within the year, 1-12.
    pub month: u32,
    pub investment: Money,
    pub total_invested: Money,
    pub portfolio_value: Money,
}

fn validate(params: &SipParameters) -> FinCalcResult<u32> {
    let non_negative = [
        ("monthly_investment", params.monthly_investment),
        ("annual_return_rate", params.annual_return_rate),
        ("initial_investment", params.initial_investment),
        ("step_up_rate", params.step_up_rate),
        ("inflation_rate", params.inflation_rate),
    ];
    for (field, value) in non_negative {
        if value < Decimal::ZERO {
            return Err(FinCalcError::invalid(field, format!("{field} must be >= 0")));
        }
    }
    if params.years <= 0 {
        return Err(FinCalcError::invalid("years", "years must be > 0"));
    }
    if params.years as u32 > MAX_YEARS {
        return Err(FinCalcError::invalid(
            "years",
            format!("years must be <= {MAX_YEARS}"),
        ));
    }
    Ok(params.years as u32)
}

/// Simulate a monthly investment plan: each month the instalment is added and
/// the portfolio then grows by one month of return. The instalment steps up
/// once per year.
pub fn compute_sip(params: &SipParameters) -> FinCalcResult<ComputationOutput<SipResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let years = validate(params)?;
    debug!(
        "compute_sip: monthly={} rate={} years={} step_up={}",
        params.monthly_investment, params.annual_return_rate, years, params.step_up_rate
    );

    let monthly_step = Decimal::ONE + params.annual_return_rate / Decimal::from(MONTHS_PER_YEAR);
    let step_up = Decimal::ONE + params.step_up_rate;

    let mut value = params.initial_investment;
    let mut total_invested = params.initial_investment;
    let mut instalment = params.monthly_investment;
    let mut yearly_breakdown = Vec::with_capacity(years as usize);
    let mut monthly_breakdown = Vec::with_capacity((years * MONTHS_PER_YEAR) as usize);

    for year in 1..=years {
        let year_start_value = value;
        let mut yearly_investment = Decimal::ZERO;

        for month in 1..=MONTHS_PER_YEAR {
            value = checked_sum(value, instalment, "SIP portfolio value")?;
            total_invested = checked_sum(total_invested, instalment, "SIP total invested")?;
            yearly_investment = checked_sum(yearly_investment, instalment, "SIP yearly investment")?;
            value = checked_scale(value, monthly_step, "SIP portfolio value")?;

            monthly_breakdown.push(SipMonth {
                year,
                month,
                investment: instalment,
                total_invested,
                portfolio_value: value,
            });
        }

        let yearly_return = value - year_start_value - yearly_investment;
        let yearly_return_percentage = if year_start_value > Decimal::ZERO {
            yearly_return / year_start_value * dec!(100)
        } else {
            Decimal::ZERO
        };

        yearly_breakdown.push(SipYear {
            year,
            yearly_investment,
            cumulative_investment: total_invested,
            portfolio_value: value,
            yearly_return,
            yearly_return_percentage,
        });

        if params.step_up_rate > Decimal::ZERO {
            instalment = checked_scale(instalment, step_up, "stepped-up instalment")?;
        }
    }

    let total_returns = value - total_invested;
    let (total_return_percentage, average_annual_return) = if total_invested > Decimal::ZERO {
        let growth_multiple = value / total_invested;
        let exponent = Decimal::ONE / Decimal::from(years);
        let annualised = growth_multiple
            .checked_powd(exponent)
            .ok_or_else(|| FinCalcError::Overflow {
                context: "SIP average annual return".into(),
            })?;
        (
            total_returns / total_invested * dec!(100),
            annualised - Decimal::ONE,
        )
    } else {
        warnings.push("Nothing was invested; return figures are zero".into());
        (Decimal::ZERO, Decimal::ZERO)
    };

    let inflation_adjusted_value = if params.inflation_rate > Decimal::ZERO {
        value / compound(params.inflation_rate, years)?
    } else {
        value
    };

    let output = SipResult {
        total_invested,
        final_value: value,
        total_returns,
        total_return_percentage,
        average_annual_return,
        final_monthly_investment: instalment,
        inflation_adjusted_value,
        yearly_breakdown,
        monthly_breakdown,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "SIP: monthly instalment credited then compounded at annual_rate/12, stepped up yearly",
        params,
        warnings,
        elapsed,
        output,
    ))
}
