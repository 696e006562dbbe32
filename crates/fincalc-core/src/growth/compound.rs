use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::time_value::{annuity_fv_factor, checked_scale, checked_sum, compound};
use crate::types::{
    with_metadata, ComputationOutput, Money, Rate, MAX_COMPOUNDING_FREQUENCY, MAX_YEARS,
    MONTHS_PER_YEAR,
};
use crate::FinCalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

fn default_compounding_frequency() -> i32 {
    12
}

/// Input parameters for a compound growth projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthParameters {
    pub principal: Money,
    pub annual_rate: Rate,
    pub years: i32,
    /// Compounding periods per year.
    #[serde(default = "default_compounding_frequency")]
    pub compounding_frequency: i32,
    #[serde(default)]
    pub monthly_contribution: Money,
    #[serde(default)]
    pub inflation_rate: Rate,
}

impl GrowthParameters {
    /// Monthly compounding, no contributions, no inflation.
    pub fn new(principal: Money, annual_rate: Rate, years: i32) -> Self {
        Self {
            principal,
            annual_rate,
            years,
            compounding_frequency: default_compounding_frequency(),
            monthly_contribution: Decimal::ZERO,
            inflation_rate: Decimal::ZERO,
        }
    }
}

/// Output of `compute_growth`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthResult {
    pub future_value: Money,
    pub total_contributions: Money,
    pub total_interest_earned: Money,
    pub effective_annual_rate: Rate,
    pub inflation_adjusted_value: Money,
    pub real_return: Money,
    pub yearly_breakdown: Vec<YearlyGrowthEntry>,
}

/// A single year of the growth breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyGrowthEntry {
    pub year: u32,
    pub starting_balance: Money,
    pub contributions: Money,
    pub interest_earned: Money,
    pub ending_balance: Money,
    pub inflation_adjusted_value: Money,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Returns the validated (years, compounding frequency).
fn validate(params: &GrowthParameters) -> FinCalcResult<(u32, u32)> {
    if params.principal < Decimal::ZERO {
        return Err(FinCalcError::invalid("principal", "principal must be >= 0"));
    }
    if params.annual_rate < Decimal::ZERO {
        return Err(FinCalcError::invalid("annual_rate", "annual_rate must be >= 0"));
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
    if params.compounding_frequency <= 0 {
        return Err(FinCalcError::invalid(
            "compounding_frequency",
            "compounding_frequency must be > 0",
        ));
    }
    if params.compounding_frequency as u32 > MAX_COMPOUNDING_FREQUENCY {
        return Err(FinCalcError::invalid(
            "compounding_frequency",
            format!("compounding_frequency must be <= {MAX_COMPOUNDING_FREQUENCY}"),
        ));
    }
    if params.monthly_contribution < Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "monthly_contribution",
            "monthly_contribution must be >= 0",
        ));
    }
    if params.inflation_rate < Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "inflation_rate",
            "inflation_rate must be >= 0",
        ));
    }
    Ok((params.years as u32, params.compounding_frequency as u32))
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Project the future value of a principal plus monthly contributions,
/// compounded `compounding_frequency` times per year, with an optional
/// inflation deflator and a year-by-year breakdown.
pub fn compute_growth(
    params: &GrowthParameters,
) -> FinCalcResult<ComputationOutput<GrowthResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let (years, frequency) = validate(params)?;

    debug!(
        "compute_growth: principal={} rate={} years={} frequency={}",
        params.principal, params.annual_rate, years, frequency
    );

    let periodic_rate = params.annual_rate / Decimal::from(frequency);
    let total_periods = years
        .checked_mul(frequency)
        .ok_or_else(|| FinCalcError::Overflow {
            context: "total compounding periods".into(),
        })?;

    // --- Lump sum plus ordinary annuity ---
    let growth_factor = compound(periodic_rate, total_periods)?;
    let mut future_value = checked_scale(params.principal, growth_factor, "future value")?;

    let has_contributions = params.monthly_contribution > Decimal::ZERO;
    if has_contributions {
        // Contributions ride the compounding-period rate, not a monthly rate
        let annuity = annuity_fv_factor(periodic_rate, total_periods)?;
        let annuity_value = checked_scale(params.monthly_contribution, annuity, "annuity value")?;
        future_value = checked_sum(future_value, annuity_value, "future value")?;

        if frequency != MONTHS_PER_YEAR {
            warnings.push(format!(
                "Monthly contributions compound at the {frequency}-per-year periodic rate"
            ));
        }
        warnings.push(
            "Yearly breakdown credits each year's contributions before compounding; \
             its final balance differs from the annuity-based future value"
                .into(),
        );
    }

    let contributed = checked_scale(
        params.monthly_contribution,
        Decimal::from(MONTHS_PER_YEAR * years),
        "total contributions",
    )?;
    let total_contributions = checked_sum(params.principal, contributed, "total contributions")?;
    let total_interest_earned = future_value - total_contributions;

    let (inflation_adjusted_value, real_return) = if params.inflation_rate > Decimal::ZERO {
        let deflator = compound(params.inflation_rate, years)?;
        let adjusted = future_value / deflator;
        (adjusted, adjusted - total_contributions)
    } else {
        (future_value, total_interest_earned)
    };

    let effective_annual_rate = compound(periodic_rate, frequency)? - Decimal::ONE;

    let yearly_breakdown = yearly_breakdown(params, years, frequency, periodic_rate)?;

    let output = GrowthResult {
        future_value,
        total_contributions,
        total_interest_earned,
        effective_annual_rate,
        inflation_adjusted_value,
        real_return,
        yearly_breakdown,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Compound growth: FV = P(1+r/f)^(nf) + PMT((1+r/f)^(nf)-1)/(r/f)",
        params,
        warnings,
        elapsed,
        output,
    ))
}

/// Year-by-year balance roll-forward. Each year's contributions are credited
/// up front, then `compounding_frequency` compounding passes are applied.
fn yearly_breakdown(
    params: &GrowthParameters,
    years: u32,
    frequency: u32,
    periodic_rate: Rate,
) -> FinCalcResult<Vec<YearlyGrowthEntry>> {
    let step = Decimal::ONE + periodic_rate;
    let yearly_contribution = checked_scale(
        params.monthly_contribution,
        Decimal::from(MONTHS_PER_YEAR),
        "yearly contribution",
    )?;
    let inflation_step = Decimal::ONE + params.inflation_rate;

    let mut breakdown = Vec::with_capacity(years as usize);
    let mut balance = params.principal;
    let mut deflator = Decimal::ONE;

    for year in 1..=years {
        let starting_balance = balance;
        balance = checked_sum(balance, yearly_contribution, "yearly breakdown balance")?;
        for _ in 0..frequency {
            balance = checked_scale(balance, step, "yearly breakdown balance")?;
        }

        let inflation_adjusted_value = if params.inflation_rate > Decimal::ZERO {
            deflator = checked_scale(deflator, inflation_step, "inflation deflator")?;
            balance / deflator
        } else {
            balance
        };

        breakdown.push(YearlyGrowthEntry {
            year,
            starting_balance,
            contributions: yearly_contribution,
            interest_earned: balance - starting_balance - yearly_contribution,
            ending_balance: balance,
            inflation_adjusted_value,
        });
    }

    Ok(breakdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal_macros::dec;

    fn run(params: &GrowthParameters) -> GrowthResult {
        compute_growth(params).unwrap().result
    }

    #[test]
    fn test_lump_sum_monthly_compounding() {
        let result = run(&GrowthParameters::new(dec!(1000), dec!(0.05), 10));

        // 1000 * (1 + 0.05/12)^120 ≈ 1647.01
        assert!((result.future_value - dec!(1647.01)).abs() < dec!(0.01));
        assert_eq!(result.total_contributions, dec!(1000));
        assert_eq!(
            result.total_interest_earned,
            result.future_value - dec!(1000)
        );
    }

    #[test]
    fn test_lump_sum_matches_float_closed_form() {
        let params = GrowthParameters {
            compounding_frequency: 4,
            ..GrowthParameters::new(dec!(2500), dec!(0.065), 7)
        };
        let result = run(&params);

        let expected = 2500.0_f64 * (1.0 + 0.065 / 4.0_f64).powi(28);
        let actual = result.future_value.to_f64().unwrap();
        assert!((actual - expected).abs() < 1e-6, "actual={actual} expected={expected}");
    }

    #[test]
    fn test_monthly_contributions_totals() {
        let params = GrowthParameters {
            monthly_contribution: dec!(100),
            ..GrowthParameters::new(dec!(1000), dec!(0.06), 5)
        };
        let result = run(&params);

        assert_eq!(result.total_contributions, dec!(7000));
        assert!(result.future_value > dec!(7000));
        assert!(result.total_interest_earned > Decimal::ZERO);
    }

    #[test]
    fn test_zero_rate_returns_principal() {
        let result = run(&GrowthParameters::new(dec!(1000), Decimal::ZERO, 5));

        assert_eq!(result.future_value, dec!(1000));
        assert_eq!(result.total_interest_earned, Decimal::ZERO);
        assert_eq!(result.effective_annual_rate, Decimal::ZERO);
    }

    #[test]
    fn test_zero_rate_with_contributions_uses_annuity_limit() {
        let params = GrowthParameters {
            monthly_contribution: dec!(50),
            ..GrowthParameters::new(dec!(1000), Decimal::ZERO, 2)
        };
        let result = run(&params);

        // 1000 + 50 * 24 periods
        assert_eq!(result.future_value, dec!(2200));
        assert_eq!(result.total_interest_earned, Decimal::ZERO);
    }

    #[test]
    fn test_effective_annual_rate_monthly() {
        let result = run(&GrowthParameters::new(dec!(1000), dec!(0.06), 1));

        // (1 + 0.06/12)^12 - 1 ≈ 0.0616778
        assert!(result.effective_annual_rate > dec!(0.06));
        assert!((result.effective_annual_rate - dec!(0.0616778)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_inflation_adjustment() {
        let params = GrowthParameters {
            inflation_rate: dec!(0.03),
            ..GrowthParameters::new(dec!(10_000), dec!(0.07), 10)
        };
        let result = run(&params);

        assert!(result.inflation_adjusted_value < result.future_value);
        assert_eq!(
            result.real_return,
            result.inflation_adjusted_value - result.total_contributions
        );
        let last = result.yearly_breakdown.last().unwrap();
        assert!(last.inflation_adjusted_value < last.ending_balance);
    }

    #[test]
    fn test_no_inflation_real_return_is_nominal() {
        let result = run(&GrowthParameters::new(dec!(10_000), dec!(0.07), 10));
        assert_eq!(result.inflation_adjusted_value, result.future_value);
        assert_eq!(result.real_return, result.total_interest_earned);
    }

    #[test]
    fn test_yearly_breakdown_contributions_before_compounding() {
        let params = GrowthParameters {
            monthly_contribution: dec!(50),
            ..GrowthParameters::new(dec!(5000), dec!(0.08), 3)
        };
        let result = run(&params);
        let breakdown = &result.yearly_breakdown;

        assert_eq!(breakdown.len(), 3);
        let year1 = &breakdown[0];
        assert_eq!(year1.year, 1);
        assert_eq!(year1.starting_balance, dec!(5000));
        assert_eq!(year1.contributions, dec!(600));

        // (5000 + 600) compounded 12 times
        let expected_end = dec!(5600) * compound(dec!(0.08) / dec!(12), 12).unwrap();
        assert!((year1.ending_balance - expected_end).abs() < dec!(0.0000001));
        assert_eq!(
            year1.ending_balance,
            year1.starting_balance + year1.contributions + year1.interest_earned
        );
    }

    #[test]
    fn test_balance_continuity() {
        let params = GrowthParameters {
            compounding_frequency: 365,
            monthly_contribution: dec!(250),
            inflation_rate: dec!(0.02),
            ..GrowthParameters::new(dec!(12_345.67), dec!(0.0725), 15)
        };
        let result = run(&params);

        for pair in result.yearly_breakdown.windows(2) {
            assert_eq!(pair[1].starting_balance, pair[0].ending_balance);
        }
    }

    #[test]
    fn test_single_year_one_pass() {
        let params = GrowthParameters {
            compounding_frequency: 4,
            ..GrowthParameters::new(dec!(1000), dec!(0.08), 1)
        };
        let result = run(&params);

        assert_eq!(result.yearly_breakdown.len(), 1);
        assert_eq!(result.yearly_breakdown[0].ending_balance, result.future_value);
    }

    #[test]
    fn test_contribution_warnings() {
        let params = GrowthParameters {
            compounding_frequency: 4,
            monthly_contribution: dec!(10),
            ..GrowthParameters::new(dec!(1000), dec!(0.05), 2)
        };
        let output = compute_growth(&params).unwrap();
        assert_eq!(output.warnings.len(), 2);

        let quiet = compute_growth(&GrowthParameters::new(dec!(1000), dec!(0.05), 2)).unwrap();
        assert!(quiet.warnings.is_empty());
    }

    #[test]
    fn test_invalid_inputs() {
        let cases = [
            ("principal", GrowthParameters::new(dec!(-1), dec!(0.05), 10)),
            ("annual_rate", GrowthParameters::new(dec!(1000), dec!(-0.05), 10)),
            ("years", GrowthParameters::new(dec!(1000), dec!(0.05), 0)),
            ("years", GrowthParameters::new(dec!(1000), dec!(0.05), -3)),
            ("years", GrowthParameters::new(dec!(1000), Decimal::ZERO, 300_000_000)),
            (
                "compounding_frequency",
                GrowthParameters {
                    compounding_frequency: 0,
                    ..GrowthParameters::new(dec!(1000), dec!(0.05), 10)
                },
            ),
            (
                "compounding_frequency",
                GrowthParameters {
                    compounding_frequency: -4,
                    ..GrowthParameters::new(dec!(1000), dec!(0.05), 10)
                },
            ),
            (
                "compounding_frequency",
                GrowthParameters {
                    compounding_frequency: 1_000_000_000,
                    ..GrowthParameters::new(dec!(1000), dec!(0.05), 1)
                },
            ),
        ];

        for (expected_field, params) in cases {
            match compute_growth(&params) {
                Err(FinCalcError::InvalidInput { field, .. }) => {
                    assert_eq!(field, expected_field)
                }
                other => panic!("expected InvalidInput for {expected_field}, got {other:?}"),
            }
        }
    }
}
