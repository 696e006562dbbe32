use log::{debug, trace};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::time_value::{checked_scale, level_payment};
use crate::types::{
    with_metadata, ComputationOutput, Money, Rate, MAX_LOAN_MONTHS, MONTHS_PER_YEAR,
};
use crate::FinCalcResult;

/// Balances below this are treated as fully repaid.
const CLAMP_EPSILON: Decimal = dec!(0.000001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input parameters for an EMI loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanParameters {
    pub principal: Money,
    pub annual_rate: Rate,
    pub tenure_years: i32,
    /// Extra months on top of `tenure_years`.
    #[serde(default)]
    pub tenure_months: i32,
}

impl LoanParameters {
    pub fn new(principal: Money, annual_rate: Rate, tenure_years: i32) -> Self {
        Self {
            principal,
            annual_rate,
            tenure_years,
            tenure_months: 0,
        }
    }
}

/// Output of `compute_emi`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanResult {
    pub total_months: u32,
    pub monthly_emi: Money,
    pub total_amount: Money,
    pub total_interest: Money,
    /// Total interest as a percentage of principal (25 = 25%).
    pub interest_percentage: Decimal,
    pub amortization_schedule: Vec<AmortizationEntry>,
}

/// One month of the amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    pub month: u32,
    pub emi: Money,
    pub interest_payment: Money,
    pub principal_payment: Money,
    pub remaining_balance: Money,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(params: &LoanParameters) -> FinCalcResult<u32> {
    if params.principal <= Decimal::ZERO {
        return Err(FinCalcError::invalid("principal", "principal must be > 0"));
    }
    if params.annual_rate <= Decimal::ZERO {
        return Err(FinCalcError::invalid("annual_rate", "annual_rate must be > 0"));
    }
    if params.tenure_years < 0 {
        return Err(FinCalcError::invalid("tenure_years", "tenure_years must be >= 0"));
    }
    if params.tenure_months < 0 {
        return Err(FinCalcError::invalid(
            "tenure_months",
            "tenure_months must be >= 0",
        ));
    }
    if params.tenure_years == 0 && params.tenure_months == 0 {
        return Err(FinCalcError::invalid(
            "tenure",
            "tenure_years or tenure_months must be > 0",
        ));
    }

    (params.tenure_years as u32)
        .checked_mul(MONTHS_PER_YEAR)
        .and_then(|m| m.checked_add(params.tenure_months as u32))
        .filter(|months| *months <= MAX_LOAN_MONTHS)
        .ok_or_else(|| {
            FinCalcError::invalid(
                "tenure",
                format!("tenure must be <= {MAX_LOAN_MONTHS} months"),
            )
        })
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Compute the equated monthly instalment for a loan and its full
/// month-by-month amortization schedule.
pub fn compute_emi(params: &LoanParameters) -> FinCalcResult<ComputationOutput<LoanResult>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    let total_months = validate(params)?;
    let monthly_rate = params.annual_rate / Decimal::from(MONTHS_PER_YEAR);

    debug!(
        "compute_emi: principal={} rate={} months={}",
        params.principal, params.annual_rate, total_months
    );

    let monthly_emi = level_payment(params.principal, monthly_rate, total_months)?;
    let total_amount = checked_scale(monthly_emi, Decimal::from(total_months), "total amount")?;
    let total_interest = total_amount - params.principal;
    let interest_percentage = total_interest / params.principal * dec!(100);

    let amortization_schedule =
        amortization_schedule(params.principal, monthly_rate, total_months, monthly_emi);

    let output = LoanResult {
        total_months,
        monthly_emi,
        total_amount,
        total_interest,
        interest_percentage,
        amortization_schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "EMI = P*r*(1+r)^n / ((1+r)^n - 1), r = annual_rate/12",
        params,
        warnings,
        elapsed,
        output,
    ))
}

/// Roll the balance forward one month at a time. The final month (or any
/// month whose balance falls under `CLAMP_EPSILON`) is forced to exactly zero;
/// the principal component already recorded for that month is left as is.
fn amortization_schedule(
    principal: Money,
    monthly_rate: Rate,
    total_months: u32,
    emi: Money,
) -> Vec<AmortizationEntry> {
    let mut remaining = principal;

    (1..=total_months)
        .map(|month| {
            let interest_payment = remaining * monthly_rate;
            let principal_payment = emi - interest_payment;
            remaining -= principal_payment;

            if month == total_months || remaining < CLAMP_EPSILON {
                if !remaining.is_zero() {
                    trace!("month {month}: clamping residual balance {remaining}");
                }
                remaining = Decimal::ZERO;
            }

            AmortizationEntry {
                month,
                emi,
                interest_payment,
                principal_payment,
                remaining_balance: remaining,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(params: &LoanParameters) -> LoanResult {
        compute_emi(params).unwrap().result
    }

    #[test]
    fn test_five_year_loan_at_twelve_percent() {
        let result = run(&LoanParameters::new(dec!(100_000), dec!(0.12), 5));

        assert_eq!(result.total_months, 60);
        assert!((result.monthly_emi - dec!(2224.44)).abs() < dec!(0.01));
        assert_eq!(result.amortization_schedule.len(), 60);
        assert_eq!(
            result.amortization_schedule.last().unwrap().remaining_balance,
            Decimal::ZERO
        );
        assert!((result.total_amount - dec!(133_466.67)).abs() < dec!(1));
        assert_eq!(result.total_interest, result.total_amount - dec!(100_000));
    }

    #[test]
    fn test_extra_months_extend_tenure() {
        let params = LoanParameters {
            tenure_months: 6,
            ..LoanParameters::new(dec!(50_000), dec!(0.10), 3)
        };
        let result = run(&params);

        assert_eq!(result.total_months, 42);
        assert!(result.monthly_emi > Decimal::ZERO);
        assert!(result.monthly_emi < dec!(2000));
    }

    #[test]
    fn test_first_payment_split() {
        let result = run(&LoanParameters::new(dec!(10_000), dec!(0.12), 1));
        let first = &result.amortization_schedule[0];

        assert_eq!(first.month, 1);
        assert_eq!(first.emi, result.monthly_emi);
        assert_eq!(first.interest_payment, dec!(100));
        assert_eq!(first.principal_payment, result.monthly_emi - dec!(100));
    }

    #[test]
    fn test_single_month_loan() {
        let params = LoanParameters {
            tenure_months: 1,
            ..LoanParameters::new(dec!(1200), dec!(0.12), 0)
        };
        let result = run(&params);

        assert_eq!(result.total_months, 1);
        assert_eq!(result.amortization_schedule.len(), 1);
        let only = &result.amortization_schedule[0];
        assert!((only.principal_payment - dec!(1200)).abs() < dec!(0.0000001));
        assert_eq!(only.remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_one_year_has_twelve_periods() {
        let result = run(&LoanParameters::new(dec!(10_000), dec!(0.09), 1));
        assert_eq!(result.amortization_schedule.len(), 12);
        assert_eq!(result.amortization_schedule[11].month, 12);
    }

    #[test]
    fn test_schedule_invariants() {
        let params = LoanParameters {
            tenure_months: 7,
            ..LoanParameters::new(dec!(347_250.55), dec!(0.0675), 29)
        };
        let result = run(&params);
        let schedule = &result.amortization_schedule;

        assert!(schedule.iter().all(|e| e.emi == result.monthly_emi));
        for pair in schedule.windows(2) {
            assert!(pair[1].remaining_balance <= pair[0].remaining_balance);
        }
        assert_eq!(schedule.last().unwrap().remaining_balance, Decimal::ZERO);

        let repaid: Decimal = schedule.iter().map(|e| e.principal_payment).sum();
        assert!((repaid - params.principal).abs() < dec!(0.01));
    }

    #[test]
    fn test_invalid_loan_inputs() {
        let cases = [
            ("principal", LoanParameters::new(dec!(-1), dec!(0.1), 5)),
            ("principal", LoanParameters::new(Decimal::ZERO, dec!(0.1), 5)),
            ("annual_rate", LoanParameters::new(dec!(1000), Decimal::ZERO, 5)),
            ("tenure_years", LoanParameters::new(dec!(1000), dec!(0.1), -1)),
            (
                "tenure_months",
                LoanParameters {
                    tenure_months: -2,
                    ..LoanParameters::new(dec!(1000), dec!(0.1), 1)
                },
            ),
            ("tenure", LoanParameters::new(dec!(1000), dec!(0.1), 0)),
            ("tenure", LoanParameters::new(dec!(1000), dec!(0.0001), 1_001)),
            (
                "tenure",
                LoanParameters {
                    tenure_months: i32::MAX,
                    ..LoanParameters::new(dec!(1000), dec!(0.1), 1)
                },
            ),
        ];

        for (expected_field, params) in cases {
            match compute_emi(&params) {
                Err(FinCalcError::InvalidInput { field, .. }) => {
                    assert_eq!(field, expected_field)
                }
                other => panic!("expected InvalidInput for {expected_field}, got {other:?}"),
            }
        }
    }
}
