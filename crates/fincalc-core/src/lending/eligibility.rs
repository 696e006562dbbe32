use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FinCalcError;
use crate::time_value::{annuity_pv_factor, checked_scale};
use crate::types::{with_metadata, ComputationOutput, Money, Rate, MAX_YEARS, MONTHS_PER_YEAR};
use crate::FinCalcResult;

fn default_max_emi_percentage() -> Rate {
    dec!(0.5)
}

/// Candidate annual rates and tenures (in years) the solver sizes a loan for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityGrid {
    pub rates: Vec<Rate>,
    pub tenures: Vec<u32>,
}

impl Default for EligibilityGrid {
    fn default() -> Self {
        Self {
            rates: vec![dec!(0.08), dec!(0.10), dec!(0.12), dec!(0.14)],
            tenures: vec![5, 10, 15, 20],
        }
    }
}

impl EligibilityGrid {
    pub fn validate(&self) -> FinCalcResult<()> {
        if let Some(rate) = self.rates.iter().find(|r| **r < Decimal::ZERO) {
            return Err(FinCalcError::invalid(
                "grid.rates",
                format!("candidate rate {rate} must be >= 0"),
            ));
        }
        if self.tenures.iter().any(|t| *t == 0 || *t > MAX_YEARS) {
            return Err(FinCalcError::invalid(
                "grid.tenures",
                format!("candidate tenures must be between 1 and {MAX_YEARS} years"),
            ));
        }
        Ok(())
    }
}

/// Borrower profile for the eligibility solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityParameters {
    pub monthly_income: Money,
    #[serde(default)]
    pub existing_obligations: Money,
    /// Share of income that may go to EMIs (0.5 = 50%).
    #[serde(default = "default_max_emi_percentage")]
    pub max_emi_percentage: Rate,
    #[serde(default)]
    pub grid: EligibilityGrid,
}

impl EligibilityParameters {
    pub fn new(monthly_income: Money) -> Self {
        Self {
            monthly_income,
            existing_obligations: Decimal::ZERO,
            max_emi_percentage: default_max_emi_percentage(),
            grid: EligibilityGrid::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub max_monthly_emi: Money,
    /// EMI budget left after existing obligations, floored at zero.
    pub available_emi: Money,
    pub scenarios: Vec<EligibilityScenario>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityScenario {
    pub rate: Rate,
    pub tenure_years: u32,
    pub max_loan_principal: Money,
    pub monthly_emi_used: Money,
}

/// Back-solve the largest principal the borrower's spare EMI budget can
/// service for every (rate, tenure) pair in the grid, rate-major.
pub fn compute_eligibility(
    params: &EligibilityParameters,
) -> FinCalcResult<ComputationOutput<EligibilityResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if params.monthly_income <= Decimal::ZERO {
        return Err(FinCalcError::invalid(
            "monthly_income",
            "monthly_income must be > 0",
        ));
    }
    params.grid.validate()?;

    if params.max_emi_percentage < Decimal::ZERO || params.max_emi_percentage > Decimal::ONE {
        warnings.push(format!(
            "max_emi_percentage {} is outside 0-1",
            params.max_emi_percentage
        ));
    }
    if params.existing_obligations < Decimal::ZERO {
        warnings.push("existing_obligations is negative and increases the EMI budget".into());
    }
    if params.grid.rates.is_empty() || params.grid.tenures.is_empty() {
        warnings.push("Scenario grid is empty".into());
    }

    let max_monthly_emi = checked_scale(
        params.monthly_income,
        params.max_emi_percentage,
        "maximum monthly EMI",
    )?;
    let budget = max_monthly_emi
        .checked_sub(params.existing_obligations)
        .ok_or_else(|| FinCalcError::Overflow {
            context: "EMI budget".into(),
        })?;
    let available_emi = budget.max(Decimal::ZERO);

    if budget <= Decimal::ZERO {
        warnings.push("Existing obligations consume the whole EMI budget".into());
    }

    debug!(
        "compute_eligibility: income={} max_emi={} available={}",
        params.monthly_income, max_monthly_emi, available_emi
    );

    let mut scenarios =
        Vec::with_capacity(params.grid.rates.len() * params.grid.tenures.len());
    for &rate in &params.grid.rates {
        let monthly_rate = rate / Decimal::from(MONTHS_PER_YEAR);
        for &tenure_years in &params.grid.tenures {
            let months = tenure_years * MONTHS_PER_YEAR;

            let max_loan_principal = if available_emi.is_zero() {
                Decimal::ZERO
            } else {
                // Zero-rate limit of the factor is `months`
                let factor = annuity_pv_factor(monthly_rate, months)?;
                checked_scale(available_emi, factor, "eligible principal")?
            };

            scenarios.push(EligibilityScenario {
                rate,
                tenure_years,
                max_loan_principal,
                monthly_emi_used: available_emi,
            });
        }
    }

    let output = EligibilityResult {
        max_monthly_emi,
        available_emi,
        scenarios,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Eligible principal P = EMI * ((1+r)^n - 1) / (r * (1+r)^n), EMI = income * pct - obligations",
        params,
        warnings,
        elapsed,
        output,
    ))
}
