use rust_decimal::Decimal;

use crate::error::FinCalcError;
use crate::types::{Money, Rate};
use crate::FinCalcResult;

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
///
/// Fails with [`FinCalcError::Overflow`] once the factor leaves the 96-bit
/// decimal range instead of saturating.
pub fn compound(rate: Rate, n: u32) -> FinCalcResult<Decimal> {
    let factor = Decimal::ONE + rate;
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result = result
            .checked_mul(factor)
            .ok_or_else(|| FinCalcError::Overflow {
                context: format!("compound factor (1 + {rate})^{n}"),
            })?;
    }
    Ok(result)
}

/// Multiply `amount` by `factor`, reporting overflow against `context`.
pub(crate) fn checked_scale(amount: Money, factor: Decimal, context: &str) -> FinCalcResult<Money> {
    amount
        .checked_mul(factor)
        .ok_or_else(|| FinCalcError::Overflow {
            context: context.to_string(),
        })
}

/// Add `amount` to `total`, reporting overflow against `context`.
pub(crate) fn checked_sum(total: Money, amount: Money, context: &str) -> FinCalcResult<Money> {
    total
        .checked_add(amount)
        .ok_or_else(|| FinCalcError::Overflow {
            context: context.to_string(),
        })
}

/// Future value of one unit paid at the end of each of `n` periods:
/// ((1+r)^n - 1) / r, or `n` when the rate is zero.
pub fn annuity_fv_factor(rate: Rate, n: u32) -> FinCalcResult<Decimal> {
    if rate.is_zero() {
        return Ok(Decimal::from(n));
    }
    let growth = compound(rate, n)?;
    Ok((growth - Decimal::ONE) / rate)
}

/// Present value of one unit paid at the end of each of `n` periods:
/// ((1+r)^n - 1) / (r (1+r)^n), or `n` when the rate is zero.
pub fn annuity_pv_factor(rate: Rate, n: u32) -> FinCalcResult<Decimal> {
    if rate.is_zero() {
        return Ok(Decimal::from(n));
    }
    let growth = compound(rate, n)?;
    let denominator = rate * growth;
    if denominator.is_zero() {
        return Err(FinCalcError::invalid(
            "rate",
            "periodic rate of -100% has no present value",
        ));
    }
    Ok((growth - Decimal::ONE) / denominator)
}

/// Level payment that amortizes `principal` over `n` periods at periodic
/// `rate`: P r (1+r)^n / ((1+r)^n - 1).
pub fn level_payment(principal: Money, rate: Rate, n: u32) -> FinCalcResult<Money> {
    if n == 0 {
        return Err(FinCalcError::invalid(
            "n",
            "Number of periods must be > 0",
        ));
    }
    if rate.is_zero() {
        return Ok(principal / Decimal::from(n));
    }

    let growth = compound(rate, n)?;
    let denominator = growth - Decimal::ONE;
    if denominator.is_zero() {
        return Err(FinCalcError::invalid(
            "rate",
            "Periodic rate too small to resolve a level payment",
        ));
    }

    let periodic_interest = checked_scale(principal, rate, "level payment")?;
    checked_scale(periodic_interest, growth, "level payment")?
        .checked_div(denominator)
        .ok_or_else(|| FinCalcError::Overflow {
            context: "level payment".into(),
        })
}
