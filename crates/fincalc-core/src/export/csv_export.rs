use rust_decimal::{Decimal, RoundingStrategy};
use std::io::Write;

use crate::growth::compound::GrowthResult;
use crate::growth::sip::SipResult;
use crate::lending::eligibility::EligibilityResult;
use crate::lending::emi::LoanResult;
use crate::FinCalcResult;

/// A result whose period-by-period breakdown can be written as CSV.
pub trait BreakdownCsv {
    fn headers() -> &'static [&'static str];
    fn rows(&self) -> Vec<Vec<String>>;
}

fn fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", dp as usize, rounded)
}

fn money(value: Decimal) -> String {
    fixed(value, 2)
}

impl BreakdownCsv for GrowthResult {
    fn headers() -> &'static [&'static str] {
        &[
            "Year",
            "Starting Balance",
            "Contributions",
            "Interest Earned",
            "Ending Balance",
            "Inflation Adjusted Value",
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.yearly_breakdown
            .iter()
            .map(|y| {
                vec![
                    y.year.to_string(),
                    money(y.starting_balance),
                    money(y.contributions),
                    money(y.interest_earned),
                    money(y.ending_balance),
                    money(y.inflation_adjusted_value),
                ]
            })
            .collect()
    }
}

impl BreakdownCsv for LoanResult {
    fn headers() -> &'static [&'static str] {
        &[
            "Month",
            "EMI",
            "Interest Payment",
            "Principal Payment",
            "Remaining Balance",
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.amortization_schedule
            .iter()
            .map(|m| {
                vec![
                    m.month.to_string(),
                    money(m.emi),
                    money(m.interest_payment),
                    money(m.principal_payment),
                    money(m.remaining_balance),
                ]
            })
            .collect()
    }
}

impl BreakdownCsv for EligibilityResult {
    fn headers() -> &'static [&'static str] {
        &["Rate", "Tenure Years", "Max Loan Principal", "Monthly EMI Used"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.scenarios
            .iter()
            .map(|s| {
                vec![
                    fixed(s.rate, 4),
                    s.tenure_years.to_string(),
                    money(s.max_loan_principal),
                    money(s.monthly_emi_used),
                ]
            })
            .collect()
    }
}

impl BreakdownCsv for SipResult {
    fn headers() -> &'static [&'static str] {
        &[
            "Year",
            "Yearly Investment",
            "Cumulative Investment",
            "Portfolio Value",
            "Yearly Return",
            "Yearly Return Percentage",
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.yearly_breakdown
            .iter()
            .map(|y| {
                vec![
                    y.year.to_string(),
                    money(y.yearly_investment),
                    money(y.cumulative_investment),
                    money(y.portfolio_value),
                    money(y.yearly_return),
                    money(y.yearly_return_percentage),
                ]
            })
            .collect()
    }
}

/// Month-by-month view of a SIP result.
pub struct SipMonthlyBreakdown<'a>(pub &'a SipResult);

impl BreakdownCsv for SipMonthlyBreakdown<'_> {
    fn headers() -> &'static [&'static str] {
        &["Year", "Month", "Investment", "Total Invested", "Portfolio Value"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.0
            .monthly_breakdown
            .iter()
            .map(|m| {
                vec![
                    m.year.to_string(),
                    m.month.to_string(),
                    money(m.investment),
                    money(m.total_invested),
                    money(m.portfolio_value),
                ]
            })
            .collect()
    }
}

/// Write the header row and one row per period.
pub fn write_breakdown_csv<R: BreakdownCsv, W: Write>(result: &R, writer: W) -> FinCalcResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(R::headers())?;
    for row in result.rows() {
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}
