use fincalc_core::batch::{run_batch, BatchRequest};
use fincalc_core::lending::eligibility::{
    compute_eligibility, EligibilityGrid, EligibilityParameters,
};
use fincalc_core::lending::emi::{compute_emi, LoanParameters};
use fincalc_core::time_value::level_payment;
use fincalc_core::FinCalcError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// EMI / amortization
// ===========================================================================

fn home_loan() -> LoanParameters {
    LoanParameters {
        tenure_months: 3,
        ..LoanParameters::new(dec!(2_500_000), dec!(0.0875), 20)
    }
}

#[test]
fn test_reference_emi() {
    let result = compute_emi(&LoanParameters::new(dec!(100_000), dec!(0.12), 5))
        .unwrap()
        .result;

    assert_eq!(result.total_months, 60);
    assert!((result.monthly_emi - dec!(2224.44)).abs() < dec!(0.005));
    assert_eq!(
        result.amortization_schedule.last().unwrap().remaining_balance,
        Decimal::ZERO
    );
}

#[test]
fn test_schedule_repays_principal_exactly() {
    let params = home_loan();
    let result = compute_emi(&params).unwrap().result;
    let schedule = &result.amortization_schedule;

    assert_eq!(schedule.len(), 243);
    assert_eq!(schedule.last().unwrap().remaining_balance, Decimal::ZERO);

    let repaid: Decimal = schedule.iter().map(|e| e.principal_payment).sum();
    assert!((repaid - params.principal).abs() < dec!(0.01));

    let interest: Decimal = schedule.iter().map(|e| e.interest_payment).sum();
    assert!((interest - result.total_interest).abs() < dec!(0.01));
}

#[test]
fn test_emi_constant_and_balance_non_increasing() {
    let result = compute_emi(&home_loan()).unwrap().result;
    let schedule = &result.amortization_schedule;

    assert!(schedule.iter().all(|e| e.emi == result.monthly_emi));
    assert!(schedule
        .windows(2)
        .all(|w| w[1].remaining_balance <= w[0].remaining_balance));
    // Interest share shrinks as the balance falls
    assert!(schedule[0].interest_payment > schedule[242].interest_payment);
}

#[test]
fn test_month_numbers_have_no_gaps() {
    let result = compute_emi(&LoanParameters {
        tenure_months: 1,
        ..LoanParameters::new(dec!(5000), dec!(0.1), 0)
    })
    .unwrap()
    .result;
    let months: Vec<u32> = result.amortization_schedule.iter().map(|e| e.month).collect();
    assert_eq!(months, vec![1]);

    let result = compute_emi(&LoanParameters::new(dec!(5000), dec!(0.1), 1))
        .unwrap()
        .result;
    let months: Vec<u32> = result.amortization_schedule.iter().map(|e| e.month).collect();
    assert_eq!(months, (1..=12).collect::<Vec<u32>>());
}

#[test]
fn test_emi_is_idempotent() {
    let params = home_loan();
    let first = compute_emi(&params).unwrap().result;
    let second = compute_emi(&params).unwrap().result;
    assert_eq!(first, second);
}

#[test]
fn test_negative_principal_fails_before_computation() {
    match compute_emi(&LoanParameters::new(dec!(-1), dec!(0.1), 10)) {
        Err(FinCalcError::InvalidInput { field, .. }) => assert_eq!(field, "principal"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_error_message_names_field_and_constraint() {
    let err = compute_emi(&LoanParameters::new(dec!(1000), dec!(0.1), 0)).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("tenure"));
    assert!(message.contains("> 0"));
}

#[test]
fn test_principal_near_decimal_max_reports_overflow() {
    let params = LoanParameters::new(
        dec!(70_000_000_000_000_000_000_000_000_000),
        dec!(0.12),
        5,
    );
    match compute_emi(&params) {
        Err(FinCalcError::Overflow { context }) => assert_eq!(context, "total amount"),
        other => panic!("expected Overflow, got {other:?}"),
    }
}

#[test]
fn test_principal_at_decimal_max_reports_overflow() {
    let params = LoanParameters::new(Decimal::MAX, dec!(0.12), 5);
    assert!(matches!(
        compute_emi(&params),
        Err(FinCalcError::Overflow { .. })
    ));
}

#[test]
fn test_tenure_beyond_horizon_is_rejected() {
    match compute_emi(&LoanParameters::new(dec!(1000), dec!(0.01), 5_000)) {
        Err(FinCalcError::InvalidInput { field, .. }) => assert_eq!(field, "tenure"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

// ===========================================================================
// Eligibility
// ===========================================================================

#[test]
fn test_reference_eligibility() {
    let params = EligibilityParameters {
        existing_obligations: dec!(500),
        ..EligibilityParameters::new(dec!(5000))
    };
    let result = compute_eligibility(&params).unwrap().result;

    assert_eq!(result.max_monthly_emi, dec!(2500));
    assert_eq!(result.available_emi, dec!(2000));
    assert_eq!(result.scenarios.len(), 16);
    for scenario in &result.scenarios {
        assert!(scenario.rate > Decimal::ZERO);
        assert!(scenario.max_loan_principal > Decimal::ZERO);
    }
}

#[test]
fn test_eligible_principal_is_serviced_by_available_emi() {
    let params = EligibilityParameters {
        existing_obligations: dec!(750),
        max_emi_percentage: dec!(0.4),
        ..EligibilityParameters::new(dec!(9000))
    };
    let result = compute_eligibility(&params).unwrap().result;

    for scenario in &result.scenarios {
        let months = scenario.tenure_years * 12;
        let emi = level_payment(scenario.max_loan_principal, scenario.rate / dec!(12), months)
            .unwrap();
        assert!(
            (emi - result.available_emi).abs() < dec!(0.000001),
            "rate={} tenure={}",
            scenario.rate,
            scenario.tenure_years
        );
    }
}

#[test]
fn test_custom_grid_replaces_defaults() {
    let params = EligibilityParameters {
        grid: EligibilityGrid {
            rates: vec![dec!(0.065), dec!(0.07)],
            tenures: vec![25, 30],
        },
        ..EligibilityParameters::new(dec!(12_000))
    };
    let result = compute_eligibility(&params).unwrap().result;

    let pairs: Vec<(Decimal, u32)> = result
        .scenarios
        .iter()
        .map(|s| (s.rate, s.tenure_years))
        .collect();
    assert_eq!(
        pairs,
        vec![
            (dec!(0.065), 25),
            (dec!(0.065), 30),
            (dec!(0.07), 25),
            (dec!(0.07), 30),
        ]
    );
}

#[test]
fn test_eligibility_json_defaults() {
    let params: EligibilityParameters =
        serde_json::from_str(r#"{"monthly_income": 5000}"#).unwrap();
    assert_eq!(params, EligibilityParameters::new(dec!(5000)));
}

// ===========================================================================
// Batch
// ===========================================================================

#[test]
fn test_batch_matches_individual_runs() {
    let request = BatchRequest {
        loans: vec![home_loan(), LoanParameters::new(dec!(100_000), dec!(0.12), 5)],
        eligibility: vec![EligibilityParameters::new(dec!(5000))],
        ..Default::default()
    };
    let output = run_batch(&request);

    assert_eq!(output.failed, 0);
    assert_eq!(output.succeeded, 3);
    let direct = compute_emi(&home_loan()).unwrap().result;
    assert_eq!(output.loans[0].output.as_ref().unwrap().result, direct);
}
