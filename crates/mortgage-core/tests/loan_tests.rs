use chrono::NaiveDate;
use mortgage_core::config::{JurisdictionRates, MarketDefaults};
use mortgage_core::loan::{amortization, monthly_payment};
use mortgage_core::time_value;
use mortgage_core::MortgageError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Amortization schedule tests
// ===========================================================================

fn jumbo_loan() -> amortization::AmortizationInput {
    amortization::AmortizationInput {
        principal: dec!(520_000),
        annual_rate_percent: dec!(7.25),
        term_years: 30,
        extra_monthly_principal: None,
        first_payment_date: None,
    }
}

#[test]
fn test_first_payment_split() {
    let out = amortization::build_amortization_schedule(&jumbo_loan())
        .unwrap()
        .result;
    let first = &out.schedule[0];

    // 520,000 * 7.25% / 12 = 3,141.666.. -> 3,141.67
    assert_eq!(first.interest_portion, dec!(3141.67));
    assert_eq!(first.principal_portion, out.monthly_payment - dec!(3141.67));
    assert_eq!(first.payment_index, 1);
}

#[test]
fn test_schedule_retires_loan_across_terms() {
    for (principal, rate, years) in [
        (dec!(520_000), dec!(7.25), 30),
        (dec!(250_000), dec!(3.875), 15),
        (dec!(87_500), dec!(11), 20),
        (dec!(1_000), dec!(0.5), 1),
        (dec!(300_000), dec!(0), 30),
    ] {
        let input = amortization::AmortizationInput {
            principal,
            annual_rate_percent: rate,
            term_years: years,
            extra_monthly_principal: None,
            first_payment_date: None,
        };
        let out = amortization::build_amortization_schedule(&input)
            .unwrap()
            .result;

        let last = out.schedule.last().unwrap();
        assert_eq!(last.remaining_balance, Decimal::ZERO, "{principal} at {rate}%");
        assert_eq!(out.total_principal, principal, "{principal} at {rate}%");
        assert_eq!(out.schedule.len() as u32, years * 12);
        assert_eq!(out.total_paid, out.total_principal + out.total_interest);
    }
}

#[test]
fn test_zero_rate_payment_is_straight_line() {
    let payment = time_value::monthly_payment(dec!(360_000), dec!(0), 30).unwrap();
    assert_eq!(payment, dec!(1_000));
}

#[test]
fn test_extra_principal_saves_interest() {
    let mut input = jumbo_loan();
    input.extra_monthly_principal = Some(dec!(500));
    let out = amortization::build_amortization_schedule(&input)
        .unwrap()
        .result;

    assert!(out.payoff_months < 360);
    assert_eq!(out.months_saved, 360 - out.payoff_months);
    assert!(out.interest_saved > dec!(100_000));
    assert_eq!(out.total_principal, dec!(520_000));
}

#[test]
fn test_scheduled_dates_and_yearly_summary() {
    let mut input = jumbo_loan();
    input.first_payment_date = NaiveDate::from_ymd_opt(2025, 1, 31);
    let out = amortization::build_amortization_schedule(&input)
        .unwrap()
        .result;

    // Month-end dates clamp to the shorter month.
    assert_eq!(out.schedule[1].scheduled_date, NaiveDate::from_ymd_opt(2025, 2, 28));
    assert_eq!(out.schedule[12].scheduled_date, NaiveDate::from_ymd_opt(2026, 1, 31));

    assert_eq!(out.yearly_summary.len(), 30);
    let first_year = &out.yearly_summary[0];
    assert_eq!(first_year.ending_balance, out.schedule[11].remaining_balance);
    assert_eq!(
        first_year.principal_paid,
        dec!(520_000) - first_year.ending_balance
    );
}

#[test]
fn test_schedule_rejects_bad_terms() {
    let mut input = jumbo_loan();
    input.term_years = 0;
    match amortization::build_amortization_schedule(&input).unwrap_err() {
        MortgageError::InvalidInput { field, .. } => assert_eq!(field, "term_years"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }

    let mut input = jumbo_loan();
    input.principal = dec!(-1);
    assert!(amortization::build_amortization_schedule(&input).is_err());
}

#[test]
fn test_oversized_loan_is_rejected() {
    let err = time_value::monthly_payment(dec!(2_000_000_000), dec!(100), 50).unwrap_err();
    match err {
        MortgageError::InvalidInput { field, .. } => assert_eq!(field, "rate"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }

    let input = amortization::AmortizationInput {
        principal: dec!(2_000_000_000),
        annual_rate_percent: dec!(100),
        term_years: 50,
        ..jumbo_loan()
    };
    assert!(amortization::build_amortization_schedule(&input).is_err());
}

// ===========================================================================
// Monthly payment tests
// ===========================================================================

fn payment_input(down_payment: Decimal) -> monthly_payment::MortgagePaymentInput {
    monthly_payment::MortgagePaymentInput {
        home_price: dec!(650_000),
        down_payment,
        annual_rate_percent: dec!(7.25),
        term_years: 30,
        annual_property_tax: None,
        annual_insurance: None,
        monthly_pmi: None,
        monthly_hoa: None,
        jurisdiction: None,
    }
}

#[test]
fn test_twenty_percent_down_has_no_pmi() {
    let out = monthly_payment::calculate_mortgage_payment(
        &payment_input(dec!(130_000)),
        &MarketDefaults::default(),
    )
    .unwrap();
    let b = &out.result;

    assert_eq!(b.pmi, Decimal::ZERO);
    assert!(!b.pmi_required);
    assert_eq!(b.loan_amount, dec!(520_000));
    assert_eq!(b.loan_to_value, dec!(0.8));
    assert!(out.warnings.is_empty());
}

#[test]
fn test_ten_percent_down_adds_pmi() {
    let out = monthly_payment::calculate_mortgage_payment(
        &payment_input(dec!(65_000)),
        &MarketDefaults::default(),
    )
    .unwrap();
    let b = &out.result;

    // 585,000 * 0.5% / 12
    assert_eq!(b.pmi, dec!(243.75));
    assert!(b.pmi_required);
    assert_eq!(
        b.total_monthly_payment,
        b.principal_and_interest + b.property_tax + b.insurance + b.pmi + b.hoa
    );
    assert_eq!(out.warnings.len(), 1);
}

#[test]
fn test_escrow_defaults_follow_configuration() {
    let mut defaults = MarketDefaults {
        insurance_rate: dec!(0.0012),
        ..MarketDefaults::default()
    };
    defaults.jurisdictions.insert(
        "default".to_string(),
        JurisdictionRates {
            county: dec!(0.004),
            school: dec!(0.012),
            city: dec!(0.006),
            special_district: dec!(0.002),
        },
    );
    let b = monthly_payment::calculate_mortgage_payment(&payment_input(dec!(130_000)), &defaults)
        .unwrap()
        .result;

    // 650,000 * 2.4% / 12, 650,000 * 0.12% / 12
    assert_eq!(b.property_tax, dec!(1_300));
    assert_eq!(b.insurance, dec!(65));
}

#[test]
fn test_total_matches_amortization_payment() {
    let b = monthly_payment::calculate_mortgage_payment(
        &payment_input(dec!(130_000)),
        &MarketDefaults::default(),
    )
    .unwrap()
    .result;
    let schedule = amortization::build_amortization_schedule(&jumbo_loan())
        .unwrap()
        .result;

    assert_eq!(b.principal_and_interest, schedule.monthly_payment);
    assert_eq!(
        b.total_cost_of_loan,
        schedule.monthly_payment * Decimal::from(360)
    );
}
