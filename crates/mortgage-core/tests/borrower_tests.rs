use mortgage_core::borrower::{affordability, refinance};
use mortgage_core::config::MarketDefaults;
use mortgage_core::loan::monthly_payment::{compose_budget, MortgagePaymentInput};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Affordability tests
// ===========================================================================

fn sample_profile() -> affordability::AffordabilityProfile {
    affordability::AffordabilityProfile {
        monthly_gross_income: dec!(8_000),
        monthly_debts: dec!(800),
        down_payment: dec!(60_000),
        annual_rate_percent: dec!(7.25),
        term_years: 30,
        property_tax_rate: None,
        insurance_rate: None,
        max_front_end_ratio: None,
    }
}

#[test]
fn test_affordability_is_reproducible() {
    let defaults = MarketDefaults::default();
    let first = affordability::calculate_affordability(&sample_profile(), &defaults)
        .unwrap()
        .result;
    let second = affordability::calculate_affordability(&sample_profile(), &defaults)
        .unwrap()
        .result;

    assert!(first.feasible);
    assert_eq!(first.max_home_price, second.max_home_price);
    assert_eq!(first.estimated_payment, second.estimated_payment);
    // 8,000 * 36% - 800 = 2,080 binds below 8,000 * 28% = 2,240
    assert_eq!(first.max_monthly_payment, dec!(2_080));
    assert_eq!(first.max_home_price % dec!(1_000), Decimal::ZERO);
}

#[test]
fn test_affordable_price_fits_composed_payment() {
    let defaults = MarketDefaults::default();
    let profile = sample_profile();
    let out = affordability::calculate_affordability(&profile, &defaults)
        .unwrap()
        .result;

    let (budget, _) = compose_budget(
        &MortgagePaymentInput {
            home_price: out.max_home_price,
            down_payment: profile.down_payment,
            annual_rate_percent: profile.annual_rate_percent,
            term_years: profile.term_years,
            annual_property_tax: None,
            annual_insurance: None,
            monthly_pmi: None,
            monthly_hoa: None,
            jurisdiction: None,
        },
        &defaults,
    )
    .unwrap();
    assert!(budget.total_monthly_payment <= out.max_monthly_payment);

    // One more grid step breaks the budget.
    let next = affordability::estimate_housing_payment(
        out.max_home_price + dec!(1_000),
        &profile,
        &defaults,
    )
    .unwrap();
    assert!(next.total > out.max_monthly_payment);
}

#[test]
fn test_heavy_debt_is_infeasible() {
    let mut profile = sample_profile();
    profile.monthly_debts = dec!(2_880);
    let out = affordability::calculate_affordability(&profile, &MarketDefaults::default())
        .unwrap()
        .result;

    assert!(!out.feasible);
    assert_eq!(out.max_home_price, Decimal::ZERO);
    assert_eq!(
        out.recommendation,
        affordability::AffordabilityRecommendation::IncreaseIncomeOrSavings
    );
}

#[test]
fn test_front_end_ratio_override_binds() {
    let mut profile = sample_profile();
    profile.monthly_debts = Decimal::ZERO;
    profile.max_front_end_ratio = Some(dec!(0.20));
    let out = affordability::calculate_affordability(&profile, &MarketDefaults::default())
        .unwrap()
        .result;

    assert_eq!(out.max_monthly_payment, dec!(1_600));
    assert!(out.front_end_ratio <= dec!(0.20));
    assert_eq!(
        out.recommendation,
        affordability::AffordabilityRecommendation::StrongPosition
    );
}

// ===========================================================================
// Refinance tests
// ===========================================================================

fn sample_refinance() -> refinance::RefinanceInput {
    refinance::RefinanceInput {
        current_balance: dec!(300_000),
        current_rate_percent: dec!(7.5),
        remaining_months: 330,
        current_payment: Some(dec!(2_200)),
        new_rate_percent: dec!(6),
        new_term_years: 30,
        closing_costs: dec!(6_000),
    }
}

#[test]
fn test_refinance_break_even() {
    let out = refinance::analyze_refinance(&sample_refinance()).unwrap();
    let r = &out.result;

    // 300,000 at 6% over 30 years
    assert_eq!(r.new_payment, dec!(1798.65));
    assert_eq!(r.monthly_savings, dec!(401.35));
    // 6,000 / 401.35 = 14.95
    assert_eq!(r.break_even_months, Some(dec!(14.95)));
    assert_eq!(r.break_even_whole_months, Some(15));
    assert_eq!(r.recommendation, refinance::RefinanceRecommendation::Excellent);
    assert_eq!(r.rate_reduction, dec!(1.5));
    assert!(!out.warnings.is_empty());
}

#[test]
fn test_refinance_without_savings_has_no_break_even() {
    let mut input = sample_refinance();
    input.new_rate_percent = dec!(9);
    let r = refinance::analyze_refinance(&input).unwrap().result;

    assert!(r.monthly_savings <= Decimal::ZERO);
    assert_eq!(r.break_even_months, None);
    assert_eq!(
        r.recommendation,
        refinance::RefinanceRecommendation::NotRecommended
    );
}

#[test]
fn test_refinance_derives_current_payment() {
    let mut input = sample_refinance();
    input.current_payment = None;
    input.remaining_months = 360;
    let r = refinance::analyze_refinance(&input).unwrap().result;

    // 300,000 at 7.5% over 360 months
    assert_eq!(r.current_payment, dec!(2097.64));
}
