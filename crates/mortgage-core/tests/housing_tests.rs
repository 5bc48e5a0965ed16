use mortgage_core::config::MarketDefaults;
use mortgage_core::housing::property_tax::{self, ExemptionKind, PropertyTaxInput};
use mortgage_core::housing::rent_vs_buy::{self, RentVsBuyInput, RentVsBuyRecommendation};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Property tax tests
// ===========================================================================

fn tax_input(price: Decimal, jurisdiction: Option<&str>) -> PropertyTaxInput {
    PropertyTaxInput {
        home_price: price,
        jurisdiction: jurisdiction.map(str::to_string),
        homestead: false,
        senior: false,
        veteran: false,
    }
}

#[test]
fn test_travis_county_components() {
    let out = property_tax::estimate_property_tax(
        &tax_input(dec!(500_000), Some("Travis")),
        &MarketDefaults::default(),
    )
    .unwrap()
    .result;

    assert_eq!(out.jurisdiction, "travis");
    assert_eq!(out.combined_rate, dec!(0.01905));
    assert_eq!(out.base_tax, dec!(9_525));
    assert_eq!(out.components.school, dec!(4_900));
    assert_eq!(out.annual_tax, out.base_tax);
}

#[test]
fn test_all_exemptions_in_order() {
    let mut input = tax_input(dec!(300_000), Some("harris"));
    input.homestead = true;
    input.senior = true;
    input.veteran = true;
    let out = property_tax::estimate_property_tax(&input, &MarketDefaults::default())
        .unwrap()
        .result;

    // 300,000 * 2.08% = 6,240; 6,000 + 5,000 (capped) + 3,000 eligible
    let kinds: Vec<ExemptionKind> = out.exemptions.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ExemptionKind::Homestead,
            ExemptionKind::Senior,
            ExemptionKind::Veteran
        ]
    );
    assert_eq!(out.base_tax, dec!(6_240));
    assert_eq!(out.annual_tax, Decimal::ZERO);
    assert_eq!(out.total_exemptions, dec!(6_240));
    assert_eq!(out.exemptions[1].applied_amount, dec!(240));
}

#[test]
fn test_unknown_jurisdiction_falls_back() {
    let out = property_tax::estimate_property_tax(
        &tax_input(dec!(400_000), Some("nowhere")),
        &MarketDefaults::default(),
    )
    .unwrap();

    assert_eq!(out.result.jurisdiction, "default");
    assert_eq!(out.result.combined_rate, dec!(0.012));
    assert_eq!(out.warnings.len(), 1);
}

// ===========================================================================
// Rent vs buy tests
// ===========================================================================

fn rent_vs_buy_input(monthly_rent: Decimal) -> RentVsBuyInput {
    RentVsBuyInput {
        home_price: dec!(500_000),
        down_payment: dec!(100_000),
        annual_rate_percent: dec!(7),
        term_years: 30,
        monthly_rent,
        property_tax_rate: None,
        insurance_rate: None,
        maintenance_rate: dec!(0.01),
        monthly_hoa: Decimal::ZERO,
        closing_costs: dec!(15_000),
        rent_growth_rate: dec!(0.03),
        appreciation_rate: dec!(0.03),
        investment_return: dec!(0.07),
        marginal_tax_rate: dec!(0.22),
        horizon_years: 10,
    }
}

#[test]
fn test_break_even_is_within_horizon_or_sentinel() {
    for rent in [dec!(800), dec!(1_500), dec!(2_500), dec!(3_500), dec!(6_000)] {
        let out = rent_vs_buy::analyze_rent_vs_buy(
            &rent_vs_buy_input(rent),
            &MarketDefaults::default(),
        )
        .unwrap()
        .result;

        assert!(
            (1..=11).contains(&out.break_even_year),
            "rent {rent}: break-even {}",
            out.break_even_year
        );
        assert_eq!(out.break_even_reached, out.break_even_year <= 10);
        assert_eq!(out.projections.len(), 10);
    }
}

#[test]
fn test_higher_rent_never_delays_break_even() {
    let defaults = MarketDefaults::default();
    let cheap = rent_vs_buy::analyze_rent_vs_buy(&rent_vs_buy_input(dec!(1_500)), &defaults)
        .unwrap()
        .result;
    let dear = rent_vs_buy::analyze_rent_vs_buy(&rent_vs_buy_input(dec!(6_000)), &defaults)
        .unwrap()
        .result;

    assert!(dear.break_even_year <= cheap.break_even_year);
    assert!(dear.final_net_difference > cheap.final_net_difference);
    assert_eq!(dear.recommendation, RentVsBuyRecommendation::Buy);
}

#[test]
fn test_rent_vs_buy_uses_default_escrow_rates() {
    let out = rent_vs_buy::analyze_rent_vs_buy(
        &rent_vs_buy_input(dec!(2_500)),
        &MarketDefaults::default(),
    )
    .unwrap()
    .result;

    // 500,000 * 1.2% / 12 and 500,000 * 0.35% / 12
    assert_eq!(out.monthly.property_tax, dec!(500));
    assert_eq!(out.monthly.insurance, dec!(145.83));
}
