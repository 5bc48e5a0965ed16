use napi::Result as NapiResult;
use napi_derive::napi;

use mortgage_core::config::MarketDefaults;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Market defaults from an optional JSON document; built-ins when absent.
fn parse_defaults(defaults_json: Option<String>) -> NapiResult<MarketDefaults> {
    let defaults = match defaults_json {
        Some(json) => serde_json::from_str::<MarketDefaults>(&json).map_err(to_napi_error)?,
        None => MarketDefaults::default(),
    };
    defaults.validate().map_err(to_napi_error)?;
    Ok(defaults)
}

// ---------------------------------------------------------------------------
// Loan
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_mortgage_payment(
    input_json: String,
    defaults_json: Option<String>,
) -> NapiResult<String> {
    let input: mortgage_core::loan::monthly_payment::MortgagePaymentInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let defaults = parse_defaults(defaults_json)?;
    let output = mortgage_core::loan::monthly_payment::calculate_mortgage_payment(&input, &defaults)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: mortgage_core::loan::amortization::AmortizationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = mortgage_core::loan::amortization::build_amortization_schedule(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Borrower
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_affordability(
    input_json: String,
    defaults_json: Option<String>,
) -> NapiResult<String> {
    let input: mortgage_core::borrower::affordability::AffordabilityProfile =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let defaults = parse_defaults(defaults_json)?;
    let output = mortgage_core::borrower::affordability::calculate_affordability(&input, &defaults)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_refinance(input_json: String) -> NapiResult<String> {
    let input: mortgage_core::borrower::refinance::RefinanceInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        mortgage_core::borrower::refinance::analyze_refinance(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// ARM
// ---------------------------------------------------------------------------

#[napi]
pub fn project_arm(input_json: String) -> NapiResult<String> {
    let input: mortgage_core::arm::projection::ArmInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = mortgage_core::arm::projection::project_arm(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Housing
// ---------------------------------------------------------------------------

#[napi]
pub fn estimate_property_tax(
    input_json: String,
    defaults_json: Option<String>,
) -> NapiResult<String> {
    let input: mortgage_core::housing::property_tax::PropertyTaxInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let defaults = parse_defaults(defaults_json)?;
    let output = mortgage_core::housing::property_tax::estimate_property_tax(&input, &defaults)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_rent_vs_buy(input_json: String, defaults_json: Option<String>) -> NapiResult<String> {
    let input: mortgage_core::housing::rent_vs_buy::RentVsBuyInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let defaults = parse_defaults(defaults_json)?;
    let output = mortgage_core::housing::rent_vs_buy::analyze_rent_vs_buy(&input, &defaults)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Built-in market defaults, as a starting point for callers' own configuration.
#[napi]
pub fn default_market_config() -> NapiResult<String> {
    serde_json::to_string(&MarketDefaults::default()).map_err(to_napi_error)
}
