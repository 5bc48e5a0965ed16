//! Jurisdictional property tax estimate with homeowner exemptions.
//!
//! Base tax is the price times the jurisdiction's combined county, school,
//! city and special-district rate. Exemptions are then taken off the bill in
//! a fixed order (homestead, senior, veteran); each is limited to whatever
//! tax is left, so the bill never goes negative.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::{JurisdictionRates, MarketDefaults};
use crate::types::{require_positive, round_money, with_metadata, ComputationOutput, Money, Rate};
use crate::MortgageResult;

const HOMESTEAD_RATE: Rate = dec!(0.02);
const HOMESTEAD_CAP: Money = dec!(7_000);
const SENIOR_RATE: Rate = dec!(0.04);
const SENIOR_CAP: Money = dec!(5_000);
const SENIOR_PRICE_LIMIT: Money = dec!(400_000);
const VETERAN_RATE: Rate = dec!(0.01);
const VETERAN_CAP: Money = dec!(4_000);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyTaxInput {
    pub home_price: Money,
    /// Jurisdiction key; the configured default is used when absent or unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(default)]
    pub homestead: bool,
    #[serde(default)]
    pub senior: bool,
    #[serde(default)]
    pub veteran: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExemptionKind {
    Homestead,
    Senior,
    Veteran,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExemptionApplied {
    pub kind: ExemptionKind,
    /// Statutory amount before limiting to the remaining tax.
    pub eligible_amount: Money,
    /// Amount actually deducted.
    pub applied_amount: Money,
}

/// Tax owed to each taxing unit before exemptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxComponents {
    pub county: Money,
    pub school: Money,
    pub city: Money,
    pub special_district: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyTaxOutput {
    pub jurisdiction: String,
    pub rates: JurisdictionRates,
    pub combined_rate: Rate,
    pub components: TaxComponents,
    pub base_tax: Money,
    pub exemptions: Vec<ExemptionApplied>,
    pub total_exemptions: Money,
    pub annual_tax: Money,
    pub monthly_tax: Money,
    /// Annual tax after exemptions as a fraction of price.
    pub effective_rate: Rate,
}

/// Estimate the annual property tax bill.
pub fn estimate_property_tax(
    input: &PropertyTaxInput,
    defaults: &MarketDefaults,
) -> MortgageResult<ComputationOutput<PropertyTaxOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    require_positive("home_price", input.home_price)?;

    let requested = input
        .jurisdiction
        .as_deref()
        .unwrap_or(defaults.default_jurisdiction.as_str());
    let resolved = defaults.jurisdiction(requested)?;
    if resolved.fell_back {
        warnings.push(format!(
            "Unknown jurisdiction '{requested}'; using '{}' rates",
            resolved.key
        ));
    }

    let price = input.home_price;
    let rates = resolved.rates.clone();
    let combined_rate = rates.total();
    let components = TaxComponents {
        county: round_money(price * rates.county),
        school: round_money(price * rates.school),
        city: round_money(price * rates.city),
        special_district: round_money(price * rates.special_district),
    };
    let base_tax = round_money(price * combined_rate);

    let mut eligible: Vec<(ExemptionKind, Money)> = Vec::new();
    if input.homestead {
        eligible.push((
            ExemptionKind::Homestead,
            (price * HOMESTEAD_RATE).min(HOMESTEAD_CAP),
        ));
    }
    if input.senior {
        if price < SENIOR_PRICE_LIMIT {
            eligible.push((ExemptionKind::Senior, (price * SENIOR_RATE).min(SENIOR_CAP)));
        } else {
            warnings.push("Senior exemption applies only to homes priced under $400,000".into());
        }
    }
    if input.veteran {
        eligible.push((
            ExemptionKind::Veteran,
            (price * VETERAN_RATE).min(VETERAN_CAP),
        ));
    }

    let mut remaining = base_tax;
    let exemptions: Vec<ExemptionApplied> = eligible
        .into_iter()
        .map(|(kind, amount)| {
            let eligible_amount = round_money(amount);
            let applied_amount = eligible_amount.min(remaining);
            remaining -= applied_amount;
            ExemptionApplied {
                kind,
                eligible_amount,
                applied_amount,
            }
        })
        .collect();
    let total_exemptions = base_tax - remaining;

    if remaining.is_zero() && !exemptions.is_empty() {
        warnings.push("Exemptions eliminate the entire tax bill".into());
    }

    let output = PropertyTaxOutput {
        jurisdiction: resolved.key.to_string(),
        rates,
        combined_rate,
        components,
        base_tax,
        exemptions,
        total_exemptions,
        annual_tax: remaining,
        monthly_tax: round_money(remaining / dec!(12)),
        effective_rate: (remaining / price).round_dp(6),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Jurisdictional rate table with ordered homestead, senior and veteran exemptions",
        input,
        warnings,
        elapsed,
        output,
    ))
}
