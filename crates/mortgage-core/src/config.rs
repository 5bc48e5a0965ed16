//! Market assumptions supplied by the caller: default escrow rates, PMI policy,
//! underwriting ratio and the jurisdictional property-tax table.
//!
//! Nothing here is a global. Callers build a [`MarketDefaults`] (usually via
//! `Default`, or deserialised from a config file) and pass it into the
//! calculators that need it.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::MortgageError;
use crate::types::{require_unit_interval, Rate};
use crate::MortgageResult;

/// Rate components of a single taxing jurisdiction, as fractions of market value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JurisdictionRates {
    pub county: Rate,
    pub school: Rate,
    pub city: Rate,
    pub special_district: Rate,
}

impl JurisdictionRates {
    pub fn total(&self) -> Rate {
        self.county + self.school + self.city + self.special_district
    }
}

/// Escrow and underwriting defaults used when a request leaves a value unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDefaults {
    /// Annual homeowners insurance as a fraction of price.
    pub insurance_rate: Rate,
    /// Annual PMI premium as a fraction of the loan amount.
    pub pmi_rate: Rate,
    /// Down-payment ratio at or above which PMI is not charged.
    pub pmi_down_payment_threshold: Rate,
    /// Housing-cost-to-income ceiling used by the affordability solver.
    pub front_end_ratio: Rate,
    /// Jurisdiction used when a request names none or an unknown one. Its
    /// combined rate is also the flat property-tax rate for budgeting.
    pub default_jurisdiction: String,
    pub jurisdictions: BTreeMap<String, JurisdictionRates>,
}

impl Default for MarketDefaults {
    fn default() -> Self {
        let mut jurisdictions = BTreeMap::new();
        jurisdictions.insert(
            "default".to_string(),
            JurisdictionRates {
                county: dec!(0.0025),
                school: dec!(0.0065),
                city: dec!(0.0020),
                special_district: dec!(0.0010),
            },
        );
        jurisdictions.insert(
            "travis".to_string(),
            JurisdictionRates {
                county: dec!(0.00375),
                school: dec!(0.0098),
                city: dec!(0.0045),
                special_district: dec!(0.0010),
            },
        );
        jurisdictions.insert(
            "harris".to_string(),
            JurisdictionRates {
                county: dec!(0.0038),
                school: dec!(0.0105),
                city: dec!(0.0053),
                special_district: dec!(0.0012),
            },
        );
        jurisdictions.insert(
            "dallas".to_string(),
            JurisdictionRates {
                county: dec!(0.0022),
                school: dec!(0.0108),
                city: dec!(0.0073),
                special_district: dec!(0.0011),
            },
        );
        jurisdictions.insert(
            "bexar".to_string(),
            JurisdictionRates {
                county: dec!(0.0028),
                school: dec!(0.0120),
                city: dec!(0.0054),
                special_district: dec!(0.0014),
            },
        );

        MarketDefaults {
            insurance_rate: dec!(0.0035),
            pmi_rate: dec!(0.005),
            pmi_down_payment_threshold: dec!(0.20),
            front_end_ratio: dec!(0.28),
            default_jurisdiction: "default".to_string(),
            jurisdictions,
        }
    }
}

/// Result of a jurisdiction lookup.
#[derive(Debug, Clone)]
pub struct ResolvedJurisdiction<'a> {
    pub key: &'a str,
    pub rates: &'a JurisdictionRates,
    /// True when the requested key was unknown and the default was used.
    pub fell_back: bool,
}

impl MarketDefaults {
    /// Check that every rate is a sane fraction and the default jurisdiction exists.
    pub fn validate(&self) -> MortgageResult<()> {
        require_unit_interval("insurance_rate", self.insurance_rate)?;
        require_unit_interval("pmi_rate", self.pmi_rate)?;
        require_unit_interval("pmi_down_payment_threshold", self.pmi_down_payment_threshold)?;
        require_unit_interval("front_end_ratio", self.front_end_ratio)?;

        for (key, rates) in &self.jurisdictions {
            for component in [
                rates.county,
                rates.school,
                rates.city,
                rates.special_district,
            ] {
                if component < Decimal::ZERO || component > Decimal::ONE {
                    return Err(MortgageError::Config(format!(
                        "jurisdiction '{key}' has a rate component outside [0, 1]"
                    )));
                }
            }
        }

        self.default_property_tax_rate().map(|_| ())
    }

    /// Combined rate of the default jurisdiction, used as the property-tax
    /// rate wherever a request gives neither a rate nor a jurisdiction.
    pub fn default_property_tax_rate(&self) -> MortgageResult<Rate> {
        self.lookup(&self.default_jurisdiction)
            .map(|(_, rates)| rates.total())
            .ok_or_else(|| self.missing_default())
    }

    /// Resolve a jurisdiction key, falling back to the default jurisdiction.
    pub fn jurisdiction(&self, key: &str) -> MortgageResult<ResolvedJurisdiction<'_>> {
        if let Some((found, rates)) = self.lookup(key) {
            return Ok(ResolvedJurisdiction {
                key: found,
                rates,
                fell_back: false,
            });
        }

        tracing::warn!(
            requested = key,
            fallback = %self.default_jurisdiction,
            "unknown jurisdiction, using default rates"
        );
        let (found, rates) = self
            .lookup(&self.default_jurisdiction)
            .ok_or_else(|| self.missing_default())?;
        Ok(ResolvedJurisdiction {
            key: found,
            rates,
            fell_back: true,
        })
    }

    fn missing_default(&self) -> MortgageError {
        MortgageError::Config(format!(
            "default jurisdiction '{}' is not in the jurisdiction table",
            self.default_jurisdiction
        ))
    }

    fn lookup(&self, key: &str) -> Option<(&str, &JurisdictionRates)> {
        let wanted = key.trim().to_ascii_lowercase();
        self.jurisdictions
            .iter()
            .find(|(k, _)| k.to_ascii_lowercase() == wanted)
            .map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_validate() {
        assert!(MarketDefaults::default().validate().is_ok());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let defaults = MarketDefaults::default();
        let resolved = defaults.jurisdiction("  Travis ").unwrap();
        assert_eq!(resolved.key, "travis");
        assert!(!resolved.fell_back);
    }

    #[test]
    fn test_unknown_jurisdiction_falls_back() {
        let defaults = MarketDefaults::default();
        let resolved = defaults.jurisdiction("atlantis").unwrap();
        assert_eq!(resolved.key, "default");
        assert!(resolved.fell_back);
        assert_eq!(resolved.rates.total(), dec!(0.012));
    }

    #[test]
    fn test_flat_tax_rate_follows_default_jurisdiction() {
        let mut defaults = MarketDefaults::default();
        assert_eq!(defaults.default_property_tax_rate().unwrap(), dec!(0.012));
        defaults.default_jurisdiction = "Dallas".into();
        assert_eq!(defaults.default_property_tax_rate().unwrap(), dec!(0.0214));
        let resolved = defaults.jurisdiction("nowhere").unwrap();
        assert_eq!(resolved.rates.total(), dec!(0.0214));
    }

    #[test]
    fn test_missing_default_jurisdiction_rejected() {
        let defaults = MarketDefaults {
            default_jurisdiction: "nowhere".into(),
            ..MarketDefaults::default()
        };
        assert!(defaults.validate().is_err());
        assert!(defaults.jurisdiction("also-nowhere").is_err());
        assert!(defaults.default_property_tax_rate().is_err());
    }

    #[test]
    fn test_partial_config_takes_defaults() {
        let parsed: MarketDefaults =
            serde_json::from_str(r#"{ "insurance_rate": "0.005" }"#).unwrap();
        assert_eq!(parsed.insurance_rate, dec!(0.005));
        assert_eq!(parsed.pmi_rate, dec!(0.005));
        assert!(parsed.jurisdictions.contains_key("harris"));
    }
}
