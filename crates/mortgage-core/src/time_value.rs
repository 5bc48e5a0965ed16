//! Level-payment annuity math shared by every calculator.
//!
//! Loan rates arrive as annual percentages and are converted to a monthly
//! decimal rate here; all other helpers take periodic decimal rates.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::MortgageError;
use crate::types::{
    require_non_negative, round_money, validate_rate_percent, validate_term_years, Money,
    Percent, Rate,
};
use crate::MortgageResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Convert an annual percentage (7.25) into a monthly decimal rate.
pub fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent / Decimal::ONE_HUNDRED / MONTHS_PER_YEAR
}

/// `(1 + rate)^periods`, rejecting rates whose growth overflows Decimal.
pub fn compound_factor(rate: Rate, periods: u32) -> MortgageResult<Decimal> {
    (Decimal::ONE + rate)
        .checked_powi(i64::from(periods))
        .ok_or_else(|| MortgageError::overflow("rate"))
}

/// Level monthly payment over a term expressed in years, rounded to cents.
pub fn monthly_payment(
    principal: Money,
    annual_rate_percent: Percent,
    term_years: u32,
) -> MortgageResult<Money> {
    validate_term_years("term_years", term_years)?;
    level_payment(principal, annual_rate_percent, term_years * 12)
}

/// Level monthly payment over `months` periods, rounded to cents.
///
/// `M = P·r·(1+r)^n / ((1+r)^n − 1)`; a zero rate degrades to `P / n`.
pub fn level_payment(
    principal: Money,
    annual_rate_percent: Percent,
    months: u32,
) -> MortgageResult<Money> {
    require_non_negative("principal", principal)?;
    validate_rate_percent("annual_rate_percent", annual_rate_percent)?;
    if months == 0 {
        return Err(MortgageError::invalid(
            "term",
            "Number of payments must be greater than zero",
        ));
    }

    let r = monthly_rate(annual_rate_percent);
    if r.is_zero() {
        return Ok(round_money(principal / Decimal::from(months)));
    }

    let factor = compound_factor(r, months)?;
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return Err(MortgageError::DivisionByZero {
            context: "level payment annuity factor".into(),
        });
    }

    let payment = principal
        .checked_mul(r)
        .and_then(|v| v.checked_mul(factor))
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(|| MortgageError::overflow("rate"))?;
    Ok(round_money(payment))
}

/// Outstanding balance after `paid` level payments, in closed form.
///
/// Uses the cent-rounded payment a borrower actually remits, so the result
/// tracks the amortization ledger to within rounding.
pub fn remaining_balance(
    principal: Money,
    annual_rate_percent: Percent,
    months: u32,
    paid: u32,
) -> MortgageResult<Money> {
    if paid >= months {
        return Ok(Decimal::ZERO);
    }
    let payment = level_payment(principal, annual_rate_percent, months)?;
    let r = monthly_rate(annual_rate_percent);

    let balance = if r.is_zero() {
        principal - payment * Decimal::from(paid)
    } else {
        let growth = compound_factor(r, paid)?;
        let grown = principal.checked_mul(growth);
        let repaid = payment
            .checked_mul(growth - Decimal::ONE)
            .and_then(|v| v.checked_div(r));
        grown
            .zip(repaid)
            .and_then(|(g, p)| g.checked_sub(p))
            .ok_or_else(|| MortgageError::overflow("rate"))?
    };

    Ok(round_money(balance.max(Decimal::ZERO)))
}

/// Value of a lump sum after compounding for `periods` at `rate` per period.
pub fn future_value(rate: Rate, periods: u32, present_value: Money) -> MortgageResult<Money> {
    present_value
        .checked_mul(compound_factor(rate, periods)?)
        .ok_or_else(|| MortgageError::overflow("rate"))
}

/// Accumulated value of `payment` deposited at the end of each period.
pub fn annuity_future_value(rate: Rate, periods: u32, payment: Money) -> MortgageResult<Money> {
    if rate.is_zero() {
        return Ok(payment * Decimal::from(periods));
    }
    let factor = compound_factor(rate, periods)?;
    payment
        .checked_mul(factor - Decimal::ONE)
        .and_then(|v| v.checked_div(rate))
        .ok_or_else(|| MortgageError::overflow("rate"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_known_answer() {
        // $200k at 6% for 30 years is the textbook $1,199.10
        let pmt = monthly_payment(dec!(200_000), dec!(6), 30).unwrap();
        assert_eq!(pmt, dec!(1199.10));
    }

    #[test]
    fn test_payment_scenario_520k() {
        let pmt = monthly_payment(dec!(520_000), dec!(7.25), 30).unwrap();
        assert!((pmt - dec!(3547.32)).abs() < dec!(0.05), "got {pmt}");
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let pmt = monthly_payment(dec!(360_000), Decimal::ZERO, 30).unwrap();
        assert_eq!(pmt, dec!(1000));
    }

    #[test]
    fn test_zero_principal() {
        let pmt = monthly_payment(Decimal::ZERO, dec!(5), 15).unwrap();
        assert_eq!(pmt, Decimal::ZERO);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(monthly_payment(dec!(-1), dec!(5), 30).is_err());
        assert!(monthly_payment(dec!(1000), dec!(-0.5), 30).is_err());
        assert!(monthly_payment(dec!(1000), dec!(5), 0).is_err());
        assert!(level_payment(dec!(1000), dec!(5), 0).is_err());
    }

    #[test]
    fn test_remaining_balance_endpoints() {
        let p = dec!(300_000);
        assert_eq!(remaining_balance(p, dec!(6.5), 360, 0).unwrap(), p);
        assert_eq!(remaining_balance(p, dec!(6.5), 360, 360).unwrap(), Decimal::ZERO);
        let mid = remaining_balance(p, dec!(6.5), 360, 180).unwrap();
        assert!(mid > Decimal::ZERO && mid < p);
    }

    #[test]
    fn test_remaining_balance_zero_rate() {
        let bal = remaining_balance(dec!(12_000), Decimal::ZERO, 120, 60).unwrap();
        assert_eq!(bal, dec!(6000));
    }

    #[test]
    fn test_overflowing_payment_is_rejected() {
        // (1 + 1/12)^600 fits, but principal * r * factor does not
        match monthly_payment(dec!(2_000_000_000), dec!(100), 50).unwrap_err() {
            MortgageError::InvalidInput { field, .. } => assert_eq!(field, "rate"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
        assert!(remaining_balance(dec!(2_000_000_000), dec!(100), 600, 300).is_err());
    }

    #[test]
    fn test_overflowing_growth_is_rejected() {
        let huge = dec!(1_000_000_000_000_000);
        assert!(future_value(Decimal::ONE, 50, huge).is_err());
        assert!(annuity_future_value(dec!(0.5), 120, huge).is_err());
    }

    #[test]
    fn test_future_values() {
        let fv = future_value(dec!(0.10), 2, dec!(100)).unwrap();
        assert_eq!(fv, dec!(121));
        let afv = annuity_future_value(dec!(0.10), 2, dec!(100)).unwrap();
        assert_eq!(afv, dec!(210));
        let flat = annuity_future_value(Decimal::ZERO, 12, dec!(50)).unwrap();
        assert_eq!(flat, dec!(600));
    }
}
