//! Fixed-point arithmetic and valuation math.
//!
//! All monetary quantities are `u128` integers at the 18-decimal working scale.
//! Multiply-then-divide sequences go through a 256-bit intermediate so that no
//! product of two working-scale values can overflow before the final rescale.
//! Every division rounds down.

use primitive_types::U256;
use rust_decimal::prelude::*;

use crate::error::{Error, Result};
use crate::utils::constants::{MAX_FEED_DECIMALS, PRECISION, WAD_DECIMALS};

// ═══════════════════════════════════════════════════════════════════════════════
// WIDE ARITHMETIC
// ═══════════════════════════════════════════════════════════════════════════════

/// 10^exp as u128
pub fn pow10(exp: u32) -> Result<u128> {
    10u128.checked_pow(exp).ok_or(Error::Overflow {
        operation: format!("10^{}", exp),
    })
}

/// Computes `floor(a * b / denominator)` with a 256-bit intermediate
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128> {
    if denominator == 0 {
        return Err(Error::InvalidParameter {
            name: "divisor".into(),
            reason: "division by zero".into(),
        });
    }
    let result = U256::from(a) * U256::from(b) / U256::from(denominator);
    if result > U256::from(u128::MAX) {
        return Err(Error::Overflow {
            operation: format!("({} * {}) / {}", a, b, denominator),
        });
    }
    Ok(result.low_u128())
}

/// Checked addition reporting the operation on overflow
pub fn safe_add(a: u128, b: u128) -> Result<u128> {
    a.checked_add(b).ok_or(Error::Overflow {
        operation: format!("{} + {}", a, b),
    })
}

/// Checked subtraction reporting the shortfall as an insufficient balance
pub fn safe_sub(balance: u128, amount: u128) -> Result<u128> {
    balance.checked_sub(amount).ok_or(Error::InsufficientBalance {
        requested: amount,
        available: balance,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRICE SCALING
// ═══════════════════════════════════════════════════════════════════════════════

/// Rescale a raw feed price with `decimals` decimals to the working scale.
///
/// Feeds with more than 18 decimals are truncated; the loss is below one unit
/// of the last working-scale digit.
pub fn scale_price(price: u128, decimals: u32) -> Result<u128> {
    if decimals > MAX_FEED_DECIMALS {
        return Err(Error::InvalidParameter {
            name: "price_decimals".into(),
            reason: format!("{} exceeds maximum {}", decimals, MAX_FEED_DECIMALS),
        });
    }
    if decimals <= WAD_DECIMALS {
        let factor = pow10(WAD_DECIMALS - decimals)?;
        price.checked_mul(factor).ok_or(Error::Overflow {
            operation: format!("scale price {} by 10^{}", price, WAD_DECIMALS - decimals),
        })
    } else {
        Ok(price / pow10(decimals - WAD_DECIMALS)?)
    }
}

/// USD value of `amount` units of an asset priced at `price_wad` (working scale)
pub fn usd_value(amount: u128, price_wad: u128) -> Result<u128> {
    mul_div(amount, price_wad, PRECISION)
}

/// Asset quantity worth `usd_amount` at `price_wad`, rounded down
pub fn token_amount_from_usd(usd_amount: u128, price_wad: u128) -> Result<u128> {
    if price_wad == 0 {
        return Err(Error::InvalidParameter {
            name: "price".into(),
            reason: "cannot be zero".into(),
        });
    }
    mul_div(usd_amount, PRECISION, price_wad)
}

// ═══════════════════════════════════════════════════════════════════════════════
// RISK CALCULATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Health factor for a position with non-zero debt:
/// `(collateral_usd * threshold / liquidation_precision) * precision / debt`
///
/// Returns [`Error::UndefinedHealthFactor`] when `debt` is zero. Factors too
/// large for `u128` (dust debt against large collateral) saturate at `u128::MAX`.
pub fn calculate_health_factor(
    collateral_usd: u128,
    debt: u128,
    threshold: u128,
    liquidation_precision: u128,
    precision: u128,
) -> Result<u128> {
    if debt == 0 {
        return Err(Error::UndefinedHealthFactor);
    }
    let adjusted = mul_div(collateral_usd, threshold, liquidation_precision)?;
    let factor = U256::from(adjusted) * U256::from(precision) / U256::from(debt);
    Ok(factor.min(U256::from(u128::MAX)).low_u128())
}

/// Bonus paid on top of `base` at `bonus / liquidation_precision`
pub fn liquidation_bonus(base: u128, bonus: u128, liquidation_precision: u128) -> Result<u128> {
    mul_div(base, bonus, liquidation_precision)
}

// ═══════════════════════════════════════════════════════════════════════════════
// DECIMAL CONVERSION
// ═══════════════════════════════════════════════════════════════════════════════

/// Parse a human decimal string ("15", "0.05") into a working-scale integer.
/// Digits beyond 18 decimals are truncated.
pub fn parse_units(value: &str) -> Result<u128> {
    let invalid = |reason: String| Error::InvalidParameter {
        name: "amount".into(),
        reason,
    };
    let decimal = Decimal::from_str(value.trim()).map_err(|e| invalid(e.to_string()))?;
    if decimal.is_sign_negative() {
        return Err(invalid(format!("{} is negative", value)));
    }
    let truncated = decimal.round_dp_with_strategy(WAD_DECIMALS, RoundingStrategy::ToZero);
    let mantissa = truncated.mantissa() as u128;
    let factor = pow10(WAD_DECIMALS - truncated.scale())?;
    mantissa.checked_mul(factor).ok_or(Error::Overflow {
        operation: format!("parse {}", value),
    })
}

/// Format a working-scale integer as a trimmed decimal string
pub fn format_units(value: u128) -> String {
    if let Ok(mantissa) = i128::try_from(value) {
        if let Ok(decimal) = Decimal::try_from_i128_with_scale(mantissa, WAD_DECIMALS) {
            return decimal.normalize().to_string();
        }
    }
    let whole = value / PRECISION;
    let frac = value % PRECISION;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:018}", frac);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
