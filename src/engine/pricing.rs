//! Mark and acceptable price derivation.
//!
//! The acceptable price carried by an order is the slippage-adjusted median,
//! truncated to an integer and then widened by right-padding its decimal
//! digits with zeros to [`ACCEPTABLE_PRICE_WIDTH`] characters. Prices that
//! already have that many digits are left alone, so the widening is not a
//! fixed power of ten.

use alloy::primitives::U256;
use serde::Serialize;

use crate::domain::price::to_f64;
use crate::domain::{Direction, PriceIntent, USD_DECIMALS};

/// Total digit count the acceptable price is padded to
pub const ACCEPTABLE_PRICE_WIDTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AcceptablePrice {
    pub median: f64,
    /// Truncated median for opens, zero for closes and swaps
    pub mark_price: U256,
    /// Slippage-adjusted price before widening
    pub acceptable_price: U256,
    /// Widened value sent with the order
    pub acceptable_price_raw: U256,
    /// Un-widened `acceptable_price / 10^(30 - index decimals)`, display only.
    ///
    /// The widened value is not used here: its scale depends on how many
    /// digits were padded, so dividing it by a fixed power of ten is only
    /// right for prices that gained exactly three digits.
    pub acceptable_price_usd: f64,
}

/// Direction-adjusted worst price the trader accepts.
///
/// `decimals` are the index token's decimals; they only affect the USD figure.
pub fn compute_acceptable_price(
    median: f64,
    direction: Direction,
    intent: PriceIntent,
    slippage: f64,
    decimals: u8,
) -> AcceptablePrice {
    let adjusted = match (intent, direction) {
        (PriceIntent::Open, Direction::Long) | (PriceIntent::Close, Direction::Short) => {
            Some(median + median * slippage)
        }
        (PriceIntent::Open, Direction::Short) | (PriceIntent::Close, Direction::Long) => {
            Some(median - median * slippage)
        }
        (PriceIntent::Swap, _) => None,
    };

    let acceptable_price = adjusted.map(truncate_to_u256).unwrap_or(U256::ZERO);
    let acceptable_price_raw = match adjusted {
        Some(_) => widen(acceptable_price),
        None => U256::ZERO,
    };

    let mark_price = match intent {
        PriceIntent::Open => truncate_to_u256(median),
        PriceIntent::Close | PriceIntent::Swap => U256::ZERO,
    };

    let scale = i32::from(USD_DECIMALS) - i32::from(decimals);
    let acceptable_price_usd = to_f64(acceptable_price) / 10f64.powi(scale);

    AcceptablePrice {
        median,
        mark_price,
        acceptable_price,
        acceptable_price_raw,
        acceptable_price_usd,
    }
}

/// Right-pad the decimal representation with zeros to the fixed width
pub fn widen(value: U256) -> U256 {
    let digits = value.to_string();
    if digits.len() >= ACCEPTABLE_PRICE_WIDTH {
        return value;
    }
    let padded = format!("{digits:0<width$}", width = ACCEPTABLE_PRICE_WIDTH);
    U256::from_str_radix(&padded, 10).unwrap_or(value)
}

/// Exact integer part of a non-negative double; negatives and NaN map to zero
pub fn truncate_to_u256(value: f64) -> U256 {
    if value.is_nan() || value < 1.0 {
        return U256::ZERO;
    }
    if value.is_infinite() {
        return U256::MAX;
    }

    let truncated = value.trunc();
    if truncated < 2f64.powi(128) {
        return U256::from(truncated as u128);
    }

    // Beyond u128 the double is mantissa * 2^exp with exp > 0, so the shift is exact
    let bits = truncated.to_bits();
    let exponent = ((bits >> 52) & 0x7ff) as usize - 1075;
    let mantissa = (bits & ((1u64 << 52) - 1)) | (1u64 << 52);
    if exponent + 53 > 256 {
        return U256::MAX;
    }
    U256::from(mantissa) << exponent
}
