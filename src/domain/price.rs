use alloy::primitives::{Address, I256, U256};
use std::collections::HashMap;

use super::MarketInfo;
use crate::error::{Result, TraderError};

/// Stand-in min/max price for a short token missing from the signed price feed
pub const SHORT_SIDE_SENTINEL_PRICE: U256 = U256::from_limbs([0x1bce_cced_a100_0000, 0xd3c2, 0, 0]);

/// Oracle min/max pair for one token, scaled to 1e30 / 10^token_decimals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    pub min_price: U256,
    pub max_price: U256,
}

impl PriceQuote {
    pub fn new(min_price: U256, max_price: U256) -> Self {
        Self {
            min_price,
            max_price,
        }
    }

    /// Parse the provider's decimal integer strings
    pub fn from_decimal_strings(min_price: &str, max_price: &str) -> Result<Self> {
        Ok(Self {
            min_price: parse_price(min_price)?,
            max_price: parse_price(max_price)?,
        })
    }

    /// Median of {min, max} as a double.
    ///
    /// Each bound is converted through its decimal string so the result is
    /// the correctly rounded double of the exact integer.
    pub fn median(&self) -> f64 {
        (to_f64(self.max_price) + to_f64(self.min_price)) / 2.0
    }

    fn sentinel() -> Self {
        Self::new(SHORT_SIDE_SENTINEL_PRICE, SHORT_SIDE_SENTINEL_PRICE)
    }
}

fn parse_price(raw: &str) -> Result<U256> {
    if raw.trim().is_empty() {
        return Err(TraderError::InvalidMarketData("empty price".into()));
    }
    U256::from_str_radix(raw.trim(), 10)
        .map_err(|e| TraderError::InvalidMarketData(format!("invalid price '{raw}': {e}")))
}

pub(crate) fn to_f64(value: U256) -> f64 {
    value.to_string().parse::<f64>().unwrap_or(f64::INFINITY)
}

/// Reader preview of where a position order would fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionPreview {
    /// Scaled like oracle prices, 1e30 / 10^index_decimals
    pub execution_price: U256,
    /// USD scaled by 1e30; negative when the order pays impact
    pub price_impact: I256,
    pub index_decimals: u8,
}

impl ExecutionPreview {
    pub fn execution_price_usd(&self) -> f64 {
        let scale = i32::from(super::USD_DECIMALS) - i32::from(self.index_decimals);
        to_f64(self.execution_price) / 10f64.powi(scale)
    }

    pub fn price_impact_usd(&self) -> f64 {
        let magnitude = to_f64(self.price_impact.unsigned_abs())
            / 10f64.powi(i32::from(super::USD_DECIMALS));
        if self.price_impact.is_negative() {
            -magnitude
        } else {
            magnitude
        }
    }
}

/// Index/long/short prices for one market, in the reader's argument order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketPrices {
    pub index: PriceQuote,
    pub long: PriceQuote,
    pub short: PriceQuote,
}

/// One oracle snapshot, keyed by token address
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    quotes: HashMap<Address, PriceQuote>,
}

impl PriceTable {
    pub fn new(quotes: HashMap<Address, PriceQuote>) -> Self {
        Self { quotes }
    }

    pub fn insert(&mut self, token: Address, quote: PriceQuote) {
        self.quotes.insert(token, quote);
    }

    pub fn get(&self, token: Address) -> Result<&PriceQuote> {
        self.quotes
            .get(&token)
            .ok_or(TraderError::MissingPriceData { token })
    }

    /// Prices for a market's three tokens.
    ///
    /// The feed does not publish every stable token, so a missing short-side
    /// price falls back to [`SHORT_SIDE_SENTINEL_PRICE`]. Index and long
    /// prices are always required.
    pub fn market_prices(&self, market: &MarketInfo) -> Result<MarketPrices> {
        let index = *self.get(market.index_token)?;
        let long = *self.get(market.long_token)?;
        let short = self
            .quotes
            .get(&market.short_token)
            .copied()
            .unwrap_or_else(PriceQuote::sentinel);

        Ok(MarketPrices { index, long, short })
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}
