use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use super::price::to_f64;
use super::{Direction, MarketSet, USD_DECIMALS};

/// An open position as stored by the protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub market: Address,
    pub collateral_token: Address,
    pub direction: Direction,
    /// Scaled by 1e30
    pub size_in_usd: U256,
    pub size_in_tokens: U256,
    /// In the collateral token's native decimals
    pub collateral_amount: U256,
}

impl OpenPosition {
    /// `{INDEX}_{direction}` label, e.g. `ETH_short`
    pub fn label(&self, markets: &MarketSet) -> String {
        let symbol = markets
            .get(&self.market)
            .map(|m| m.symbol.to_ascii_uppercase())
            .unwrap_or_else(|| self.market.to_string());
        format!("{}_{}", symbol, self.direction)
    }

    pub fn size_usd(&self) -> f64 {
        to_f64(self.size_in_usd) / 10f64.powi(i32::from(USD_DECIMALS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MarketInfo;
    use alloy::primitives::address;

    #[test]
    fn test_label_uses_index_symbol_and_direction() {
        let market = address!("70d95587d40A2caf56bd97485aB3Eec10Bee6336");
        let weth = address!("82aF49447D8a07e3bd95BD0d56f35241523fBab1");
        let markets = MarketSet::new(vec![MarketInfo {
            market_token: market,
            symbol: "eth".to_string(),
            index_token: weth,
            long_token: weth,
            short_token: address!("af88d065e77c8cC2239327C5EDb3A432268e5831"),
            index_decimals: Some(18),
        }]);

        let position = OpenPosition {
            market,
            collateral_token: weth,
            direction: Direction::Short,
            size_in_usd: U256::from(25u64) * U256::from(10u64).pow(U256::from(29u64)),
            size_in_tokens: U256::ZERO,
            collateral_amount: U256::ZERO,
        };
        assert_eq!(position.label(&markets), "ETH_short");
        assert!((position.size_usd() - 2.5).abs() < 1e-12);
        assert_eq!(
            position.label(&MarketSet::default()),
            format!("{market}_short")
        );
    }
}
