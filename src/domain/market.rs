use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Token metadata as published by the protocol's token list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

/// A protocol market: the market token plus its index/long/short tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketInfo {
    pub market_token: Address,
    pub symbol: String,
    /// As reported by the reader; unlisted for swap-only markets
    pub index_token: Address,
    pub long_token: Address,
    pub short_token: Address,
    /// Decimals of the index token; `None` for swap-only markets
    pub index_decimals: Option<u8>,
}

impl MarketInfo {
    /// Decode one reader entry against the published token list.
    ///
    /// A zero index token, or one missing from the list, marks a swap-only
    /// market, labelled `SWAP {long}-{short}`.
    pub fn decode(
        market_token: Address,
        index_token: Address,
        long_token: Address,
        short_token: Address,
        tokens: &HashMap<Address, TokenInfo>,
    ) -> Self {
        let symbol_of = |token: &Address| {
            tokens
                .get(token)
                .map(|t| t.symbol.clone())
                .unwrap_or_else(|| token.to_string())
        };

        // The token list may carry the native coin at the zero address
        let listed_index = tokens.get(&index_token).filter(|_| !index_token.is_zero());
        let (symbol, index_decimals) = match listed_index {
            Some(index) => (index.symbol.clone(), Some(index.decimals)),
            None => (
                format!("SWAP {}-{}", symbol_of(&long_token), symbol_of(&short_token)),
                None,
            ),
        };

        Self {
            market_token,
            symbol,
            index_token,
            long_token,
            short_token,
            index_decimals,
        }
    }

    /// Swap-only markets have no listed index token and cannot carry positions
    pub fn is_swap_only(&self) -> bool {
        self.index_decimals.is_none()
    }

    /// Whether `token` is one of the two pooled collateral tokens
    pub fn is_collateral(&self, token: Address) -> bool {
        self.long_token == token || self.short_token == token
    }
}

/// Snapshot of the available markets on one chain, in reader order
#[derive(Debug, Clone, Default)]
pub struct MarketSet {
    markets: Vec<MarketInfo>,
    by_address: HashMap<Address, usize>,
}

impl MarketSet {
    pub fn new(markets: Vec<MarketInfo>) -> Self {
        let by_address = markets
            .iter()
            .enumerate()
            .map(|(i, m)| (m.market_token, i))
            .collect();
        Self {
            markets,
            by_address,
        }
    }

    pub fn get(&self, market: &Address) -> Option<&MarketInfo> {
        self.by_address.get(market).map(|&i| &self.markets[i])
    }

    /// First market (in reader order) whose index token is `token`
    pub fn find_by_index_token(&self, token: Address) -> Option<&MarketInfo> {
        self.markets.iter().find(|m| m.index_token == token)
    }

    /// Markets that can carry positions (swap-only markets excluded)
    pub fn trade_markets(&self) -> impl Iterator<Item = &MarketInfo> {
        self.markets.iter().filter(|m| !m.is_swap_only())
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarketInfo> {
        self.markets.iter()
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}

/// Ordered list of markets a swap traverses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRoute {
    pub hops: Vec<Address>,
    pub multi_hop: bool,
}

impl SwapRoute {
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }
}
