//! Human-unit order parameters resolved into an [`OrderRequest`].
//!
//! Symbols are matched case-insensitively against the published token list,
//! and decimal amounts are scaled exactly: USD sizes by 1e30, token amounts by
//! the token's own decimals.

use alloy::primitives::{Address, U256};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::domain::{
    Direction, MarketInfo, MarketSet, OpenPosition, OrderKind, OrderRequest, PositionTarget,
    TokenInfo, USD_DECIMALS,
};
use crate::error::{Result, TraderError};

#[derive(Debug, Clone, PartialEq)]
pub struct PositionParameters {
    pub chain: String,
    pub index_symbol: String,
    pub collateral_symbol: String,
    pub direction: Direction,
    /// USD notional to add or remove
    pub size_usd: Decimal,
    /// Whole collateral tokens to deposit or withdraw
    pub collateral_amount: Decimal,
    /// Fraction, e.g. 0.03
    pub slippage: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwapParameters {
    pub chain: String,
    pub start_symbol: String,
    pub out_symbol: String,
    /// Whole start tokens
    pub amount: Decimal,
    pub slippage: Decimal,
}

/// Token list indexed by uppercase symbol
#[derive(Debug, Clone, Default)]
pub struct TokenDirectory {
    by_symbol: HashMap<String, TokenInfo>,
}

impl TokenDirectory {
    pub fn new(tokens: Vec<TokenInfo>) -> Self {
        let mut by_symbol: HashMap<String, TokenInfo> = HashMap::new();
        for token in tokens {
            let key = token.symbol.to_ascii_uppercase();
            // The list also carries native placeholders at the zero address
            let keep_existing = by_symbol
                .get(&key)
                .map(|existing| !existing.address.is_zero())
                .unwrap_or(false);
            if !keep_existing {
                by_symbol.insert(key, token);
            }
        }
        Self { by_symbol }
    }

    pub fn by_symbol(&self, symbol: &str) -> Result<&TokenInfo> {
        self.by_symbol
            .get(&symbol.trim().to_ascii_uppercase())
            .ok_or_else(|| TraderError::Validation(format!("unknown token symbol '{symbol}'")))
    }

    pub fn by_address(&self, address: Address) -> Option<&TokenInfo> {
        self.by_symbol.values().find(|t| t.address == address)
    }

    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }
}

/// Trade market for an index symbol, preferring one that pools the collateral
pub fn find_trade_market<'a>(
    markets: &'a MarketSet,
    index_symbol: &str,
    collateral_token: Address,
) -> Result<&'a MarketInfo> {
    let candidates: Vec<&MarketInfo> = markets
        .trade_markets()
        .filter(|m| m.symbol.eq_ignore_ascii_case(index_symbol.trim()))
        .collect();

    candidates
        .iter()
        .find(|m| m.is_collateral(collateral_token))
        .or_else(|| candidates.first())
        .copied()
        .ok_or_else(|| TraderError::Validation(format!("no trade market for '{index_symbol}'")))
}

pub fn position_request(
    kind: OrderKind,
    params: &PositionParameters,
    markets: &MarketSet,
    tokens: &TokenDirectory,
) -> Result<OrderRequest> {
    let collateral = tokens.by_symbol(&params.collateral_symbol)?;
    let market = find_trade_market(markets, &params.index_symbol, collateral.address)?;

    let target = PositionTarget {
        market: market.market_token,
        collateral_token: collateral.address,
        index_token: market.index_token,
        direction: params.direction,
    };
    let size_delta_usd = scale_decimal(params.size_usd, u32::from(USD_DECIMALS))?;
    let collateral_delta = scale_decimal(params.collateral_amount, u32::from(collateral.decimals))?;
    let slippage = slippage_fraction(params.slippage)?;

    let request = match kind {
        OrderKind::Increase => OrderRequest::increase(
            params.chain.clone(),
            target,
            size_delta_usd,
            collateral_delta,
            slippage,
        ),
        OrderKind::Decrease => OrderRequest::decrease(
            params.chain.clone(),
            target,
            size_delta_usd,
            collateral_delta,
            slippage,
        ),
        OrderKind::Swap => {
            return Err(TraderError::Validation(
                "use swap_request for swap orders".into(),
            ))
        }
    };

    request.validate()?;
    Ok(request)
}

pub fn swap_request(params: &SwapParameters, tokens: &TokenDirectory) -> Result<OrderRequest> {
    let start = tokens.by_symbol(&params.start_symbol)?;
    let out = tokens.by_symbol(&params.out_symbol)?;
    let amount = scale_decimal(params.amount, u32::from(start.decimals))?;

    let request = OrderRequest::swap(
        params.chain.clone(),
        start.address,
        out.address,
        amount,
        slippage_fraction(params.slippage)?,
    );
    request.validate()?;
    Ok(request)
}

/// Decrease order that closes the whole open position on `market_symbol`.
///
/// Positions are matched by index symbol and direction; the first match in
/// reader order is closed.
pub fn close_position_request(
    chain: &str,
    positions: &[OpenPosition],
    markets: &MarketSet,
    market_symbol: &str,
    direction: Direction,
    slippage: Decimal,
) -> Result<OrderRequest> {
    let (position, market) = positions
        .iter()
        .filter(|p| p.direction == direction)
        .find_map(|p| {
            markets
                .get(&p.market)
                .filter(|m| m.symbol.eq_ignore_ascii_case(market_symbol.trim()))
                .map(|m| (p, m))
        })
        .ok_or_else(|| {
            TraderError::Validation(format!(
                "no open {} {} position",
                market_symbol.trim().to_ascii_uppercase(),
                direction
            ))
        })?;

    let request = OrderRequest::decrease(
        chain,
        PositionTarget {
            market: market.market_token,
            collateral_token: position.collateral_token,
            index_token: market.index_token,
            direction,
        },
        position.size_in_usd,
        position.collateral_amount,
        slippage_fraction(slippage)?,
    );
    request.validate()?;
    Ok(request)
}

/// `amount * 10^decimals`, truncating digits beyond the token's precision
pub fn scale_decimal(amount: Decimal, decimals: u32) -> Result<U256> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(TraderError::Validation(format!(
            "amount must not be negative: {amount}"
        )));
    }

    let mantissa = U256::from(amount.mantissa().unsigned_abs());
    let scale = amount.scale();
    let ten = U256::from(10u64);

    if decimals >= scale {
        Ok(mantissa * ten.pow(U256::from(decimals - scale)))
    } else {
        Ok(mantissa / ten.pow(U256::from(scale - decimals)))
    }
}

fn slippage_fraction(slippage: Decimal) -> Result<f64> {
    slippage
        .to_f64()
        .ok_or_else(|| TraderError::Validation(format!("invalid slippage {slippage}")))
}
