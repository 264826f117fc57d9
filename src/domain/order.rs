use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TraderError};

/// Fixed-point precision of USD amounts and prices on the protocol
pub const USD_DECIMALS: u8 = 30;

/// Position direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn is_long(&self) -> bool {
        matches!(self, Direction::Long)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

impl From<bool> for Direction {
    fn from(is_long: bool) -> Self {
        if is_long {
            Direction::Long
        } else {
            Direction::Short
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the order does to a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    Increase,
    Decrease,
    Swap,
}

impl OrderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderKind::Increase => "increase",
            OrderKind::Decrease => "decrease",
            OrderKind::Swap => "swap",
        }
    }

    /// Protocol `Order.OrderType` value for the market variant of this kind
    pub fn order_type(&self) -> u8 {
        match self {
            OrderKind::Swap => 0,     // MarketSwap
            OrderKind::Increase => 2, // MarketIncrease
            OrderKind::Decrease => 4, // MarketDecrease
        }
    }

    pub fn intent(&self) -> PriceIntent {
        match self {
            OrderKind::Increase => PriceIntent::Open,
            OrderKind::Decrease => PriceIntent::Close,
            OrderKind::Swap => PriceIntent::Swap,
        }
    }
}

impl std::fmt::Display for OrderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which way slippage is applied when deriving the acceptable price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceIntent {
    Open,
    Close,
    Swap,
}

/// Protocol `Order.DecreasePositionSwapType`; only `NoSwap` is ever sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecreasePositionSwapType {
    NoSwap = 0,
    SwapPnlTokenToCollateralToken = 1,
    SwapCollateralTokenToPnlToken = 2,
}

/// The market, collateral and direction of a position order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionTarget {
    pub market: Address,
    pub collateral_token: Address,
    pub index_token: Address,
    pub direction: Direction,
}

/// Endpoints of a swap order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapTokens {
    pub start_token: Address,
    pub out_token: Address,
}

/// Trade intent handed to the engine.
///
/// `size_delta_usd` is scaled by 1e30 and `initial_collateral_delta` is in the
/// collateral token's native decimals. Callers are responsible for units.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub chain: String,
    pub kind: OrderKind,
    /// Zero for swaps
    pub market: Address,
    /// For swaps this is the start token
    pub collateral_token: Address,
    pub index_token: Address,
    pub direction: Direction,
    pub size_delta_usd: U256,
    pub initial_collateral_delta: U256,
    /// Fraction, e.g. 0.03 for 3%
    pub slippage: f64,
    pub swap_path: Vec<Address>,
    pub swap: Option<SwapTokens>,
}

impl OrderRequest {
    pub fn increase(
        chain: impl Into<String>,
        target: PositionTarget,
        size_delta_usd: U256,
        initial_collateral_delta: U256,
        slippage: f64,
    ) -> Self {
        Self::position(
            chain,
            OrderKind::Increase,
            target,
            size_delta_usd,
            initial_collateral_delta,
            slippage,
        )
    }

    pub fn decrease(
        chain: impl Into<String>,
        target: PositionTarget,
        size_delta_usd: U256,
        initial_collateral_delta: U256,
        slippage: f64,
    ) -> Self {
        Self::position(
            chain,
            OrderKind::Decrease,
            target,
            size_delta_usd,
            initial_collateral_delta,
            slippage,
        )
    }

    fn position(
        chain: impl Into<String>,
        kind: OrderKind,
        target: PositionTarget,
        size_delta_usd: U256,
        initial_collateral_delta: U256,
        slippage: f64,
    ) -> Self {
        Self {
            chain: chain.into(),
            kind,
            market: target.market,
            collateral_token: target.collateral_token,
            index_token: target.index_token,
            direction: target.direction,
            size_delta_usd,
            initial_collateral_delta,
            slippage,
            swap_path: Vec::new(),
            swap: None,
        }
    }

    pub fn swap(
        chain: impl Into<String>,
        start_token: Address,
        out_token: Address,
        amount_in: U256,
        slippage: f64,
    ) -> Self {
        Self {
            chain: chain.into(),
            kind: OrderKind::Swap,
            market: Address::ZERO,
            collateral_token: start_token,
            index_token: Address::ZERO,
            direction: Direction::Short,
            size_delta_usd: U256::ZERO,
            initial_collateral_delta: amount_in,
            slippage,
            swap_path: Vec::new(),
            swap: Some(SwapTokens {
                start_token,
                out_token,
            }),
        }
    }

    /// Swap the collateral through these markets before it reaches the position
    pub fn with_swap_path(mut self, swap_path: Vec<Address>) -> Self {
        self.swap_path = swap_path;
        self
    }

    pub fn is_swap(&self) -> bool {
        self.kind == OrderKind::Swap
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.slippage) || !self.slippage.is_finite() {
            return Err(TraderError::Validation(format!(
                "slippage must be a fraction in [0, 1), got {}",
                self.slippage
            )));
        }

        match self.kind {
            OrderKind::Swap => {
                let swap = self.swap.ok_or_else(|| {
                    TraderError::Validation("swap order requires start and out tokens".into())
                })?;
                if swap.start_token == swap.out_token {
                    return Err(TraderError::Validation(
                        "swap start and out tokens must differ".into(),
                    ));
                }
                if self.initial_collateral_delta.is_zero() {
                    return Err(TraderError::Validation("swap amount must be positive".into()));
                }
            }
            OrderKind::Increase | OrderKind::Decrease => {
                if self.market.is_zero() {
                    return Err(TraderError::Validation(format!(
                        "{} order requires a market",
                        self.kind
                    )));
                }
                if self.index_token.is_zero() {
                    return Err(TraderError::Validation(format!(
                        "{} order requires an index token",
                        self.kind
                    )));
                }
            }
        }

        Ok(())
    }
}
