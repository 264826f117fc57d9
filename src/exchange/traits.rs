use alloy::primitives::{Address, B256, I256, U256};
use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{
    ExecutionPreview, GasLimits, MarketInfo, MarketPrices, MarketSet, OpenPosition, PriceQuote,
    PriceTable, TokenInfo,
};
use crate::engine::batch::MulticallBatch;
use crate::error::Result;

/// Signed oracle prices for every listed token
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// One fresh snapshot; callers must not cache it across order builds
    async fn recent_prices(&self) -> Result<PriceTable>;
}

/// Markets and token metadata for one chain
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketRegistry: Send + Sync {
    async fn available_markets(&self) -> Result<MarketSet>;

    async fn tokens(&self) -> Result<Vec<TokenInfo>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GasLimitTable: Send + Sync {
    async fn gas_limits(&self) -> Result<GasLimits>;
}

/// Read-only swap quote for a single market hop
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SwapEstimator: Send + Sync {
    async fn estimate_swap_output(
        &self,
        market: &MarketInfo,
        prices: &MarketPrices,
        token_in: Address,
        amount_in: U256,
    ) -> Result<U256>;
}

/// Fill price and price impact of a position order before it is sent
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExecutionPriceEstimator: Send + Sync {
    /// `size_delta_usd` is negative for decreases
    async fn execution_price(
        &self,
        market: &MarketInfo,
        index_price: &PriceQuote,
        size_delta_usd: I256,
        is_long: bool,
    ) -> Result<ExecutionPreview>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PositionReader: Send + Sync {
    async fn open_positions(&self, account: Address) -> Result<Vec<OpenPosition>>;
}

/// Balances, allowances and approvals for the trading account
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenLedger: Send + Sync {
    async fn native_balance(&self, owner: Address) -> Result<U256>;

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256>;

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256>;

    /// Submit `approve(spender, amount)` and wait until it is mined
    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<B256>;
}

/// Outcome of a mined transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub tx_hash: B256,
    pub success: bool,
}

/// The single submission boundary of the engine
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Account that signs and receives orders
    fn trader(&self) -> Address;

    async fn gas_price(&self) -> Result<U256>;

    /// Send `multicall(batch)` with the batch's native value attached, once
    async fn submit(&self, batch: &MulticallBatch) -> Result<SubmissionReceipt>;
}

/// Collaborators bound to one chain
#[derive(Clone)]
pub struct ChainServices {
    pub oracle: Arc<dyn PriceOracle>,
    pub markets: Arc<dyn MarketRegistry>,
    pub gas: Arc<dyn GasLimitTable>,
    pub swaps: Arc<dyn SwapEstimator>,
    pub tokens: Arc<dyn TokenLedger>,
    pub ledger: Arc<dyn Ledger>,
    pub positions: Arc<dyn PositionReader>,
    /// Previews are skipped when unset
    pub execution: Option<Arc<dyn ExecutionPriceEstimator>>,
}

impl std::fmt::Debug for ChainServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainServices")
            .field("trader", &self.ledger.trader())
            .finish()
    }
}
