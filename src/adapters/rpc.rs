//! JSON-RPC backed chain services: reader and data store queries, ERC-20
//! bookkeeping, and multicall submission through a signing provider.

use alloy::network::{EthereumWallet, ReceiptResponse};
use alloy::primitives::{Address, B256, I256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::contracts::{
    IDataStore, IERC20, IExchangeRouter, IReader, MarketProps, MarketPricesProps, PriceProps,
};
use super::gmx_api::GmxApiClient;
use super::keys;
use super::scatter::gather_positional;
use crate::chain::ChainContracts;
use crate::domain::{
    ExecutionPreview, GasLimits, MarketInfo, MarketPrices, MarketSet, OpenPosition, PriceQuote,
    TokenInfo,
};
use crate::engine::batch::MulticallBatch;
use crate::error::{Result, TraderError};
use crate::exchange::{
    ExecutionPriceEstimator, GasLimitTable, Ledger, MarketRegistry, PositionReader,
    SubmissionReceipt, SwapEstimator, TokenLedger,
};

/// One chain's RPC endpoint bound to the trading signer
#[derive(Clone)]
pub struct RpcChainClient {
    provider: DynProvider,
    contracts: Arc<ChainContracts>,
    api: GmxApiClient,
    trader: Address,
    receipt_timeout: Duration,
}

impl RpcChainClient {
    /// Build the signing provider. No request is made until the first call.
    pub fn connect(
        contracts: Arc<ChainContracts>,
        signer: PrivateKeySigner,
        api: GmxApiClient,
        receipt_timeout: Duration,
    ) -> Result<Self> {
        let trader = signer.address();
        let rpc_url = contracts.rpc_url.parse().map_err(|e| {
            TraderError::Rpc(format!("Invalid RPC URL '{}': {}", contracts.rpc_url, e))
        })?;
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(rpc_url)
            .erased();

        debug!(chain = %contracts.name, %trader, "RPC client ready");

        Ok(Self {
            provider,
            contracts,
            api,
            trader,
            receipt_timeout,
        })
    }

    pub fn contracts(&self) -> &ChainContracts {
        &self.contracts
    }

    async fn read_uint(&self, key: B256) -> Result<U256> {
        IDataStore::new(self.contracts.datastore, self.provider.clone())
            .getUint(key)
            .call()
            .await
            .map_err(|e| TraderError::Contract(format!("getUint({key}) failed: {e}")))
    }
}

fn gas_limits_from(values: Vec<U256>) -> Result<GasLimits> {
    match values.as_slice() {
        [increase, decrease, swap, single_swap, base, multiplier] => Ok(GasLimits {
            increase_order: *increase,
            decrease_order: *decrease,
            swap_order: *swap,
            single_swap: *single_swap,
            estimated_fee_base_gas_limit: *base,
            estimated_fee_multiplier_factor: *multiplier,
        }),
        other => Err(TraderError::InvalidMarketData(format!(
            "expected 6 gas limit values, got {}",
            other.len()
        ))),
    }
}

fn markets_from(props: Vec<MarketProps>, tokens: Vec<TokenInfo>) -> MarketSet {
    let by_address: HashMap<Address, TokenInfo> =
        tokens.into_iter().map(|t| (t.address, t)).collect();

    MarketSet::new(
        props
            .into_iter()
            .map(|m| {
                MarketInfo::decode(
                    m.marketToken,
                    m.indexToken,
                    m.longToken,
                    m.shortToken,
                    &by_address,
                )
            })
            .collect(),
    )
}

#[async_trait]
impl MarketRegistry for RpcChainClient {
    #[instrument(skip(self), fields(chain = %self.contracts.name))]
    async fn available_markets(&self) -> Result<MarketSet> {
        let reader = IReader::new(self.contracts.synthetics_reader, self.provider.clone());
        let call = reader.getMarkets(
            self.contracts.datastore,
            U256::ZERO,
            U256::from(self.contracts.market_page_size),
        );

        let (props, tokens) = tokio::try_join!(
            async {
                call.call()
                    .await
                    .map_err(|e| TraderError::Contract(format!("getMarkets failed: {e}")))
            },
            self.api.tokens(),
        )?;

        let markets = markets_from(props, tokens);
        debug!(count = markets.len(), "Loaded markets");
        Ok(markets)
    }

    async fn tokens(&self) -> Result<Vec<TokenInfo>> {
        self.api.tokens().await
    }
}

#[async_trait]
impl GasLimitTable for RpcChainClient {
    #[instrument(skip(self), fields(chain = %self.contracts.name))]
    async fn gas_limits(&self) -> Result<GasLimits> {
        let keys = [
            keys::increase_order_gas_limit_key(),
            keys::decrease_order_gas_limit_key(),
            keys::swap_order_gas_limit_key(),
            keys::single_swap_gas_limit_key(),
            keys::execution_gas_fee_base_amount_key(),
            keys::execution_gas_fee_multiplier_key(),
        ];

        let values = gather_positional(keys.into_iter().map(|key| self.read_uint(key))).await?;
        gas_limits_from(values)
    }
}

#[async_trait]
impl SwapEstimator for RpcChainClient {
    async fn estimate_swap_output(
        &self,
        market: &MarketInfo,
        prices: &MarketPrices,
        token_in: Address,
        amount_in: U256,
    ) -> Result<U256> {
        let reader = IReader::new(self.contracts.synthetics_reader, self.provider.clone());
        let quote = reader
            .getSwapAmountOut(
                self.contracts.datastore,
                MarketProps::from(market),
                MarketPricesProps::from(prices),
                token_in,
                amount_in,
                Address::ZERO,
            )
            .call()
            .await
            .map_err(|e| {
                TraderError::Contract(format!(
                    "getSwapAmountOut on {} failed: {e}",
                    market.market_token
                ))
            })?;

        debug!(market = %market.symbol, amount_out = %quote.amountOut, "Swap estimate");
        Ok(quote.amountOut)
    }
}

#[async_trait]
impl ExecutionPriceEstimator for RpcChainClient {
    #[instrument(skip(self, market, index_price), fields(market = %market.symbol))]
    async fn execution_price(
        &self,
        market: &MarketInfo,
        index_price: &PriceQuote,
        size_delta_usd: I256,
        is_long: bool,
    ) -> Result<ExecutionPreview> {
        let index_decimals = market.index_decimals.ok_or_else(|| {
            TraderError::Validation(format!("{} has no index token to price", market.symbol))
        })?;

        let reader = IReader::new(self.contracts.synthetics_reader, self.provider.clone());
        let result = reader
            .getExecutionPrice(
                self.contracts.datastore,
                market.market_token,
                PriceProps::from(index_price),
                U256::ZERO,
                U256::ZERO,
                size_delta_usd,
                is_long,
            )
            .call()
            .await
            .map_err(|e| {
                TraderError::Contract(format!(
                    "getExecutionPrice on {} failed: {e}",
                    market.market_token
                ))
            })?;

        Ok(ExecutionPreview {
            execution_price: result.executionPrice,
            price_impact: result.priceImpactUsd,
            index_decimals,
        })
    }
}

#[async_trait]
impl PositionReader for RpcChainClient {
    #[instrument(skip(self), fields(chain = %self.contracts.name))]
    async fn open_positions(&self, account: Address) -> Result<Vec<OpenPosition>> {
        let reader = IReader::new(self.contracts.synthetics_reader, self.provider.clone());
        let props = reader
            .getAccountPositions(
                self.contracts.datastore,
                account,
                U256::ZERO,
                U256::from(self.contracts.market_page_size),
            )
            .call()
            .await
            .map_err(|e| TraderError::Contract(format!("getAccountPositions failed: {e}")))?;

        let positions: Vec<OpenPosition> = props.into_iter().map(OpenPosition::from).collect();
        debug!(count = positions.len(), %account, "Loaded open positions");
        Ok(positions)
    }
}

#[async_trait]
impl TokenLedger for RpcChainClient {
    async fn native_balance(&self, owner: Address) -> Result<U256> {
        self.provider
            .get_balance(owner)
            .await
            .map_err(|e| TraderError::Rpc(format!("Failed to get balance: {e}")))
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        IERC20::new(token, self.provider.clone())
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| TraderError::Contract(format!("balanceOf on {token} failed: {e}")))
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        IERC20::new(token, self.provider.clone())
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| TraderError::Contract(format!("allowance on {token} failed: {e}")))
    }

    #[instrument(skip(self), fields(chain = %self.contracts.name))]
    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<B256> {
        let pending = IERC20::new(token, self.provider.clone())
            .approve(spender, amount)
            .send()
            .await
            .map_err(|e| TraderError::SubmissionFailure {
                reason: format!("approve tx failed: {e}"),
                explorer_url: None,
            })?;

        let receipt = pending
            .with_timeout(Some(self.receipt_timeout))
            .get_receipt()
            .await
            .map_err(|e| TraderError::Rpc(format!("approve confirmation failed: {e}")))?;

        let tx_hash = receipt.transaction_hash;
        if !receipt.status() {
            return Err(TraderError::SubmissionFailure {
                reason: "approve reverted".into(),
                explorer_url: Some(self.contracts.tx_url(tx_hash)),
            });
        }

        info!(%tx_hash, "Approve confirmed");
        Ok(tx_hash)
    }
}

#[async_trait]
impl Ledger for RpcChainClient {
    fn trader(&self) -> Address {
        self.trader
    }

    async fn gas_price(&self) -> Result<U256> {
        self.provider
            .get_gas_price()
            .await
            .map(U256::from)
            .map_err(|e| TraderError::Rpc(format!("Failed to get gas price: {e}")))
    }

    #[instrument(skip_all, fields(chain = %self.contracts.name, value = %batch.value))]
    async fn submit(&self, batch: &MulticallBatch) -> Result<SubmissionReceipt> {
        let router = IExchangeRouter::new(self.contracts.exchange_router, self.provider.clone());
        let mut call = router.multicall(batch.encode()).value(batch.value);
        if let Some(max_fee) = self.contracts.max_fee_per_gas {
            call = call.max_fee_per_gas(max_fee);
        }
        if let Some(max_priority_fee) = self.contracts.max_priority_fee_per_gas {
            call = call.max_priority_fee_per_gas(max_priority_fee);
        }

        let pending = call.send().await.map_err(|e| TraderError::SubmissionFailure {
            reason: format!("multicall tx failed: {e}"),
            explorer_url: None,
        })?;
        let tx_hash = *pending.tx_hash();
        info!(%tx_hash, "Multicall sent, waiting for receipt");

        let receipt = pending
            .with_timeout(Some(self.receipt_timeout))
            .get_receipt()
            .await
            .map_err(|e| TraderError::SubmissionFailure {
                reason: format!("Tx confirmation failed: {e}"),
                explorer_url: Some(self.contracts.tx_url(tx_hash)),
            })?;

        if !receipt.status() {
            warn!(%tx_hash, "Multicall reverted");
        }

        Ok(SubmissionReceipt {
            tx_hash: receipt.transaction_hash,
            success: receipt.status(),
        })
    }
}
