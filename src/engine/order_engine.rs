//! Order construction and submission.
//!
//! Every call builds one [`OrderBuild`] that walks the [`OrderState`]
//! lifecycle forward exactly once. Each step hands the next one the values it
//! needs; nothing is cached between builds and no step is retried.

use alloy::primitives::{Address, B256, I256, U256};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::chain::{ChainContracts, ChainRegistry};
use crate::domain::{
    ExecutionPreview, GasLimits, MarketInfo, MarketSet, OrderKind, OrderLifecycle, OrderRequest,
    OrderState, PriceQuote, PriceTable, StateTransition, SwapRoute,
};
use crate::engine::approval::{ensure_spend_approval, ApprovalMode, ApprovalOutcome};
use crate::engine::batch::{assemble_batch, order_params, MulticallBatch};
use crate::engine::fees::{execution_fee, pad_execution_fee};
use crate::engine::pricing::{compute_acceptable_price, AcceptablePrice};
use crate::engine::routing::{estimate_min_output, requires_multi_hop, resolve_route};
use crate::error::{Result, TraderError};
use crate::exchange::ChainServices;

#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Submit `approve` when the router allowance is short
    pub auto_approve: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self { auto_approve: true }
    }
}

/// Gas-limit entry chosen for the order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasSelection {
    pub limits: GasLimits,
    pub entry: U256,
    pub multi_hop: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeEstimate {
    pub gas_price: U256,
    /// Before padding
    pub base_fee: U256,
    pub execution_fee: U256,
}

/// One oracle snapshot with the market set it was priced against
#[derive(Debug, Clone)]
pub struct PricedOrder {
    pub prices: PriceTable,
    pub markets: MarketSet,
    pub price: AcceptablePrice,
    pub execution_preview: Option<ExecutionPreview>,
}

/// Everything needed to submit an order, fully assembled
#[derive(Debug, Clone)]
pub struct OrderPlan {
    pub build_id: Uuid,
    pub chain: String,
    pub kind: OrderKind,
    pub trader: Address,
    pub gas: GasSelection,
    pub approval: ApprovalOutcome,
    pub price: AcceptablePrice,
    /// Reader fill estimate for position orders, when an estimator is wired
    pub execution_preview: Option<ExecutionPreview>,
    pub fee: FeeEstimate,
    pub route: Option<SwapRoute>,
    pub min_output_amount: U256,
    pub batch: MulticallBatch,
    pub transitions: Vec<StateTransition>,
}

/// A mined order transaction
#[derive(Debug, Clone, Serialize)]
pub struct TransactionHandle {
    pub build_id: Uuid,
    pub tx_hash: B256,
    pub explorer_url: String,
    pub state: OrderState,
    pub execution_fee: U256,
    pub value: U256,
    pub submitted_at: DateTime<Utc>,
}

pub struct OrderEngine {
    registry: Arc<ChainRegistry>,
    services: HashMap<String, ChainServices>,
    settings: EngineSettings,
}

impl OrderEngine {
    pub fn new(registry: Arc<ChainRegistry>, settings: EngineSettings) -> Self {
        Self {
            registry,
            services: HashMap::new(),
            settings,
        }
    }

    /// Register the collaborators for a configured chain
    pub fn with_chain(mut self, chain: &str, services: ChainServices) -> Self {
        self.services
            .insert(chain.trim().to_ascii_lowercase(), services);
        self
    }

    /// Contracts and collaborators registered for `chain`
    pub fn resolve(&self, chain: &str) -> Result<(&ChainContracts, &ChainServices)> {
        let contracts = self.registry.get(chain)?;
        let services = self
            .services
            .get(&contracts.name)
            .ok_or_else(|| TraderError::UnknownChain(chain.to_string()))?;
        Ok((contracts, services))
    }

    /// Build the order without submitting anything.
    ///
    /// A short allowance is reported in the plan instead of being approved.
    #[instrument(skip(self, request), fields(kind = %request.kind, chain = %request.chain))]
    pub async fn plan(&self, request: OrderRequest) -> Result<OrderPlan> {
        let (contracts, services) = self.resolve(&request.chain)?;
        let mut build = OrderBuild::new(request, contracts, services)?;
        build.prepare(ApprovalMode::Inspect).await
    }

    /// Build the order and submit it as one `multicall` transaction
    #[instrument(skip(self, request), fields(kind = %request.kind, chain = %request.chain))]
    pub async fn build_and_submit(&self, request: OrderRequest) -> Result<TransactionHandle> {
        let (contracts, services) = self.resolve(&request.chain)?;
        let mode = if self.settings.auto_approve {
            ApprovalMode::AutoApprove
        } else {
            ApprovalMode::Require
        };

        let mut build = OrderBuild::new(request, contracts, services)?;
        let plan = build.prepare(mode).await?;
        build.submit(&plan).await
    }
}

/// Single-use build of one order
pub struct OrderBuild<'a> {
    id: Uuid,
    request: OrderRequest,
    contracts: &'a ChainContracts,
    services: &'a ChainServices,
    lifecycle: OrderLifecycle,
}

impl<'a> OrderBuild<'a> {
    pub fn new(
        request: OrderRequest,
        contracts: &'a ChainContracts,
        services: &'a ChainServices,
    ) -> Result<Self> {
        request.validate()?;
        let id = Uuid::new_v4();
        info!(
            %id,
            kind = %request.kind,
            chain = %contracts.name,
            market = %request.market,
            collateral = %request.collateral_token,
            size_delta_usd = %request.size_delta_usd,
            collateral_delta = %request.initial_collateral_delta,
            "Building order"
        );

        Ok(Self {
            id,
            request,
            contracts,
            services,
            lifecycle: OrderLifecycle::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> OrderState {
        self.lifecycle.state()
    }

    /// Run every step up to `BatchBuilt`
    pub async fn prepare(&mut self, approval_mode: ApprovalMode) -> Result<OrderPlan> {
        let trader = self.services.ledger.trader();

        let gas = self.resolve_gas().await?;
        let approval = self.check_approval(trader, approval_mode).await?;
        let priced = self.price().await?;
        let fee = self.estimate_fee(&gas).await?;

        let (route, min_output_amount) = if self.request.is_swap() {
            let (route, min_output) = self.route(&priced).await?;
            (Some(route), min_output)
        } else {
            (None, U256::ZERO)
        };

        let swap_path = route
            .as_ref()
            .map(|r| r.hops.clone())
            .unwrap_or_else(|| self.request.swap_path.clone());
        let batch = self.build_batch(trader, swap_path, &priced.price, &fee, min_output_amount)?;

        Ok(OrderPlan {
            build_id: self.id,
            chain: self.contracts.name.clone(),
            kind: self.request.kind,
            trader,
            gas,
            approval,
            price: priced.price,
            execution_preview: priced.execution_preview,
            fee,
            route,
            min_output_amount,
            batch,
            transitions: self.lifecycle.history().to_vec(),
        })
    }

    pub async fn resolve_gas(&mut self) -> Result<GasSelection> {
        let limits = self.services.gas.gas_limits().await?;
        let multi_hop = match self.request.swap {
            Some(swap) => {
                requires_multi_hop(swap.start_token, swap.out_token, self.contracts.hub_token)
            }
            None => false,
        };
        let entry = limits.for_order(self.request.kind, multi_hop);
        debug!(?limits, %entry, multi_hop, "Gas limits resolved");

        self.lifecycle
            .advance(OrderState::GasResolved, format!("{} gas limit {}", self.request.kind, entry))?;
        Ok(GasSelection {
            limits,
            entry,
            multi_hop,
        })
    }

    pub async fn check_approval(
        &mut self,
        trader: Address,
        mode: ApprovalMode,
    ) -> Result<ApprovalOutcome> {
        let outcome = if self.request.kind == OrderKind::Decrease {
            ApprovalOutcome::Sufficient
        } else {
            ensure_spend_approval(
                self.services.tokens.as_ref(),
                trader,
                self.request.collateral_token,
                self.contracts.synthetics_router,
                self.request.initial_collateral_delta,
                self.contracts.wrapped_native_token,
                mode,
            )
            .await?
        };

        self.lifecycle
            .advance(OrderState::ApprovalChecked, format!("{outcome:?}"))?;
        Ok(outcome)
    }

    /// Take the oracle snapshot and derive mark and acceptable prices
    pub async fn price(&mut self) -> Result<PricedOrder> {
        let markets = self.services.markets.available_markets().await?;
        let prices = self.services.oracle.recent_prices().await?;

        let mut execution_preview = None;
        let price = if self.request.is_swap() {
            compute_acceptable_price(
                0.0,
                self.request.direction,
                self.request.kind.intent(),
                self.request.slippage,
                0,
            )
        } else {
            let market = markets.get(&self.request.market).ok_or_else(|| {
                TraderError::InvalidMarketData(format!(
                    "market {} is not listed on {}",
                    self.request.market, self.contracts.name
                ))
            })?;
            let decimals = market.index_decimals.ok_or_else(|| {
                TraderError::Validation(format!(
                    "{} is a swap-only market and cannot hold positions",
                    market.symbol
                ))
            })?;
            let quote = prices.get(self.request.index_token)?;
            execution_preview = self.preview_execution(market, quote).await?;

            compute_acceptable_price(
                quote.median(),
                self.request.direction,
                self.request.kind.intent(),
                self.request.slippage,
                decimals,
            )
        };

        info!(
            median = price.median,
            mark_price = %price.mark_price,
            acceptable_price = %price.acceptable_price,
            acceptable_price_raw = %price.acceptable_price_raw,
            acceptable_price_usd = price.acceptable_price_usd,
            "Order priced"
        );

        self.lifecycle
            .advance(OrderState::Priced, format!("{} prices", prices.len()))?;
        Ok(PricedOrder {
            prices,
            markets,
            price,
            execution_preview,
        })
    }

    async fn preview_execution(
        &self,
        market: &MarketInfo,
        quote: &PriceQuote,
    ) -> Result<Option<ExecutionPreview>> {
        let Some(estimator) = self.services.execution.as_ref() else {
            return Ok(None);
        };

        let size = I256::try_from(self.request.size_delta_usd).map_err(|_| {
            TraderError::Validation(format!(
                "size delta {} exceeds int256",
                self.request.size_delta_usd
            ))
        })?;
        let size_delta_usd = match self.request.kind {
            OrderKind::Decrease => -size,
            _ => size,
        };

        let preview = estimator
            .execution_price(market, quote, size_delta_usd, self.request.direction.is_long())
            .await?;
        info!(
            execution_price = %preview.execution_price,
            execution_price_usd = preview.execution_price_usd(),
            price_impact_usd = preview.price_impact_usd(),
            "Execution price preview"
        );
        Ok(Some(preview))
    }

    pub async fn estimate_fee(&mut self, gas: &GasSelection) -> Result<FeeEstimate> {
        let gas_price = self.services.ledger.gas_price().await?;
        let base_fee = execution_fee(&gas.limits, gas.entry, gas_price);
        let padded = pad_execution_fee(base_fee, self.request.kind);
        info!(%gas_price, %base_fee, execution_fee = %padded, "Execution fee estimated");

        self.lifecycle
            .advance(OrderState::FeeEstimated, format!("execution fee {padded}"))?;
        Ok(FeeEstimate {
            gas_price,
            base_fee,
            execution_fee: padded,
        })
    }

    /// Swap route and minimum output
    pub async fn route(&mut self, priced: &PricedOrder) -> Result<(SwapRoute, U256)> {
        let swap = self.request.swap.ok_or_else(|| {
            TraderError::Validation("swap order requires start and out tokens".into())
        })?;

        let route = resolve_route(
            &priced.markets,
            swap.start_token,
            swap.out_token,
            self.contracts.hub_token,
            &self.contracts.route_substitutions,
        )?;
        let min_output = estimate_min_output(
            self.services.swaps.as_ref(),
            &priced.markets,
            &priced.prices,
            &route,
            swap.start_token,
            self.contracts.hub_token,
            self.request.initial_collateral_delta,
            self.request.slippage,
        )
        .await?;
        info!(hops = ?route.hops, multi_hop = route.multi_hop, %min_output, "Swap routed");

        self.lifecycle
            .advance(OrderState::Routed, format!("{} hop(s)", route.len()))?;
        Ok((route, min_output))
    }

    pub fn build_batch(
        &mut self,
        trader: Address,
        swap_path: Vec<Address>,
        price: &AcceptablePrice,
        fee: &FeeEstimate,
        min_output_amount: U256,
    ) -> Result<MulticallBatch> {
        let params = order_params(
            trader,
            &self.request,
            swap_path,
            price,
            fee.execution_fee,
            min_output_amount,
        );
        let batch = assemble_batch(
            self.contracts,
            self.request.kind,
            self.request.collateral_token,
            self.request.initial_collateral_delta,
            fee.execution_fee,
            params,
        );
        info!(%batch, "Batch assembled");

        self.lifecycle
            .advance(OrderState::BatchBuilt, batch.to_string())?;
        Ok(batch)
    }

    /// Send the batch once and wait for its receipt.
    ///
    /// Only a plan prepared by this build is accepted.
    pub async fn submit(&mut self, plan: &OrderPlan) -> Result<TransactionHandle> {
        if plan.build_id != self.id {
            return Err(TraderError::InvalidStateTransition {
                from: format!("{} (build {})", self.state(), self.id),
                to: format!("{} (plan of build {})", OrderState::Submitted, plan.build_id),
            });
        }
        self.lifecycle
            .advance(OrderState::Submitted, "multicall sent")?;
        let submitted_at = Utc::now();

        let receipt = match self.services.ledger.submit(&plan.batch).await {
            Ok(receipt) => receipt,
            Err(e) => {
                self.lifecycle.advance(OrderState::Rejected, e.to_string())?;
                error!("Order submission failed: {}", e);
                return Err(match e {
                    TraderError::SubmissionFailure { .. } => e,
                    other => TraderError::SubmissionFailure {
                        reason: other.to_string(),
                        explorer_url: None,
                    },
                });
            }
        };

        let explorer_url = self.contracts.tx_url(receipt.tx_hash);
        if !receipt.success {
            self.lifecycle
                .advance(OrderState::Rejected, "receipt status failed")?;
            error!(tx_hash = %receipt.tx_hash, %explorer_url, "Order transaction reverted");
            return Err(TraderError::SubmissionFailure {
                reason: format!("transaction {} reverted", receipt.tx_hash),
                explorer_url: Some(explorer_url),
            });
        }

        self.lifecycle
            .advance(OrderState::Accepted, "receipt status success")?;
        info!(tx_hash = %receipt.tx_hash, %explorer_url, "Order transaction mined");

        Ok(TransactionHandle {
            build_id: self.id,
            tx_hash: receipt.tx_hash,
            explorer_url,
            state: self.lifecycle.state(),
            execution_fee: plan.fee.execution_fee,
            value: plan.batch.value,
            submitted_at,
        })
    }
}
