#![allow(dead_code)]

use alloy::primitives::{address, Address, B256, I256, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use gmx_trader::chain::{ChainContracts, ChainRegistry};
use gmx_trader::config::AppConfig;
use gmx_trader::domain::{
    Direction, ExecutionPreview, GasLimits, MarketInfo, MarketPrices, MarketSet, OpenPosition,
    PriceQuote, PriceTable, TokenInfo,
};
use gmx_trader::engine::{EngineSettings, MulticallBatch, OrderEngine};
use gmx_trader::error::{Result, TraderError};
use gmx_trader::exchange::{
    ChainServices, ExecutionPriceEstimator, GasLimitTable, Ledger, MarketRegistry,
    PositionReader, PriceOracle, SubmissionReceipt, SwapEstimator, TokenLedger,
};

pub const USDC: Address = address!("af88d065e77c8cC2239327C5EDb3A432268e5831");
pub const WETH: Address = address!("82aF49447D8a07e3bd95BD0d56f35241523fBab1");
pub const ARB: Address = address!("912CE59144191C1204E64559FE8253a0e49E6548");
pub const BTC: Address = address!("2f2a2543B76A4166549F7aaB2e75Bef0aefC5B0f");
pub const WBTC: Address = address!("47904963fc8b2340414262125aF798B9655E58Cd");
pub const LINK: Address = address!("f97f4df75117a78c1A5a0DBb814Af92458539FB4");

pub const ARB_MARKET: Address = address!("C25cEf6061Cf5dE5eb761b50E4743c1F5D7E5407");
pub const ETH_MARKET: Address = address!("70d95587d40A2caf56bd97485aB3Eec10Bee6336");
pub const WBTC_MARKET: Address = address!("47c031236e19d024b42f8AE6780E44A573170703");
pub const SWAP_ONLY_MARKET: Address = address!("9C2433dFD71096C435Be9465220BB2B189375eA7");

pub const TRADER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

pub const GAS_PRICE: u64 = 10_000_000;

pub fn e30() -> U256 {
    U256::from(10u64).pow(U256::from(30u64))
}

pub fn registry() -> Arc<ChainRegistry> {
    Arc::new(ChainRegistry::from_config(&AppConfig::default()).unwrap())
}

pub fn arbitrum() -> ChainContracts {
    registry().get("arbitrum").unwrap().clone()
}

fn market(market_token: Address, symbol: &str, index: Address, long: Address) -> MarketInfo {
    MarketInfo {
        market_token,
        symbol: symbol.to_string(),
        index_token: index,
        long_token: long,
        short_token: USDC,
        index_decimals: Some(18),
    }
}

fn token(address: Address, symbol: &str, decimals: u8) -> TokenInfo {
    TokenInfo {
        address,
        symbol: symbol.to_string(),
        decimals,
    }
}

/// In-memory chain that records everything the engine asks of it
pub struct FakeChain {
    pub markets: Vec<MarketInfo>,
    pub tokens: Vec<TokenInfo>,
    pub prices: Mutex<HashMap<Address, PriceQuote>>,
    pub gas_limits: GasLimits,
    pub native_balance: U256,
    pub balances: HashMap<Address, U256>,
    pub allowances: Mutex<HashMap<Address, U256>>,
    /// Output per market as `amount * mul / div`
    pub swap_rates: HashMap<Address, (u64, u64)>,
    pub positions: Vec<OpenPosition>,
    pub receipt_success: bool,
    pub submitted: Mutex<Vec<MulticallBatch>>,
    pub approvals: Mutex<Vec<(Address, Address, U256)>>,
    pub swap_quotes: Mutex<Vec<(Address, Address, U256)>>,
    /// (market, size delta, is_long) per execution price preview
    pub execution_quotes: Mutex<Vec<(Address, I256, bool)>>,
}

impl FakeChain {
    pub fn arbitrum() -> Self {
        let markets = vec![
            market(ETH_MARKET, "ETH", WETH, WETH),
            market(ARB_MARKET, "ARB", ARB, ARB),
            market(WBTC_MARKET, "BTC", WBTC, WBTC),
            MarketInfo {
                market_token: SWAP_ONLY_MARKET,
                symbol: "SWAP USDC-USDC.e".to_string(),
                index_token: Address::ZERO,
                long_token: USDC,
                short_token: USDC,
                index_decimals: None,
            },
        ];

        let tokens = vec![
            token(USDC, "USDC", 6),
            token(WETH, "ETH", 18),
            token(ARB, "ARB", 18),
            token(WBTC, "WBTC", 8),
            token(BTC, "BTC", 8),
        ];

        let mut prices = HashMap::new();
        prices.insert(
            ARB,
            PriceQuote::new(
                U256::from(1_199_000_000_000u64),
                U256::from(1_201_000_000_000u64),
            ),
        );
        prices.insert(
            WETH,
            PriceQuote::new(
                U256::from(3_000_000_000_000_000u64),
                U256::from(3_000_000_000_000_000u64),
            ),
        );
        prices.insert(
            WBTC,
            PriceQuote::new(e30() * U256::from(600u64), e30() * U256::from(600u64)),
        );
        prices.insert(
            USDC,
            PriceQuote::new(
                U256::from(1_000_000_000_000_000_000_000_000u128),
                U256::from(1_000_000_000_000_000_000_000_000u128),
            ),
        );

        let mut balances = HashMap::new();
        balances.insert(USDC, U256::from(100_000_000u64));
        balances.insert(ARB, U256::from(10u64).pow(U256::from(21u64)));

        let mut allowances = HashMap::new();
        allowances.insert(USDC, U256::MAX);
        allowances.insert(ARB, U256::MAX);
        allowances.insert(WETH, U256::MAX);

        let mut swap_rates = HashMap::new();
        swap_rates.insert(ARB_MARKET, (2, 1));
        swap_rates.insert(ETH_MARKET, (1, 2));
        swap_rates.insert(WBTC_MARKET, (1, 4));

        Self {
            markets,
            tokens,
            prices: Mutex::new(prices),
            gas_limits: GasLimits {
                increase_order: U256::from(3_000_000u64),
                decrease_order: U256::from(3_000_000u64),
                swap_order: U256::from(2_500_000u64),
                single_swap: U256::from(1_000_000u64),
                estimated_fee_base_gas_limit: U256::from(600_000u64),
                estimated_fee_multiplier_factor: e30(),
            },
            native_balance: U256::from(10u64).pow(U256::from(19u64)),
            balances,
            allowances: Mutex::new(allowances),
            swap_rates,
            positions: vec![OpenPosition {
                market: ARB_MARKET,
                collateral_token: USDC,
                direction: Direction::Short,
                size_in_usd: U256::from(12u64) * e30(),
                size_in_tokens: U256::from(10u64).pow(U256::from(19u64)),
                collateral_amount: U256::from(5_950_000u64),
            }],
            receipt_success: true,
            submitted: Mutex::new(Vec::new()),
            approvals: Mutex::new(Vec::new()),
            swap_quotes: Mutex::new(Vec::new()),
            execution_quotes: Mutex::new(Vec::new()),
        }
    }

    pub fn set_allowance(&self, token: Address, amount: U256) {
        self.allowances.lock().unwrap().insert(token, amount);
    }

    pub fn remove_price(&self, token: Address) {
        self.prices.lock().unwrap().remove(&token);
    }

    pub fn submitted(&self) -> Vec<MulticallBatch> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn approvals(&self) -> Vec<(Address, Address, U256)> {
        self.approvals.lock().unwrap().clone()
    }

    pub fn swap_quotes(&self) -> Vec<(Address, Address, U256)> {
        self.swap_quotes.lock().unwrap().clone()
    }

    pub fn execution_quotes(&self) -> Vec<(Address, I256, bool)> {
        self.execution_quotes.lock().unwrap().clone()
    }
}

pub fn services(chain: &Arc<FakeChain>) -> ChainServices {
    ChainServices {
        oracle: chain.clone(),
        markets: chain.clone(),
        gas: chain.clone(),
        swaps: chain.clone(),
        tokens: chain.clone(),
        ledger: chain.clone(),
        positions: chain.clone(),
        execution: Some(chain.clone() as Arc<dyn ExecutionPriceEstimator>),
    }
}

pub fn engine(chain: &Arc<FakeChain>) -> OrderEngine {
    OrderEngine::new(registry(), EngineSettings::default()).with_chain("arbitrum", services(chain))
}

#[async_trait]
impl PriceOracle for FakeChain {
    async fn recent_prices(&self) -> Result<PriceTable> {
        Ok(PriceTable::new(self.prices.lock().unwrap().clone()))
    }
}

#[async_trait]
impl MarketRegistry for FakeChain {
    async fn available_markets(&self) -> Result<MarketSet> {
        Ok(MarketSet::new(self.markets.clone()))
    }

    async fn tokens(&self) -> Result<Vec<TokenInfo>> {
        Ok(self.tokens.clone())
    }
}

#[async_trait]
impl GasLimitTable for FakeChain {
    async fn gas_limits(&self) -> Result<GasLimits> {
        Ok(self.gas_limits)
    }
}

#[async_trait]
impl SwapEstimator for FakeChain {
    async fn estimate_swap_output(
        &self,
        market: &MarketInfo,
        _prices: &MarketPrices,
        token_in: Address,
        amount_in: U256,
    ) -> Result<U256> {
        self.swap_quotes
            .lock()
            .unwrap()
            .push((market.market_token, token_in, amount_in));
        let (mul, div) = self.swap_rates.get(&market.market_token).copied().ok_or_else(|| {
            TraderError::Contract(format!("no liquidity in {}", market.market_token))
        })?;
        Ok(amount_in * U256::from(mul) / U256::from(div))
    }
}

#[async_trait]
impl TokenLedger for FakeChain {
    async fn native_balance(&self, _owner: Address) -> Result<U256> {
        Ok(self.native_balance)
    }

    async fn balance_of(&self, token: Address, _owner: Address) -> Result<U256> {
        Ok(self.balances.get(&token).copied().unwrap_or_default())
    }

    async fn allowance(&self, token: Address, _owner: Address, _spender: Address) -> Result<U256> {
        Ok(self
            .allowances
            .lock()
            .unwrap()
            .get(&token)
            .copied()
            .unwrap_or_default())
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<B256> {
        self.approvals.lock().unwrap().push((token, spender, amount));
        self.set_allowance(token, amount);
        Ok(B256::repeat_byte(0xaa))
    }
}

#[async_trait]
impl Ledger for FakeChain {
    fn trader(&self) -> Address {
        TRADER
    }

    async fn gas_price(&self) -> Result<U256> {
        Ok(U256::from(GAS_PRICE))
    }

    async fn submit(&self, batch: &MulticallBatch) -> Result<SubmissionReceipt> {
        self.submitted.lock().unwrap().push(batch.clone());
        Ok(SubmissionReceipt {
            tx_hash: B256::repeat_byte(0x42),
            success: self.receipt_success,
        })
    }
}

#[async_trait]
impl ExecutionPriceEstimator for FakeChain {
    /// Fills at the worse side of the quote with no price impact
    async fn execution_price(
        &self,
        market: &MarketInfo,
        index_price: &PriceQuote,
        size_delta_usd: I256,
        is_long: bool,
    ) -> Result<ExecutionPreview> {
        self.execution_quotes
            .lock()
            .unwrap()
            .push((market.market_token, size_delta_usd, is_long));
        let increasing = size_delta_usd.is_positive();
        let execution_price = if is_long == increasing {
            index_price.max_price
        } else {
            index_price.min_price
        };
        Ok(ExecutionPreview {
            execution_price,
            price_impact: I256::ZERO,
            index_decimals: market.index_decimals.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl PositionReader for FakeChain {
    async fn open_positions(&self, account: Address) -> Result<Vec<OpenPosition>> {
        if account == TRADER {
            Ok(self.positions.clone())
        } else {
            Ok(Vec::new())
        }
    }
}
