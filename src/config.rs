use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Per-chain contract tables, keyed by lowercase chain name
    pub chains: HashMap<String, ChainConfig>,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    /// JSON-RPC endpoint
    pub rpc_url: String,
    /// GMX infra API base (signed prices, token list)
    pub oracle_url: String,
    /// Block explorer base, used for transaction links
    pub explorer_url: String,
    /// Stable settlement token used as the swap routing pivot
    pub hub_token: String,
    /// Wrapped native token (WETH / WAVAX)
    pub wrapped_native_token: String,
    pub datastore: String,
    pub exchange_router: String,
    pub order_vault: String,
    pub synthetics_reader: String,
    /// Router that pulls collateral; ERC-20 approvals target this contract
    pub synthetics_router: String,
    /// Number of markets requested from the reader
    #[serde(default = "default_market_page_size")]
    pub market_page_size: u64,
    /// Out-token redirections applied to the second swap hop
    #[serde(default)]
    pub route_substitutions: HashMap<String, String>,
    #[serde(default)]
    pub max_fee_per_gas_wei: Option<u64>,
    #[serde(default)]
    pub max_priority_fee_per_gas_wei: Option<u64>,
}

fn default_market_page_size() -> u64 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WalletConfig {
    /// Trader address; derived from the signer when unset
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Submit an approve transaction when the router allowance is short
    #[serde(default = "default_auto_approve")]
    pub auto_approve: bool,
    /// Seconds to wait for a receipt before giving up on a submitted transaction
    #[serde(default = "default_receipt_timeout")]
    pub receipt_timeout_secs: u64,
}

fn default_auto_approve() -> bool {
    true
}

fn default_receipt_timeout() -> u64 {
    120
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            auto_approve: true,
            receipt_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut chains = HashMap::new();
        chains.insert("arbitrum".to_string(), ChainConfig::arbitrum());
        chains.insert("avalanche".to_string(), ChainConfig::avalanche());

        Self {
            chains,
            wallet: WalletConfig::default(),
            execution: ExecutionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ChainConfig {
    pub fn arbitrum() -> Self {
        let mut route_substitutions = HashMap::new();
        // BTC index token has no direct market; route through the WBTC market
        route_substitutions.insert(
            "0x2f2a2543B76A4166549F7aaB2e75Bef0aefC5B0f".to_string(),
            "0x47904963fc8b2340414262125aF798B9655E58Cd".to_string(),
        );

        Self {
            chain_id: 42161,
            rpc_url: "https://arb1.arbitrum.io/rpc".to_string(),
            oracle_url: "https://arbitrum-api.gmxinfra.io".to_string(),
            explorer_url: "https://arbiscan.io".to_string(),
            hub_token: "0xaf88d065e77c8cC2239327C5EDb3A432268e5831".to_string(),
            wrapped_native_token: "0x82aF49447D8a07e3bd95BD0d56f35241523fBab1".to_string(),
            datastore: "0xFD70de6b91282D8017aA4E741e9Ae325CAb992d8".to_string(),
            exchange_router: "0x7C68C7866A64FA2160F78EEaE12217FFbf871fa8".to_string(),
            order_vault: "0x31eF83a530Fde1B38EE9A18093A333D8Bbbc40D5".to_string(),
            synthetics_reader: "0xf60becbba223EEA9495Da3f606753867eC10d139".to_string(),
            synthetics_router: "0x7452c558d45f8afC8c83dAe62C3f8A5BE19c71f6".to_string(),
            market_page_size: default_market_page_size(),
            route_substitutions,
            max_fee_per_gas_wei: Some(100_000_000),
            max_priority_fee_per_gas_wei: Some(100_000_000),
        }
    }

    pub fn avalanche() -> Self {
        Self {
            chain_id: 43114,
            rpc_url: "https://api.avax.network/ext/bc/C/rpc".to_string(),
            oracle_url: "https://avalanche-api.gmxinfra.io".to_string(),
            explorer_url: "https://snowtrace.io".to_string(),
            hub_token: "0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E".to_string(),
            wrapped_native_token: "0xB31f66AA3C1e785363F0875A1B74E27b85FD66c7".to_string(),
            datastore: "0x2F0b22339414ADeD7D5F06f9D604c7fF5b2fe3f6".to_string(),
            exchange_router: "0x79be2F4eC8A4143BaF963206cF133f3710856D0a".to_string(),
            order_vault: "0xD3D60D22d415aD43b7e64b510D86A30f19B1B12C".to_string(),
            synthetics_reader: "0x1D5d64d691FBcD8C80A2FD6A9382dF0fe544cBd8".to_string(),
            synthetics_router: "0x820F5FfC5b525cD4d88Cd91aCf2c28F16530Cc68".to_string(),
            market_page_size: default_market_page_size(),
            route_substitutions: HashMap::new(),
            max_fee_per_gas_wei: None,
            max_priority_fee_per_gas_wei: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with the built-in arbitrum/avalanche tables
            .add_source(Config::try_from(&AppConfig::default())?)
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("GMX_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (GMX__CHAINS__ARBITRUM__RPC_URL, etc.)
            .add_source(
                Environment::with_prefix("GMX")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.chains.is_empty() {
            errors.push("at least one chain must be configured".to_string());
        }

        for (name, chain) in &self.chains {
            if chain.rpc_url.trim().is_empty() {
                errors.push(format!("chains.{name}.rpc_url must be set"));
            }
            if chain.oracle_url.trim().is_empty() {
                errors.push(format!("chains.{name}.oracle_url must be set"));
            }
            if chain.market_page_size == 0 {
                errors.push(format!("chains.{name}.market_page_size must be positive"));
            }
            if chain.hub_token.eq_ignore_ascii_case(&chain.wrapped_native_token) {
                errors.push(format!(
                    "chains.{name}.hub_token must differ from wrapped_native_token"
                ));
            }
        }

        if self.execution.receipt_timeout_secs == 0 {
            errors.push("execution.receipt_timeout_secs must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
