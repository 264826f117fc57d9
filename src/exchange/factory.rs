use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{GmxApiClient, RpcChainClient};
use crate::chain::{ChainContracts, ChainRegistry};
use crate::config::AppConfig;
use crate::engine::{EngineSettings, OrderEngine};
use crate::error::{Result, TraderError};
use crate::signing::Wallet;

use super::{ChainServices, ExecutionPriceEstimator};

/// Wire the RPC client and the oracle API for one chain.
///
/// The same RPC client backs every on-chain collaborator, including the
/// execution price preview; prices come from the chain's oracle endpoint.
pub fn build_chain_services(
    contracts: Arc<ChainContracts>,
    wallet: &Wallet,
    receipt_timeout: Duration,
) -> Result<ChainServices> {
    let api = GmxApiClient::new(&contracts.oracle_url)?;
    let client = Arc::new(RpcChainClient::connect(
        contracts,
        wallet.signer(),
        api.clone(),
        receipt_timeout,
    )?);

    Ok(ChainServices {
        oracle: Arc::new(api),
        markets: client.clone(),
        gas: client.clone(),
        swaps: client.clone(),
        tokens: client.clone(),
        ledger: client.clone(),
        positions: client.clone(),
        execution: Some(client as Arc<dyn ExecutionPriceEstimator>),
    })
}

/// Create an engine with every configured chain registered
pub fn build_engine(app_config: &AppConfig, wallet: &Wallet) -> Result<OrderEngine> {
    app_config
        .validate()
        .map_err(|errors| TraderError::Validation(errors.join("; ")))?;
    wallet.ensure_address(app_config.wallet.address.as_deref())?;

    let registry = Arc::new(ChainRegistry::from_config(app_config)?);
    let receipt_timeout = Duration::from_secs(app_config.execution.receipt_timeout_secs);
    let settings = EngineSettings {
        auto_approve: app_config.execution.auto_approve,
    };

    let mut engine = OrderEngine::new(registry.clone(), settings);
    for name in registry.names() {
        let contracts = Arc::new(registry.get(name)?.clone());
        let services = build_chain_services(contracts, wallet, receipt_timeout)?;
        engine = engine.with_chain(name, services);
    }

    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_build_engine_registers_every_chain() {
        let wallet = Wallet::from_private_key(DEV_KEY).unwrap();
        let engine = build_engine(&AppConfig::default(), &wallet).unwrap();

        for chain in ["arbitrum", "avalanche"] {
            let (contracts, services) = engine.resolve(chain).unwrap();
            assert_eq!(contracts.name, chain);
            assert_eq!(services.ledger.trader(), wallet.address());
            assert!(services.execution.is_some());
        }
        assert!(matches!(
            engine.resolve("base"),
            Err(TraderError::UnknownChain(_))
        ));
    }

    #[test]
    fn test_build_engine_rejects_mismatched_wallet() {
        let wallet = Wallet::from_private_key(DEV_KEY).unwrap();
        let mut config = AppConfig::default();
        config.wallet.address = Some("0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string());

        assert!(matches!(
            build_engine(&config, &wallet),
            Err(TraderError::Wallet(_))
        ));
    }

    #[test]
    fn test_build_engine_rejects_invalid_config() {
        let wallet = Wallet::from_private_key(DEV_KEY).unwrap();
        let mut config = AppConfig::default();
        config.execution.receipt_timeout_secs = 0;

        assert!(matches!(
            build_engine(&config, &wallet),
            Err(TraderError::Validation(_))
        ));
    }
}
