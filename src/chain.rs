//! Typed per-chain contract tables.
//!
//! Built once from [`AppConfig`] at startup and injected wherever a chain's
//! addresses are needed. Lookups of an unconfigured chain fail with
//! [`TraderError::UnknownChain`].

use alloy::primitives::{Address, B256};
use std::collections::HashMap;

use crate::config::{AppConfig, ChainConfig};
use crate::error::{Result, TraderError};

/// Resolved addresses and endpoints for one chain
#[derive(Debug, Clone)]
pub struct ChainContracts {
    pub name: String,
    pub chain_id: u64,
    pub rpc_url: String,
    pub oracle_url: String,
    pub explorer_url: String,
    pub hub_token: Address,
    pub wrapped_native_token: Address,
    pub datastore: Address,
    pub exchange_router: Address,
    pub order_vault: Address,
    pub synthetics_reader: Address,
    pub synthetics_router: Address,
    pub market_page_size: u64,
    pub route_substitutions: HashMap<Address, Address>,
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
}

impl ChainContracts {
    pub fn from_config(name: &str, config: &ChainConfig) -> Result<Self> {
        let route_substitutions = config
            .route_substitutions
            .iter()
            .map(|(from, to)| {
                Ok((
                    parse_address("route_substitutions", from)?,
                    parse_address("route_substitutions", to)?,
                ))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(Self {
            name: name.to_string(),
            chain_id: config.chain_id,
            rpc_url: config.rpc_url.clone(),
            oracle_url: config.oracle_url.trim_end_matches('/').to_string(),
            explorer_url: config.explorer_url.trim_end_matches('/').to_string(),
            hub_token: parse_address("hub_token", &config.hub_token)?,
            wrapped_native_token: parse_address(
                "wrapped_native_token",
                &config.wrapped_native_token,
            )?,
            datastore: parse_address("datastore", &config.datastore)?,
            exchange_router: parse_address("exchange_router", &config.exchange_router)?,
            order_vault: parse_address("order_vault", &config.order_vault)?,
            synthetics_reader: parse_address("synthetics_reader", &config.synthetics_reader)?,
            synthetics_router: parse_address("synthetics_router", &config.synthetics_router)?,
            market_page_size: config.market_page_size,
            route_substitutions,
            max_fee_per_gas: config.max_fee_per_gas_wei.map(u128::from),
            max_priority_fee_per_gas: config.max_priority_fee_per_gas_wei.map(u128::from),
        })
    }

    /// Explorer link for a transaction hash
    pub fn tx_url(&self, tx_hash: B256) -> String {
        format!("{}/tx/{}", self.explorer_url, tx_hash)
    }
}

/// All configured chains, keyed by lowercase name
#[derive(Debug, Clone, Default)]
pub struct ChainRegistry {
    chains: HashMap<String, ChainContracts>,
}

impl ChainRegistry {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let chains = config
            .chains
            .iter()
            .map(|(name, chain)| {
                let name = name.to_ascii_lowercase();
                let contracts = ChainContracts::from_config(&name, chain)?;
                Ok((name, contracts))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(Self { chains })
    }

    pub fn insert(&mut self, contracts: ChainContracts) {
        self.chains.insert(contracts.name.clone(), contracts);
    }

    pub fn get(&self, chain: &str) -> Result<&ChainContracts> {
        self.chains
            .get(&chain.trim().to_ascii_lowercase())
            .ok_or_else(|| TraderError::UnknownChain(chain.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.chains.keys().map(String::as_str)
    }
}

pub fn parse_address(field: &str, raw: &str) -> Result<Address> {
    raw.trim()
        .parse::<Address>()
        .map_err(|e| TraderError::AddressParsing(format!("{field} '{raw}': {e}")))
}
