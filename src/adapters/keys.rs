//! Data-store keys: `keccak256(abi.encode(string))` of the protocol's key names.

use alloy::primitives::{keccak256, B256};
use alloy::sol_types::SolValue;

pub const INCREASE_ORDER_GAS_LIMIT: &str = "INCREASE_ORDER_GAS_LIMIT";
pub const DECREASE_ORDER_GAS_LIMIT: &str = "DECREASE_ORDER_GAS_LIMIT";
pub const SWAP_ORDER_GAS_LIMIT: &str = "SWAP_ORDER_GAS_LIMIT";
pub const SINGLE_SWAP_GAS_LIMIT: &str = "SINGLE_SWAP_GAS_LIMIT";
pub const ESTIMATED_GAS_FEE_BASE_AMOUNT: &str = "ESTIMATED_GAS_FEE_BASE_AMOUNT";
pub const ESTIMATED_GAS_FEE_MULTIPLIER_FACTOR: &str = "ESTIMATED_GAS_FEE_MULTIPLIER_FACTOR";

pub fn hash_string(name: &str) -> B256 {
    keccak256((name.to_string(),).abi_encode_params())
}

pub fn increase_order_gas_limit_key() -> B256 {
    hash_string(INCREASE_ORDER_GAS_LIMIT)
}

pub fn decrease_order_gas_limit_key() -> B256 {
    hash_string(DECREASE_ORDER_GAS_LIMIT)
}

pub fn swap_order_gas_limit_key() -> B256 {
    hash_string(SWAP_ORDER_GAS_LIMIT)
}

pub fn single_swap_gas_limit_key() -> B256 {
    hash_string(SINGLE_SWAP_GAS_LIMIT)
}

pub fn execution_gas_fee_base_amount_key() -> B256 {
    hash_string(ESTIMATED_GAS_FEE_BASE_AMOUNT)
}

pub fn execution_gas_fee_multiplier_key() -> B256 {
    hash_string(ESTIMATED_GAS_FEE_MULTIPLIER_FACTOR)
}
