use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use super::OrderKind;

/// Gas-limit constants read from the protocol data store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasLimits {
    pub increase_order: U256,
    pub decrease_order: U256,
    pub swap_order: U256,
    pub single_swap: U256,
    pub estimated_fee_base_gas_limit: U256,
    /// 1e30-scaled factor applied to the order's gas limit
    pub estimated_fee_multiplier_factor: U256,
}

impl GasLimits {
    /// Gas limit the keeper will need for an order of this kind.
    ///
    /// Multi-hop swaps also pay for the first leg's single swap.
    pub fn for_order(&self, kind: OrderKind, multi_hop: bool) -> U256 {
        match kind {
            OrderKind::Increase => self.increase_order,
            OrderKind::Decrease => self.decrease_order,
            OrderKind::Swap if multi_hop => self.swap_order + self.single_swap,
            OrderKind::Swap => self.swap_order,
        }
    }
}
