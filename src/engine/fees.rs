use alloy::primitives::U256;

use crate::domain::{GasLimits, OrderKind};

/// Precision of `estimated_fee_multiplier_factor`
pub const FLOAT_PRECISION: U256 = U256::from_limbs([0x4674_edea_4000_0000, 0xc_9f2c_9cd0, 0, 0]);

/// `value * factor / 1e30`
pub fn apply_factor(value: U256, factor: U256) -> U256 {
    value.saturating_mul(factor) / FLOAT_PRECISION
}

/// Native fee the keeper is paid for executing the order, before padding
pub fn execution_fee(gas_limits: &GasLimits, gas_limit_entry: U256, gas_price: U256) -> U256 {
    let adjusted_gas_limit = gas_limits.estimated_fee_base_gas_limit
        + apply_factor(gas_limit_entry, gas_limits.estimated_fee_multiplier_factor);
    adjusted_gas_limit.saturating_mul(gas_price)
}

/// Headroom for gas price drift between estimation and execution:
/// 3/2 for swaps, 6/5 for position orders
pub fn pad_execution_fee(fee: U256, kind: OrderKind) -> U256 {
    let (numerator, denominator) = match kind {
        OrderKind::Swap => (3u64, 2u64),
        OrderKind::Increase | OrderKind::Decrease => (6, 5),
    };
    fee.saturating_mul(U256::from(numerator)) / U256::from(denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> GasLimits {
        GasLimits {
            increase_order: U256::from(3_000_000u64),
            decrease_order: U256::from(3_000_000u64),
            swap_order: U256::from(2_500_000u64),
            single_swap: U256::from(1_000_000u64),
            estimated_fee_base_gas_limit: U256::from(600_000u64),
            // 1.5x
            estimated_fee_multiplier_factor: FLOAT_PRECISION * U256::from(3u64) / U256::from(2u64),
        }
    }

    #[test]
    fn test_float_precision_is_ten_to_the_30() {
        assert_eq!(FLOAT_PRECISION, U256::from(10u64).pow(U256::from(30u64)));
    }

    #[test]
    fn test_fee_formula() {
        let gas = limits();
        let fee = execution_fee(&gas, gas.increase_order, U256::from(10_000_000u64));
        // (600_000 + 3_000_000 * 1.5) * 1e7
        assert_eq!(fee, U256::from(51_000_000_000_000u64));
    }

    #[test]
    fn test_fee_scales_linearly_with_gas_price() {
        let gas = limits();
        let single = execution_fee(&gas, gas.swap_order, U256::from(12_345_678u64));
        let double = execution_fee(&gas, gas.swap_order, U256::from(24_691_356u64));
        assert_eq!(double, single * U256::from(2u64));
    }

    #[test]
    fn test_fee_is_deterministic() {
        let gas = limits();
        let price = U256::from(100_000_000u64);
        let first = pad_execution_fee(execution_fee(&gas, gas.decrease_order, price), OrderKind::Decrease);
        let second = pad_execution_fee(execution_fee(&gas, gas.decrease_order, price), OrderKind::Decrease);
        assert_eq!(first, second);
    }

    #[test]
    fn test_padding_per_kind() {
        let fee = U256::from(1_000_001u64);
        assert_eq!(pad_execution_fee(fee, OrderKind::Swap), U256::from(1_500_001u64));
        assert_eq!(pad_execution_fee(fee, OrderKind::Increase), U256::from(1_200_001u64));
        assert_eq!(pad_execution_fee(fee, OrderKind::Decrease), U256::from(1_200_001u64));
    }
}
