//! Ordered multicall batches for the exchange router.
//!
//! The router executes the batch atomically. Funding operations must precede
//! `createOrder` because the order vault balance is recorded when the order
//! is created.

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::SolCall;
use std::fmt;

use crate::adapters::contracts::{
    CreateOrderParams, CreateOrderParamsAddresses, CreateOrderParamsNumbers, IExchangeRouter,
};
use crate::chain::ChainContracts;
use crate::domain::{DecreasePositionSwapType, OrderKind, OrderRequest};
use crate::engine::pricing::AcceptablePrice;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// `sendWnt`: wrap the attached native value into the receiver
    SendNativeCurrency { receiver: Address, amount: U256 },
    /// `sendTokens`: pull an approved ERC-20 amount into the receiver
    SendToken {
        token: Address,
        receiver: Address,
        amount: U256,
    },
    CreateOrder(Box<CreateOrderParams>),
}

impl BatchOperation {
    pub fn name(&self) -> &'static str {
        match self {
            BatchOperation::SendNativeCurrency { .. } => "sendWnt",
            BatchOperation::SendToken { .. } => "sendTokens",
            BatchOperation::CreateOrder(_) => "createOrder",
        }
    }

    pub fn encode(&self) -> Bytes {
        match self {
            BatchOperation::SendNativeCurrency { receiver, amount } => {
                IExchangeRouter::sendWntCall {
                    receiver: *receiver,
                    amount: *amount,
                }
                .abi_encode()
                .into()
            }
            BatchOperation::SendToken {
                token,
                receiver,
                amount,
            } => IExchangeRouter::sendTokensCall {
                token: *token,
                receiver: *receiver,
                amount: *amount,
            }
            .abi_encode()
            .into(),
            BatchOperation::CreateOrder(params) => IExchangeRouter::createOrderCall {
                params: params.as_ref().clone(),
            }
            .abi_encode()
            .into(),
        }
    }
}

/// Operations for one `multicall` plus the native value sent with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MulticallBatch {
    pub operations: Vec<BatchOperation>,
    pub value: U256,
}

impl MulticallBatch {
    pub fn encode(&self) -> Vec<Bytes> {
        self.operations.iter().map(BatchOperation::encode).collect()
    }

    /// Calldata of `multicall(bytes[])`
    pub fn calldata(&self) -> Bytes {
        IExchangeRouter::multicallCall {
            data: self.encode(),
        }
        .abi_encode()
        .into()
    }

    pub fn create_order(&self) -> Option<&CreateOrderParams> {
        self.operations.iter().find_map(|op| match op {
            BatchOperation::CreateOrder(params) => Some(params.as_ref()),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl fmt::Display for MulticallBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.operations.iter().map(BatchOperation::name).collect();
        write!(f, "[{}] value={}", names.join(", "), self.value)
    }
}

/// Arguments for `createOrder`.
///
/// Callbacks, UI fees, referral codes and decrease-position swaps are not
/// supported, so those fields are always zero. Swaps carry no market and no
/// trigger or acceptable price.
pub fn order_params(
    trader: Address,
    request: &OrderRequest,
    swap_path: Vec<Address>,
    price: &AcceptablePrice,
    execution_fee: U256,
    min_output_amount: U256,
) -> CreateOrderParams {
    let market = if request.is_swap() {
        Address::ZERO
    } else {
        request.market
    };

    CreateOrderParams {
        addresses: CreateOrderParamsAddresses {
            receiver: trader,
            callbackContract: Address::ZERO,
            uiFeeReceiver: Address::ZERO,
            market,
            initialCollateralToken: request.collateral_token,
            swapPath: swap_path,
        },
        numbers: CreateOrderParamsNumbers {
            sizeDeltaUsd: request.size_delta_usd,
            initialCollateralDeltaAmount: request.initial_collateral_delta,
            triggerPrice: price.mark_price,
            acceptablePrice: price.acceptable_price_raw,
            executionFee: execution_fee,
            callbackGasLimit: U256::ZERO,
            minOutputAmount: min_output_amount,
        },
        orderType: request.kind.order_type(),
        decreasePositionSwapType: DecreasePositionSwapType::NoSwap as u8,
        isLong: request.direction.is_long(),
        shouldUnwrapNativeToken: true,
        referralCode: B256::ZERO,
    }
}

/// Order the funding and creation calls.
///
/// Wrapped-native collateral and closes fund the vault with one `sendWnt`
/// (fee only for closes, collateral plus fee otherwise). Any other collateral
/// is funded with `sendWnt(fee)` followed by `sendTokens(collateral)`.
pub fn assemble_batch(
    contracts: &ChainContracts,
    kind: OrderKind,
    collateral_token: Address,
    collateral_amount: U256,
    execution_fee: U256,
    params: CreateOrderParams,
) -> MulticallBatch {
    let vault = contracts.order_vault;
    let create = BatchOperation::CreateOrder(Box::new(params));

    if collateral_token == contracts.wrapped_native_token || kind == OrderKind::Decrease {
        let value = if kind == OrderKind::Decrease {
            execution_fee
        } else {
            collateral_amount + execution_fee
        };

        return MulticallBatch {
            operations: vec![
                BatchOperation::SendNativeCurrency {
                    receiver: vault,
                    amount: value,
                },
                create,
            ],
            value,
        };
    }

    MulticallBatch {
        operations: vec![
            BatchOperation::SendNativeCurrency {
                receiver: vault,
                amount: execution_fee,
            },
            BatchOperation::SendToken {
                token: collateral_token,
                receiver: vault,
                amount: collateral_amount,
            },
            create,
        ],
        value: execution_fee,
    }
}
