mod common;

use alloy::primitives::{Address, U256};
use std::sync::Arc;

use common::*;
use gmx_trader::domain::{OrderRequest, OrderState};
use gmx_trader::engine::BatchOperation;
use gmx_trader::error::TraderError;

#[tokio::test]
async fn test_multi_hop_swap_quotes_through_the_hub() {
    let chain = Arc::new(FakeChain::arbitrum());
    let engine = engine(&chain);

    let handle = engine
        .build_and_submit(OrderRequest::swap(
            "arbitrum",
            ARB,
            WETH,
            U256::from(1_000u64),
            0.01,
        ))
        .await
        .unwrap();
    assert_eq!(handle.state, OrderState::Accepted);

    // 1000 ARB -> 2000 USDC, less 1% -> 1980 USDC -> 990 WETH, less 1% -> 980
    assert_eq!(
        chain.swap_quotes(),
        vec![
            (ARB_MARKET, ARB, U256::from(1_000u64)),
            (ETH_MARKET, USDC, U256::from(1_980u64)),
        ]
    );

    let submitted = chain.submitted();
    let batch = &submitted[0];
    // (600_000 + 2_500_000 + 1_000_000) * GAS_PRICE * 3 / 2
    let fee = U256::from(61_500_000_000_000u64);
    assert_eq!(batch.value, fee);
    assert_eq!(batch.len(), 3);
    assert_eq!(
        batch.operations[1],
        BatchOperation::SendToken {
            token: ARB,
            receiver: arbitrum().order_vault,
            amount: U256::from(1_000u64),
        }
    );

    let params = batch.create_order().unwrap();
    assert_eq!(params.orderType, 0);
    assert_eq!(params.addresses.market, Address::ZERO);
    assert_eq!(params.addresses.initialCollateralToken, ARB);
    assert_eq!(params.addresses.swapPath, vec![ARB_MARKET, ETH_MARKET]);
    assert_eq!(params.numbers.minOutputAmount, U256::from(980u64));
    assert_eq!(params.numbers.acceptablePrice, U256::ZERO);
    assert_eq!(params.numbers.triggerPrice, U256::ZERO);
    assert_eq!(params.numbers.sizeDeltaUsd, U256::ZERO);
    assert_eq!(params.numbers.executionFee, fee);
    assert!(chain.execution_quotes().is_empty());
}

#[tokio::test]
async fn test_single_hop_from_hub_uses_out_token_market() {
    let chain = Arc::new(FakeChain::arbitrum());
    let engine = engine(&chain);

    let plan = engine
        .plan(OrderRequest::swap(
            "arbitrum",
            USDC,
            ARB,
            U256::from(5_000_000u64),
            0.01,
        ))
        .await
        .unwrap();

    assert!(plan.execution_preview.is_none());
    let route = plan.route.unwrap();
    assert_eq!(route.hops, vec![ARB_MARKET]);
    assert!(!route.multi_hop);
    assert!(!plan.gas.multi_hop);
    assert_eq!(plan.gas.entry, U256::from(2_500_000u64));
    assert_eq!(plan.min_output_amount, U256::from(9_900_000u64));
    assert_eq!(
        plan.transitions.iter().map(|t| t.to).collect::<Vec<_>>(),
        vec![
            OrderState::GasResolved,
            OrderState::ApprovalChecked,
            OrderState::Priced,
            OrderState::FeeEstimated,
            OrderState::Routed,
            OrderState::BatchBuilt,
        ]
    );
    assert!(chain.submitted().is_empty());
}

#[tokio::test]
async fn test_substituted_out_token_routes_through_its_market() {
    let chain = Arc::new(FakeChain::arbitrum());
    let engine = engine(&chain);

    let plan = engine
        .plan(OrderRequest::swap(
            "arbitrum",
            ARB,
            BTC,
            U256::from(4_000u64),
            0.0,
        ))
        .await
        .unwrap();

    let route = plan.route.unwrap();
    assert_eq!(route.hops, vec![ARB_MARKET, WBTC_MARKET]);
    assert!(plan.gas.multi_hop);
    // 4000 -> 8000 -> 2000
    assert_eq!(plan.min_output_amount, U256::from(2_000u64));
}

#[tokio::test]
async fn test_wrapped_native_swap_sends_amount_with_fee() {
    let chain = Arc::new(FakeChain::arbitrum());
    let engine = engine(&chain);
    let amount = U256::from(10u64).pow(U256::from(17u64));

    let plan = engine
        .plan(OrderRequest::swap("arbitrum", WETH, ARB, amount, 0.01))
        .await
        .unwrap();

    assert_eq!(plan.batch.len(), 2);
    assert_eq!(plan.batch.value, amount + plan.fee.execution_fee);
    assert_eq!(
        plan.route.map(|r| r.hops),
        Some(vec![ETH_MARKET, ARB_MARKET])
    );
}

#[tokio::test]
async fn test_unroutable_token_fails_before_submission() {
    let chain = Arc::new(FakeChain::arbitrum());
    let engine = engine(&chain);

    let err = engine
        .build_and_submit(OrderRequest::swap(
            "arbitrum",
            USDC,
            LINK,
            U256::from(1_000_000u64),
            0.01,
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, TraderError::RouteResolutionFailure { token } if token == LINK));
    assert!(chain.submitted().is_empty());
    assert!(chain.swap_quotes().is_empty());
}

#[tokio::test]
async fn test_swap_to_same_token_is_rejected() {
    let chain = Arc::new(FakeChain::arbitrum());
    let engine = engine(&chain);

    let err = engine
        .plan(OrderRequest::swap(
            "arbitrum",
            USDC,
            USDC,
            U256::from(1_000_000u64),
            0.01,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, TraderError::Validation(_)));
}
