use alloy::primitives::{Address, U256};
use std::collections::HashMap;
use tracing::debug;

use crate::domain::price::to_f64;
use crate::domain::{MarketSet, PriceTable, SwapRoute};
use crate::engine::pricing::truncate_to_u256;
use crate::error::{Result, TraderError};
use crate::exchange::SwapEstimator;

/// A swap needs two markets when neither endpoint is the hub token
pub fn requires_multi_hop(start_token: Address, out_token: Address, hub_token: Address) -> bool {
    start_token != hub_token && out_token != hub_token
}

/// Markets a swap from `start_token` to `out_token` must traverse.
///
/// Every hop is the first market (in reader order) whose index token is the
/// non-hub side of that leg. `substitutions` redirect the out token of the
/// second leg to the token its market is actually indexed by.
pub fn resolve_route(
    markets: &MarketSet,
    start_token: Address,
    out_token: Address,
    hub_token: Address,
    substitutions: &HashMap<Address, Address>,
) -> Result<SwapRoute> {
    let first_leg_token = if start_token == hub_token {
        out_token
    } else {
        start_token
    };
    let first = market_indexed_by(markets, first_leg_token)?;

    if !requires_multi_hop(start_token, out_token, hub_token) {
        return Ok(SwapRoute {
            hops: vec![first],
            multi_hop: false,
        });
    }

    let second_leg_token = substitutions.get(&out_token).copied().unwrap_or(out_token);
    let second = market_indexed_by(markets, second_leg_token)?;

    Ok(SwapRoute {
        hops: vec![first, second],
        multi_hop: true,
    })
}

fn market_indexed_by(markets: &MarketSet, token: Address) -> Result<Address> {
    markets
        .find_by_index_token(token)
        .map(|m| m.market_token)
        .ok_or(TraderError::RouteResolutionFailure { token })
}

/// `amount - amount * slippage`, truncated
pub fn reduce_by_slippage(amount: U256, slippage: f64) -> U256 {
    let amount = to_f64(amount);
    truncate_to_u256(amount - amount * slippage)
}

/// Minimum output of a routed swap.
///
/// The first hop is quoted for `amount_in` of `start_token`. Each later hop
/// is quoted with the hub token as input and the previous quote, reduced by
/// slippage, as amount. The last quote reduced by slippage is the minimum.
#[allow(clippy::too_many_arguments)]
pub async fn estimate_min_output(
    estimator: &dyn SwapEstimator,
    markets: &MarketSet,
    prices: &PriceTable,
    route: &SwapRoute,
    start_token: Address,
    hub_token: Address,
    amount_in: U256,
    slippage: f64,
) -> Result<U256> {
    let mut token_in = start_token;
    let mut amount = amount_in;
    let mut quoted = U256::ZERO;

    for (hop, market_token) in route.hops.iter().enumerate() {
        let market = markets.get(market_token).ok_or_else(|| {
            TraderError::InvalidMarketData(format!("route market {market_token} not listed"))
        })?;
        let market_prices = prices.market_prices(market)?;

        if hop > 0 {
            token_in = hub_token;
            amount = reduce_by_slippage(quoted, slippage);
        }

        quoted = estimator
            .estimate_swap_output(market, &market_prices, token_in, amount)
            .await?;
        debug!(
            hop,
            market = %market.symbol,
            %token_in,
            %amount,
            %quoted,
            "Swap hop quoted"
        );
    }

    Ok(reduce_by_slippage(quoted, slippage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MarketInfo, PriceQuote};
    use crate::exchange::MockSwapEstimator;
    use alloy::primitives::address;

    const USDC: Address = address!("af88d065e77c8cC2239327C5EDb3A432268e5831");
    const WETH: Address = address!("82aF49447D8a07e3bd95BD0d56f35241523fBab1");
    const ARB: Address = address!("912CE59144191C1204E64559FE8253a0e49E6548");
    const BTC: Address = address!("2f2a2543B76A4166549F7aaB2e75Bef0aefC5B0f");
    const WBTC: Address = address!("47904963fc8b2340414262125aF798B9655E58Cd");

    const ETH_MARKET: Address = address!("70d95587d40A2caf56bd97485aB3Eec10Bee6336");
    const ARB_MARKET: Address = address!("C25cEf6061Cf5dE5eb761b50E4743c1F5D7E5407");
    const WBTC_MARKET: Address = address!("47c031236e19d024b42f8AE6780E44A573170703");

    fn market(token: Address, index: Address, long: Address) -> MarketInfo {
        MarketInfo {
            market_token: token,
            symbol: index.to_string(),
            index_token: index,
            long_token: long,
            short_token: USDC,
            index_decimals: Some(18),
        }
    }

    fn markets() -> MarketSet {
        MarketSet::new(vec![
            market(ETH_MARKET, WETH, WETH),
            market(ARB_MARKET, ARB, ARB),
            market(WBTC_MARKET, WBTC, WBTC),
        ])
    }

    #[test]
    fn test_hub_start_is_single_hop() {
        let route = resolve_route(&markets(), USDC, WETH, USDC, &HashMap::new()).unwrap();
        assert_eq!(route.hops, vec![ETH_MARKET]);
        assert!(!route.multi_hop);
    }

    #[test]
    fn test_hub_out_is_single_hop() {
        let route = resolve_route(&markets(), ARB, USDC, USDC, &HashMap::new()).unwrap();
        assert_eq!(route.hops, vec![ARB_MARKET]);
        assert!(!route.multi_hop);
    }

    #[test]
    fn test_non_hub_pair_routes_through_two_markets() {
        let route = resolve_route(&markets(), ARB, WETH, USDC, &HashMap::new()).unwrap();
        assert_eq!(route.hops, vec![ARB_MARKET, ETH_MARKET]);
        assert!(route.multi_hop);
        assert!(requires_multi_hop(ARB, WETH, USDC));
    }

    #[test]
    fn test_substitution_applies_to_second_leg() {
        let substitutions = HashMap::from([(BTC, WBTC)]);
        let route = resolve_route(&markets(), WETH, BTC, USDC, &substitutions).unwrap();
        assert_eq!(route.hops, vec![ETH_MARKET, WBTC_MARKET]);

        match resolve_route(&markets(), WETH, BTC, USDC, &HashMap::new()) {
            Err(TraderError::RouteResolutionFailure { token }) => assert_eq!(token, BTC),
            other => panic!("expected RouteResolutionFailure, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_start_token_is_typed_failure() {
        let unknown = address!("00000000000000000000000000000000000000ff");
        let err = resolve_route(&markets(), unknown, USDC, USDC, &HashMap::new()).unwrap_err();
        assert!(matches!(err, TraderError::RouteResolutionFailure { token } if token == unknown));
    }

    #[test]
    fn test_reduce_by_slippage_truncates() {
        assert_eq!(reduce_by_slippage(U256::from(1_000u64), 0.01), U256::from(990u64));
        assert_eq!(reduce_by_slippage(U256::from(999u64), 0.5), U256::from(499u64));
    }

    #[tokio::test]
    async fn test_min_output_chains_hops_through_hub() {
        let mut prices = PriceTable::default();
        for token in [USDC, WETH, ARB] {
            prices.insert(token, PriceQuote::new(U256::from(10u64), U256::from(10u64)));
        }

        let mut estimator = MockSwapEstimator::new();
        estimator
            .expect_estimate_swap_output()
            .withf(|m, _, token_in, amount| {
                m.market_token == ARB_MARKET && *token_in == ARB && *amount == U256::from(1_000u64)
            })
            .times(1)
            .returning(|_, _, _, _| Ok(U256::from(2_000u64)));
        estimator
            .expect_estimate_swap_output()
            .withf(|m, _, token_in, amount| {
                m.market_token == ETH_MARKET && *token_in == USDC && *amount == U256::from(1_980u64)
            })
            .times(1)
            .returning(|_, _, _, _| Ok(U256::from(500u64)));

        let route = SwapRoute {
            hops: vec![ARB_MARKET, ETH_MARKET],
            multi_hop: true,
        };
        let min_out = estimate_min_output(
            &estimator,
            &markets(),
            &prices,
            &route,
            ARB,
            USDC,
            U256::from(1_000u64),
            0.01,
        )
        .await
        .unwrap();

        assert_eq!(min_out, U256::from(495u64));
    }

    #[tokio::test]
    async fn test_min_output_requires_long_price() {
        let prices = PriceTable::default();
        let mut estimator = MockSwapEstimator::new();
        estimator.expect_estimate_swap_output().never();

        let route = SwapRoute {
            hops: vec![ARB_MARKET],
            multi_hop: false,
        };
        let err = estimate_min_output(
            &estimator,
            &markets(),
            &prices,
            &route,
            ARB,
            USDC,
            U256::from(1u64),
            0.01,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, TraderError::MissingPriceData { token } if token == ARB));
    }
}
