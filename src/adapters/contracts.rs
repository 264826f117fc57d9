//! Contract bindings for the protocol's router, reader and data store.

use alloy::sol;

sol! {
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    struct CreateOrderParamsAddresses {
        address receiver;
        address callbackContract;
        address uiFeeReceiver;
        address market;
        address initialCollateralToken;
        address[] swapPath;
    }

    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    struct CreateOrderParamsNumbers {
        uint256 sizeDeltaUsd;
        uint256 initialCollateralDeltaAmount;
        uint256 triggerPrice;
        uint256 acceptablePrice;
        uint256 executionFee;
        uint256 callbackGasLimit;
        uint256 minOutputAmount;
    }

    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    struct CreateOrderParams {
        CreateOrderParamsAddresses addresses;
        CreateOrderParamsNumbers numbers;
        uint8 orderType;
        uint8 decreasePositionSwapType;
        bool isLong;
        bool shouldUnwrapNativeToken;
        bytes32 referralCode;
    }

    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    struct MarketProps {
        address marketToken;
        address indexToken;
        address longToken;
        address shortToken;
    }

    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    struct PriceProps {
        uint256 min;
        uint256 max;
    }

    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    struct MarketPricesProps {
        PriceProps indexTokenPrice;
        PriceProps longTokenPrice;
        PriceProps shortTokenPrice;
    }

    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    struct SwapFees {
        uint256 feeReceiverAmount;
        uint256 feeAmountForPool;
        uint256 amountAfterFees;
        address uiFeeReceiver;
        uint256 uiFeeReceiverFactor;
        uint256 uiFeeAmount;
    }

    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    struct PositionAddresses {
        address account;
        address market;
        address collateralToken;
    }

    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    struct PositionNumbers {
        uint256 sizeInUsd;
        uint256 sizeInTokens;
        uint256 collateralAmount;
        uint256 borrowingFactor;
        uint256 fundingFeeAmountPerSize;
        uint256 longTokenClaimableFundingAmountPerSize;
        uint256 shortTokenClaimableFundingAmountPerSize;
        uint256 increasedAtBlock;
        uint256 decreasedAtBlock;
    }

    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    struct PositionFlags {
        bool isLong;
    }

    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    struct PositionProps {
        PositionAddresses addresses;
        PositionNumbers numbers;
        PositionFlags flags;
    }

    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    struct ExecutionPriceResult {
        int256 priceImpactUsd;
        uint256 priceImpactDiffUsd;
        uint256 executionPrice;
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IExchangeRouter {
        function multicall(bytes[] calldata data) external payable returns (bytes[] memory results);

        function sendWnt(address receiver, uint256 amount) external payable;

        function sendTokens(address token, address receiver, uint256 amount) external payable;

        function createOrder(CreateOrderParams calldata params) external payable returns (bytes32);
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IDataStore {
        function getUint(bytes32 key) external view returns (uint256);
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IReader {
        function getMarkets(address dataStore, uint256 start, uint256 end) external view returns (MarketProps[] memory);

        function getSwapAmountOut(
            address dataStore,
            MarketProps memory market,
            MarketPricesProps memory prices,
            address tokenIn,
            uint256 amountIn,
            address uiFeeReceiver
        ) external view returns (uint256 amountOut, int256 impactAmount, SwapFees memory fees);

        function getAccountPositions(address dataStore, address account, uint256 start, uint256 end) external view returns (PositionProps[] memory);

        function getExecutionPrice(
            address dataStore,
            address marketKey,
            PriceProps memory indexTokenPrice,
            uint256 positionSizeInUsd,
            uint256 positionSizeInTokens,
            int256 sizeDeltaUsd,
            bool isLong
        ) external view returns (ExecutionPriceResult memory);
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);

        function allowance(address owner, address spender) external view returns (uint256);

        function approve(address spender, uint256 amount) external returns (bool);
    }
}

impl From<&crate::domain::MarketInfo> for MarketProps {
    fn from(market: &crate::domain::MarketInfo) -> Self {
        Self {
            marketToken: market.market_token,
            indexToken: market.index_token,
            longToken: market.long_token,
            shortToken: market.short_token,
        }
    }
}

impl From<&crate::domain::PriceQuote> for PriceProps {
    fn from(quote: &crate::domain::PriceQuote) -> Self {
        Self {
            min: quote.min_price,
            max: quote.max_price,
        }
    }
}

impl From<&crate::domain::MarketPrices> for MarketPricesProps {
    fn from(prices: &crate::domain::MarketPrices) -> Self {
        Self {
            indexTokenPrice: (&prices.index).into(),
            longTokenPrice: (&prices.long).into(),
            shortTokenPrice: (&prices.short).into(),
        }
    }
}

impl From<PositionProps> for crate::domain::OpenPosition {
    fn from(props: PositionProps) -> Self {
        Self {
            market: props.addresses.market,
            collateral_token: props.addresses.collateralToken,
            direction: props.flags.isLong.into(),
            size_in_usd: props.numbers.sizeInUsd,
            size_in_tokens: props.numbers.sizeInTokens,
            collateral_amount: props.numbers.collateralAmount,
        }
    }
}
