pub mod approval;
pub mod batch;
pub mod fees;
pub mod order_engine;
pub mod parameters;
pub mod pricing;
pub mod routing;

pub use approval::{ensure_spend_approval, ApprovalMode, ApprovalOutcome};
pub use batch::{assemble_batch, order_params, BatchOperation, MulticallBatch};
pub use order_engine::{
    EngineSettings, FeeEstimate, GasSelection, OrderBuild, OrderEngine, OrderPlan, PricedOrder,
    TransactionHandle,
};
pub use parameters::{close_position_request, PositionParameters, SwapParameters, TokenDirectory};
pub use pricing::{compute_acceptable_price, AcceptablePrice};
pub use routing::{resolve_route, requires_multi_hop};
