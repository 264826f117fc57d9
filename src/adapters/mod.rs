pub mod contracts;
pub mod gmx_api;
pub mod keys;
pub mod rpc;
pub mod scatter;

pub use gmx_api::GmxApiClient;
pub use rpc::RpcChainClient;
pub use scatter::gather_positional;
