pub mod factory;
mod traits;

pub use factory::{build_chain_services, build_engine};
pub use traits::*;
