pub mod adapters;
pub mod chain;
pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod exchange;
pub mod signing;

pub use chain::{ChainContracts, ChainRegistry};
pub use config::AppConfig;
pub use engine::{OrderEngine, OrderPlan, TransactionHandle};
pub use error::{Result, TraderError};
pub use exchange::ChainServices;
pub use signing::Wallet;
