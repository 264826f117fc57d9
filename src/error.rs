use alloy::primitives::{Address, U256};
use thiserror::Error;

/// Main error type for order construction and submission
#[derive(Error, Debug)]
pub enum TraderError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Unknown chain: {0}")]
    UnknownChain(String),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Contract call failed: {0}")]
    Contract(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Order construction errors
    #[error("Insufficient balance of {token}: required {required}, available {available}")]
    InsufficientBalance {
        token: Address,
        required: U256,
        available: U256,
    },

    #[error("Token {token} not approved for spend by {spender}: required {required}, approved {approved}")]
    ApprovalRequired {
        token: Address,
        spender: Address,
        required: U256,
        approved: U256,
    },

    #[error("Missing price data for token: {token}")]
    MissingPriceData { token: Address },

    #[error("No market found to route swap through for token: {token}")]
    RouteResolutionFailure { token: Address },

    #[error("Transaction submission failed: {reason}{}", link_suffix(.explorer_url))]
    SubmissionFailure {
        reason: String,
        explorer_url: Option<String>,
    },

    // State machine errors
    #[error("Invalid state transition: from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invalid market data: {0}")]
    InvalidMarketData(String),

    #[error("Address parsing error: {0}")]
    AddressParsing(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // Crypto/signing errors
    #[error("Wallet error: {0}")]
    Wallet(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

fn link_suffix(explorer_url: &Option<String>) -> String {
    explorer_url
        .as_ref()
        .map(|url| format!(" ({url})"))
        .unwrap_or_default()
}

/// Result type alias for TraderError
pub type Result<T> = std::result::Result<T, TraderError>;
