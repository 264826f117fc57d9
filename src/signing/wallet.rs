use crate::error::{Result, TraderError};
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use tracing::info;
use zeroize::Zeroize;

/// Signing key for order and approval transactions
///
/// # Security
/// The hex key is zeroized as soon as the signer is built and is never kept
/// on this struct.
#[derive(Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a private key hex string, with or without `0x`
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let mut secure_key = private_key.trim().trim_start_matches("0x").to_string();

        let parsed = secure_key.parse::<PrivateKeySigner>();
        secure_key.zeroize();

        let signer = parsed.map_err(|e| TraderError::Wallet(format!("Invalid private key: {}", e)))?;
        info!("Wallet initialized: {} (private key zeroized from memory)", signer.address());

        Ok(Self { signer })
    }

    /// Read the key from `GMX_PRIVATE_KEY`, falling back to `PRIVATE_KEY`
    pub fn from_env() -> Result<Self> {
        let mut private_key = std::env::var("GMX_PRIVATE_KEY")
            .or_else(|_| std::env::var("PRIVATE_KEY"))
            .map_err(|_| {
                TraderError::Wallet(
                    "GMX_PRIVATE_KEY or PRIVATE_KEY environment variable not set".to_string(),
                )
            })?;

        let result = Self::from_private_key(&private_key);
        private_key.zeroize();

        result
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Fail unless the configured trader address belongs to this key
    pub fn ensure_address(&self, expected: Option<&str>) -> Result<()> {
        let Some(raw) = expected else {
            return Ok(());
        };
        let expected = crate::chain::parse_address("wallet.address", raw)?;
        if expected != self.address() {
            return Err(TraderError::Wallet(format!(
                "configured wallet address {} does not match signer {}",
                expected,
                self.address()
            )));
        }
        Ok(())
    }

    pub fn signer(&self) -> PrivateKeySigner {
        self.signer.clone()
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
