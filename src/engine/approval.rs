use alloy::primitives::{Address, B256, U256};
use tracing::{info, instrument, warn};

use crate::error::{Result, TraderError};
use crate::exchange::TokenLedger;

/// What to do when the router allowance is short
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalMode {
    /// Submit `approve` and wait for it
    AutoApprove,
    /// Fail with `ApprovalRequired`
    Require,
    /// Report the shortfall without failing or submitting (dry runs)
    Inspect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// Allowance already covers the amount
    Sufficient,
    /// An approve transaction was mined
    Approved { tx_hash: B256 },
    /// Allowance is short; only returned in `Inspect` mode
    Needed { approved: U256 },
}

/// Make sure `owner` holds `amount` of `token` and `spender` may pull it.
///
/// The balance of the wrapped-native token is the account's native balance,
/// since it is wrapped inside the batch.
#[instrument(skip_all, fields(%token, %amount))]
pub async fn ensure_spend_approval(
    ledger: &dyn TokenLedger,
    owner: Address,
    token: Address,
    spender: Address,
    amount: U256,
    wrapped_native_token: Address,
    mode: ApprovalMode,
) -> Result<ApprovalOutcome> {
    let available = if token == wrapped_native_token {
        ledger.native_balance(owner).await?
    } else {
        ledger.balance_of(token, owner).await?
    };

    if available < amount {
        warn!(%available, "Insufficient collateral balance");
        return Err(TraderError::InsufficientBalance {
            token,
            required: amount,
            available,
        });
    }

    let approved = ledger.allowance(token, owner, spender).await?;
    if approved >= amount {
        return Ok(ApprovalOutcome::Sufficient);
    }

    match mode {
        ApprovalMode::AutoApprove => {
            info!(%approved, %spender, "Allowance short, submitting approve");
            let tx_hash = ledger.approve(token, spender, amount).await?;
            info!(%tx_hash, "Approve mined");
            Ok(ApprovalOutcome::Approved { tx_hash })
        }
        ApprovalMode::Require => Err(TraderError::ApprovalRequired {
            token,
            spender,
            required: amount,
            approved,
        }),
        ApprovalMode::Inspect => {
            warn!(%approved, %spender, "Allowance short, approval needed before submission");
            Ok(ApprovalOutcome::Needed { approved })
        }
    }
}
