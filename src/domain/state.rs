use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TraderError};

/// Lifecycle of a single order build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderState {
    /// Request accepted, nothing resolved yet
    Created,
    /// Gas-limit entry selected for the order kind
    GasResolved,
    /// Balance and allowance verified (or skipped for decreases)
    ApprovalChecked,
    /// Oracle snapshot taken, acceptable price computed
    Priced,
    /// Execution fee estimated
    FeeEstimated,
    /// Swap route and minimum output resolved (swaps only)
    Routed,
    /// Multicall batch assembled
    BatchBuilt,
    /// Transaction sent, waiting for the receipt
    Submitted,
    /// Receipt status success
    Accepted,
    /// Receipt reverted or submission failed
    Rejected,
}

impl OrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Created => "CREATED",
            OrderState::GasResolved => "GAS_RESOLVED",
            OrderState::ApprovalChecked => "APPROVAL_CHECKED",
            OrderState::Priced => "PRICED",
            OrderState::FeeEstimated => "FEE_ESTIMATED",
            OrderState::Routed => "ROUTED",
            OrderState::BatchBuilt => "BATCH_BUILT",
            OrderState::Submitted => "SUBMITTED",
            OrderState::Accepted => "ACCEPTED",
            OrderState::Rejected => "REJECTED",
        }
    }

    /// Check if this state can transition to another state
    pub fn can_transition_to(&self, target: OrderState) -> bool {
        use OrderState::*;

        match (self, target) {
            (Created, GasResolved) => true,
            (GasResolved, ApprovalChecked) => true,
            (ApprovalChecked, Priced) => true,
            (Priced, FeeEstimated) => true,

            // Swaps pass through Routed, position orders go straight to the batch
            (FeeEstimated, Routed) => true,
            (FeeEstimated, BatchBuilt) => true,
            (Routed, BatchBuilt) => true,

            (BatchBuilt, Submitted) => true,
            (Submitted, Accepted) => true,
            (Submitted, Rejected) => true,

            _ => false,
        }
    }

    /// Get valid next states from current state
    pub fn valid_transitions(&self) -> Vec<OrderState> {
        use OrderState::*;

        match self {
            Created => vec![GasResolved],
            GasResolved => vec![ApprovalChecked],
            ApprovalChecked => vec![Priced],
            Priced => vec![FeeEstimated],
            FeeEstimated => vec![Routed, BatchBuilt],
            Routed => vec![BatchBuilt],
            BatchBuilt => vec![Submitted],
            Submitted => vec![Accepted, Rejected],
            Accepted | Rejected => vec![],
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderState::Accepted | OrderState::Rejected)
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for OrderState {
    type Error = String;

    fn try_from(s: &str) -> std::result::Result<Self, Self::Error> {
        match s.to_uppercase().as_str() {
            "CREATED" => Ok(OrderState::Created),
            "GAS_RESOLVED" => Ok(OrderState::GasResolved),
            "APPROVAL_CHECKED" => Ok(OrderState::ApprovalChecked),
            "PRICED" => Ok(OrderState::Priced),
            "FEE_ESTIMATED" => Ok(OrderState::FeeEstimated),
            "ROUTED" => Ok(OrderState::Routed),
            "BATCH_BUILT" => Ok(OrderState::BatchBuilt),
            "SUBMITTED" => Ok(OrderState::Submitted),
            "ACCEPTED" => Ok(OrderState::Accepted),
            "REJECTED" => Ok(OrderState::Rejected),
            _ => Err(format!("Unknown state: {}", s)),
        }
    }
}

/// State transition event (for logging/debugging)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: OrderState,
    pub to: OrderState,
    pub reason: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl StateTransition {
    pub fn new(from: OrderState, to: OrderState, reason: impl Into<String>) -> Self {
        Self {
            from,
            to,
            reason: reason.into(),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Forward-only state tracker with its transition history
#[derive(Debug, Clone)]
pub struct OrderLifecycle {
    state: OrderState,
    history: Vec<StateTransition>,
}

impl Default for OrderLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderLifecycle {
    pub fn new() -> Self {
        Self {
            state: OrderState::Created,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> OrderState {
        self.state
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    pub fn advance(&mut self, to: OrderState, reason: impl Into<String>) -> Result<()> {
        if !self.state.can_transition_to(to) {
            return Err(TraderError::InvalidStateTransition {
                from: self.state.to_string(),
                to: to.to_string(),
            });
        }

        self.history
            .push(StateTransition::new(self.state, to, reason));
        self.state = to;
        Ok(())
    }
}
