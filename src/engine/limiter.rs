//! Per-execution safety cap.
//!
//! Every run carries a hard ceiling on the number of side-effecting channel
//! actions it may perform. The engine checks the cap before each action
//! attempt; a breach is a policy error, never a silent skip.

use tracing::warn;

use crate::error::{Error, Result};

/// Inputs to one safety-cap check.
#[derive(Debug, Clone, Copy)]
pub struct SafetyLimitCheck {
    /// Hard ceiling on actions for this execution
    pub max_actions: u32,

    /// In-flight approval requests for this execution. Carried for future
    /// policies that subtract approvals from headroom; the baseline rule
    /// ignores it.
    pub pending_approvals: u32,

    /// Actions the run wants to have attempted, including this one
    pub requested_actions: u32,
}

/// Enforce the per-execution action cap.
///
/// Fails with [`Error::ExecutionCapExceeded`] iff `requested_actions`
/// exceeds `max_actions`; the boundary `requested_actions == max_actions`
/// passes. Pure and synchronous.
pub fn enforce_safety_limits(check: &SafetyLimitCheck) -> Result<()> {
    if check.requested_actions > check.max_actions {
        warn!(
            requested = check.requested_actions,
            max = check.max_actions,
            pending_approvals = check.pending_approvals,
            "execution action cap exceeded"
        );
        return Err(Error::ExecutionCapExceeded {
            requested: check.requested_actions,
            max: check.max_actions,
        });
    }
    Ok(())
}
