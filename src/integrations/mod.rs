//! Channel integration readiness.
//!
//! Before a workflow may use an external channel for a client workspace,
//! the channel's credentials must be present and its last live
//! verification must be recent enough. This module turns raw
//! credential/verification facts into a readiness verdict and, when the
//! verdict is negative, an ordered list of remediation steps.

mod contract;
mod suggestions;

pub use contract::{evaluate, IntegrationContract, VerificationFacts};
pub use suggestions::{
    build_fix_suggestions, Suggestion, SuggestionInput, VerificationStatus,
};
