//! Remediation suggestions for channels that are not ready.
//!
//! Suggestions are derived purely from contract component flags and are
//! emitted in a stable order (credential issues, then policy, then
//! freshness) so repeated calls with identical inputs render identically
//! in the UI.

use serde::{Deserialize, Serialize};

use super::contract::{IntegrationContract, VerificationFacts};

/// Outcome of the most recent live verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Passed,
    Failed,
}

/// One actionable remediation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// Stable key, e.g. `connect_access_token`
    pub id: String,

    /// Short human title
    pub title: String,

    /// Next step, actionable by a human or by automation
    pub action: String,
}

impl Suggestion {
    fn new(id: &str, title: &str, action: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            action: action.to_string(),
        }
    }
}

/// Inputs to the suggestion builder: the contract's component flags plus
/// the per-credential facts the flags were derived from.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuggestionInput {
    pub connected: bool,
    pub has_access_token: bool,
    pub has_phone_number_id: bool,
    pub verified: bool,
    pub test_send_passed: bool,
    pub stale: bool,

    /// Live verification is allowed by tenant policy/config
    pub live_allowed: bool,

    /// Most recent verification outcome, if any attempt exists
    pub latest_verification_status: Option<VerificationStatus>,
}

impl SuggestionInput {
    /// Assemble builder input from an evaluated contract and the facts it
    /// was evaluated from.
    pub fn from_contract(
        contract: &IntegrationContract,
        facts: &VerificationFacts,
        live_allowed: bool,
        latest_verification_status: Option<VerificationStatus>,
    ) -> Self {
        Self {
            connected: contract.connected,
            has_access_token: facts.has_access_token,
            has_phone_number_id: facts.has_phone_number_id,
            verified: contract.verified,
            test_send_passed: contract.test_send_passed,
            stale: contract.stale,
            live_allowed,
            latest_verification_status,
        }
    }
}

/// Build the ordered remediation list for one channel.
///
/// Rules are evaluated independently; a single input can yield several
/// suggestions, each emitted at most once. Identical inputs produce
/// byte-identical output.
pub fn build_fix_suggestions(input: &SuggestionInput) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    if !input.connected {
        if !input.has_access_token {
            suggestions.push(Suggestion::new(
                "connect_access_token",
                "Connect the channel",
                "Add an access token for this channel in workspace settings",
            ));
        }
        if !input.has_phone_number_id {
            suggestions.push(Suggestion::new(
                "set_phone_number_id",
                "Set the phone number",
                "Select the business phone number id this channel sends from",
            ));
        }
    }

    if !input.live_allowed {
        suggestions.push(Suggestion::new(
            "enable_live_verify",
            "Enable live verification",
            "Allow live verification sends for this workspace in policy settings",
        ));
    }

    if input.stale || input.latest_verification_status == Some(VerificationStatus::Failed) {
        suggestions.push(Suggestion::new(
            "refresh_verification",
            "Refresh verification",
            "Run a live verification send to confirm the channel still works",
        ));
    }

    suggestions
}
