//! Integration readiness contract.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

/// Raw facts about one channel's credentials and verification history,
/// as supplied by the external credential/verification store. This crate
/// never reads secrets itself; it only sees presence flags.
///
/// The credential pair is WhatsApp's required set (access token +
/// phone-number id); channels with a single credential pass
/// `has_phone_number_id = true`.
#[derive(Debug, Clone, Copy)]
pub struct VerificationFacts {
    /// An access token is stored for this channel
    pub has_access_token: bool,

    /// The channel's second required credential is stored
    pub has_phone_number_id: bool,

    /// The most recent live verification passed
    pub latest_live_verification_ok: bool,

    /// When the most recent live verification ran, if ever
    pub latest_live_verification_at: Option<DateTime<Utc>>,

    /// Freshness window in whole days
    pub max_age_days: i64,
}

/// Derived readiness verdict for one channel of one client workspace.
/// Computed, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationContract {
    /// Channel may be used: `connected && verified`
    pub ready: bool,

    /// All required credentials are present
    pub connected: bool,

    /// Latest live verification passed and is fresh
    pub verified: bool,

    /// Alias of `verified` until a dedicated test-send record exists
    pub test_send_passed: bool,

    /// Verification is missing or older than the freshness window
    pub stale: bool,
}

/// Evaluate one channel's readiness contract at `now`.
///
/// Pure: `now` is injected and frozen for the whole call, so identical
/// inputs always produce identical output. Staleness compares whole fixed
/// 24-hour days, not calendar days, to avoid timezone drift; the boundary
/// (exactly `max_age_days` old) is still fresh.
pub fn evaluate(facts: &VerificationFacts, now: DateTime<Utc>) -> IntegrationContract {
    let connected = facts.has_access_token && facts.has_phone_number_id;

    let stale = match facts.latest_live_verification_at {
        Some(at) => now.signed_duration_since(at).num_days() > facts.max_age_days,
        None => true,
    };

    let verified = facts.latest_live_verification_ok && !stale;
    let ready = connected && verified;

    debug!(connected, verified, stale, ready, "evaluated integration contract");

    IntegrationContract {
        ready,
        connected,
        verified,
        test_send_passed: verified,
        stale,
    }
}
