//! outr8 - tenant-aware marketing automation engine
//!
//! outr8 executes declarative marketing workflows in reaction to business
//! events (a lead going quiet, a form submission, a renewal date). It is the
//! deterministic core of a larger product: the surrounding HTTP API, storage,
//! scheduler, and AI workflow authoring all live elsewhere and talk to this
//! crate through small trait seams.
//!
//! ## Key guarantees
//!
//! - **Bounded side effects**: every run carries a hard cap on the number of
//!   channel actions it may perform (`execution_cap_exceeded` on breach)
//! - **Allow-listed actions**: unknown action identifiers fail loudly with
//!   `unsupported_action`, never silently no-op
//! - **Deterministic replay**: nodes execute strictly in definition order,
//!   delay nodes are modeled without sleeping, and "now" is injected wherever
//!   freshness matters
//! - **Channel readiness contracts**: credential and verification facts are
//!   reduced to a ready/not-ready verdict with actionable fix suggestions
//!
//! ## Example
//!
//! ```yaml
//! id: wf-lead-nudge
//! tenantId: tn-acme
//! clientId: cl-dental-east
//! name: lead-inactivity-nudge
//! version: 3
//! status: approved
//! triggers: [lead.inactive]
//! actions: [email.send]
//! conditions: [no_reply]
//!
//! nodes:
//!   - id: on-inactive
//!     type: trigger
//!     config:
//!       event: lead.inactive
//!
//!   - id: gate-no-reply
//!     type: condition
//!     config:
//!       operator: is_true
//!       path: noReply
//!       stopOnFalse: true
//!
//!   - id: nudge
//!     type: action
//!     config:
//!       action: email.send
//!       params:
//!         to: "{{ lead.email }}"
//!         template: gentle-nudge
//! ```

pub mod actions;
pub mod config;
pub mod engine;
pub mod error;
pub mod integrations;
pub mod telemetry;
pub mod workflow;

pub use error::{Error, Result};
