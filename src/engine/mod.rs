//! Execution engine for workflows.

pub mod events;
pub mod limiter;
mod runtime;

pub use events::{ChannelObserver, ExecutionObserver, NodeEvent, NodeEventKind, NullObserver};
pub use limiter::{enforce_safety_limits, SafetyLimitCheck};
pub use runtime::{ExecutionOutcome, Runtime, TriggerEvent};
