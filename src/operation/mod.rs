//! Per-operation lifecycle tracking
//!
//! An [`OperationMachine`] wraps one [`Operation`](crate::contracts::Operation)
//! and enforces at most one in-flight attempt per instance. Observers read the
//! current [`OperationState`] or subscribe to transitions.

mod machine;
mod state;

pub use machine::{OperationMachine, SubmitError};
pub use state::{AttemptId, ErrorInfo, ErrorKind, OperationState};
