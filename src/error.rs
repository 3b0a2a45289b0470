//! Error types for the simulator core.

use thiserror::Error;

/// Result type alias for simulator operations.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors produced by the scheduler, the FTL, and configuration loading.
#[derive(Error, Debug)]
pub enum SimError {
    /// The external controller/SSD facade refused to accept an event.
    #[error("controller refused to issue event: {0}")]
    ControllerFailure(String),

    /// The scheduler made no progress for `idle_limit` ticks.
    #[error("scheduler deadlock: no dispatchable event for the idle limit; outstanding io ids: {outstanding_io_ids:?}")]
    SchedulerDeadlock { outstanding_io_ids: Vec<u32> },

    /// A design invariant was violated; there is no recovery at this layer.
    #[error("invariant breach: {0}")]
    InvariantBreach(String),

    /// Malformed or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),
}
