//! Recording session management
//!
//! This module provides the `RecordingSession` abstraction that owns one
//! recording's lifecycle:
//! - the shared `ChunkBuffer` the capture context appends into
//! - the background streaming decode worker
//! - the conditional whole-recording final pass
//! - statistics, loop repair, and persistence on completion

mod final_pass;
mod session;
mod state;
mod stats;
mod worker;

pub use final_pass::{FinalPassEngine, FinalPassOutcome};
pub use session::{RecordingSession, SessionOutcome};
pub use state::{SessionState, StateCell};
pub use stats::{DecodeStats, PerfSummary};
pub use worker::{StreamingWorker, WorkerOutcome};
