//! Core of the ephemeral writing surface.
//!
//! Everything in this crate is pure: no IO, no clocks, no tasks. Callers feed
//! in edits with the instant they happened, ask whether the idle timer has
//! elapsed, and hand back commit outcomes. The async driver lives in
//! `the-runtime` and the HTTP service in `the-commit`.

pub mod buffer;
pub mod commit;
pub mod idle;
pub mod wire;

pub use buffer::{
  Buffer,
  Edit,
};
pub use commit::{
  CommitOutcome,
  CommitRequest,
  CommitResult,
  TransportFailure,
  commit,
};
pub use idle::{
  DEFAULT_IDLE_TIMEOUT,
  Expiry,
  IdleConfig,
  IdleDetector,
  IdleTimer,
  Output,
  Phase,
  Resolution,
  View,
};
