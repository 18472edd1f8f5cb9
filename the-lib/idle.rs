//! Idle detection for the composition buffer.
//!
//! The detector decides, from the timing of edits alone, when writing has
//! paused long enough to commit. Every edit arms a single idle timer and bumps
//! its generation. Only an expiry for the current generation snapshots the
//! buffer. Snapshots carry increasing sequence numbers so that responses which
//! come back out of order can be told apart from newer ones.

use std::time::{
  Duration,
  Instant,
};

use tracing::{
  debug,
  trace,
};

use crate::{
  buffer::{
    Buffer,
    Edit,
  },
  commit::{
    CommitOutcome,
    CommitRequest,
    CommitResult,
  },
};

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
  /// No timer pending.
  #[default]
  Idle,
  /// Idle timer running.
  Composing,
  /// Timer fired, waiting for the commit to resolve.
  Resolving,
}

/// What the output region shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Output {
  /// Nothing has resolved yet this session.
  #[default]
  Blank,
  Displayed(String),
  Discarded,
  TransportFailure(String),
}

impl From<CommitOutcome> for Output {
  fn from(outcome: CommitOutcome) -> Self {
    match outcome {
      Ok(CommitResult::Displayed(text)) => Self::Displayed(text),
      Ok(CommitResult::Discarded) => Self::Discarded,
      Err(failure) => Self::TransportFailure(failure.reason().to_string()),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleTimer {
  pub generation: u64,
  pub deadline:   Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expiry {
  /// The snapshot has to go to the commit service.
  Commit(CommitRequest),
  /// The buffer was empty and resolved to `Discarded` without a round trip.
  DiscardedLocally { seq: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
  Applied,
  /// A newer response was already applied. The output is left untouched.
  Stale { highest_applied: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleConfig {
  pub timeout:               Duration,
  /// Resolve an empty buffer to `Discarded` without contacting the service.
  pub resolve_empty_locally: bool,
}

impl Default for IdleConfig {
  fn default() -> Self {
    Self {
      timeout:               DEFAULT_IDLE_TIMEOUT,
      resolve_empty_locally: true,
    }
  }
}

/// Everything a shell needs to draw the current state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct View {
  pub phase:        Phase,
  pub buffer:       String,
  pub output:       Output,
  pub last_applied: u64,
}

#[derive(Debug)]
pub struct IdleDetector {
  config:           IdleConfig,
  phase:            Phase,
  buffer:           Buffer,
  output:           Output,
  timer:            Option<IdleTimer>,
  timer_generation: u64,
  last_issued:      u64,
  last_applied:     u64,
}

impl Default for IdleDetector {
  fn default() -> Self {
    Self::new(IdleConfig::default())
  }
}

impl IdleDetector {
  pub fn new(config: IdleConfig) -> Self {
    Self {
      config,
      phase: Phase::Idle,
      buffer: Buffer::new(),
      output: Output::Blank,
      timer: None,
      timer_generation: 0,
      last_issued: 0,
      last_applied: 0,
    }
  }

  /// Apply an edit made at `now` and rearm the idle timer.
  ///
  /// Any previously armed timer is superseded; expiring it afterwards is a
  /// no-op.
  pub fn input(&mut self, edit: Edit, now: Instant) -> IdleTimer {
    self.buffer.apply(edit);
    self.timer_generation = self.timer_generation.wrapping_add(1);
    let timer = IdleTimer {
      generation: self.timer_generation,
      deadline:   now + self.config.timeout,
    };
    self.timer = Some(timer);
    self.phase = Phase::Composing;
    trace!(
      generation = timer.generation,
      len = self.buffer.text().len(),
      "idle timer rearmed"
    );
    timer
  }

  /// Fire the timer of the given generation.
  ///
  /// Returns `None` when that timer was superseded or already fired.
  pub fn expire(&mut self, generation: u64) -> Option<Expiry> {
    let timer = self.timer?;
    if timer.generation != generation {
      trace!(
        generation,
        current = timer.generation,
        "ignoring superseded idle timer"
      );
      return None;
    }

    self.timer = None;
    self.last_issued = self.last_issued.saturating_add(1);
    let seq = self.last_issued;
    let payload = self.buffer.take();

    if payload.is_empty() && self.config.resolve_empty_locally {
      debug!(seq, "empty buffer discarded locally");
      self.apply(seq, Ok(CommitResult::Discarded));
      self.phase = Phase::Idle;
      return Some(Expiry::DiscardedLocally { seq });
    }

    debug!(seq, len = payload.len(), "buffer snapshot taken for commit");
    self.phase = Phase::Resolving;
    Some(Expiry::Commit(CommitRequest::new(seq, payload)))
  }

  /// Fire the armed timer if its deadline has passed by `now`.
  pub fn poll(&mut self, now: Instant) -> Option<Expiry> {
    let timer = self.timer?;
    if now < timer.deadline {
      return None;
    }
    self.expire(timer.generation)
  }

  /// Apply the outcome of commit `seq` unless something newer already was.
  pub fn resolve(&mut self, seq: u64, outcome: CommitOutcome) -> Resolution {
    if seq <= self.last_applied {
      debug!(
        seq,
        highest_applied = self.last_applied,
        "dropping stale commit response"
      );
      return Resolution::Stale {
        highest_applied: self.last_applied,
      };
    }

    self.apply(seq, outcome);
    if self.phase == Phase::Resolving && seq == self.last_issued {
      self.phase = Phase::Idle;
    }
    Resolution::Applied
  }

  fn apply(&mut self, seq: u64, outcome: CommitOutcome) {
    self.last_applied = seq;
    self.output = Output::from(outcome);
  }

  pub fn config(&self) -> &IdleConfig {
    &self.config
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  pub fn buffer(&self) -> &Buffer {
    &self.buffer
  }

  pub fn output(&self) -> &Output {
    &self.output
  }

  pub fn timer(&self) -> Option<IdleTimer> {
    self.timer
  }

  pub fn last_issued(&self) -> u64 {
    self.last_issued
  }

  pub fn last_applied(&self) -> u64 {
    self.last_applied
  }

  pub fn view(&self) -> View {
    View {
      phase:        self.phase,
      buffer:       self.buffer.text().to_string(),
      output:       self.output.clone(),
      last_applied: self.last_applied,
    }
  }
}
