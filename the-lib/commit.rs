use std::fmt;

/// Canonical disposition of a committed buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitResult {
  Displayed(String),
  Discarded,
}

/// Decide what a committed payload becomes.
///
/// Blank payloads (empty or whitespace only) are discarded. Anything else is
/// echoed back byte for byte.
pub fn commit(payload: String) -> CommitResult {
  if payload.trim().is_empty() {
    CommitResult::Discarded
  } else {
    CommitResult::Displayed(payload)
  }
}

/// Immutable snapshot of a buffer, numbered in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
  seq:     u64,
  payload: String,
}

impl CommitRequest {
  pub fn new(seq: u64, payload: String) -> Self {
    Self { seq, payload }
  }

  pub fn seq(&self) -> u64 {
    self.seq
  }

  pub fn payload(&self) -> &str {
    &self.payload
  }
}

/// The round trip never produced a disposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
  reason: String,
}

impl TransportFailure {
  pub fn new(reason: impl Into<String>) -> Self {
    Self {
      reason: reason.into(),
    }
  }

  pub fn reason(&self) -> &str {
    &self.reason
  }
}

impl fmt::Display for TransportFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.reason)
  }
}

pub type CommitOutcome = Result<CommitResult, TransportFailure>;

#[cfg(test)]
mod tests {
  use quickcheck::quickcheck;

  use super::*;

  #[test]
  fn blank_payloads_are_discarded() {
    assert_eq!(commit(String::new()), CommitResult::Discarded);
    assert_eq!(commit("   ".into()), CommitResult::Discarded);
    assert_eq!(commit("\n\t \r\n".into()), CommitResult::Discarded);
  }

  #[test]
  fn payload_is_displayed_verbatim() {
    assert_eq!(
      commit("hello".into()),
      CommitResult::Displayed("hello".into())
    );
    assert_eq!(
      commit("  padded\n".into()),
      CommitResult::Displayed("  padded\n".into())
    );
    // the sentinel word is ordinary text here
    assert_eq!(
      commit("empty".into()),
      CommitResult::Displayed("empty".into())
    );
  }

  quickcheck! {
    fn commit_is_idempotent(payload: String) -> bool {
      commit(payload.clone()) == commit(payload)
    }

    fn displayed_payload_is_unchanged(payload: String) -> bool {
      match commit(payload.clone()) {
        CommitResult::Displayed(text) => text == payload && !payload.trim().is_empty(),
        CommitResult::Discarded => payload.trim().is_empty(),
      }
    }
  }
}
