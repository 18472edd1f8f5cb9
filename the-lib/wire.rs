//! Wire format shared by the commit endpoint and its clients.
//!
//! The body carries either the committed text or [`DISCARDED_SENTINEL`]. Since
//! a writer can type the sentinel word itself, the server also names the
//! disposition in [`DISPOSITION_HEADER`] and clients trust the header first.

use crate::commit::CommitResult;

pub const COMMIT_PATH: &str = "/commit";
/// Route name used by the first version of the page.
pub const LEGACY_COMMIT_PATH: &str = "/submit";
pub const TEXT_FIELD: &str = "text";
pub const DISCARDED_SENTINEL: &str = "empty";
pub const DISPOSITION_HEADER: &str = "x-commit-disposition";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
  Displayed,
  Discarded,
}

impl Disposition {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Displayed => "displayed",
      Self::Discarded => "discarded",
    }
  }

  pub fn parse(value: &str) -> Option<Self> {
    match value.trim() {
      v if v.eq_ignore_ascii_case("displayed") => Some(Self::Displayed),
      v if v.eq_ignore_ascii_case("discarded") => Some(Self::Discarded),
      _ => None,
    }
  }
}

/// Header value and body for a commit result.
pub fn encode(result: CommitResult) -> (Disposition, String) {
  match result {
    CommitResult::Displayed(text) => (Disposition::Displayed, text),
    CommitResult::Discarded => (Disposition::Discarded, DISCARDED_SENTINEL.to_string()),
  }
}

/// Interpret a commit response.
///
/// A recognised disposition header decides. Without one the body is compared
/// against the sentinel.
pub fn decode(disposition: Option<&str>, body: String) -> CommitResult {
  match disposition.and_then(Disposition::parse) {
    Some(Disposition::Displayed) => CommitResult::Displayed(body),
    Some(Disposition::Discarded) => CommitResult::Discarded,
    None if body == DISCARDED_SENTINEL => CommitResult::Discarded,
    None => CommitResult::Displayed(body),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn header_wins_over_sentinel_body() {
    assert_eq!(
      decode(Some("displayed"), "empty".into()),
      CommitResult::Displayed("empty".into())
    );
    assert_eq!(
      decode(Some("Discarded"), "whatever".into()),
      CommitResult::Discarded
    );
  }

  #[test]
  fn sentinel_is_the_fallback() {
    assert_eq!(decode(None, "empty".into()), CommitResult::Discarded);
    assert_eq!(
      decode(None, "hi".into()),
      CommitResult::Displayed("hi".into())
    );
    assert_eq!(
      decode(Some("unknown"), "empty".into()),
      CommitResult::Discarded
    );
  }

  #[test]
  fn encode_names_the_disposition() {
    let (disposition, body) = encode(CommitResult::Discarded);
    assert_eq!(disposition.as_str(), "discarded");
    assert_eq!(body, DISCARDED_SENTINEL);

    let (disposition, body) = encode(CommitResult::Displayed("empty".into()));
    assert_eq!(decode(Some(disposition.as_str()), body), CommitResult::Displayed("empty".into()));
  }
}
