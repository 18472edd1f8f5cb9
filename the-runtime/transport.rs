use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use the_lib::{
  CommitRequest,
  CommitResult,
  wire,
};
use thiserror::Error;
use tracing::trace;
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum TransportError {
  #[error("invalid commit endpoint: {0}")]
  Endpoint(#[from] url::ParseError),
  #[error("failed to build http client: {0}")]
  Client(#[source] reqwest::Error),
  #[error("commit request failed: {0}")]
  Request(#[from] reqwest::Error),
  #[error("commit service answered {0}")]
  Status(StatusCode),
}

/// Carries a snapshot to the commit service and brings back its disposition.
#[async_trait]
pub trait CommitTransport: Send + Sync + 'static {
  async fn commit(&self, request: &CommitRequest) -> Result<CommitResult, TransportError>;
}

/// Commits over HTTP as a form post to the service's commit route.
#[derive(Debug, Clone)]
pub struct HttpTransport {
  client:   reqwest::Client,
  endpoint: Url,
}

impl HttpTransport {
  /// `server` is the service's base url. The commit route is resolved
  /// against its root, so any path on `server` is replaced.
  pub fn new(server: &Url, timeout: Duration) -> Result<Self, TransportError> {
    let endpoint = server.join(wire::COMMIT_PATH)?;
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(TransportError::Client)?;
    Ok(Self { client, endpoint })
  }

  pub fn endpoint(&self) -> &Url {
    &self.endpoint
  }
}

#[async_trait]
impl CommitTransport for HttpTransport {
  async fn commit(&self, request: &CommitRequest) -> Result<CommitResult, TransportError> {
    trace!(seq = request.seq(), endpoint = %self.endpoint, "posting commit");
    let response = self
      .client
      .post(self.endpoint.clone())
      .form(&[(wire::TEXT_FIELD, request.payload())])
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      return Err(TransportError::Status(status));
    }

    let disposition = response
      .headers()
      .get(wire::DISPOSITION_HEADER)
      .and_then(|value| value.to_str().ok())
      .map(str::to_string);
    let body = response.text().await?;
    Ok(wire::decode(disposition.as_deref(), body))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn endpoint_is_resolved_from_server_root() {
    let server = Url::parse("http://127.0.0.1:5000").unwrap();
    let transport = HttpTransport::new(&server, DEFAULT_REQUEST_TIMEOUT).unwrap();
    assert_eq!(transport.endpoint().as_str(), "http://127.0.0.1:5000/commit");

    let server = Url::parse("https://write.example/app/").unwrap();
    let transport = HttpTransport::new(&server, DEFAULT_REQUEST_TIMEOUT).unwrap();
    assert_eq!(transport.endpoint().as_str(), "https://write.example/commit");
  }
}
