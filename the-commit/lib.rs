//! The buffer commit service.
//!
//! A stateless HTTP endpoint that turns a submitted buffer into its canonical
//! disposition. Nothing is stored between requests, so any number of
//! sessions can be served concurrently without coordination.

use std::{
  future::Future,
  io,
  net::{
    Ipv4Addr,
    SocketAddr,
  },
};

use axum::{
  Form,
  Router,
  http::{
    HeaderName,
    header,
  },
  response::{
    IntoResponse,
    Response,
  },
  routing::post,
};
use serde::Deserialize;
use the_lib::wire;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{
  debug,
  info,
};

/// Port the commit service has always listened on.
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
  pub bind: SocketAddr,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      bind: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
    }
  }
}

#[derive(Debug, Error)]
pub enum ServeError {
  #[error("failed to bind commit service to {addr}: {source}")]
  Bind {
    addr:   SocketAddr,
    #[source]
    source: io::Error,
  },
  #[error("failed to read local address: {0}")]
  LocalAddr(#[source] io::Error),
  #[error("commit service stopped: {0}")]
  Serve(#[source] io::Error),
}

#[derive(Debug, Deserialize)]
struct CommitForm {
  text: String,
}

/// Routes for the commit endpoint and its legacy alias.
pub fn router() -> Router {
  Router::new()
    .route(wire::COMMIT_PATH, post(commit))
    .route(wire::LEGACY_COMMIT_PATH, post(commit))
    .layer(TraceLayer::new_for_http())
}

async fn commit(Form(form): Form<CommitForm>) -> Response {
  let len = form.text.len();
  let (disposition, body) = wire::encode(the_lib::commit(form.text));
  debug!(len, disposition = disposition.as_str(), "commit resolved");

  (
    [
      (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
      (
        HeaderName::from_static(wire::DISPOSITION_HEADER),
        disposition.as_str(),
      ),
    ],
    body,
  )
    .into_response()
}

/// A bound, not yet running, commit service.
pub struct CommitServer {
  listener: TcpListener,
}

impl CommitServer {
  pub async fn bind(config: &ServerConfig) -> Result<Self, ServeError> {
    let listener = TcpListener::bind(config.bind)
      .await
      .map_err(|source| {
        ServeError::Bind {
          addr: config.bind,
          source,
        }
      })?;
    Ok(Self { listener })
  }

  pub fn local_addr(&self) -> Result<SocketAddr, ServeError> {
    self.listener.local_addr().map_err(ServeError::LocalAddr)
  }

  /// Serve until `shutdown` resolves, then let in-flight requests finish.
  pub async fn run<F>(self, shutdown: F) -> Result<(), ServeError>
  where
    F: Future<Output = ()> + Send + 'static,
  {
    let addr = self.local_addr()?;
    info!(%addr, "commit service listening");
    axum::serve(self.listener, router())
      .with_graceful_shutdown(shutdown)
      .await
      .map_err(ServeError::Serve)?;
    info!(%addr, "commit service stopped");
    Ok(())
  }
}
