//! End-to-end tests against a real socket.

use std::net::SocketAddr;

use the_commit::{
  CommitServer,
  ServerConfig,
};
use the_lib::wire;
use tokio::task::JoinSet;

async fn start() -> SocketAddr {
  let config = ServerConfig {
    bind: "127.0.0.1:0".parse().unwrap(),
  };
  let server = CommitServer::bind(&config).await.expect("bind commit service");
  let addr = server.local_addr().unwrap();
  tokio::spawn(server.run(std::future::pending()));
  addr
}

async fn post(addr: SocketAddr, path: &str, text: &str) -> (String, Option<String>) {
  let response = reqwest::Client::new()
    .post(format!("http://{addr}{path}"))
    .form(&[(wire::TEXT_FIELD, text)])
    .send()
    .await
    .expect("send commit");
  assert!(response.status().is_success(), "status {}", response.status());
  let disposition = response
    .headers()
    .get(wire::DISPOSITION_HEADER)
    .and_then(|value| value.to_str().ok())
    .map(str::to_string);
  (response.text().await.unwrap(), disposition)
}

#[tokio::test]
async fn non_empty_text_is_echoed() {
  let addr = start().await;
  let (body, disposition) = post(addr, wire::COMMIT_PATH, "hello").await;
  assert_eq!(body, "hello");
  assert_eq!(disposition.as_deref(), Some("displayed"));
}

#[tokio::test]
async fn blank_text_returns_sentinel() {
  let addr = start().await;
  for text in ["", "   ", "\n\t"] {
    let (body, disposition) = post(addr, wire::COMMIT_PATH, text).await;
    assert_eq!(body, wire::DISCARDED_SENTINEL);
    assert_eq!(disposition.as_deref(), Some("discarded"));
  }
}

#[tokio::test]
async fn sentinel_word_is_still_displayed() {
  let addr = start().await;
  let (body, disposition) = post(addr, wire::COMMIT_PATH, "empty").await;
  assert_eq!(body, "empty");
  assert_eq!(disposition.as_deref(), Some("displayed"));
}

#[tokio::test]
async fn repeated_commits_are_identical() {
  let addr = start().await;
  let first = post(addr, wire::COMMIT_PATH, "same words").await;
  let second = post(addr, wire::COMMIT_PATH, "same words").await;
  assert_eq!(first, second);
}

#[tokio::test]
async fn legacy_submit_route_is_served() {
  let addr = start().await;
  let (body, _) = post(addr, wire::LEGACY_COMMIT_PATH, "from the old page").await;
  assert_eq!(body, "from the old page");
}

#[tokio::test]
async fn missing_text_field_is_rejected() {
  let addr = start().await;
  let response = reqwest::Client::new()
    .post(format!("http://{addr}{}", wire::COMMIT_PATH))
    .form(&[("other", "value")])
    .send()
    .await
    .unwrap();
  assert!(response.status().is_client_error(), "status {}", response.status());
}

#[tokio::test]
async fn get_is_not_allowed() {
  let addr = start().await;
  let response = reqwest::get(format!("http://{addr}{}", wire::COMMIT_PATH))
    .await
    .unwrap();
  assert_eq!(response.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sessions_do_not_interfere() {
  let addr = start().await;
  let mut requests = JoinSet::new();
  for i in 0..32 {
    requests.spawn(async move {
      let text = format!("session {i}");
      let (body, _) = post(addr, wire::COMMIT_PATH, &text).await;
      (text, body)
    });
  }

  let mut seen = 0;
  while let Some(result) = requests.join_next().await {
    let (sent, received) = result.unwrap();
    assert_eq!(sent, received);
    seen += 1;
  }
  assert_eq!(seen, 32);
}

#[tokio::test]
async fn graceful_shutdown_stops_the_server() {
  let config = ServerConfig {
    bind: "127.0.0.1:0".parse().unwrap(),
  };
  let server = CommitServer::bind(&config).await.unwrap();
  let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
  let task = tokio::spawn(server.run(async move {
    let _ = stop_rx.await;
  }));

  stop_tx.send(()).unwrap();
  task.await.unwrap().expect("server exits cleanly");
}
