//! `unsaid`: a writing surface that keeps only what you stop typing.
//!
//! `unsaid serve` runs the commit service, `unsaid write` opens the terminal
//! client against it.

mod config;
mod input;
mod logging;
mod render;
mod terminal;

use std::{
  net::SocketAddr,
  path::PathBuf,
  time::Duration,
};

use anyhow::{
  Context,
  Result,
};
use clap::{
  Parser,
  Subcommand,
};
use crossterm::event::{
  self,
  Event,
};
use the_commit::CommitServer;
use the_lib::{
  Edit,
  View,
};
use the_runtime::{
  ComposeEvent,
  Composer,
  ComposerClosed,
  HttpTransport,
};
use tokio::{
  sync::{
    mpsc::Sender,
    watch,
  },
  time::Instant,
};
use tracing::{
  info,
  warn,
};
use url::Url;

use crate::{
  config::Config,
  input::KeyAction,
  logging::LogTarget,
};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Parser)]
#[command(name = "unsaid")]
#[command(about = "A writing surface that commits whatever you stop typing")]
struct Cli {
  /// Read configuration from this file instead of ~/.config/unsaid/config.toml
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Run the commit service
  Serve {
    /// Address to listen on
    #[arg(long)]
    bind: Option<SocketAddr>,
  },
  /// Open the writing surface in this terminal
  Write {
    /// Base url of the commit service
    #[arg(long)]
    server:  Option<Url>,
    /// Milliseconds without input before the buffer is committed
    #[arg(long)]
    idle_ms: Option<u64>,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  let config = Config::load(cli.config.as_deref())?;

  match cli.command {
    Command::Serve { bind } => serve(config, bind).await,
    Command::Write { server, idle_ms } => write(config, server, idle_ms).await,
  }
}

async fn serve(config: Config, bind: Option<SocketAddr>) -> Result<()> {
  logging::init(LogTarget::Stderr, &config.log)?;

  let mut server_config = config.server.server_config();
  if let Some(bind) = bind {
    server_config.bind = bind;
  }

  let server = CommitServer::bind(&server_config).await?;
  server.run(shutdown_signal()).await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(err) = tokio::signal::ctrl_c().await {
    warn!(%err, "failed to listen for ctrl-c, serving until killed");
    std::future::pending::<()>().await;
  }
}

async fn write(config: Config, server: Option<Url>, idle_ms: Option<u64>) -> Result<()> {
  // stderr belongs to the terminal UI from here on
  let log_file = config
    .log
    .file
    .clone()
    .unwrap_or_else(logging::default_log_file);
  logging::init(LogTarget::File(log_file), &config.log)?;

  let mut client = config.client;
  if let Some(server) = server {
    client.server_url = server;
  }
  if let Some(idle_ms) = idle_ms {
    client.idle_timeout_ms = idle_ms;
  }

  let idle = client.idle_config();
  let transport = HttpTransport::new(&client.server_url, client.request_timeout())?;
  info!(
    endpoint = %transport.endpoint(),
    idle_ms = client.idle_timeout_ms,
    "opening writing surface"
  );

  let handle = Composer::spawn(idle, transport);
  let events = handle.sender();
  let view = handle.subscribe();
  let timeout = idle.timeout;

  let shell = tokio::task::spawn_blocking(move || run_shell(events, view, timeout))
    .await
    .context("terminal thread panicked")?;

  if let Some(view) = handle.shutdown().await {
    info!(last_applied = view.last_applied, "writing surface closed");
  }
  shell
}

fn run_shell(
  events: Sender<ComposeEvent>,
  mut view: watch::Receiver<View>,
  idle: Duration,
) -> Result<()> {
  let mut terminal = terminal::Terminal::enter()?;
  let result = event_loop(&mut terminal, &events, &mut view, idle);
  terminal.leave()?;
  result
}

fn event_loop(
  terminal: &mut terminal::Terminal,
  events: &Sender<ComposeEvent>,
  view: &mut watch::Receiver<View>,
  idle: Duration,
) -> Result<()> {
  let mut current = view.borrow_and_update().clone();
  let mut needs_render = true;

  loop {
    if needs_render {
      terminal.draw(|frame| render::draw(frame, &current, idle))?;
      needs_render = false;
    }

    if event::poll(POLL_INTERVAL)? {
      match event::read()? {
        Event::Key(key) => {
          match input::map_key(key) {
            KeyAction::Quit => return Ok(()),
            KeyAction::Edit(edit) => submit(events, edit)?,
            KeyAction::Ignore => {},
          }
        },
        Event::Paste(text) => submit(events, Edit::Insert(text))?,
        Event::Resize(..) => needs_render = true,
        _ => {},
      }
    }

    match view.has_changed() {
      Ok(true) => {
        current = view.borrow_and_update().clone();
        needs_render = true;
      },
      Ok(false) => {},
      // composer is gone, nothing left to show
      Err(_) => return Ok(()),
    }
  }
}

/// Hand an edit to the composer, stamped with the instant it was read. Waits
/// for room when the channel is full so no keystroke is dropped.
fn submit(events: &Sender<ComposeEvent>, edit: Edit) -> Result<(), ComposerClosed> {
  events
    .blocking_send(ComposeEvent::Input {
      edit,
      at: Instant::now(),
    })
    .map_err(|_| ComposerClosed)
}

#[cfg(test)]
mod tests {
  use std::thread;

  use tokio::sync::mpsc;

  use super::*;

  #[test]
  fn full_channel_waits_instead_of_dropping_edits() {
    let (tx, mut rx) = mpsc::channel(1);
    submit(&tx, Edit::Insert("a".into())).unwrap();

    let drain = thread::spawn(move || {
      thread::sleep(Duration::from_millis(20));
      let mut edits = Vec::new();
      while let Some(event) = rx.blocking_recv() {
        if let ComposeEvent::Input { edit, .. } = event {
          edits.push(edit);
        }
      }
      edits
    });

    // blocks until the drain thread makes room
    submit(&tx, Edit::Insert("b".into())).unwrap();
    drop(tx);
    assert_eq!(
      drain.join().unwrap(),
      vec![Edit::Insert("a".into()), Edit::Insert("b".into())]
    );
  }

  #[test]
  fn edits_are_stamped_in_order() {
    let (tx, mut rx) = mpsc::channel(4);
    submit(&tx, Edit::Insert("a".into())).unwrap();
    submit(&tx, Edit::DeleteBackward).unwrap();
    drop(tx);

    let mut stamps = Vec::new();
    while let Some(ComposeEvent::Input { at, .. }) = rx.blocking_recv() {
      stamps.push(at);
    }
    assert_eq!(stamps.len(), 2);
    assert!(stamps[0] <= stamps[1]);
  }

  #[test]
  fn stopped_composer_is_reported() {
    let (tx, rx) = mpsc::channel(1);
    drop(rx);
    assert!(submit(&tx, Edit::Insert("a".into())).is_err());
  }
}
