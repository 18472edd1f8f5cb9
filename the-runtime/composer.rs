//! The composer task.
//!
//! Edits, idle expiry and commit responses all funnel through one channel
//! drained by a single task, so the buffer and the idle timer are only ever
//! touched from one place. Commits run as detached tasks and report back on
//! the same channel; their responses are ordered by sequence number, not by
//! arrival.

use std::sync::Arc;

use the_event::AsyncHook;
use the_lib::{
  CommitOutcome,
  CommitRequest,
  Edit,
  Expiry,
  IdleConfig,
  IdleDetector,
  Resolution,
  TransportFailure,
  View,
};
use thiserror::Error;
use tokio::{
  sync::{
    mpsc::{
      Sender,
      WeakSender,
    },
    watch,
  },
  task::JoinHandle,
  time::Instant,
};
use tracing::{
  debug,
  warn,
};

use crate::transport::CommitTransport;

#[derive(Debug)]
pub enum ComposeEvent {
  /// An edit and the instant the shell saw it. The idle window is measured
  /// between these instants, not between arrivals on the channel.
  Input { edit: Edit, at: Instant },
  /// A commit round trip finished, successfully or not.
  Resolved { seq: u64, outcome: CommitOutcome },
}

#[derive(Debug, Error)]
#[error("composer task has stopped")]
pub struct ComposerClosed;

pub struct Composer<T> {
  detector:  IdleDetector,
  transport: Arc<T>,
  // weak so the loop ends once the shell drops its sender
  events:    WeakSender<ComposeEvent>,
  view:      watch::Sender<View>,
}

impl<T: CommitTransport> Composer<T> {
  /// Start the composer on the current tokio runtime.
  pub fn spawn(config: IdleConfig, transport: T) -> ComposerHandle<T> {
    let (events_tx, events_rx) = the_event::channel();
    let detector = IdleDetector::new(config);
    let (view_tx, view_rx) = watch::channel(detector.view());

    let composer = Composer {
      detector,
      transport: Arc::new(transport),
      events: events_tx.downgrade(),
      view: view_tx,
    };
    let task = AsyncHook::spawn(composer, events_rx);

    ComposerHandle {
      events: events_tx,
      view: view_rx,
      task,
    }
  }

  fn publish(&self) {
    self.view.send_replace(self.detector.view());
  }

  fn dispatch(&self, request: CommitRequest) {
    let transport = Arc::clone(&self.transport);
    let events = self.events.clone();
    tokio::spawn(async move {
      let seq = request.seq();
      let outcome = transport.commit(&request).await.map_err(|err| {
        warn!(seq, %err, "commit round trip failed");
        TransportFailure::new(err.to_string())
      });

      let Some(events) = events.upgrade() else {
        debug!(seq, "composer stopped before commit resolved");
        return;
      };
      if events
        .send(ComposeEvent::Resolved { seq, outcome })
        .await
        .is_err()
      {
        debug!(seq, "composer stopped before commit resolved");
      }
    });
  }
}

impl<T: CommitTransport> AsyncHook for Composer<T> {
  type Event = ComposeEvent;

  fn handle_event(&mut self, event: Self::Event, timeout: Option<Instant>) -> Option<Instant> {
    match event {
      ComposeEvent::Input { edit, at } => {
        let at = at.into_std();
        // the edit may have waited in the queue past an elapsed window, in
        // which case the previous burst is committed first
        if let Some(Expiry::Commit(request)) = self.detector.poll(at) {
          self.dispatch(request);
        }
        let timer = self.detector.input(edit, at);
        self.publish();
        Some(Instant::from_std(timer.deadline))
      },
      ComposeEvent::Resolved { seq, outcome } => {
        if self.detector.resolve(seq, outcome) == Resolution::Applied {
          self.publish();
        }
        timeout
      },
    }
  }

  fn finish_debounce(&mut self) {
    let Some(timer) = self.detector.timer() else {
      return;
    };
    match self.detector.expire(timer.generation) {
      Some(Expiry::Commit(request)) => self.dispatch(request),
      Some(Expiry::DiscardedLocally { .. }) | None => {},
    }
    self.publish();
  }
}

/// The shell's side of a running composer.
pub struct ComposerHandle<T> {
  events: Sender<ComposeEvent>,
  view:   watch::Receiver<View>,
  task:   JoinHandle<Composer<T>>,
}

impl<T: CommitTransport> ComposerHandle<T> {
  /// Sender for input events, for shells that feed edits from their own
  /// thread.
  pub fn sender(&self) -> Sender<ComposeEvent> {
    self.events.clone()
  }

  /// The latest view, updated after every state change.
  pub fn subscribe(&self) -> watch::Receiver<View> {
    self.view.clone()
  }

  /// Send an edit stamped with the current instant.
  pub async fn input(&self, edit: Edit) -> Result<(), ComposerClosed> {
    self
      .events
      .send(ComposeEvent::Input {
        edit,
        at: Instant::now(),
      })
      .await
      .map_err(|_| ComposerClosed)
  }

  /// Stop accepting input and wait for the composer task to wind down,
  /// returning its final view. Commits still in flight are abandoned.
  ///
  /// Senders handed out by [`ComposerHandle::sender`] keep the task alive
  /// until they are dropped too.
  pub async fn shutdown(self) -> Option<View> {
    let Self { events, task, .. } = self;
    drop(events);
    match task.await {
      Ok(composer) => Some(composer.detector.view()),
      Err(err) => {
        warn!(%err, "composer task panicked");
        None
      },
    }
  }
}
