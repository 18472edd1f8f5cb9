//! Utilities for declaring an async (usually debounced) hook

use tokio::{
  sync::mpsc::{
    self,
    Receiver,
    Sender,
  },
  task::JoinHandle,
  time::Instant,
};

/// Room for a fast typist plus any commit responses arriving at the same time.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Create the channel a hook is driven by.
///
/// Split from [`AsyncHook::spawn`] so the hook itself can hold a (weak)
/// sender and feed completions of its own background work back into the
/// same queue.
pub fn channel<E>() -> (Sender<E>, Receiver<E>) {
  mpsc::channel(EVENT_CHANNEL_CAPACITY)
}

/// Async hooks run as a background tokio task that owns all of their state
/// and drains events from one channel. Events and debounce expiry are
/// therefore serialized: no locks are needed inside a hook.
pub trait AsyncHook: Send + 'static + Sized {
  type Event: Send + 'static;

  /// Called immediately whenever an event is received. The returned instant
  /// is the new debounce deadline; return `timeout` to keep the current one
  /// or `None` to clear it.
  fn handle_event(&mut self, event: Self::Event, timeout: Option<Instant>) -> Option<Instant>;

  /// Called once the debounce deadline is reached without a newer one
  /// replacing it.
  fn finish_debounce(&mut self);

  /// Run the hook until every sender for `rx` is dropped. The task yields the
  /// hook back so callers can inspect its final state.
  fn spawn(self, rx: Receiver<Self::Event>) -> JoinHandle<Self> {
    tokio::spawn(run(self, rx))
  }
}

/// Events already waiting in the channel are handed to the hook before an
/// elapsed deadline fires, so a hook always sees every event stamped before
/// its debounce is finished.
async fn run<Hook: AsyncHook>(mut hook: Hook, mut rx: Receiver<Hook::Event>) -> Hook {
  let mut deadline: Option<Instant> = None;
  loop {
    let received = match deadline {
      None => rx.recv().await,
      Some(at) => {
        match tokio::time::timeout_at(at, rx.recv()).await {
          Ok(received) => received,
          Err(_elapsed) => {
            deadline = None;
            hook.finish_debounce();
            continue;
          },
        }
      },
    };

    let Some(event) = received else {
      tracing::debug!(pending = deadline.is_some(), "hook channel closed");
      return hook;
    };
    deadline = hook.handle_event(event, deadline);
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::*;

  #[derive(Default)]
  struct Counter {
    seen:     Vec<u32>,
    finished: Vec<Vec<u32>>,
  }

  impl AsyncHook for Counter {
    type Event = u32;

    fn handle_event(&mut self, event: u32, _timeout: Option<Instant>) -> Option<Instant> {
      self.seen.push(event);
      Some(Instant::now() + Duration::from_millis(50))
    }

    fn finish_debounce(&mut self) {
      self.finished.push(std::mem::take(&mut self.seen));
    }
  }

  #[tokio::test(start_paused = true)]
  async fn burst_is_collapsed_into_one_finish() {
    let (tx, rx) = channel();
    let task = Counter::default().spawn(rx);

    for event in 0..5 {
      tx.send(event).await.unwrap();
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    tx.send(9).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    drop(tx);
    let hook = task.await.unwrap();
    assert_eq!(hook.finished, vec![vec![0, 1, 2, 3, 4], vec![9]]);
    assert!(hook.seen.is_empty());
  }

  #[tokio::test(start_paused = true)]
  async fn closing_the_channel_skips_pending_debounce() {
    let (tx, rx) = channel();
    let task = Counter::default().spawn(rx);
    tx.send(1).await.unwrap();
    drop(tx);

    let hook = task.await.unwrap();
    assert!(hook.finished.is_empty());
    assert_eq!(hook.seen, vec![1]);
  }

  /// Arms a deadline that has already passed.
  #[derive(Default)]
  struct Overdue(Counter);

  impl AsyncHook for Overdue {
    type Event = u32;

    fn handle_event(&mut self, event: u32, _timeout: Option<Instant>) -> Option<Instant> {
      self.0.seen.push(event);
      Some(Instant::now() - Duration::from_millis(1))
    }

    fn finish_debounce(&mut self) {
      self.0.finish_debounce();
    }
  }

  #[tokio::test(start_paused = true)]
  async fn queued_events_are_handled_before_an_elapsed_deadline() {
    let (tx, rx) = channel();
    tx.try_send(1).unwrap();
    tx.try_send(2).unwrap();
    let task = Overdue::default().spawn(rx);

    tokio::time::sleep(Duration::from_millis(10)).await;
    drop(tx);
    let hook = task.await.unwrap();
    assert_eq!(hook.0.finished, vec![vec![1, 2]]);
  }
}
