//! Debounced async hooks driven by a single event channel.

mod debounce;

pub use debounce::{
  AsyncHook,
  EVENT_CHANNEL_CAPACITY,
  channel,
};
