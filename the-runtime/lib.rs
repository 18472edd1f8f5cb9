//! Client side of the writing surface: the composer task that owns the idle
//! detector, and the transports it commits through.

pub mod composer;
pub mod transport;

pub use composer::{
  ComposeEvent,
  Composer,
  ComposerClosed,
  ComposerHandle,
};
pub use transport::{
  CommitTransport,
  HttpTransport,
  TransportError,
};
