//! Full-screen terminal session for the writing surface.
//!
//! [`Terminal::enter`] switches to raw mode on the alternate screen with
//! bracketed paste, so a pasted paragraph arrives as one edit. The session is
//! restored on [`Terminal::leave`] or, failing that, when it is dropped, which
//! also covers a panic on the shell thread.

use std::io::{
  self,
  Stdout,
};

use anyhow::Result;
use crossterm::{
  event::{
    DisableBracketedPaste,
    EnableBracketedPaste,
  },
  execute,
  terminal::{
    EnterAlternateScreen,
    LeaveAlternateScreen,
    disable_raw_mode,
    enable_raw_mode,
  },
};
use ratatui::{
  Frame,
  Terminal as RatatuiTerminal,
  backend::CrosstermBackend,
};

pub struct Terminal {
  inner:  RatatuiTerminal<CrosstermBackend<Stdout>>,
  active: bool,
}

impl Terminal {
  pub fn enter() -> Result<Self> {
    let inner = RatatuiTerminal::new(CrosstermBackend::new(io::stdout()))?;
    enable_raw_mode()?;
    // from here on dropping the session restores the screen
    let mut terminal = Self {
      inner,
      active: true,
    };
    execute!(
      terminal.inner.backend_mut(),
      EnterAlternateScreen,
      EnableBracketedPaste
    )?;
    terminal.inner.clear()?;
    Ok(terminal)
  }

  pub fn draw(&mut self, render: impl FnOnce(&mut Frame<'_>)) -> Result<()> {
    self.inner.draw(render)?;
    Ok(())
  }

  pub fn leave(mut self) -> Result<()> {
    self.restore()
  }

  fn restore(&mut self) -> Result<()> {
    if !self.active {
      return Ok(());
    }
    self.active = false;
    execute!(
      self.inner.backend_mut(),
      DisableBracketedPaste,
      LeaveAlternateScreen
    )?;
    disable_raw_mode()?;
    self.inner.show_cursor()?;
    Ok(())
  }
}

impl Drop for Terminal {
  fn drop(&mut self) {
    if let Err(err) = self.restore() {
      tracing::warn!(%err, "failed to restore terminal");
    }
  }
}
