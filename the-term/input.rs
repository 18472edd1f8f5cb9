//! Input handling - maps key events to buffer edits.

use crossterm::event::{
  KeyCode,
  KeyEvent,
  KeyEventKind,
  KeyModifiers,
};
use the_lib::Edit;

#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
  Edit(Edit),
  Quit,
  Ignore,
}

pub fn map_key(event: KeyEvent) -> KeyAction {
  if event.kind == KeyEventKind::Release {
    return KeyAction::Ignore;
  }

  let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
  match event.code {
    KeyCode::Esc => KeyAction::Quit,
    KeyCode::Char('c' | 'd') if ctrl => KeyAction::Quit,
    KeyCode::Char(_) if ctrl => KeyAction::Ignore,
    KeyCode::Char(ch) => KeyAction::Edit(Edit::Insert(ch.to_string())),
    KeyCode::Enter => KeyAction::Edit(Edit::Insert("\n".to_string())),
    KeyCode::Tab => KeyAction::Edit(Edit::Insert("\t".to_string())),
    KeyCode::Backspace => KeyAction::Edit(Edit::DeleteBackward),
    _ => KeyAction::Ignore,
  }
}
