/// A single change reported by the input control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
  /// Text typed or pasted at the end of the buffer.
  Insert(String),
  /// Remove the last character, if there is one.
  DeleteBackward,
  /// The control's full current content.
  Replace(String),
}

/// The composition that has not been committed yet.
///
/// Taking the content out for a commit clears the buffer and starts a new
/// generation, so edits made while a commit is in flight never touch the
/// snapshot that was sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
  text:       String,
  generation: u64,
}

impl Buffer {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn apply(&mut self, edit: Edit) {
    match edit {
      Edit::Insert(text) => self.text.push_str(&text),
      Edit::DeleteBackward => {
        self.text.pop();
      },
      Edit::Replace(text) => self.text = text,
    }
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  pub fn is_empty(&self) -> bool {
    self.text.is_empty()
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }

  /// Move the content out, leaving an empty buffer of the next generation.
  pub fn take(&mut self) -> String {
    self.generation = self.generation.wrapping_add(1);
    std::mem::take(&mut self.text)
  }
}
