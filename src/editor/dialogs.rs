//! Host-provided collaborators: modal messages and file choosers.
//!
//! The canvas controller only talks to the outside world through these
//! traits, so it can run headless under test.

use std::path::PathBuf;

/// Synchronous modal messages.
pub trait Dialogs {
    fn error(&mut self, title: &str, message: &str);
    fn info(&mut self, title: &str, message: &str);
    /// Ask a yes/no question. `true` means the user confirmed.
    fn confirm(&mut self, title: &str, message: &str) -> bool;
}

/// File open/save pickers. `None` means the user cancelled.
pub trait FileChooser {
    fn open_path(&mut self, title: &str) -> Option<PathBuf>;
    fn save_path(&mut self, title: &str, suggested_name: &str) -> Option<PathBuf>;
    fn choose_directory(&mut self, title: &str) -> Option<PathBuf>;
}

/// Kind of a message recorded by [`MemoryDialogs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Error,
    Info,
    Confirm,
}

/// Dialogs that record every message and answer confirmations with a fixed value.
///
/// Used by headless front ends (the CLI) and by tests.
#[derive(Debug, Clone)]
pub struct MemoryDialogs {
    pub messages: Vec<(MessageKind, String)>,
    pub confirm_answer: bool,
}

impl Default for MemoryDialogs {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            confirm_answer: true,
        }
    }
}

impl MemoryDialogs {
    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(|(kind, _)| *kind == MessageKind::Error)
            .map(|(_, msg)| msg.as_str())
    }

    pub fn last_error(&self) -> Option<&str> {
        self.errors().last()
    }
}

impl Dialogs for MemoryDialogs {
    fn error(&mut self, _title: &str, message: &str) {
        self.messages.push((MessageKind::Error, message.to_string()));
    }

    fn info(&mut self, _title: &str, message: &str) {
        self.messages.push((MessageKind::Info, message.to_string()));
    }

    fn confirm(&mut self, _title: &str, message: &str) -> bool {
        self.messages.push((MessageKind::Confirm, message.to_string()));
        self.confirm_answer
    }
}

/// A chooser that always returns the same preset paths.
#[derive(Debug, Clone, Default)]
pub struct FixedChooser {
    pub open: Option<PathBuf>,
    pub save: Option<PathBuf>,
    pub directory: Option<PathBuf>,
}

impl FileChooser for FixedChooser {
    fn open_path(&mut self, _title: &str) -> Option<PathBuf> {
        self.open.clone()
    }

    fn save_path(&mut self, _title: &str, _suggested_name: &str) -> Option<PathBuf> {
        self.save.clone()
    }

    fn choose_directory(&mut self, _title: &str) -> Option<PathBuf> {
        self.directory.clone()
    }
}
