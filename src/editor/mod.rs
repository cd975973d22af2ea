//! Interactive editing of class diagrams.
//!
//! This module provides:
//! - [`Canvas`] – the controller that turns pointer and keyboard events into
//!   model mutations and redraws after each one.
//! - [`InteractionState`] – armed tool, selection, gesture and inline edit as
//!   a plain value.
//! - [`operations`] – the model mutations themselves, usable without a canvas.
//! - [`selection`] – hit-testing against nodes, relationships and
//!   connection points.
//! - [`Dialogs`] / [`FileChooser`] – the host's modal collaborators.

pub mod canvas;
pub mod dialogs;
pub mod operations;
pub mod selection;
pub mod state;

pub use canvas::Canvas;
pub use dialogs::{Dialogs, FileChooser, FixedChooser, MemoryDialogs, MessageKind};
pub use selection::Selection;
pub use state::{CanvasState, DragMode, EditTarget, InteractionState, TextEdit, Tool};
