//! Class-diagram editor core.
//!
//! This crate provides the model, interaction controller, persistence and
//! exporters of a small UML class-diagram editor:
//!
//! - [`model`] – nodes keyed by `(kind, x, y)`, relationships between
//!   connection points, and the [`model::Diagram`] that owns both.
//! - [`editor`] – the [`editor::Canvas`] state machine driven by pointer and
//!   keyboard events.
//! - [`document`] – binary save and load of a whole diagram.
//! - [`render`] / [`export`] – scene building and SVG/PNG/JPEG output.
//! - [`generator`] – Java source skeletons, one file per node.
//!
//! The binary `umlsketch` wraps these for headless use.

pub mod color;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod export;
pub mod generator;
pub mod geometry;
pub mod model;
pub mod render;
pub mod text;

pub use config::CanvasConfig;
pub use editor::Canvas;
pub use error::{ConfigError, DocumentError, EditorError, ExportError};
pub use model::{Diagram, Node, NodeKey, NodeKind, RelationKind, Relationship, Visibility};
