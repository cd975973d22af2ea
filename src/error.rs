//! Error types for diagram editing, persistence and export.
//!
//! Every error here is recoverable: the editor reports it to the user and
//! returns to a resting state.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::model::NodeKey;

/// User-facing validation and command errors raised by the canvas controller.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Select a node first")]
    NoNodeSelected,

    #[error("The name must not be empty")]
    EmptyName,

    #[error("Choose a visibility modifier")]
    MissingModifier,

    #[error("Interfaces have no attribute section")]
    InterfaceAttributes,

    #[error("A relationship must end on a connection point of another node")]
    InvalidEndpoint,

    #[error("A node cannot be connected to itself")]
    SelfConnection,

    #[error("Node {0} does not exist")]
    UnknownNode(NodeKey),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Failures while reading or writing a diagram file.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Not a diagram file (bad magic bytes)")]
    InvalidMagic,

    #[error("Unsupported diagram file version: {0}")]
    UnsupportedVersion(u32),

    #[error("Encoding failed: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("Decoding failed: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("Relationship {index} is invalid: {reason}")]
    Dangling { index: usize, reason: String },

    #[error("Node stored under {stored} carries key {actual}")]
    KeyMismatch { stored: NodeKey, actual: NodeKey },

    #[error("{0} unexpected bytes after the diagram records")]
    TrailingData(usize),
}

/// Failures while writing image or source exports.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("`{0}` is not a valid file name")]
    InvalidFileName(String),

    #[error("Rasterisation failed: {0}")]
    Raster(String),

    #[error("Source export failed for {failed} of {total} nodes")]
    Partial { failed: usize, total: usize },
}

/// Failures while loading the TOML configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A node key string that does not have the `Kind@x,y` shape.
#[derive(Debug, Error)]
#[error("Invalid node key `{0}`")]
pub struct NodeKeyError(pub String);
