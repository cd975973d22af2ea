//! Binary diagram files.
//!
//! A file is a magic header, a little-endian format version, then two bincode
//! records in sequence: the node map and the relationship list. Files are
//! written from a fully encoded buffer and read completely before anything is
//! handed back, so a caller never observes a half-read diagram.

use std::fs;
use std::io::Write;
use std::path::Path;

use indexmap::IndexMap;
use log::{debug, info};
use tempfile::NamedTempFile;

use crate::error::DocumentError;
use crate::model::{Diagram, Node, NodeKey, Relationship};

const MAGIC: &[u8; 9] = b"UMLSKETCH";
const VERSION: u32 = 1;

/// Encode a diagram into the on-disk byte layout.
pub fn encode(diagram: &Diagram) -> Result<Vec<u8>, DocumentError> {
    let config = bincode::config::standard();
    let mut out = Vec::with_capacity(256);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    bincode::serde::encode_into_std_write(&diagram.nodes, &mut out, config)?;
    bincode::serde::encode_into_std_write(&diagram.relationships, &mut out, config)?;
    Ok(out)
}

/// Decode and validate a diagram from its on-disk byte layout.
pub fn decode(bytes: &[u8]) -> Result<Diagram, DocumentError> {
    let rest = bytes
        .strip_prefix(MAGIC.as_slice())
        .ok_or(DocumentError::InvalidMagic)?;
    if rest.len() < 4 {
        return Err(DocumentError::InvalidMagic);
    }
    let (version_bytes, rest) = rest.split_at(4);
    let version = u32::from_le_bytes([
        version_bytes[0],
        version_bytes[1],
        version_bytes[2],
        version_bytes[3],
    ]);
    if version != VERSION {
        return Err(DocumentError::UnsupportedVersion(version));
    }

    let config = bincode::config::standard();
    let (nodes, used): (IndexMap<NodeKey, Node>, usize) =
        bincode::serde::decode_from_slice(rest, config)?;
    let rest = &rest[used..];
    let (relationships, used): (Vec<Relationship>, usize) =
        bincode::serde::decode_from_slice(rest, config)?;
    if used != rest.len() {
        return Err(DocumentError::TrailingData(rest.len() - used));
    }

    let diagram = Diagram {
        nodes,
        relationships,
    };
    validate(&diagram)?;
    Ok(diagram)
}

/// Check the store invariants a decoded diagram must satisfy.
pub fn validate(diagram: &Diagram) -> Result<(), DocumentError> {
    for (stored, node) in &diagram.nodes {
        if *stored != node.key {
            return Err(DocumentError::KeyMismatch {
                stored: *stored,
                actual: node.key,
            });
        }
    }
    match diagram.find_dangling() {
        Some((index, reason)) => Err(DocumentError::Dangling { index, reason }),
        None => Ok(()),
    }
}

/// Save a diagram to `path`.
///
/// The bytes go to a uniquely named temporary file in the same directory,
/// which is then renamed into place. A failed save never leaves a truncated
/// diagram behind and never touches other files in that directory.
pub fn save_diagram<P: AsRef<Path>>(diagram: &Diagram, path: P) -> Result<(), DocumentError> {
    let path = path.as_ref();
    let bytes = encode(diagram)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| DocumentError::Io(err.error))?;
    info!(
        path:? = path,
        nodes = diagram.nodes.len(),
        relationships = diagram.relationships.len();
        "Saved diagram"
    );
    Ok(())
}

/// Load a diagram from `path`.
pub fn load_diagram<P: AsRef<Path>>(path: P) -> Result<Diagram, DocumentError> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    debug!(path:? = path, bytes = bytes.len(); "Read diagram file");
    let diagram = decode(&bytes)?;
    info!(
        path:? = path,
        nodes = diagram.nodes.len(),
        relationships = diagram.relationships.len();
        "Loaded diagram"
    );
    Ok(diagram)
}
