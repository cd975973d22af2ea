//! Source skeleton generation from the diagram.
//!
//! This module provides:
//! - [`members`] – Parse attribute and operation entries.
//! - [`java`] – Emit a Java skeleton for one node.
//!
//! [`export_sources`] writes one file per node; a failure for one node is
//! recorded and the remaining nodes are still written.

pub mod java;
pub mod members;

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::ExportError;
use crate::model::{Diagram, Node};

pub use java::generate_node;

/// Outcome of a source export.
#[derive(Debug, Default)]
pub struct SourceExport {
    pub written: Vec<PathBuf>,
    /// Node name and the reason its file was not written.
    pub failed: Vec<(String, ExportError)>,
}

impl SourceExport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// File name `<name>.<extension>` for a node, or `None` if the name cannot be one.
pub fn source_file_name(node: &Node, extension: &str) -> Option<String> {
    let name = node.name.trim();
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    (!bad).then(|| format!("{}.{}", name, extension))
}

/// Generate every node's skeleton into `dir`.
pub fn export_sources(diagram: &Diagram, dir: &Path, extension: &str) -> SourceExport {
    let mut report = SourceExport::default();
    for node in diagram.nodes.values() {
        let Some(file_name) = source_file_name(node, extension) else {
            warn!(node:% = node.key; "Skipping node without a usable file name");
            report.failed.push((
                node.name.clone(),
                ExportError::InvalidFileName(node.name.clone()),
            ));
            continue;
        };
        let path = dir.join(file_name);
        match std::fs::write(&path, generate_node(diagram, node)) {
            Ok(()) => report.written.push(path),
            Err(err) => {
                warn!(path:? = path, error:% = err; "Failed to write source file");
                report.failed.push((node.name.clone(), err.into()));
            }
        }
    }
    info!(
        written = report.written.len(),
        failed = report.failed.len();
        "Exported sources"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::model::NodeKind;

    #[test]
    fn test_source_file_name() {
        let mut node = Node::new(NodeKind::Class, Point::new(0, 0));
        node.name = " Order ".into();
        assert_eq!(source_file_name(&node, "java").as_deref(), Some("Order.java"));
        node.name = "../evil".into();
        assert!(source_file_name(&node, "java").is_none());
        node.name = String::new();
        assert!(source_file_name(&node, "java").is_none());
    }
}
