//! Interaction state of the canvas.
//!
//! [`InteractionState`] holds the armed tool, the selection, the gesture in
//! progress and any open inline edit. It is a plain value owned by the
//! controller, so the state machine can be inspected without a live canvas.

use crate::geometry::Point;
use crate::model::{NodeKey, NodeKind, RelationKind};

use super::selection::Selection;

// ────────────────────────────────────────────────────────────────────────────
// Tools
// ────────────────────────────────────────────────────────────────────────────

/// A toolbox entry. Node tools act on click, relationship tools on press/release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Class,
    Interface,
    Association,
    Aggregation,
    Composition,
    Inheritance,
}

impl Tool {
    pub const ALL: [Tool; 6] = [
        Tool::Class,
        Tool::Interface,
        Tool::Association,
        Tool::Aggregation,
        Tool::Composition,
        Tool::Inheritance,
    ];

    pub fn node_kind(self) -> Option<NodeKind> {
        match self {
            Tool::Class => Some(NodeKind::Class),
            Tool::Interface => Some(NodeKind::Interface),
            _ => None,
        }
    }

    pub fn relation_kind(self) -> Option<RelationKind> {
        match self {
            Tool::Association => Some(RelationKind::Association),
            Tool::Aggregation => Some(RelationKind::Aggregation),
            Tool::Composition => Some(RelationKind::Composition),
            Tool::Inheritance => Some(RelationKind::Inheritance),
            Tool::Class | Tool::Interface => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Inline text editing
// ────────────────────────────────────────────────────────────────────────────

/// What an inline text edit writes back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    NodeName(NodeKey),
    Attribute(NodeKey, usize),
    Operation(NodeKey, usize),
    /// Label of the relationship at this index.
    Label(usize),
}

/// An open inline editor and its current buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub target: EditTarget,
    pub text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Drag state
// ────────────────────────────────────────────────────────────────────────────

/// What the pointer is currently dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragMode {
    #[default]
    None,
    /// Drawing a new relationship from a connection point.
    CreatingLine {
        start: NodeKey,
        start_index: usize,
        /// Current pointer position, for the rubber-band line.
        cursor: Point,
    },
    /// Moving a node; `offset` is the pointer position relative to its top-left corner.
    Node { key: NodeKey, offset: Point },
    /// Moving one control point of a relationship.
    ControlPoint { line: usize, index: usize },
    /// Translating every control point of a relationship.
    Line { line: usize, last: Point },
}

/// Coarse state of the controller, one variant per state of the interaction machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasState {
    Idle,
    ToolArmed(Tool),
    CreatingLine { start: NodeKey, start_index: usize },
    DraggingNode { node: NodeKey, offset: Point },
    DraggingControlPoint { line: usize, index: usize },
    DraggingLine(usize),
    EditingText(EditTarget),
}

// ────────────────────────────────────────────────────────────────────────────
// InteractionState
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    /// At most one tool is armed at a time.
    pub armed: Option<Tool>,
    pub selection: Selection,
    pub drag: DragMode,
    pub editing: Option<TextEdit>,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle `tool`: arm it (disarming any other), or disarm it if already armed.
    pub fn toggle_tool(&mut self, tool: Tool) {
        self.armed = if self.armed == Some(tool) {
            None
        } else {
            Some(tool)
        };
        self.drag = DragMode::None;
    }

    /// Collapse the fields into the current machine state.
    pub fn state(&self) -> CanvasState {
        if let Some(edit) = &self.editing {
            return CanvasState::EditingText(edit.target);
        }
        match self.drag {
            DragMode::CreatingLine {
                start, start_index, ..
            } => CanvasState::CreatingLine { start, start_index },
            DragMode::Node { key, offset } => CanvasState::DraggingNode { node: key, offset },
            DragMode::ControlPoint { line, index } => {
                CanvasState::DraggingControlPoint { line, index }
            }
            DragMode::Line { line, .. } => CanvasState::DraggingLine(line),
            DragMode::None => match self.armed {
                Some(tool) => CanvasState::ToolArmed(tool),
                None => CanvasState::Idle,
            },
        }
    }
}
