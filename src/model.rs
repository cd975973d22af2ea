//! Diagram entity model: class/interface nodes and the relationships between them.
//!
//! Nodes live in an insertion-ordered map keyed by a [`NodeKey`] computed once
//! from the creation tool and click position. Relationships refer to nodes by
//! key plus a connection-point index, so moving a node never invalidates them.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::NodeKeyError;
use crate::geometry::{self, Point, RectF, Vec2f};
use crate::text::TextMeasurer;

/// Height of every text row inside a node box.
pub const ROW_HEIGHT: i32 = 30;
/// Narrowest a node box may get.
pub const MIN_NODE_WIDTH: i32 = 120;
/// Horizontal room added around the widest text line.
pub const TEXT_PADDING: f32 = 40.0;
/// Number of connection points on every node.
pub const CONNECTION_POINTS: usize = 6;

// ────────────────────────────────────────────────────────────────────────────
// Node kinds and keys
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Class,
    Interface,
}

impl NodeKind {
    pub fn default_name(self) -> &'static str {
        match self {
            NodeKind::Class => "Class",
            NodeKind::Interface => "Interface",
        }
    }

    /// Interfaces omit the attribute compartment.
    pub fn has_attributes(self) -> bool {
        matches!(self, NodeKind::Class)
    }

    /// Rows taken by the header (name, plus the stereotype line for interfaces).
    pub fn header_rows(self) -> i32 {
        match self {
            NodeKind::Class => 1,
            NodeKind::Interface => 2,
        }
    }
}

/// Identity of a node: the kind and position it was created with.
///
/// The key is never recomputed when the node moves, so a lookup by the
/// original creation key resolves for the lifetime of the node.
/// Serialised as `Kind@x,y` so it can serve as a map key in any format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct NodeKey {
    pub kind: NodeKind,
    pub x: i32,
    pub y: i32,
}

impl NodeKey {
    pub fn new(kind: NodeKind, at: Point) -> Self {
        Self {
            kind,
            x: at.x,
            y: at.y,
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{},{}", self.kind, self.x, self.y)
    }
}

impl FromStr for NodeKey {
    type Err = NodeKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || NodeKeyError(s.to_string());
        let (kind, pos) = s.split_once('@').ok_or_else(err)?;
        let kind = match kind {
            "Class" => NodeKind::Class,
            "Interface" => NodeKind::Interface,
            _ => return Err(err()),
        };
        let (x, y) = pos.split_once(',').ok_or_else(err)?;
        let x = x.trim().parse().map_err(|_| err())?;
        let y = y.trim().parse().map_err(|_| err())?;
        Ok(NodeKey { kind, x, y })
    }
}

impl From<NodeKey> for String {
    fn from(key: NodeKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for NodeKey {
    type Error = NodeKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Node
// ────────────────────────────────────────────────────────────────────────────

/// Which text row of a node box a canvas position falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRow {
    Name,
    Attribute(usize),
    Operation(usize),
}

/// A class or interface box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub key: NodeKey,
    pub x: i32,
    pub y: i32,
    /// Derived on every redraw; persisted only as a convenience.
    pub width: i32,
    /// Derived on every redraw; persisted only as a convenience.
    pub height: i32,
    pub name: String,
    /// Formatted `"<symbol> <text>"` entries. Always empty for interfaces.
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub operations: Vec<String>,
}

impl Node {
    /// Create a node with the default name at `at`, sized for its empty compartments.
    pub fn new(kind: NodeKind, at: Point) -> Self {
        let mut node = Node {
            key: NodeKey::new(kind, at),
            x: at.x,
            y: at.y,
            width: MIN_NODE_WIDTH,
            height: 0,
            name: kind.default_name().to_string(),
            attributes: Vec::new(),
            operations: Vec::new(),
        };
        node.height = node.compute_height();
        node
    }

    pub fn kind(&self) -> NodeKind {
        self.key.kind
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn bounds(&self) -> RectF {
        RectF::new(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
        )
    }

    /// The six connection points for the current geometry.
    pub fn connection_points(&self) -> [Vec2f; CONNECTION_POINTS] {
        geometry::connection_points(self.bounds())
    }

    pub fn connection_point(&self, index: usize) -> Option<Vec2f> {
        self.connection_points().get(index).copied()
    }

    /// Recompute `width` and `height` from the current text.
    pub fn relayout(&mut self, measurer: &dyn TextMeasurer) {
        let widest = std::iter::once(&self.name)
            .chain(&self.attributes)
            .chain(&self.operations)
            .map(|text| measurer.measure(text).0)
            .fold(0.0f32, f32::max);
        self.width = MIN_NODE_WIDTH.max((widest + TEXT_PADDING).ceil() as i32);
        self.height = self.compute_height();
    }

    fn compute_height(&self) -> i32 {
        let ops = self.operations.len() as i32;
        match self.kind() {
            NodeKind::Class => {
                let attrs = self.attributes.len() as i32;
                ROW_HEIGHT * (1 + attrs.max(1) + ops.max(1))
            }
            NodeKind::Interface => ROW_HEIGHT * 2 + ROW_HEIGHT.max(ROW_HEIGHT * ops),
        }
    }

    /// Top of the attribute compartment (classes) or operation compartment (interfaces).
    pub fn header_bottom(&self) -> i32 {
        self.y + ROW_HEIGHT * self.kind().header_rows()
    }

    /// Top of the operation compartment.
    pub fn operations_top(&self) -> i32 {
        match self.kind() {
            NodeKind::Class => {
                self.header_bottom() + ROW_HEIGHT * (self.attributes.len() as i32).max(1)
            }
            NodeKind::Interface => self.header_bottom(),
        }
    }

    /// Map a canvas y coordinate to the text row under it.
    ///
    /// Placeholder rows of an empty compartment map to `None`.
    pub fn row_at(&self, y: i32) -> Option<NodeRow> {
        if y < self.y || y > self.y + self.height {
            return None;
        }
        if y < self.header_bottom() {
            return Some(NodeRow::Name);
        }
        let ops_top = self.operations_top();
        if y < ops_top {
            let idx = ((y - self.header_bottom()) / ROW_HEIGHT) as usize;
            return (idx < self.attributes.len()).then_some(NodeRow::Attribute(idx));
        }
        let idx = ((y - ops_top) / ROW_HEIGHT) as usize;
        (idx < self.operations.len()).then_some(NodeRow::Operation(idx))
    }
}

/// Member visibility, shown as the leading symbol of an attribute or operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
    Protected,
    Package,
}

impl Visibility {
    pub fn symbol(self) -> char {
        match self {
            Visibility::Public => '+',
            Visibility::Private => '-',
            Visibility::Protected => '#',
            Visibility::Package => '~',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '+' => Some(Visibility::Public),
            '-' => Some(Visibility::Private),
            '#' => Some(Visibility::Protected),
            '~' => Some(Visibility::Package),
            _ => None,
        }
    }

    /// Map a modifier chooser label to a visibility. Unrecognised labels fall back to public.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "private" => Visibility::Private,
            "protected" => Visibility::Protected,
            "package" | "package-private" | "default" => Visibility::Package,
            _ => Visibility::Public,
        }
    }

    /// Format a compartment entry: `"<symbol> <text>"`.
    pub fn format_member(self, text: &str) -> String {
        format!("{} {}", self.symbol(), text)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Relationship
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    Association,
    Aggregation,
    Composition,
    Inheritance,
}

impl RelationKind {
    pub const ALL: [RelationKind; 4] = [
        RelationKind::Association,
        RelationKind::Aggregation,
        RelationKind::Composition,
        RelationKind::Inheritance,
    ];

    /// How far the line stops short of its end to make room for the glyph.
    pub fn end_offset(self) -> f32 {
        match self {
            RelationKind::Association => 0.0,
            RelationKind::Inheritance => geometry::TRIANGLE_OFFSET,
            RelationKind::Aggregation | RelationKind::Composition => geometry::DIAMOND_OFFSET,
        }
    }
}

/// A typed line between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub kind: RelationKind,
    pub start: NodeKey,
    pub start_index: usize,
    pub end: NodeKey,
    pub end_index: usize,
    /// Intermediate polyline vertices, in drawing order.
    #[serde(default)]
    pub control_points: Vec<Point>,
    #[serde(default)]
    pub label: Option<String>,
}

impl Relationship {
    pub fn new(
        kind: RelationKind,
        start: NodeKey,
        start_index: usize,
        end: NodeKey,
        end_index: usize,
    ) -> Self {
        Self {
            kind,
            start,
            start_index,
            end,
            end_index,
            control_points: Vec::new(),
            label: None,
        }
    }

    pub fn touches(&self, key: &NodeKey) -> bool {
        self.start == *key || self.end == *key
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Diagram
// ────────────────────────────────────────────────────────────────────────────

/// The whole diagram graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub nodes: IndexMap<NodeKey, Node>,
    pub relationships: Vec<Relationship>,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, key: &NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub fn node_mut(&mut self, key: &NodeKey) -> Option<&mut Node> {
        self.nodes.get_mut(key)
    }

    /// Recompute derived node sizes.
    pub fn relayout(&mut self, measurer: &dyn TextMeasurer) {
        for node in self.nodes.values_mut() {
            node.relayout(measurer);
        }
    }

    /// Full polyline of a relationship: start anchor, control points, end anchor.
    ///
    /// `None` if an endpoint is missing or an index is out of range.
    pub fn relationship_path(&self, rel: &Relationship) -> Option<Vec<Vec2f>> {
        let start = self.node(&rel.start)?.connection_point(rel.start_index)?;
        let end = self.node(&rel.end)?.connection_point(rel.end_index)?;
        let mut path = Vec::with_capacity(rel.control_points.len() + 2);
        path.push(start);
        path.extend(rel.control_points.iter().map(|p| p.to_vec2()));
        path.push(end);
        Some(path)
    }

    /// First relationship violating the endpoint invariants, with a reason.
    pub fn find_dangling(&self) -> Option<(usize, String)> {
        self.relationships.iter().enumerate().find_map(|(i, rel)| {
            for (key, index) in [(rel.start, rel.start_index), (rel.end, rel.end_index)] {
                if !self.nodes.contains_key(&key) {
                    return Some((i, format!("endpoint {} does not exist", key)));
                }
                if index >= CONNECTION_POINTS {
                    return Some((i, format!("connection index {} out of range", index)));
                }
            }
            None
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::MonospaceMeasurer;

    #[test]
    fn test_node_key_round_trips_through_string() {
        let key = NodeKey::new(NodeKind::Interface, Point::new(-4, 250));
        assert_eq!(key.to_string(), "Interface@-4,250");
        assert_eq!("Interface@-4,250".parse::<NodeKey>().unwrap(), key);
        assert!("Enum@1,2".parse::<NodeKey>().is_err());
        assert!("Class@1".parse::<NodeKey>().is_err());
    }

    #[test]
    fn test_default_class_geometry() {
        let node = Node::new(NodeKind::Class, Point::new(150, 250));
        assert_eq!(node.name, "Class");
        assert_eq!(node.width, 120);
        assert_eq!(node.height, 90);
    }

    #[test]
    fn test_interface_height() {
        let mut node = Node::new(NodeKind::Interface, Point::new(0, 0));
        assert_eq!(node.height, 90);
        node.operations = vec!["+ a()".into(), "+ b()".into(), "+ c()".into()];
        node.relayout(&MonospaceMeasurer::default());
        assert_eq!(node.height, 150);
    }

    #[test]
    fn test_width_follows_longest_text() {
        let mut node = Node::new(NodeKind::Class, Point::new(0, 0));
        node.attributes.push("+ aVeryLongAttributeName: String".into());
        node.relayout(&MonospaceMeasurer::default());
        // 32 chars * 7px + 40px padding
        assert_eq!(node.width, 264);
        assert_eq!(node.height, 90);
    }

    #[test]
    fn test_row_at() {
        let mut node = Node::new(NodeKind::Class, Point::new(0, 0));
        node.attributes = vec!["+ a".into(), "+ b".into()];
        node.operations = vec!["+ f()".into()];
        node.relayout(&MonospaceMeasurer::default());
        assert_eq!(node.row_at(10), Some(NodeRow::Name));
        assert_eq!(node.row_at(40), Some(NodeRow::Attribute(0)));
        assert_eq!(node.row_at(75), Some(NodeRow::Attribute(1)));
        assert_eq!(node.row_at(100), Some(NodeRow::Operation(0)));
        assert_eq!(node.row_at(200), None);

        let iface = Node::new(NodeKind::Interface, Point::new(0, 0));
        assert_eq!(iface.row_at(45), Some(NodeRow::Name));
        assert_eq!(iface.row_at(70), None);
    }

    #[test]
    fn test_connection_points_follow_position() {
        let mut node = Node::new(NodeKind::Class, Point::new(0, 0));
        let before = node.connection_points();
        node.x += 10;
        let after = node.connection_points();
        for (b, a) in before.iter().zip(after.iter()) {
            assert_eq!(a.x - b.x, 10.0);
            assert_eq!(a.y, b.y);
        }
        assert!(node.connection_point(6).is_none());
    }

    #[test]
    fn test_visibility_formatting() {
        assert_eq!(Visibility::Public.format_member("name"), "+ name");
        assert_eq!(Visibility::from_label("protected").format_member("x"), "# x");
        assert_eq!(Visibility::from_label("Package"), Visibility::Package);
        assert_eq!(Visibility::from_label("whatever"), Visibility::Public);
        assert_eq!(Visibility::from_symbol('~'), Some(Visibility::Package));
        assert_eq!(Visibility::from_symbol('*'), None);
    }

    #[test]
    fn test_find_dangling() {
        let mut diagram = Diagram::new();
        let a = Node::new(NodeKind::Class, Point::new(0, 0));
        let b = Node::new(NodeKind::Class, Point::new(300, 0));
        let (ka, kb) = (a.key, b.key);
        diagram.nodes.insert(ka, a);
        diagram.nodes.insert(kb, b);
        diagram
            .relationships
            .push(Relationship::new(RelationKind::Association, ka, 5, kb, 4));
        assert!(diagram.find_dangling().is_none());

        diagram.relationships[0].end_index = 6;
        assert_eq!(diagram.find_dangling().map(|(i, _)| i), Some(0));

        diagram.relationships[0].end_index = 4;
        diagram.nodes.shift_remove(&kb);
        assert!(diagram.find_dangling().is_some());
    }
}
