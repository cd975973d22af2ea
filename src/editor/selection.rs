//! Selection and hit-testing for the canvas.
//!
//! All functions here are read-only queries against a [`Diagram`] in canvas
//! coordinates; the controller decides what to do with the answers.

use crate::geometry::{Point, Vec2f, distance_point_to_polyline};
use crate::model::{Diagram, NodeKey};

/// The single current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Node(NodeKey),
    /// Index into `Diagram::relationships`.
    Line(usize),
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::None)
    }

    pub fn node(&self) -> Option<NodeKey> {
        match self {
            Selection::Node(key) => Some(*key),
            _ => None,
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            Selection::Line(idx) => Some(*idx),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        *self = Selection::None;
    }
}

/// Topmost node whose bounding box contains `p`. Later nodes are drawn on top.
pub fn hit_node(diagram: &Diagram, p: Point) -> Option<NodeKey> {
    let p = p.to_vec2();
    diagram
        .nodes
        .values()
        .rev()
        .find(|node| node.bounds().contains(p))
        .map(|node| node.key)
}

/// Distance from `p` to the body of relationship `index`.
pub fn line_distance(diagram: &Diagram, index: usize, p: Point) -> Option<f32> {
    let rel = diagram.relationships.get(index)?;
    let path = diagram.relationship_path(rel)?;
    distance_point_to_polyline(p.to_vec2(), &path)
}

/// The relationship whose body passes closest to `p`, if within `tolerance`.
pub fn hit_relationship(diagram: &Diagram, p: Point, tolerance: f32) -> Option<usize> {
    (0..diagram.relationships.len())
        .filter_map(|i| line_distance(diagram, i, p).map(|d| (i, d)))
        .filter(|(_, d)| *d <= tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// Index of the control point of relationship `line` within `tolerance` of `p`.
pub fn hit_control_point(
    diagram: &Diagram,
    line: usize,
    p: Point,
    tolerance: f32,
) -> Option<usize> {
    let rel = diagram.relationships.get(line)?;
    let p = p.to_vec2();
    rel.control_points
        .iter()
        .position(|cp| cp.to_vec2().distance(p) <= tolerance)
}

/// The connection point nearest to `p` across all nodes, if within `radius`.
///
/// Points of `exclude` are ignored. Returns the owning node, the
/// connection-point index and its position.
pub fn nearest_connection_point(
    diagram: &Diagram,
    p: Point,
    radius: f32,
    exclude: Option<&NodeKey>,
) -> Option<(NodeKey, usize, Vec2f)> {
    let p = p.to_vec2();
    let mut best: Option<(NodeKey, usize, Vec2f, f32)> = None;
    for node in diagram.nodes.values() {
        if Some(&node.key) == exclude {
            continue;
        }
        for (idx, cp) in node.connection_points().into_iter().enumerate() {
            let dist = cp.distance(p);
            if dist <= radius && best.as_ref().is_none_or(|b| dist < b.3) {
                best = Some((node.key, idx, cp, dist));
            }
        }
    }
    best.map(|(key, idx, cp, _)| (key, idx, cp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Node, NodeKind, RelationKind, Relationship};

    fn make_test_diagram() -> Diagram {
        let mut diagram = Diagram::new();
        let a = Node::new(NodeKind::Class, Point::new(0, 0));
        let b = Node::new(NodeKind::Class, Point::new(300, 0));
        let (ka, kb) = (a.key, b.key);
        diagram.nodes.insert(ka, a);
        diagram.nodes.insert(kb, b);
        // right-centre (120,45) to left-centre (300,45)
        let mut rel = Relationship::new(RelationKind::Association, ka, 5, kb, 4);
        rel.control_points.push(Point::new(200, 45));
        diagram.relationships.push(rel);
        diagram
    }

    #[test]
    fn test_selection_accessors() {
        let key = NodeKey::new(NodeKind::Class, Point::new(1, 2));
        let mut sel = Selection::Node(key);
        assert_eq!(sel.node(), Some(key));
        assert_eq!(sel.line(), None);
        sel.clear();
        assert!(sel.is_empty());
    }

    #[test]
    fn test_hit_node_prefers_topmost() {
        let mut diagram = make_test_diagram();
        let over = Node::new(NodeKind::Interface, Point::new(50, 10));
        let over_key = over.key;
        diagram.nodes.insert(over_key, over);
        assert_eq!(hit_node(&diagram, Point::new(60, 20)), Some(over_key));
        assert_eq!(
            hit_node(&diagram, Point::new(5, 5)),
            Some(NodeKey::new(NodeKind::Class, Point::new(0, 0)))
        );
        assert_eq!(hit_node(&diagram, Point::new(250, 300)), None);
    }

    #[test]
    fn test_hit_relationship_within_tolerance() {
        let diagram = make_test_diagram();
        assert_eq!(hit_relationship(&diagram, Point::new(160, 52), 10.0), Some(0));
        assert_eq!(hit_relationship(&diagram, Point::new(160, 70), 10.0), None);
    }

    #[test]
    fn test_hit_control_point() {
        let diagram = make_test_diagram();
        assert_eq!(hit_control_point(&diagram, 0, Point::new(205, 50), 10.0), Some(0));
        assert_eq!(hit_control_point(&diagram, 0, Point::new(230, 45), 10.0), None);
        assert_eq!(hit_control_point(&diagram, 3, Point::new(200, 45), 10.0), None);
    }

    #[test]
    fn test_nearest_connection_point() {
        let diagram = make_test_diagram();
        let first = NodeKey::new(NodeKind::Class, Point::new(0, 0));
        let (key, idx, _) =
            nearest_connection_point(&diagram, Point::new(42, 3), 10.0, None).unwrap();
        assert_eq!(key, first);
        assert_eq!(idx, 0);
        assert!(nearest_connection_point(&diagram, Point::new(60, 45), 10.0, None).is_none());
        assert!(
            nearest_connection_point(&diagram, Point::new(42, 3), 10.0, Some(&first)).is_none()
        );
    }
}
