//! Model-mutation operations used by the canvas controller.
//!
//! Each operation works directly on a [`Diagram`] and either succeeds
//! completely or leaves the diagram untouched. Validation failures come back as
//! [`EditorError`] for the controller to surface.

use log::debug;

use crate::error::EditorError;
use crate::geometry::Point;
use crate::model::{
    CONNECTION_POINTS, Diagram, Node, NodeKey, NodeKind, RelationKind, Relationship, Visibility,
};

use super::state::EditTarget;

/// Create a node of `kind` at `at`.
///
/// Returns `None` when a node with the identical `(kind, x, y)` key already exists.
pub fn create_node(diagram: &mut Diagram, kind: NodeKind, at: Point) -> Option<NodeKey> {
    let node = Node::new(kind, at);
    let key = node.key;
    if diagram.nodes.contains_key(&key) {
        return None;
    }
    diagram.nodes.insert(key, node);
    debug!(key:% = key; "Created node");
    Some(key)
}

/// Move a node so its top-left corner sits at `to`. The key does not change.
pub fn move_node(diagram: &mut Diagram, key: &NodeKey, to: Point) -> Result<(), EditorError> {
    let node = diagram
        .node_mut(key)
        .ok_or(EditorError::UnknownNode(*key))?;
    node.x = to.x;
    node.y = to.y;
    Ok(())
}

/// Delete a node and every relationship that touches it.
///
/// Returns the removed node and relationships, or `None` if the key is unknown.
pub fn delete_node(diagram: &mut Diagram, key: &NodeKey) -> Option<(Node, Vec<Relationship>)> {
    let node = diagram.nodes.shift_remove(key)?;
    let (removed, kept): (Vec<_>, Vec<_>) = diagram
        .relationships
        .drain(..)
        .partition(|rel| rel.touches(key));
    diagram.relationships = kept;
    debug!(key:% = key, cascaded = removed.len(); "Deleted node");
    Some((node, removed))
}

/// Delete the relationship at `index`.
pub fn delete_relationship(diagram: &mut Diagram, index: usize) -> Option<Relationship> {
    (index < diagram.relationships.len()).then(|| diagram.relationships.remove(index))
}

/// Connect two nodes, returning the index of the new relationship.
pub fn connect(
    diagram: &mut Diagram,
    kind: RelationKind,
    start: NodeKey,
    start_index: usize,
    end: NodeKey,
    end_index: usize,
) -> Result<usize, EditorError> {
    if start == end {
        return Err(EditorError::SelfConnection);
    }
    for key in [start, end] {
        if !diagram.nodes.contains_key(&key) {
            return Err(EditorError::UnknownNode(key));
        }
    }
    if start_index >= CONNECTION_POINTS || end_index >= CONNECTION_POINTS {
        return Err(EditorError::InvalidEndpoint);
    }
    diagram
        .relationships
        .push(Relationship::new(kind, start, start_index, end, end_index));
    debug!(kind:? = kind, start:% = start, end:% = end; "Connected nodes");
    Ok(diagram.relationships.len() - 1)
}

/// Validate and format a new compartment entry.
pub fn format_member(visibility: Option<Visibility>, name: &str) -> Result<String, EditorError> {
    if name.trim().is_empty() {
        return Err(EditorError::EmptyName);
    }
    let visibility = visibility.ok_or(EditorError::MissingModifier)?;
    Ok(visibility.format_member(name))
}

/// Append an attribute entry to a class.
pub fn add_attribute(
    diagram: &mut Diagram,
    key: &NodeKey,
    visibility: Option<Visibility>,
    name: &str,
) -> Result<(), EditorError> {
    let entry = format_member(visibility, name)?;
    let node = diagram
        .node_mut(key)
        .ok_or(EditorError::UnknownNode(*key))?;
    if !node.kind().has_attributes() {
        return Err(EditorError::InterfaceAttributes);
    }
    node.attributes.push(entry);
    Ok(())
}

/// Append an operation entry to a class or interface.
pub fn add_operation(
    diagram: &mut Diagram,
    key: &NodeKey,
    visibility: Option<Visibility>,
    name: &str,
) -> Result<(), EditorError> {
    let entry = format_member(visibility, name)?;
    let node = diagram
        .node_mut(key)
        .ok_or(EditorError::UnknownNode(*key))?;
    node.operations.push(entry);
    Ok(())
}

/// Current text of an inline-edit target.
pub fn target_text(diagram: &Diagram, target: &EditTarget) -> Option<String> {
    match target {
        EditTarget::NodeName(key) => diagram.node(key).map(|n| n.name.clone()),
        EditTarget::Attribute(key, i) => diagram.node(key)?.attributes.get(*i).cloned(),
        EditTarget::Operation(key, i) => diagram.node(key)?.operations.get(*i).cloned(),
        EditTarget::Label(i) => diagram
            .relationships
            .get(*i)
            .map(|r| r.label.clone().unwrap_or_default()),
    }
}

/// Store committed inline-edit text. Any text, including empty, is accepted.
///
/// Returns `false` when the target no longer exists.
pub fn apply_text(diagram: &mut Diagram, target: &EditTarget, text: String) -> bool {
    let slot = match target {
        EditTarget::NodeName(key) => diagram.node_mut(key).map(|n| &mut n.name),
        EditTarget::Attribute(key, i) => diagram
            .node_mut(key)
            .and_then(|n| n.attributes.get_mut(*i)),
        EditTarget::Operation(key, i) => diagram
            .node_mut(key)
            .and_then(|n| n.operations.get_mut(*i)),
        EditTarget::Label(i) => {
            return match diagram.relationships.get_mut(*i) {
                Some(rel) => {
                    rel.label = Some(text);
                    true
                }
                None => false,
            };
        }
    };
    match slot {
        Some(slot) => {
            *slot = text;
            true
        }
        None => false,
    }
}

/// Append a control point to the end of a relationship's polyline.
///
/// The point always goes last, regardless of which segment was clicked, so a
/// point added near the start of a bent line reorders the drawn path.
pub fn append_control_point(diagram: &mut Diagram, line: usize, at: Point) -> Option<usize> {
    let rel = diagram.relationships.get_mut(line)?;
    rel.control_points.push(at);
    Some(rel.control_points.len() - 1)
}

pub fn move_control_point(diagram: &mut Diagram, line: usize, index: usize, to: Point) -> bool {
    match diagram
        .relationships
        .get_mut(line)
        .and_then(|rel| rel.control_points.get_mut(index))
    {
        Some(cp) => {
            *cp = to;
            true
        }
        None => false,
    }
}

/// Shift every control point of a relationship by `(dx, dy)`.
pub fn translate_line(diagram: &mut Diagram, line: usize, dx: i32, dy: i32) -> bool {
    match diagram.relationships.get_mut(line) {
        Some(rel) => {
            for cp in &mut rel.control_points {
                cp.x += dx;
                cp.y += dy;
            }
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_diagram() -> (Diagram, NodeKey, NodeKey) {
        let mut diagram = Diagram::new();
        let a = create_node(&mut diagram, NodeKind::Class, Point::new(100, 100)).unwrap();
        let b = create_node(&mut diagram, NodeKind::Interface, Point::new(400, 100)).unwrap();
        (diagram, a, b)
    }

    #[test]
    fn test_create_node_is_idempotent_per_key() {
        let (mut diagram, _, _) = make_test_diagram();
        assert!(create_node(&mut diagram, NodeKind::Class, Point::new(100, 100)).is_none());
        assert!(create_node(&mut diagram, NodeKind::Interface, Point::new(100, 100)).is_some());
        assert!(create_node(&mut diagram, NodeKind::Class, Point::new(101, 100)).is_some());
        assert_eq!(diagram.nodes.len(), 4);
    }

    #[test]
    fn test_move_keeps_key() {
        let (mut diagram, a, _) = make_test_diagram();
        move_node(&mut diagram, &a, Point::new(500, 20)).unwrap();
        let node = diagram.node(&a).unwrap();
        assert_eq!((node.x, node.y), (500, 20));
        assert_eq!(node.key, a);
    }

    #[test]
    fn test_delete_node_cascades() {
        let (mut diagram, a, b) = make_test_diagram();
        let c = create_node(&mut diagram, NodeKind::Class, Point::new(100, 400)).unwrap();
        connect(&mut diagram, RelationKind::Inheritance, a, 0, b, 0).unwrap();
        connect(&mut diagram, RelationKind::Association, c, 1, a, 2).unwrap();
        connect(&mut diagram, RelationKind::Aggregation, c, 5, b, 4).unwrap();

        let (node, removed) = delete_node(&mut diagram, &a).unwrap();
        assert_eq!(node.key, a);
        assert_eq!(removed.len(), 2);
        assert_eq!(diagram.nodes.len(), 2);
        assert_eq!(diagram.relationships.len(), 1);
        assert_eq!(diagram.relationships[0].kind, RelationKind::Aggregation);
        assert!(delete_node(&mut diagram, &a).is_none());
    }

    #[test]
    fn test_connect_rejects_self_and_unknown() {
        let (mut diagram, a, b) = make_test_diagram();
        assert!(matches!(
            connect(&mut diagram, RelationKind::Association, a, 0, a, 3),
            Err(EditorError::SelfConnection)
        ));
        let ghost = NodeKey::new(NodeKind::Class, Point::new(9, 9));
        assert!(matches!(
            connect(&mut diagram, RelationKind::Association, a, 0, ghost, 3),
            Err(EditorError::UnknownNode(_))
        ));
        assert!(matches!(
            connect(&mut diagram, RelationKind::Association, a, 0, b, 6),
            Err(EditorError::InvalidEndpoint)
        ));
        assert!(diagram.relationships.is_empty());
    }

    #[test]
    fn test_add_members() {
        let (mut diagram, a, b) = make_test_diagram();
        add_attribute(&mut diagram, &a, Some(Visibility::Public), "name").unwrap();
        add_attribute(&mut diagram, &a, Some(Visibility::Public), "name").unwrap();
        add_operation(&mut diagram, &b, Some(Visibility::Package), "run()").unwrap();
        assert_eq!(diagram.node(&a).unwrap().attributes, vec!["+ name", "+ name"]);
        assert_eq!(diagram.node(&b).unwrap().operations, vec!["~ run()"]);

        assert!(matches!(
            add_attribute(&mut diagram, &a, Some(Visibility::Public), "  "),
            Err(EditorError::EmptyName)
        ));
        assert!(matches!(
            add_operation(&mut diagram, &a, None, "go()"),
            Err(EditorError::MissingModifier)
        ));
        assert!(matches!(
            add_attribute(&mut diagram, &b, Some(Visibility::Private), "x"),
            Err(EditorError::InterfaceAttributes)
        ));
        assert_eq!(diagram.node(&a).unwrap().operations.len(), 0);
    }

    #[test]
    fn test_apply_text_accepts_empty() {
        let (mut diagram, a, b) = make_test_diagram();
        connect(&mut diagram, RelationKind::Association, a, 5, b, 4).unwrap();
        assert!(apply_text(&mut diagram, &EditTarget::NodeName(a), String::new()));
        assert_eq!(diagram.node(&a).unwrap().name, "");
        assert!(apply_text(&mut diagram, &EditTarget::Label(0), "uses".into()));
        assert_eq!(diagram.relationships[0].label.as_deref(), Some("uses"));
        assert!(!apply_text(&mut diagram, &EditTarget::Attribute(a, 0), "x".into()));
        assert_eq!(
            target_text(&diagram, &EditTarget::Label(0)).as_deref(),
            Some("uses")
        );
    }

    #[test]
    fn test_control_points_append_and_translate() {
        let (mut diagram, a, b) = make_test_diagram();
        connect(&mut diagram, RelationKind::Association, a, 5, b, 4).unwrap();
        assert_eq!(append_control_point(&mut diagram, 0, Point::new(300, 200)), Some(0));
        assert_eq!(append_control_point(&mut diagram, 0, Point::new(250, 120)), Some(1));
        assert!(move_control_point(&mut diagram, 0, 1, Point::new(260, 130)));
        assert!(translate_line(&mut diagram, 0, 5, -5));
        assert_eq!(
            diagram.relationships[0].control_points,
            vec![Point::new(305, 195), Point::new(265, 125)]
        );
        assert!(append_control_point(&mut diagram, 7, Point::new(0, 0)).is_none());
    }
}
