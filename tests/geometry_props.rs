use proptest::prelude::*;
use umlsketch::geometry::{Point, RectF, Vec2f, connection_points, distance_point_to_segment};
use umlsketch::model::{Diagram, Node, NodeKind};
use umlsketch::editor::operations::{connect, create_node, delete_node};

fn coord() -> impl Strategy<Value = f32> {
    -1000.0f32..1000.0
}

proptest! {
    #[test]
    fn degenerate_segment_is_point_distance(
        px in coord(),
        py in coord(),
        ax in coord(),
        ay in coord(),
    ) {
        let p = Vec2f::new(px, py);
        let a = Vec2f::new(ax, ay);
        let d = distance_point_to_segment(p, a, a);
        prop_assert!((d - p.distance(a)).abs() < 1e-3);
    }

    #[test]
    fn segment_distance_bounded_by_endpoints(
        px in coord(), py in coord(),
        ax in coord(), ay in coord(),
        bx in coord(), by in coord(),
    ) {
        let (p, a, b) = (Vec2f::new(px, py), Vec2f::new(ax, ay), Vec2f::new(bx, by));
        let d = distance_point_to_segment(p, a, b);
        prop_assert!(d >= 0.0);
        prop_assert!(d <= p.distance(a).min(p.distance(b)) + 1e-2);
    }

    #[test]
    fn connection_points_follow_geometry(
        x in -500i32..500,
        y in -500i32..500,
        w in 1i32..400,
        h in 1i32..400,
    ) {
        let rect = RectF::new(x as f32, y as f32, w as f32, h as f32);
        let points = connection_points(rect);
        prop_assert_eq!(points.len(), 6);
        for p in points {
            let on_vertical = (p.x - rect.x).abs() < 1e-3 || (p.x - rect.right()).abs() < 1e-3;
            let on_horizontal = (p.y - rect.y).abs() < 1e-3 || (p.y - rect.bottom()).abs() < 1e-3;
            prop_assert!(on_vertical || on_horizontal);
        }
        let mut node = Node::new(NodeKind::Class, Point::new(x, y));
        node.width = w;
        node.height = h;
        prop_assert_eq!(node.connection_points(), points);
    }

    #[test]
    fn create_node_is_idempotent_per_key(x in -500i32..500, y in -500i32..500) {
        let mut diagram = Diagram::new();
        let first = create_node(&mut diagram, NodeKind::Class, Point::new(x, y));
        prop_assert!(first.is_some());
        prop_assert!(create_node(&mut diagram, NodeKind::Class, Point::new(x, y)).is_none());
        prop_assert!(create_node(&mut diagram, NodeKind::Interface, Point::new(x, y)).is_some());
        prop_assert_eq!(diagram.nodes.len(), 2);
    }

    #[test]
    fn delete_cascades_every_touching_relationship(
        edges in prop::collection::vec((0usize..4, 0usize..4), 0..12),
    ) {
        let mut diagram = Diagram::new();
        let keys: Vec<_> = (0..4)
            .map(|i| create_node(&mut diagram, NodeKind::Class, Point::new(i * 200, 0)).unwrap())
            .collect();
        for (a, b) in edges {
            if a != b {
                connect(
                    &mut diagram,
                    umlsketch::RelationKind::Association,
                    keys[a],
                    5,
                    keys[b],
                    4,
                )
                .unwrap();
            }
        }
        let doomed = keys[0];
        let touching = diagram.relationships.iter().filter(|r| r.touches(&doomed)).count();
        let before = diagram.relationships.len();
        let (_, removed) = delete_node(&mut diagram, &doomed).unwrap();
        prop_assert_eq!(removed.len(), touching);
        prop_assert_eq!(diagram.relationships.len(), before - touching);
        prop_assert!(diagram.relationships.iter().all(|r| !r.touches(&doomed)));
        prop_assert!(diagram.find_dangling().is_none());
    }
}
