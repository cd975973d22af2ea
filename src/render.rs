//! Canvas redraw: turn the diagram and interaction state into drawing primitives.
//!
//! A [`Scene`] is rebuilt from scratch after every mutation. Front ends paint it
//! with their own toolkit; [`crate::export`] serialises it to SVG.

use crate::color::{Rgb, parse_color};
use crate::config::CanvasConfig;
use crate::editor::{DragMode, InteractionState, Selection};
use crate::geometry::{
    RectF, Vec2f, diamond_glyph, line_angle, nearest_endpoint_offset, triangle_glyph,
};
use crate::model::{Diagram, Node, NodeKind, ROW_HEIGHT, RelationKind, Relationship};

const TEXT_INSET: f32 = 10.0;
const BASELINE: f32 = 20.0;
const HANDLE_RADIUS: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Line {
        from: Vec2f,
        to: Vec2f,
        stroke: Rgb,
        width: f32,
    },
    Polyline {
        points: Vec<Vec2f>,
        stroke: Rgb,
        width: f32,
        dashed: bool,
    },
    Rect {
        rect: RectF,
        stroke: Rgb,
        fill: Rgb,
        width: f32,
    },
    Polygon {
        points: Vec<Vec2f>,
        stroke: Rgb,
        fill: Option<Rgb>,
    },
    Circle {
        center: Vec2f,
        radius: f32,
        fill: Rgb,
    },
    Text {
        at: Vec2f,
        text: String,
        color: Rgb,
        anchor: Anchor,
        italic: bool,
    },
}

/// One full frame of the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub background: Rgb,
    pub primitives: Vec<Primitive>,
}

impl Scene {
    pub fn empty(config: &CanvasConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            background: parse_color(&config.background).unwrap_or(Rgb::WHITE),
            primitives: Vec::new(),
        }
    }

    /// All text strings in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Build the scene for the current diagram: grid, every node, every
/// relationship with the selected one highlighted, and the rubber-band line of
/// a relationship being drawn.
pub fn build_scene(diagram: &Diagram, state: &InteractionState, config: &CanvasConfig) -> Scene {
    let mut scene = Scene::empty(config);
    if config.show_grid && config.grid_size > 0 {
        draw_grid(&mut scene, config.grid_size);
    }

    for (idx, rel) in diagram.relationships.iter().enumerate() {
        let selected = state.selection == Selection::Line(idx);
        draw_relationship(&mut scene, diagram, rel, selected);
    }

    for node in diagram.nodes.values() {
        let selected = state.selection == Selection::Node(node.key);
        draw_node(&mut scene, node, selected);
    }

    if let DragMode::CreatingLine {
        start,
        start_index,
        cursor,
    } = state.drag
    {
        if let Some(from) = diagram
            .node(&start)
            .and_then(|n| n.connection_point(start_index))
        {
            scene.primitives.push(Primitive::Polyline {
                points: vec![from, cursor.to_vec2()],
                stroke: Rgb::HIGHLIGHT,
                width: 1.0,
                dashed: true,
            });
        }
    }
    scene
}

fn draw_grid(scene: &mut Scene, step: u32) {
    let (w, h) = (scene.width as f32, scene.height as f32);
    for x in (0..=scene.width).step_by(step as usize) {
        scene.primitives.push(Primitive::Line {
            from: Vec2f::new(x as f32, 0.0),
            to: Vec2f::new(x as f32, h),
            stroke: Rgb::GRID,
            width: 1.0,
        });
    }
    for y in (0..=scene.height).step_by(step as usize) {
        scene.primitives.push(Primitive::Line {
            from: Vec2f::new(0.0, y as f32),
            to: Vec2f::new(w, y as f32),
            stroke: Rgb::GRID,
            width: 1.0,
        });
    }
}

fn draw_node(scene: &mut Scene, node: &Node, selected: bool) {
    let rect = node.bounds();
    let (stroke, width) = if selected {
        (Rgb::HIGHLIGHT, 2.0)
    } else {
        (Rgb::BLACK, 1.0)
    };
    scene.primitives.push(Primitive::Rect {
        rect,
        stroke,
        fill: Rgb::NODE_FILL,
        width,
    });

    let centre_x = rect.x + rect.width / 2.0;
    let row_text = |row_top: i32| row_top as f32 + BASELINE;
    match node.kind() {
        NodeKind::Class => {
            scene.primitives.push(text(
                centre_x,
                row_text(node.y),
                &node.name,
                Anchor::Middle,
                false,
            ));
        }
        NodeKind::Interface => {
            scene
                .primitives
                .push(text(centre_x, row_text(node.y), "«interface»", Anchor::Middle, true));
            scene.primitives.push(text(
                centre_x,
                row_text(node.y + ROW_HEIGHT),
                &node.name,
                Anchor::Middle,
                false,
            ));
        }
    }

    let mut separators = vec![node.header_bottom()];
    if node.kind() == NodeKind::Class {
        separators.push(node.operations_top());
    }
    for y in separators {
        scene.primitives.push(Primitive::Line {
            from: Vec2f::new(rect.x, y as f32),
            to: Vec2f::new(rect.right(), y as f32),
            stroke,
            width: 1.0,
        });
    }

    let left = rect.x + TEXT_INSET;
    for (i, attr) in node.attributes.iter().enumerate() {
        let top = node.header_bottom() + ROW_HEIGHT * i as i32;
        scene.primitives.push(text(left, row_text(top), attr, Anchor::Start, false));
    }
    for (i, op) in node.operations.iter().enumerate() {
        let top = node.operations_top() + ROW_HEIGHT * i as i32;
        scene.primitives.push(text(left, row_text(top), op, Anchor::Start, false));
    }
}

fn draw_relationship(scene: &mut Scene, diagram: &Diagram, rel: &Relationship, selected: bool) {
    let Some(mut path) = diagram.relationship_path(rel) else {
        return;
    };
    let stroke = if selected { Rgb::HIGHLIGHT } else { Rgb::BLACK };
    let n = path.len();
    let end = path[n - 1];
    let before_end = path[n - 2];
    let angle = line_angle(before_end, end);
    let offset = rel.kind.end_offset();
    if offset > 0.0 {
        path[n - 1] = nearest_endpoint_offset(end, before_end, offset);
    }

    let label_at = {
        let mid = (n - 1) / 2;
        let (a, b) = (path[mid], path[mid + 1]);
        Vec2f::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0 - 5.0)
    };

    scene.primitives.push(Primitive::Polyline {
        points: path,
        stroke,
        width: if selected { 2.0 } else { 1.0 },
        dashed: false,
    });

    match rel.kind {
        RelationKind::Association => {}
        RelationKind::Inheritance => scene.primitives.push(Primitive::Polygon {
            points: triangle_glyph(end, angle).to_vec(),
            stroke,
            fill: Some(Rgb::WHITE),
        }),
        RelationKind::Aggregation => scene.primitives.push(Primitive::Polygon {
            points: diamond_glyph(end, angle).to_vec(),
            stroke,
            fill: Some(Rgb::WHITE),
        }),
        RelationKind::Composition => scene.primitives.push(Primitive::Polygon {
            points: diamond_glyph(end, angle).to_vec(),
            stroke,
            fill: Some(stroke),
        }),
    }

    if let Some(label) = rel.label.as_deref().filter(|l| !l.is_empty()) {
        scene
            .primitives
            .push(text(label_at.x, label_at.y, label, Anchor::Middle, false));
    }

    if selected {
        for cp in &rel.control_points {
            scene.primitives.push(Primitive::Circle {
                center: cp.to_vec2(),
                radius: HANDLE_RADIUS,
                fill: Rgb::HANDLE,
            });
        }
    }
}

fn text(x: f32, y: f32, s: &str, anchor: Anchor, italic: bool) -> Primitive {
    Primitive::Text {
        at: Vec2f::new(x, y),
        text: s.to_string(),
        color: Rgb::BLACK,
        anchor,
        italic,
    }
}
