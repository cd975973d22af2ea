use std::fs;

use anyhow::Result;
use tempfile::tempdir;
use umlsketch::color::Rgb;
use umlsketch::editor::{Canvas, CanvasState, FixedChooser, Selection, Tool};
use umlsketch::geometry::Point;
use umlsketch::{CanvasConfig, EditorError, NodeKind, RelationKind};

/// Class "Circle" at (150,250) inheriting from interface "Shape" at (400,250).
fn build_shapes() -> Canvas {
    let mut canvas = Canvas::headless(CanvasConfig::default());
    canvas.select_tool(Tool::Class);
    canvas.click(Point::new(150, 250)).unwrap();
    canvas.select_tool(Tool::Interface);
    canvas.click(Point::new(400, 250)).unwrap();

    canvas.select_tool(Tool::Inheritance);
    canvas.press(Point::new(191, 251));
    canvas.drag(Point::new(300, 200));
    canvas.release(Point::new(439, 249)).unwrap();
    canvas.select_tool(Tool::Inheritance);

    canvas.double_click(Point::new(200, 265)).unwrap();
    canvas.set_edit_text("Circle");
    canvas.key_enter();
    canvas.double_click(Point::new(450, 265)).unwrap();
    canvas.set_edit_text("Shape");
    canvas.focus_lost();

    canvas.press(Point::new(200, 295));
    canvas.add_attribute(Some("private"), "radius: double").unwrap();
    canvas.add_operation(Some("public"), "area(): double").unwrap();
    canvas.press(Point::new(450, 320));
    canvas.add_operation(Some("public"), "area(): double").unwrap();
    canvas.press(Point::new(900, 700));
    canvas
}

#[test]
fn test_session_builds_expected_diagram() {
    let canvas = build_shapes();
    assert_eq!(canvas.canvas_state(), CanvasState::Idle);
    let diagram = canvas.diagram();
    let names: Vec<_> = diagram.nodes.values().map(|n| (n.kind(), n.name.as_str())).collect();
    assert_eq!(
        names,
        vec![(NodeKind::Class, "Circle"), (NodeKind::Interface, "Shape")]
    );
    let rel = &diagram.relationships[0];
    assert_eq!(rel.kind, RelationKind::Inheritance);
    assert_eq!((rel.start_index, rel.end_index), (0, 0));

    let texts: Vec<_> = canvas.scene().texts().collect();
    assert!(texts.contains(&"Circle"));
    assert!(texts.contains(&"- radius: double"));
    assert!(texts.contains(&"+ area(): double"));
}

#[test]
fn test_save_and_reopen_through_chooser() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("shapes.uml");
    let mut canvas = build_shapes();
    assert!(canvas.is_dirty());

    let mut chooser = FixedChooser {
        save: Some(path.clone()),
        open: Some(path.clone()),
        directory: None,
    };
    assert!(canvas.save_with(&mut chooser)?);
    assert!(!canvas.is_dirty());
    assert_eq!(canvas.current_file(), Some(path.as_path()));

    let saved = canvas.diagram().clone();
    let mut reopened = Canvas::headless(CanvasConfig::default());
    assert!(reopened.open_with(&mut chooser)?);
    assert_eq!(reopened.diagram(), &saved);

    let mut cancelled = FixedChooser::default();
    assert!(!reopened.save_with(&mut cancelled)?);
    Ok(())
}

#[test]
fn test_failed_load_keeps_current_diagram() -> Result<()> {
    let dir = tempdir()?;
    let bogus = dir.path().join("bogus.uml");
    fs::write(&bogus, b"definitely not a diagram")?;

    let mut canvas = build_shapes();
    canvas.press(Point::new(200, 295));
    let before = canvas.diagram().clone();
    let selection = canvas.selection();

    let err = canvas.load(&bogus).unwrap_err();
    assert!(matches!(err, EditorError::Document(_)));
    assert_eq!(canvas.diagram(), &before);
    assert_eq!(canvas.selection(), selection);
    assert!(canvas.dialogs().last_error().is_some());
    Ok(())
}

#[test]
fn test_load_clears_selection() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("shapes.uml");
    let mut canvas = build_shapes();
    canvas.save(&path)?;
    canvas.press(Point::new(200, 295));
    assert!(matches!(canvas.selection(), Selection::Node(_)));
    canvas.load(&path)?;
    assert!(canvas.selection().is_empty());
    Ok(())
}

#[test]
fn test_export_sources_writes_one_file_per_node() -> Result<()> {
    let dir = tempdir()?;
    let mut canvas = build_shapes();
    let report = canvas.export_sources(dir.path());
    assert!(report.is_complete());
    assert_eq!(report.written.len(), 2);

    let circle = fs::read_to_string(dir.path().join("Circle.java"))?;
    assert!(circle.starts_with("public class Circle implements Shape {"));
    assert!(circle.contains("private double radius;"));
    assert!(circle.contains("public double area() {"));
    let shape = fs::read_to_string(dir.path().join("Shape.java"))?;
    assert!(shape.contains("double area();"));
    Ok(())
}

#[test]
fn test_export_sources_continues_past_bad_names() -> Result<()> {
    let dir = tempdir()?;
    let mut canvas = build_shapes();
    canvas.double_click(Point::new(200, 265)).unwrap();
    canvas.set_edit_text("");
    canvas.key_enter();

    let report = canvas.export_sources(dir.path());
    assert_eq!(report.written.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert!(dir.path().join("Shape.java").exists());
    assert!(canvas.dialogs().last_error().is_some());
    Ok(())
}

#[test]
fn test_export_svg_snapshot_has_no_selection() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("shapes.svg");
    let mut canvas = build_shapes();
    canvas.press(Point::new(200, 295));
    canvas.export_image(&path)?;

    let svg = fs::read_to_string(&path)?;
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains(">Circle</text>"));
    assert!(svg.contains("«interface»"));
    assert!(!svg.contains(&Rgb::HIGHLIGHT.to_hex()));
    assert!(canvas.scene().primitives.len() > 0);
    assert!(canvas.export_image(&dir.path().join("shapes.bmp")).is_err());
    Ok(())
}
