//! The canvas controller.
//!
//! [`Canvas`] owns the diagram and the interaction state and turns pointer
//! and keyboard events into model mutations. Every mutation is followed by a
//! full relayout and redraw of the [`Scene`]. Errors are reported through the
//! host's [`Dialogs`] and also returned, and the controller is always left in
//! a resting state.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::CanvasConfig;
use crate::document;
use crate::error::{EditorError, ExportError};
use crate::export;
use crate::generator::{self, SourceExport};
use crate::geometry::Point;
use crate::model::{Diagram, NodeKey, NodeRow, RelationKind, Visibility};
use crate::render::{Scene, build_scene};
use crate::text::{MonospaceMeasurer, TextMeasurer};

use super::dialogs::{Dialogs, FileChooser, MemoryDialogs};
use super::operations;
use super::selection::{
    Selection, hit_control_point, hit_node, hit_relationship, line_distance,
    nearest_connection_point,
};
use super::state::{CanvasState, DragMode, EditTarget, InteractionState, TextEdit, Tool};

pub struct Canvas<D: Dialogs = MemoryDialogs, M: TextMeasurer = MonospaceMeasurer> {
    diagram: Diagram,
    state: InteractionState,
    config: CanvasConfig,
    dialogs: D,
    measurer: M,
    scene: Scene,
    /// Unsaved changes since the last save, load or new diagram.
    dirty: bool,
    current_file: Option<PathBuf>,
}

impl Canvas {
    /// A canvas with recording dialogs and monospace text metrics.
    pub fn headless(config: CanvasConfig) -> Self {
        Canvas::new(config, MemoryDialogs::default(), MonospaceMeasurer::default())
    }
}

impl<D: Dialogs, M: TextMeasurer> Canvas<D, M> {
    pub fn new(config: CanvasConfig, dialogs: D, measurer: M) -> Self {
        let scene = Scene::empty(&config);
        let mut canvas = Self {
            diagram: Diagram::new(),
            state: InteractionState::new(),
            config,
            dialogs,
            measurer,
            scene,
            dirty: false,
            current_file: None,
        };
        canvas.redraw();
        canvas
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn canvas_state(&self) -> CanvasState {
        self.state.state()
    }

    pub fn selection(&self) -> Selection {
        self.state.selection
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn dialogs(&self) -> &D {
        &self.dialogs
    }

    pub fn dialogs_mut(&mut self) -> &mut D {
        &mut self.dialogs
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    /// Rebuild node sizes and the scene from scratch.
    pub fn redraw(&mut self) {
        self.diagram.relayout(&self.measurer);
        self.scene = build_scene(&self.diagram, &self.state, &self.config);
    }

    fn changed(&mut self) {
        self.dirty = true;
        self.redraw();
    }

    /// Report an error to the user and pass the result through.
    fn surface<T>(
        &mut self,
        title: &str,
        result: Result<T, EditorError>,
    ) -> Result<T, EditorError> {
        if let Err(err) = &result {
            warn!(title = title, error:% = err; "Operation rejected");
            self.dialogs.error(title, &err.to_string());
        }
        result
    }

    // ── Tools ──────────────────────────────────────────────────────────────

    /// Toolbox click: arm `tool`, or disarm it if it is already armed.
    pub fn select_tool(&mut self, tool: Tool) {
        self.commit_edit();
        self.state.toggle_tool(tool);
        debug!(tool:? = tool, armed = self.state.armed.is_some(); "Tool toggled");
        self.redraw();
    }

    // ── Pointer events ─────────────────────────────────────────────────────

    /// Canvas click. With a node tool armed, creates a node at `p`.
    pub fn click(&mut self, p: Point) -> Option<NodeKey> {
        self.commit_edit();
        let kind = self.state.armed.and_then(Tool::node_kind)?;
        match operations::create_node(&mut self.diagram, kind, p) {
            Some(key) => {
                info!(key:% = key; "Node created");
                self.changed();
                Some(key)
            }
            None => {
                debug!(kind:? = kind, x = p.x, y = p.y; "Node already exists at this position");
                None
            }
        }
    }

    /// Pointer press.
    pub fn press(&mut self, p: Point) {
        self.commit_edit();
        self.state.drag = DragMode::None;
        match self.state.armed {
            Some(tool) if tool.relation_kind().is_some() => self.begin_line(p),
            // node tools act on click
            Some(_) => {}
            None => self.press_select(p),
        }
        self.redraw();
    }

    fn begin_line(&mut self, p: Point) {
        match nearest_connection_point(&self.diagram, p, self.config.snap_radius, None) {
            Some((start, start_index, _)) => {
                debug!(start:% = start, index = start_index; "Relationship started");
                self.state.drag = DragMode::CreatingLine {
                    start,
                    start_index,
                    cursor: p,
                };
            }
            None => debug!(x = p.x, y = p.y; "Press away from any connection point"),
        }
    }

    fn press_select(&mut self, p: Point) {
        let tolerance = self.config.pick_tolerance;

        if let Some(line) = self.state.selection.line() {
            if let Some(index) = hit_control_point(&self.diagram, line, p, tolerance) {
                self.state.drag = DragMode::ControlPoint { line, index };
                return;
            }
            let on_body = line_distance(&self.diagram, line, p).is_some_and(|d| d <= tolerance);
            if on_body {
                if let Some(index) = operations::append_control_point(&mut self.diagram, line, p) {
                    debug!(line = line, index = index; "Control point appended");
                    self.state.drag = DragMode::ControlPoint { line, index };
                    self.dirty = true;
                }
                return;
            }
        }

        if let Some(line) = hit_relationship(&self.diagram, p, tolerance) {
            self.state.selection = Selection::Line(line);
            self.state.drag = DragMode::Line { line, last: p };
            return;
        }

        if let Some(key) = hit_node(&self.diagram, p) {
            if let Some(node) = self.diagram.node(&key) {
                let origin = node.position();
                let offset = Point::new(p.x - origin.x, p.y - origin.y);
                self.state.selection = Selection::Node(key);
                self.state.drag = DragMode::Node { key, offset };
            }
            return;
        }

        self.state.selection.clear();
    }

    /// Pointer motion with the button held.
    pub fn drag(&mut self, p: Point) {
        match self.state.drag {
            DragMode::None => {}
            DragMode::CreatingLine {
                start, start_index, ..
            } => {
                self.state.drag = DragMode::CreatingLine {
                    start,
                    start_index,
                    cursor: p,
                };
                self.redraw();
            }
            DragMode::Node { key, offset } => {
                let to = Point::new(p.x - offset.x, p.y - offset.y);
                match operations::move_node(&mut self.diagram, &key, to) {
                    Ok(()) => self.changed(),
                    Err(err) => {
                        warn!(error:% = err; "Dragged node vanished");
                        self.state.drag = DragMode::None;
                    }
                }
            }
            DragMode::ControlPoint { line, index } => {
                if operations::move_control_point(&mut self.diagram, line, index, p) {
                    self.changed();
                }
            }
            DragMode::Line { line, last } => {
                let (dx, dy) = (p.x - last.x, p.y - last.y);
                if operations::translate_line(&mut self.diagram, line, dx, dy) {
                    self.state.drag = DragMode::Line { line, last: p };
                    self.changed();
                }
            }
        }
    }

    /// Pointer release. Finishes whatever gesture was in progress.
    pub fn release(&mut self, p: Point) -> Result<(), EditorError> {
        let drag = std::mem::take(&mut self.state.drag);
        let DragMode::CreatingLine {
            start, start_index, ..
        } = drag
        else {
            self.redraw();
            return Ok(());
        };
        let Some(kind) = self.state.armed.and_then(Tool::relation_kind) else {
            self.redraw();
            return Ok(());
        };

        let result = self.finish_line(kind, start, start_index, p);
        let result = self.surface("Relationship", result);
        match result {
            Ok(index) => {
                info!(index = index, kind:? = kind; "Relationship created");
                self.changed();
                Ok(())
            }
            Err(err) => {
                self.redraw();
                Err(err)
            }
        }
    }

    fn finish_line(
        &mut self,
        kind: RelationKind,
        start: NodeKey,
        start_index: usize,
        p: Point,
    ) -> Result<usize, EditorError> {
        let radius = self.config.snap_radius;
        let Some((end, end_index, _)) =
            nearest_connection_point(&self.diagram, p, radius, Some(&start))
        else {
            return Err(
                if nearest_connection_point(&self.diagram, p, radius, None).is_some() {
                    EditorError::SelfConnection
                } else {
                    EditorError::InvalidEndpoint
                },
            );
        };
        operations::connect(&mut self.diagram, kind, start, start_index, end, end_index)
    }

    // ── Inline text editing ───────────────────────────────────────────────

    /// Double-click: open an inline editor on the row or relationship under `p`.
    pub fn double_click(&mut self, p: Point) -> Option<EditTarget> {
        self.commit_edit();
        self.state.drag = DragMode::None;
        let target = self.edit_target_at(p)?;
        let text = operations::target_text(&self.diagram, &target).unwrap_or_default();
        debug!(edit:? = target; "Inline edit opened");
        self.state.editing = Some(TextEdit { target, text });
        self.redraw();
        Some(target)
    }

    /// Row under `p`, or else a relationship within tolerance. Placeholder
    /// rows of empty compartments are not editable and fall through to lines.
    fn edit_target_at(&self, p: Point) -> Option<EditTarget> {
        let row = hit_node(&self.diagram, p)
            .and_then(|key| Some((key, self.diagram.node(&key)?.row_at(p.y)?)));
        if let Some((key, row)) = row {
            return Some(match row {
                NodeRow::Name => EditTarget::NodeName(key),
                NodeRow::Attribute(i) => EditTarget::Attribute(key, i),
                NodeRow::Operation(i) => EditTarget::Operation(key, i),
            });
        }
        hit_relationship(&self.diagram, p, self.config.pick_tolerance).map(EditTarget::Label)
    }

    /// Text of the open inline editor.
    pub fn edit_text(&self) -> Option<&str> {
        self.state.editing.as_ref().map(|edit| edit.text.as_str())
    }

    /// Replace the buffer of the open inline editor.
    pub fn set_edit_text(&mut self, text: impl Into<String>) {
        if let Some(edit) = self.state.editing.as_mut() {
            edit.text = text.into();
        }
    }

    /// Enter key: commit the open inline editor.
    pub fn key_enter(&mut self) {
        self.commit_edit();
    }

    /// The inline editor lost focus: commit it.
    pub fn focus_lost(&mut self) {
        self.commit_edit();
    }

    /// Write the inline editor's buffer back to its target. There is no
    /// cancel path; an empty buffer is committed as is.
    fn commit_edit(&mut self) -> bool {
        let Some(TextEdit { target, text }) = self.state.editing.take() else {
            return false;
        };
        if operations::apply_text(&mut self.diagram, &target, text) {
            debug!(edit:? = target; "Inline edit committed");
            self.changed();
            true
        } else {
            warn!(edit:? = target; "Inline edit target no longer exists");
            self.redraw();
            false
        }
    }

    // ── Commands ───────────────────────────────────────────────────────────

    /// Delete the selected node (with its relationships) or relationship.
    pub fn delete_selection(&mut self) -> bool {
        self.commit_edit();
        let removed = match self.state.selection {
            Selection::None => false,
            Selection::Node(key) => operations::delete_node(&mut self.diagram, &key).is_some(),
            Selection::Line(line) => {
                operations::delete_relationship(&mut self.diagram, line).is_some()
            }
        };
        self.state.selection.clear();
        self.state.drag = DragMode::None;
        if removed {
            self.changed();
        }
        removed
    }

    fn selected_node(&self) -> Result<NodeKey, EditorError> {
        self.state.selection.node().ok_or(EditorError::NoNodeSelected)
    }

    /// Add an attribute to the selected class. `modifier` is a visibility
    /// label such as `"private"`; `None` means no modifier was chosen.
    pub fn add_attribute(&mut self, modifier: Option<&str>, name: &str) -> Result<(), EditorError> {
        self.commit_edit();
        let visibility = modifier.map(Visibility::from_label);
        let result = self.selected_node().and_then(|key| {
            operations::add_attribute(&mut self.diagram, &key, visibility, name)
        });
        self.finish_command("Add attribute", result)
    }

    /// Add an operation to the selected class or interface.
    pub fn add_operation(&mut self, modifier: Option<&str>, name: &str) -> Result<(), EditorError> {
        self.commit_edit();
        let visibility = modifier.map(Visibility::from_label);
        let result = self.selected_node().and_then(|key| {
            operations::add_operation(&mut self.diagram, &key, visibility, name)
        });
        self.finish_command("Add operation", result)
    }

    fn finish_command(
        &mut self,
        title: &str,
        result: Result<(), EditorError>,
    ) -> Result<(), EditorError> {
        let result = self.surface(title, result);
        if result.is_ok() {
            self.changed();
        }
        result
    }

    /// Start an empty diagram, asking first if there are unsaved changes.
    pub fn new_diagram(&mut self) -> bool {
        self.commit_edit();
        if self.dirty && !self.dialogs.confirm("New diagram", "Discard unsaved changes?") {
            return false;
        }
        self.diagram = Diagram::new();
        self.reset_interaction();
        self.current_file = None;
        self.dirty = false;
        self.redraw();
        true
    }

    fn reset_interaction(&mut self) {
        self.state.selection.clear();
        self.state.drag = DragMode::None;
        self.state.editing = None;
    }

    // ── Files ──────────────────────────────────────────────────────────────

    pub fn save(&mut self, path: &Path) -> Result<(), EditorError> {
        self.commit_edit();
        let result = document::save_diagram(&self.diagram, path).map_err(EditorError::from);
        self.surface("Save", result)?;
        self.dirty = false;
        self.current_file = Some(path.to_path_buf());
        Ok(())
    }

    /// Replace the diagram with the one stored at `path`. On failure the
    /// current diagram and selection are untouched.
    pub fn load(&mut self, path: &Path) -> Result<(), EditorError> {
        self.commit_edit();
        let result = document::load_diagram(path).map_err(EditorError::from);
        let diagram = self.surface("Open", result)?;
        self.diagram = diagram;
        self.reset_interaction();
        self.dirty = false;
        self.current_file = Some(path.to_path_buf());
        self.redraw();
        Ok(())
    }

    /// Ask for a path and save there. `Ok(false)` means the user cancelled.
    pub fn save_with(&mut self, chooser: &mut dyn FileChooser) -> Result<bool, EditorError> {
        let suggested = self
            .current_file
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("diagram.uml")
            .to_string();
        match chooser.save_path("Save diagram", &suggested) {
            Some(path) => self.save(&path).map(|()| true),
            None => Ok(false),
        }
    }

    /// Ask for a file and load it. `Ok(false)` means the user cancelled.
    pub fn open_with(&mut self, chooser: &mut dyn FileChooser) -> Result<bool, EditorError> {
        if self.dirty && !self.dialogs.confirm("Open diagram", "Discard unsaved changes?") {
            return Ok(false);
        }
        match chooser.open_path("Open diagram") {
            Some(path) => self.load(&path).map(|()| true),
            None => Ok(false),
        }
    }

    // ── Export ─────────────────────────────────────────────────────────────

    /// Snapshot of the whole canvas without selection or gesture feedback.
    pub fn snapshot(&self) -> Scene {
        build_scene(&self.diagram, &InteractionState::default(), &self.config)
    }

    /// Export the canvas as an image; the format follows the file extension.
    pub fn export_image(&mut self, path: &Path) -> Result<(), EditorError> {
        self.commit_edit();
        let result = export::export_image(&self.snapshot(), path).map_err(EditorError::from);
        self.surface("Export image", result)
    }

    /// Generate one source file per node into `dir`.
    ///
    /// Nodes that fail are listed in a single error message; the rest are
    /// still written.
    pub fn export_sources(&mut self, dir: &Path) -> SourceExport {
        self.commit_edit();
        let report =
            generator::export_sources(&self.diagram, dir, &self.config.source_extension);
        if report.is_complete() {
            self.dialogs.info(
                "Export sources",
                &format!("Wrote {} file(s) to {}", report.written.len(), dir.display()),
            );
        } else {
            let details = report
                .failed
                .iter()
                .map(|(name, err)| format!("{:?}: {}", name, err))
                .collect::<Vec<_>>()
                .join("\n");
            let summary = ExportError::Partial {
                failed: report.failed.len(),
                total: report.failed.len() + report.written.len(),
            };
            warn!(error:% = summary; "Source export incomplete");
            self.dialogs
                .error("Export sources", &format!("{}:\n{}", summary, details));
        }
        report
    }

    /// Ask for a directory and export sources into it.
    pub fn export_sources_with(&mut self, chooser: &mut dyn FileChooser) -> Option<SourceExport> {
        let dir = chooser.choose_directory("Export sources")?;
        Some(self.export_sources(&dir))
    }
}
