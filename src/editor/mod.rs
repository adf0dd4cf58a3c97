//! Panel canvas editor.
//!
//! One editor owns the scene of one panel for the duration of an editing
//! session. The host feeds it pointer and key input, drives the autosave
//! debounce through [`PanelEditor::tick`], and hands it a [`PanelSink`]
//! (normally the [`ZineStore`](crate::store::ZineStore)) to receive
//! serialized scenes and thumbnails.
//!
//! Selectability is re-derived from the active tool whenever the tool
//! changes, an object is added or a scene is loaded: text objects are always
//! interactive, everything else only while the tool is not text.

mod debounce;
mod state;
mod tool;

pub use debounce::Debouncer;
pub use state::EditorLifecycle;
pub use tool::{
    BRUSH_WIDTH_RANGE, Brush, COLOR_PALETTE, DEFAULT_BRUSH_WIDTH, DEFAULT_ERASER_WIDTH,
    DEFAULT_FONT_SIZE, FONT_SIZE_RANGE, FONT_SIZE_STEP, FontFamily, Tool, ToolSettings,
};

use std::ops::Range;

use egui::{Pos2, Vec2};
use log::{debug, info, warn};
use thiserror::Error;

use crate::config::EditorConfig;
use crate::error::{RenderError, SceneError};
use crate::raster::{self, Rasterizer};
use crate::scene::{Element, ObjectId, Scene, SceneObject, StrokeBuilder, TextObject, color};
use crate::util::time::{Clock, SystemClock};
use crate::zine::PanelPosition;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Editor for panel {0} is not initialized")]
    NotReady(PanelPosition),

    #[error("Editor for panel {0} has been disposed")]
    Disposed(PanelPosition),

    #[error("Invalid lifecycle transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: EditorLifecycle,
        to: EditorLifecycle,
    },

    #[error("Object {0:?} does not exist")]
    UnknownObject(ObjectId),

    #[error("Object {0:?} is not interactive with the current tool")]
    NotInteractive(ObjectId),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

pub type EditorResult<T> = Result<T, EditorError>;

/// Receiver of editor output.
pub trait PanelSink {
    /// Debounced or forced save of the scene alone
    fn autosave(&mut self, position: PanelPosition, scene_json: String);

    /// Explicit save that also refreshes the grid thumbnail
    fn commit(&mut self, position: PanelPosition, scene_json: String, thumbnail: String);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Backspace,
    Delete,
    Enter,
    Escape,
}

/// In-place editing of one text object; the selection is in characters.
#[derive(Debug, Clone, PartialEq)]
struct TextEditing {
    object: ObjectId,
    selection: Range<usize>,
}

pub struct PanelEditor {
    position: PanelPosition,
    config: EditorConfig,
    rasterizer: Rasterizer,
    clock: Box<dyn Clock>,
    lifecycle: EditorLifecycle,
    scene: Scene,
    settings: ToolSettings,
    stroke: Option<StrokeBuilder>,
    active: Option<ObjectId>,
    editing: Option<TextEditing>,
    autosave: Debouncer,
}

impl std::fmt::Debug for PanelEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelEditor")
            .field("position", &self.position)
            .field("lifecycle", &self.lifecycle)
            .field("objects", &self.scene.objects.len())
            .field("tool", &self.settings.tool())
            .field("active", &self.active)
            .field("editing", &self.editing)
            .field("autosave_pending", &self.autosave.is_pending())
            .finish()
    }
}

impl PanelEditor {
    pub fn new(position: PanelPosition, config: &EditorConfig) -> Self {
        Self {
            position,
            config: config.clone(),
            rasterizer: Rasterizer::default(),
            clock: Box::new(SystemClock),
            lifecycle: EditorLifecycle::Uninitialized,
            scene: Scene::blank(config.surface_size()),
            settings: ToolSettings::default(),
            stroke: None,
            active: None,
            editing: None,
            autosave: Debouncer::new(config.autosave_delay()),
        }
    }

    pub fn with_rasterizer(mut self, rasterizer: Rasterizer) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Load the panel's stored scene, if any, and become ready.
    ///
    /// A scene that fails to parse is logged and replaced by a blank sheet.
    pub async fn initialize(&mut self, scene_json: Option<&str>) -> EditorResult<()> {
        self.check_transition(EditorLifecycle::Ready)?;

        let mut scene = match scene_json {
            Some(json) => {
                let parsed = futures::future::lazy(|_| Scene::from_json(json)).await;
                parsed.unwrap_or_else(|err| {
                    warn!("Panel {}: discarding unreadable scene: {err}", self.position);
                    Scene::blank(self.config.surface_size())
                })
            }
            None => Scene::blank(self.config.surface_size()),
        };
        scene.background = color::WHITE;
        // Stored boxes may be missing or measured with other fonts
        for text in scene.objects.iter_mut().filter_map(SceneObject::as_text_mut) {
            text.measure(self.rasterizer.fonts());
        }
        self.scene = scene;
        self.apply_selectability();

        self.lifecycle = EditorLifecycle::Ready;
        info!(
            "Panel {} editor ready with {} objects",
            self.position,
            self.scene.objects.len()
        );
        Ok(())
    }

    pub fn position(&self) -> PanelPosition {
        self.position
    }

    pub fn lifecycle(&self) -> EditorLifecycle {
        self.lifecycle
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    /// Brush widths, color and font. The tool itself changes through
    /// [`PanelEditor::set_tool`].
    pub fn settings_mut(&mut self) -> &mut ToolSettings {
        &mut self.settings
    }

    pub fn tool(&self) -> Tool {
        self.settings.tool()
    }

    /// Stroke parameters of the active tool, `None` while in text mode
    pub fn brush(&self) -> Option<Brush> {
        self.settings.brush()
    }

    pub fn active_object(&self) -> Option<ObjectId> {
        self.active
    }

    pub fn is_editing_text(&self) -> bool {
        self.editing.is_some()
    }

    pub fn text_selection(&self) -> Option<Range<usize>> {
        self.editing.as_ref().map(|e| e.selection.clone())
    }

    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    pub fn set_tool(&mut self, tool: Tool) -> EditorResult<()> {
        self.ensure_ready()?;
        if tool == self.settings.tool() {
            return Ok(());
        }
        self.finish_stroke();

        if tool == Tool::Text {
            if self.active.is_some_and(|id| !self.is_text(id)) {
                self.active = None;
            }
        } else {
            self.finish_editing();
            self.active = None;
        }

        debug!("Panel {}: tool {} -> {}", self.position, self.settings.tool(), tool);
        self.settings.set_tool(tool);
        self.apply_selectability();
        Ok(())
    }

    pub fn pointer_down(&mut self, pos: Pos2) -> EditorResult<()> {
        self.ensure_ready()?;
        match self.settings.brush() {
            Some(brush) => {
                self.finish_editing();
                self.active = None;
                let mut stroke = StrokeBuilder::new(brush.color, brush.width);
                stroke.add_point(pos);
                self.stroke = Some(stroke);
            }
            None => self.text_click(pos),
        }
        Ok(())
    }

    pub fn pointer_move(&mut self, pos: Pos2) -> EditorResult<()> {
        self.ensure_ready()?;
        if let Some(stroke) = &mut self.stroke {
            stroke.add_point(pos);
        }
        Ok(())
    }

    /// Ends a stroke, returning the id of the path it produced.
    pub fn pointer_up(&mut self, pos: Pos2) -> EditorResult<Option<ObjectId>> {
        self.ensure_ready()?;
        if let Some(stroke) = &mut self.stroke {
            stroke.add_point(pos);
        }
        Ok(self.finish_stroke())
    }

    fn text_click(&mut self, pos: Pos2) {
        let had_active_text = self.active.is_some_and(|id| self.is_text(id));
        let target = self
            .scene
            .find_target(pos)
            .filter(|o| o.is_text())
            .map(Element::id);

        match target {
            Some(id) if self.active == Some(id) => {
                if self.editing.is_none() {
                    let end = self.text_len(id);
                    self.editing = Some(TextEditing {
                        object: id,
                        selection: end..end,
                    });
                }
            }
            Some(id) => {
                self.finish_editing();
                self.active = Some(id);
            }
            None if had_active_text => {
                self.finish_editing();
                self.active = None;
            }
            None => self.insert_placeholder_text(pos),
        }
    }

    fn insert_placeholder_text(&mut self, pos: Pos2) {
        let text = TextObject::new(
            pos,
            self.config.text_placeholder.as_str(),
            self.settings.font_family().display_name(),
            self.settings.font_size(),
            self.settings.color(),
            self.rasterizer.fonts(),
        );
        let len = text.char_len();
        let id = self.add_object(text.into());
        self.active = Some(id);
        self.editing = Some(TextEditing {
            object: id,
            selection: 0..len,
        });
    }

    /// Type into the text being edited. Returns false when nothing is being edited.
    pub fn type_text(&mut self, input: &str) -> EditorResult<bool> {
        self.ensure_ready()?;
        Ok(self.replace_selection(input))
    }

    /// Returns whether the key was consumed.
    pub fn key_down(&mut self, key: Key) -> EditorResult<bool> {
        self.ensure_ready()?;
        if self.editing.is_some() {
            match key {
                Key::Backspace => self.delete_in_text(false),
                Key::Delete => self.delete_in_text(true),
                Key::Enter => {
                    self.replace_selection("\n");
                }
                Key::Escape => self.finish_editing(),
            }
            return Ok(true);
        }

        match key {
            Key::Backspace | Key::Delete if self.settings.tool() == Tool::Text => {
                let Some(id) = self.active.filter(|id| self.is_text(*id)) else {
                    return Ok(false);
                };
                self.scene.remove(id);
                self.active = None;
                debug!("Panel {}: removed text {id:?}", self.position);
                self.mark_dirty();
                Ok(true)
            }
            Key::Escape if self.active.is_some() => {
                self.active = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn select(&mut self, id: ObjectId) -> EditorResult<()> {
        self.ensure_ready()?;
        self.ensure_interactive(id)?;
        if self.editing.as_ref().is_some_and(|e| e.object != id) {
            self.finish_editing();
        }
        self.active = Some(id);
        Ok(())
    }

    pub fn deselect(&mut self) -> EditorResult<()> {
        self.ensure_ready()?;
        self.finish_editing();
        self.active = None;
        Ok(())
    }

    /// Drag an interactive object by `delta`.
    pub fn move_object(&mut self, id: ObjectId, delta: Vec2) -> EditorResult<()> {
        self.ensure_ready()?;
        self.ensure_interactive(id)?;
        if let Some(object) = self.scene.get_mut(id) {
            object.translate(delta);
        }
        self.mark_dirty();
        Ok(())
    }

    /// Remove every object and go back to a white sheet.
    pub fn clear(&mut self) -> EditorResult<()> {
        self.ensure_ready()?;
        self.stroke = None;
        self.editing = None;
        self.active = None;
        self.scene.clear();
        info!("Panel {} cleared", self.position);
        self.mark_dirty();
        Ok(())
    }

    pub fn serialize(&self) -> EditorResult<String> {
        self.ensure_ready()?;
        Ok(self.scene.to_json()?)
    }

    /// Small PNG data URL of the current surface for the grid view
    pub fn thumbnail(&self) -> EditorResult<String> {
        self.ensure_ready()?;
        let pixmap = self
            .rasterizer
            .render_scaled(&self.scene, self.config.thumbnail_scale)?;
        Ok(raster::png_data_url(&raster::to_rgba_image(&pixmap))?)
    }

    /// Save scene and thumbnail together.
    pub fn commit_to_grid<S: PanelSink + ?Sized>(&mut self, sink: &mut S) -> EditorResult<()> {
        self.ensure_ready()?;
        self.finish_stroke();
        let scene_json = self.serialize()?;
        let thumbnail = self.thumbnail()?;
        info!("Panel {} committed to grid", self.position);
        sink.commit(self.position, scene_json, thumbnail);
        Ok(())
    }

    /// Deliver the pending autosave once its quiet period is over.
    /// Returns whether a save was delivered.
    pub fn tick<S: PanelSink + ?Sized>(&mut self, sink: &mut S) -> EditorResult<bool> {
        if !self.lifecycle.is_ready() || !self.autosave.fire_if_due(self.clock.now()) {
            return Ok(false);
        }
        self.deliver_autosave(sink)?;
        Ok(true)
    }

    /// Flush a final autosave and release the surface.
    ///
    /// An editor that never became ready saves nothing, so the stored scene
    /// is left as it was.
    pub fn dispose<S: PanelSink + ?Sized>(&mut self, sink: &mut S) -> EditorResult<()> {
        self.check_transition(EditorLifecycle::Disposed)?;
        if self.lifecycle.is_ready() {
            self.finish_stroke();
            self.finish_editing();
            self.autosave.cancel();
            self.deliver_autosave(sink)?;
        }
        self.lifecycle = EditorLifecycle::Disposed;
        debug!("Panel {} editor disposed", self.position);
        Ok(())
    }

    fn deliver_autosave<S: PanelSink + ?Sized>(&mut self, sink: &mut S) -> EditorResult<()> {
        let scene_json = self.scene.to_json()?;
        debug!("Panel {}: autosave ({} bytes)", self.position, scene_json.len());
        sink.autosave(self.position, scene_json);
        Ok(())
    }

    fn finish_stroke(&mut self) -> Option<ObjectId> {
        let path = self.stroke.take()?.finish()?;
        Some(self.add_object(path.into()))
    }

    fn finish_editing(&mut self) {
        let Some(editing) = self.editing.take() else {
            return;
        };
        if self.text_len(editing.object) == 0 {
            self.scene.remove(editing.object);
            if self.active == Some(editing.object) {
                self.active = None;
            }
        }
        self.mark_dirty();
    }

    fn add_object(&mut self, mut object: SceneObject) -> ObjectId {
        object.set_interactive(self.is_interactive_with_tool(&object));
        let id = self.scene.add(object);
        self.mark_dirty();
        id
    }

    fn replace_selection(&mut self, replacement: &str) -> bool {
        let Some(editing) = self.editing.as_mut() else {
            return false;
        };
        let Some(text) = self
            .scene
            .get_mut(editing.object)
            .and_then(SceneObject::as_text_mut)
        else {
            return false;
        };
        let start = editing.selection.start;
        text.replace_chars(editing.selection.clone(), replacement, self.rasterizer.fonts());
        let caret = start + replacement.chars().count();
        editing.selection = caret..caret;
        true
    }

    fn delete_in_text(&mut self, forward: bool) {
        let Some(object) = self.editing.as_ref().map(|e| e.object) else {
            return;
        };
        let len = self.text_len(object);
        if let Some(editing) = self.editing.as_mut() {
            if editing.selection.is_empty() {
                let caret = editing.selection.start;
                editing.selection = if forward {
                    caret..(caret + 1).min(len)
                } else {
                    caret.saturating_sub(1)..caret
                };
            }
        }
        self.replace_selection("");
    }

    fn apply_selectability(&mut self) {
        let tool = self.settings.tool();
        for object in &mut self.scene.objects {
            object.set_interactive(object.is_text() || tool != Tool::Text);
        }
    }

    fn is_interactive_with_tool(&self, object: &SceneObject) -> bool {
        object.is_text() || self.settings.tool() != Tool::Text
    }

    fn is_text(&self, id: ObjectId) -> bool {
        self.scene.get(id).is_some_and(SceneObject::is_text)
    }

    fn text_len(&self, id: ObjectId) -> usize {
        self.scene
            .get(id)
            .and_then(SceneObject::as_text)
            .map_or(0, TextObject::char_len)
    }

    fn mark_dirty(&mut self) {
        self.autosave.schedule(self.clock.now());
    }

    fn ensure_interactive(&self, id: ObjectId) -> EditorResult<()> {
        let object = self.scene.get(id).ok_or(EditorError::UnknownObject(id))?;
        if object.interactivity().is_interactive() {
            Ok(())
        } else {
            Err(EditorError::NotInteractive(id))
        }
    }

    fn ensure_ready(&self) -> EditorResult<()> {
        match self.lifecycle {
            EditorLifecycle::Ready => Ok(()),
            EditorLifecycle::Uninitialized => Err(EditorError::NotReady(self.position)),
            EditorLifecycle::Disposed => Err(EditorError::Disposed(self.position)),
        }
    }

    fn check_transition(&self, to: EditorLifecycle) -> EditorResult<()> {
        if self.lifecycle.can_transition_to(to) {
            Ok(())
        } else {
            Err(EditorError::InvalidTransition {
                from: self.lifecycle,
                to,
            })
        }
    }
}

impl Drop for PanelEditor {
    fn drop(&mut self) {
        if self.lifecycle.is_ready() && self.autosave.is_pending() {
            warn!(
                "Panel {} editor dropped without dispose; pending autosave lost",
                self.position
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::time::ManualClock;
    use egui::{pos2, vec2};
    use futures::executor::block_on;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingSink {
        autosaves: Vec<(PanelPosition, String)>,
        commits: Vec<(PanelPosition, String, String)>,
    }

    impl PanelSink for RecordingSink {
        fn autosave(&mut self, position: PanelPosition, scene_json: String) {
            self.autosaves.push((position, scene_json));
        }

        fn commit(&mut self, position: PanelPosition, scene_json: String, thumbnail: String) {
            self.commits.push((position, scene_json, thumbnail));
        }
    }

    fn ready_editor() -> (PanelEditor, ManualClock) {
        let clock = ManualClock::new();
        let mut editor =
            PanelEditor::new(PanelPosition::One, &EditorConfig::default()).with_clock(clock.clone());
        block_on(editor.initialize(None)).unwrap();
        (editor, clock)
    }

    fn draw_line(editor: &mut PanelEditor, from: Pos2, to: Pos2) -> ObjectId {
        editor.pointer_down(from).unwrap();
        editor.pointer_move(from + (to - from) / 2.0).unwrap();
        editor.pointer_up(to).unwrap().unwrap()
    }

    #[test]
    fn test_operations_rejected_before_ready() {
        let mut editor = PanelEditor::new(PanelPosition::Two, &EditorConfig::default());
        assert!(matches!(editor.serialize(), Err(EditorError::NotReady(PanelPosition::Two))));
        assert!(matches!(editor.set_tool(Tool::Text), Err(EditorError::NotReady(_))));
        let mut sink = RecordingSink::default();
        assert!(!editor.tick(&mut sink).unwrap());
    }

    #[test]
    fn test_initialize_twice_fails() {
        let (mut editor, _) = ready_editor();
        assert!(matches!(
            block_on(editor.initialize(None)),
            Err(EditorError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_corrupt_scene_loads_blank() {
        let mut editor = PanelEditor::new(PanelPosition::Six, &EditorConfig::default());
        block_on(editor.initialize(Some("{broken"))).unwrap();
        assert_eq!(editor.lifecycle(), EditorLifecycle::Ready);
        assert!(editor.scene().is_empty());
        assert_eq!(editor.scene().background, egui::Color32::WHITE);
    }

    #[test]
    fn test_loaded_background_forced_white() {
        let json = r##"{"width":450,"height":600,"background":"#ff0000","objects":[]}"##;
        let mut editor = PanelEditor::new(PanelPosition::Six, &EditorConfig::default());
        block_on(editor.initialize(Some(json))).unwrap();
        assert_eq!(editor.scene().background, egui::Color32::WHITE);
    }

    #[test]
    fn test_stroke_uses_brush() {
        let (mut editor, _) = ready_editor();
        editor.settings_mut().set_color(COLOR_PALETTE[6]);
        editor.settings_mut().set_brush_width(12.0);
        let id = draw_line(&mut editor, pos2(10.0, 10.0), pos2(100.0, 100.0));
        let Some(SceneObject::Path(path)) = editor.scene().get(id) else {
            panic!("expected a path");
        };
        assert_eq!(path.stroke(), COLOR_PALETTE[6]);
        assert_eq!(path.stroke_width(), 12.0);
        assert_eq!(path.points().len(), 3);
    }

    #[test]
    fn test_eraser_paints_white_path() {
        let (mut editor, _) = ready_editor();
        draw_line(&mut editor, pos2(10.0, 10.0), pos2(100.0, 100.0));
        editor.set_tool(Tool::Eraser).unwrap();
        let id = draw_line(&mut editor, pos2(10.0, 100.0), pos2(100.0, 10.0));
        assert_eq!(editor.scene().objects.len(), 2);
        let Some(SceneObject::Path(path)) = editor.scene().get(id) else {
            panic!("expected a path");
        };
        assert_eq!(path.stroke(), egui::Color32::WHITE);
        assert_eq!(path.stroke_width(), DEFAULT_ERASER_WIDTH);
    }

    #[test]
    fn test_text_click_creates_placeholder() {
        let (mut editor, _) = ready_editor();
        editor.settings_mut().set_font_family(FontFamily::Caveat);
        editor.set_tool(Tool::Text).unwrap();
        editor.pointer_down(pos2(50.0, 60.0)).unwrap();
        editor.pointer_up(pos2(50.0, 60.0)).unwrap();

        let id = editor.active_object().unwrap();
        let text = editor.scene().get(id).and_then(SceneObject::as_text).unwrap();
        assert_eq!(text.text(), "Type here");
        assert_eq!(text.font_family(), "Caveat");
        assert_eq!(text.font_size(), DEFAULT_FONT_SIZE);
        assert_eq!(text.position(), pos2(50.0, 60.0));
        assert_eq!(editor.text_selection(), Some(0..9));

        // Typing overwrites the selected placeholder
        editor.type_text("Hi").unwrap();
        let text = editor.scene().get(id).and_then(SceneObject::as_text).unwrap();
        assert_eq!(text.text(), "Hi");
    }

    #[test]
    fn test_click_away_from_active_text_only_deselects() {
        let (mut editor, _) = ready_editor();
        editor.set_tool(Tool::Text).unwrap();
        editor.pointer_down(pos2(50.0, 60.0)).unwrap();
        assert_eq!(editor.scene().objects.len(), 1);

        editor.pointer_down(pos2(300.0, 400.0)).unwrap();
        assert_eq!(editor.scene().objects.len(), 1);
        assert!(editor.active_object().is_none());
        assert!(!editor.is_editing_text());

        // With nothing active the next click inserts again
        editor.pointer_down(pos2(300.0, 400.0)).unwrap();
        assert_eq!(editor.scene().objects.len(), 2);
    }

    #[test]
    fn test_click_on_text_selects_then_edits() {
        let (mut editor, _) = ready_editor();
        editor.set_tool(Tool::Text).unwrap();
        editor.pointer_down(pos2(50.0, 60.0)).unwrap();
        let id = editor.active_object().unwrap();
        editor.key_down(Key::Escape).unwrap();
        editor.deselect().unwrap();

        editor.pointer_down(pos2(55.0, 70.0)).unwrap();
        assert_eq!(editor.active_object(), Some(id));
        assert!(!editor.is_editing_text());
        editor.pointer_down(pos2(55.0, 70.0)).unwrap();
        assert!(editor.is_editing_text());
        assert_eq!(editor.scene().objects.len(), 1);
    }

    #[test]
    fn test_delete_key_respects_editing() {
        let (mut editor, _) = ready_editor();
        editor.set_tool(Tool::Text).unwrap();
        editor.pointer_down(pos2(50.0, 60.0)).unwrap();
        editor.type_text("abc").unwrap();

        // While editing, backspace eats a character, not the object
        assert!(editor.key_down(Key::Backspace).unwrap());
        let id = editor.active_object().unwrap();
        assert_eq!(
            editor.scene().get(id).and_then(SceneObject::as_text).unwrap().text(),
            "ab"
        );

        editor.key_down(Key::Escape).unwrap();
        assert_eq!(editor.active_object(), Some(id));
        assert!(editor.key_down(Key::Delete).unwrap());
        assert!(editor.scene().is_empty());
    }

    #[test]
    fn test_delete_key_ignored_outside_text_tool() {
        let (mut editor, _) = ready_editor();
        let id = draw_line(&mut editor, pos2(10.0, 10.0), pos2(100.0, 100.0));
        editor.select(id).unwrap();
        assert!(!editor.key_down(Key::Delete).unwrap());
        assert_eq!(editor.scene().objects.len(), 1);
    }

    #[test]
    fn test_text_tool_blocks_paths() {
        let (mut editor, _) = ready_editor();
        let path = draw_line(&mut editor, pos2(10.0, 10.0), pos2(100.0, 100.0));
        editor.select(path).unwrap();
        editor.set_tool(Tool::Text).unwrap();
        assert!(editor.active_object().is_none());
        assert!(matches!(
            editor.move_object(path, vec2(5.0, 5.0)),
            Err(EditorError::NotInteractive(_))
        ));
        editor.set_tool(Tool::Pencil).unwrap();
        editor.move_object(path, vec2(5.0, 5.0)).unwrap();
    }

    #[test]
    fn test_autosave_debounces() {
        let (mut editor, clock) = ready_editor();
        let mut sink = RecordingSink::default();
        draw_line(&mut editor, pos2(10.0, 10.0), pos2(100.0, 100.0));
        clock.advance(Duration::from_millis(200));
        draw_line(&mut editor, pos2(20.0, 10.0), pos2(100.0, 200.0));
        clock.advance(Duration::from_millis(200));
        assert!(!editor.tick(&mut sink).unwrap());
        clock.advance(Duration::from_millis(150));
        assert!(editor.tick(&mut sink).unwrap());
        assert!(!editor.tick(&mut sink).unwrap());

        assert_eq!(sink.autosaves.len(), 1);
        let saved = Scene::from_json(&sink.autosaves[0].1).unwrap();
        assert_eq!(saved.objects.len(), 2);
    }

    #[test]
    fn test_clear_goes_through_autosave() {
        let (mut editor, clock) = ready_editor();
        let mut sink = RecordingSink::default();
        draw_line(&mut editor, pos2(10.0, 10.0), pos2(100.0, 100.0));
        editor.clear().unwrap();
        let cleared = Scene::from_json(&editor.serialize().unwrap()).unwrap();
        assert!(cleared.is_empty());
        assert_eq!(cleared.background, egui::Color32::WHITE);

        clock.advance(Duration::from_millis(300));
        assert!(editor.tick(&mut sink).unwrap());
        assert!(Scene::from_json(&sink.autosaves[0].1).unwrap().is_empty());
    }

    #[test]
    fn test_dispose_flushes_pending_save() {
        let (mut editor, _) = ready_editor();
        let mut sink = RecordingSink::default();
        draw_line(&mut editor, pos2(10.0, 10.0), pos2(100.0, 100.0));
        editor.dispose(&mut sink).unwrap();
        assert_eq!(sink.autosaves.len(), 1);
        assert_eq!(editor.lifecycle(), EditorLifecycle::Disposed);
        assert!(matches!(editor.serialize(), Err(EditorError::Disposed(_))));
        assert!(editor.dispose(&mut sink).is_err());
    }

    #[test]
    fn test_dispose_before_ready_saves_nothing() {
        let mut editor = PanelEditor::new(PanelPosition::Back, &EditorConfig::default());
        let mut sink = RecordingSink::default();
        editor.dispose(&mut sink).unwrap();
        assert!(sink.autosaves.is_empty());
    }

    #[test]
    fn test_loaded_text_without_box_is_clickable() {
        let json = r##"{"width":450,"height":600,"background":"#ffffff","objects":[
            {"type":"i-text","left":50,"top":60,"text":"hello","fontFamily":"Inter","fontSize":24,"fill":"#000000"}
        ]}"##;
        let mut editor = PanelEditor::new(PanelPosition::One, &EditorConfig::default());
        block_on(editor.initialize(Some(json))).unwrap();

        let text = editor.scene().objects[0].as_text().unwrap();
        assert!(text.rect().width() > 0.0 && text.rect().height() > 0.0);

        editor.set_tool(Tool::Text).unwrap();
        editor.pointer_down(pos2(60.0, 70.0)).unwrap();
        assert_eq!(editor.scene().objects.len(), 1);
        assert_eq!(editor.active_object(), Some(editor.scene().objects[0].id()));
    }

    #[test]
    fn test_commit_sends_thumbnail() {
        let (mut editor, _) = ready_editor();
        let mut sink = RecordingSink::default();
        draw_line(&mut editor, pos2(10.0, 10.0), pos2(100.0, 100.0));
        editor.commit_to_grid(&mut sink).unwrap();
        let (position, scene, thumbnail) = &sink.commits[0];
        assert_eq!(*position, PanelPosition::One);
        assert_eq!(Scene::from_json(scene).unwrap().objects.len(), 1);
        assert!(thumbnail.starts_with(raster::PNG_DATA_URL_PREFIX));
        assert!(sink.autosaves.is_empty());
    }
}
