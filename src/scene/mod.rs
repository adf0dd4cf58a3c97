//! Scene graph of one panel: freehand paths and text boxes on a white sheet.
//!
//! A scene serializes to a stable JSON document:
//!
//! ```json
//! {
//!   "version": "1",
//!   "width": 450.0,
//!   "height": 600.0,
//!   "background": "#ffffff",
//!   "objects": [
//!     { "type": "path", "points": [{ "x": 1.0, "y": 2.0 }], "stroke": "#000000", "strokeWidth": 5.0 },
//!     { "type": "i-text", "left": 10.0, "top": 20.0, "text": "hi", "fontFamily": "Inter",
//!       "fontSize": 24.0, "fill": "#000000", "width": 19.0, "height": 27.8 }
//!   ]
//! }
//! ```
//!
//! Object ids and selectability are runtime state and never serialized.

use egui::{Color32, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

pub mod color;
mod common;
mod path;
mod text;

pub use path::{PathObject, StrokeBuilder};
pub use text::TextObject;

use crate::error::{SceneError, SceneResult};

pub const SCENE_VERSION: &str = "1";

/// Runtime identifier of a scene object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

/// Whether an object can be selected and receives pointer events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interactivity {
    pub selectable: bool,
    pub evented: bool,
}

impl Interactivity {
    pub fn both(on: bool) -> Self {
        Self {
            selectable: on,
            evented: on,
        }
    }

    pub fn is_interactive(self) -> bool {
        self.selectable && self.evented
    }
}

impl Default for Interactivity {
    fn default() -> Self {
        Self::both(true)
    }
}

/// Common trait that all scene objects implement
pub trait Element {
    /// Get the runtime identifier for this object
    fn id(&self) -> ObjectId;

    /// Serialized type tag
    fn element_type(&self) -> &'static str;

    /// Bounding rectangle in scene units
    fn rect(&self) -> Rect;

    /// Test if the object covers the given position
    fn hit_test(&self, pos: Pos2) -> bool;

    fn translate(&mut self, delta: Vec2);

    fn interactivity(&self) -> Interactivity;

    fn set_interactive(&mut self, interactive: bool);

    /// Reject geometry the rasterizer cannot draw
    fn validate(&self) -> SceneResult<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SceneObject {
    #[serde(rename = "path")]
    Path(PathObject),
    #[serde(rename = "i-text")]
    Text(TextObject),
}

impl SceneObject {
    pub fn is_text(&self) -> bool {
        matches!(self, SceneObject::Text(_))
    }

    pub fn as_text(&self) -> Option<&TextObject> {
        match self {
            SceneObject::Text(text) => Some(text),
            SceneObject::Path(_) => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextObject> {
        match self {
            SceneObject::Text(text) => Some(text),
            SceneObject::Path(_) => None,
        }
    }
}

impl Element for SceneObject {
    fn id(&self) -> ObjectId {
        match self {
            SceneObject::Path(p) => p.id(),
            SceneObject::Text(t) => t.id(),
        }
    }

    fn element_type(&self) -> &'static str {
        match self {
            SceneObject::Path(p) => p.element_type(),
            SceneObject::Text(t) => t.element_type(),
        }
    }

    fn rect(&self) -> Rect {
        match self {
            SceneObject::Path(p) => p.rect(),
            SceneObject::Text(t) => t.rect(),
        }
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        match self {
            SceneObject::Path(p) => p.hit_test(pos),
            SceneObject::Text(t) => t.hit_test(pos),
        }
    }

    fn translate(&mut self, delta: Vec2) {
        match self {
            SceneObject::Path(p) => p.translate(delta),
            SceneObject::Text(t) => t.translate(delta),
        }
    }

    fn interactivity(&self) -> Interactivity {
        match self {
            SceneObject::Path(p) => p.interactivity(),
            SceneObject::Text(t) => t.interactivity(),
        }
    }

    fn set_interactive(&mut self, interactive: bool) {
        match self {
            SceneObject::Path(p) => p.set_interactive(interactive),
            SceneObject::Text(t) => t.set_interactive(interactive),
        }
    }

    fn validate(&self) -> SceneResult<()> {
        match self {
            SceneObject::Path(p) => p.validate(),
            SceneObject::Text(t) => t.validate(),
        }
    }
}

impl From<PathObject> for SceneObject {
    fn from(path: PathObject) -> Self {
        SceneObject::Path(path)
    }
}

impl From<TextObject> for SceneObject {
    fn from(text: TextObject) -> Self {
        SceneObject::Text(text)
    }
}

fn default_version() -> String {
    SCENE_VERSION.to_owned()
}

/// Full content of one panel's drawing surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default = "default_version")]
    pub version: String,
    pub width: f32,
    pub height: f32,
    #[serde(with = "color::hex")]
    pub background: Color32,
    #[serde(default)]
    pub objects: Vec<SceneObject>,
}

impl Scene {
    /// Empty white sheet of the given size
    pub fn blank(size: Vec2) -> Self {
        Self {
            version: default_version(),
            width: size.x,
            height: size.y,
            background: color::WHITE,
            objects: Vec::new(),
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn from_json(json: &str) -> SceneResult<Self> {
        let scene: Scene = serde_json::from_str(json)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn to_json(&self) -> SceneResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> SceneResult<()> {
        let valid_extent = |v: f32| v.is_finite() && v > 0.0;
        if !valid_extent(self.width) || !valid_extent(self.height) {
            return Err(SceneError::Invalid(format!(
                "surface size {}x{} is not positive",
                self.width, self.height
            )));
        }
        self.objects.iter().try_for_each(Element::validate)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    pub fn add(&mut self, object: impl Into<SceneObject>) -> ObjectId {
        let object = object.into();
        let id = object.id();
        self.objects.push(object);
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.objects.iter().position(|o| o.id() == id)?;
        Some(self.objects.remove(index))
    }

    /// Topmost object under `pos` that currently receives pointer events
    pub fn find_target(&self, pos: Pos2) -> Option<&SceneObject> {
        self.objects
            .iter()
            .rev()
            .find(|o| o.interactivity().evented && o.hit_test(pos))
    }

    /// Remove every object and restore the white background.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.background = color::WHITE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::FontBook;
    use egui::{pos2, vec2};

    fn sample_scene() -> Scene {
        let fonts = FontBook::default();
        let mut scene = Scene::blank(vec2(450.0, 600.0));
        scene.add(PathObject::new(
            vec![pos2(10.0, 10.0), pos2(50.0, 80.0), pos2(90.0, 20.0)],
            5.0,
            Color32::from_rgb(0xef, 0x44, 0x44),
        ));
        scene.add(TextObject::new(
            pos2(100.0, 200.0),
            "hello",
            "Caveat",
            32.0,
            Color32::BLACK,
            &fonts,
        ));
        scene
    }

    #[test]
    fn test_round_trip_is_lossless() {
        let scene = sample_scene();
        let json = scene.to_json().unwrap();
        let restored = Scene::from_json(&json).unwrap();
        assert_eq!(restored, scene);
        // Serializing again yields the same document
        assert_eq!(restored.to_json().unwrap(), json);
    }

    #[test]
    fn test_loaded_objects_get_fresh_ids() {
        let scene = sample_scene();
        let restored = Scene::from_json(&scene.to_json().unwrap()).unwrap();
        let ids: Vec<_> = restored.objects.iter().map(Element::id).collect();
        assert_ne!(ids[0], ids[1]);
        assert!(restored.objects.iter().all(|o| o.interactivity().is_interactive()));
    }

    #[test]
    fn test_serialized_shape() {
        let value: serde_json::Value =
            serde_json::from_str(&sample_scene().to_json().unwrap()).unwrap();
        assert_eq!(value["background"], "#ffffff");
        assert_eq!(value["objects"][0]["type"], "path");
        assert_eq!(value["objects"][0]["stroke"], "#ef4444");
        assert_eq!(value["objects"][1]["type"], "i-text");
        assert_eq!(value["objects"][1]["fontFamily"], "Caveat");
        assert!(value["objects"][1].get("selectable").is_none());
    }

    #[test]
    fn test_rejects_garbage_and_bad_geometry() {
        assert!(matches!(Scene::from_json("not json"), Err(SceneError::Parse(_))));
        assert!(matches!(
            Scene::from_json(r##"{"width":0,"height":600,"background":"#ffffff"}"##),
            Err(SceneError::Invalid(_))
        ));
        assert!(Scene::from_json(
            r##"{"width":450,"height":600,"background":"#ffffff","objects":[{"type":"path","points":[],"stroke":"#000000","strokeWidth":5}]}"##
        )
        .is_err());
        assert!(Scene::from_json(r##"{"width":450,"height":600,"background":"blue"}"##).is_err());
    }

    #[test]
    fn test_find_target_skips_non_evented() {
        let mut scene = sample_scene();
        let hit = pos2(50.0, 80.0);
        assert!(scene.find_target(hit).is_some());
        for object in &mut scene.objects {
            if !object.is_text() {
                object.set_interactive(false);
            }
        }
        assert!(scene.find_target(hit).is_none());
    }

    #[test]
    fn test_clear_restores_white() {
        let mut scene = sample_scene();
        scene.background = Color32::BLACK;
        scene.clear();
        assert!(scene.is_empty());
        assert_eq!(scene.background, Color32::WHITE);
    }
}
