use std::ops::Range;

use egui::{Color32, Pos2, Rect, Vec2, pos2, vec2};
use serde::{Deserialize, Serialize};

use super::{Element, Interactivity, ObjectId, common};
use crate::error::{SceneError, SceneResult};
use crate::id_generator::generate_id;
use crate::raster::FontBook;

/// Editable text box anchored at its top-left corner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextObject {
    #[serde(skip, default = "generate_id")]
    id: ObjectId,
    left: f32,
    top: f32,
    text: String,
    font_family: String,
    font_size: f32,
    #[serde(with = "super::color::hex")]
    fill: Color32,
    /// Measured box, kept in the scene so readers without fonts can hit-test
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(skip)]
    interactivity: Interactivity,
}

impl PartialEq for TextObject {
    fn eq(&self, other: &Self) -> bool {
        self.left == other.left
            && self.top == other.top
            && self.text == other.text
            && self.font_family == other.font_family
            && self.font_size == other.font_size
            && self.fill == other.fill
    }
}

impl TextObject {
    pub fn new(
        position: Pos2,
        text: impl Into<String>,
        font_family: impl Into<String>,
        font_size: f32,
        fill: Color32,
        fonts: &FontBook,
    ) -> Self {
        let mut object = Self {
            id: generate_id(),
            left: position.x,
            top: position.y,
            text: text.into(),
            font_family: font_family.into(),
            font_size,
            fill,
            width: 0.0,
            height: 0.0,
            interactivity: Interactivity::default(),
        };
        object.measure(fonts);
        object
    }

    pub fn position(&self) -> Pos2 {
        pos2(self.left, self.top)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn fill(&self) -> Color32 {
        self.fill
    }

    /// Number of characters, which is the unit of edit ranges
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Replace the characters in `range` and re-measure the box.
    pub fn replace_chars(&mut self, range: Range<usize>, replacement: &str, fonts: &FontBook) {
        let start = byte_offset(&self.text, range.start);
        let end = byte_offset(&self.text, range.end.max(range.start));
        self.text.replace_range(start..end, replacement);
        self.measure(fonts);
    }

    pub fn measure(&mut self, fonts: &FontBook) {
        let size = fonts.measure(&self.text, &self.font_family, self.font_size);
        self.width = size.x;
        self.height = size.y;
    }
}

fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map_or(text.len(), |(offset, _)| offset)
}

impl Element for TextObject {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn element_type(&self) -> &'static str {
        "i-text"
    }

    fn rect(&self) -> Rect {
        Rect::from_min_size(self.position(), vec2(self.width, self.height))
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        self.rect().contains(pos)
    }

    fn translate(&mut self, delta: Vec2) {
        self.left += delta.x;
        self.top += delta.y;
    }

    fn interactivity(&self) -> Interactivity {
        self.interactivity
    }

    fn set_interactive(&mut self, interactive: bool) {
        self.interactivity = Interactivity::both(interactive);
    }

    fn validate(&self) -> SceneResult<()> {
        if !common::is_finite(self.position()) {
            return Err(SceneError::Invalid("text position is not finite".into()));
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(SceneError::Invalid(format!(
                "text font size {} is not positive",
                self.font_size
            )));
        }
        Ok(())
    }
}
