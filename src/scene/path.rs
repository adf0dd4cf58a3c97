use egui::{Color32, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use super::{Element, Interactivity, ObjectId, common};
use crate::error::{SceneError, SceneResult};
use crate::id_generator::generate_id;

/// Freehand stroke captured by the pencil or eraser brush.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathObject {
    #[serde(skip, default = "generate_id")]
    id: ObjectId,
    points: Vec<Pos2>,
    #[serde(with = "super::color::hex")]
    stroke: Color32,
    stroke_width: f32,
    #[serde(skip)]
    interactivity: Interactivity,
}

// Ids and interactivity are runtime state; two paths are the same drawing if
// their geometry and style match.
impl PartialEq for PathObject {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
            && self.stroke == other.stroke
            && self.stroke_width == other.stroke_width
    }
}

impl PathObject {
    pub fn new(points: Vec<Pos2>, stroke_width: f32, stroke: Color32) -> Self {
        Self {
            id: generate_id(),
            points,
            stroke,
            stroke_width,
            interactivity: Interactivity::default(),
        }
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn stroke(&self) -> Color32 {
        self.stroke
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }
}

impl Element for PathObject {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn element_type(&self) -> &'static str {
        "path"
    }

    fn rect(&self) -> Rect {
        common::calculate_bounds(&self.points, self.stroke_width / 2.0)
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        let reach = self.stroke_width / 2.0 + common::STROKE_HIT_PADDING;
        match self.points.as_slice() {
            [] => false,
            [only] => only.distance(pos) <= reach,
            points => points
                .windows(2)
                .any(|w| common::distance_to_line_segment(pos, w[0], w[1]) <= reach),
        }
    }

    fn translate(&mut self, delta: Vec2) {
        for point in &mut self.points {
            *point += delta;
        }
    }

    fn interactivity(&self) -> Interactivity {
        self.interactivity
    }

    fn set_interactive(&mut self, interactive: bool) {
        self.interactivity = Interactivity::both(interactive);
    }

    fn validate(&self) -> SceneResult<()> {
        if self.points.is_empty() {
            return Err(SceneError::Invalid("path without points".into()));
        }
        if !self.stroke_width.is_finite() || self.stroke_width <= 0.0 {
            return Err(SceneError::Invalid(format!(
                "path stroke width {} is not positive",
                self.stroke_width
            )));
        }
        if !self.points.iter().copied().all(common::is_finite) {
            return Err(SceneError::Invalid("path point is not finite".into()));
        }
        Ok(())
    }
}

/// In-progress stroke while the pointer is held down.
#[derive(Debug, Clone)]
pub struct StrokeBuilder {
    points: Vec<Pos2>,
    color: Color32,
    width: f32,
}

impl StrokeBuilder {
    pub fn new(color: Color32, width: f32) -> Self {
        Self {
            points: Vec::new(),
            color,
            width,
        }
    }

    /// Consecutive duplicates are dropped.
    pub fn add_point(&mut self, point: Pos2) {
        if self.points.last() != Some(&point) {
            self.points.push(point);
        }
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn finish(self) -> Option<PathObject> {
        if self.points.is_empty() {
            None
        } else {
            Some(PathObject::new(self.points, self.width, self.color))
        }
    }
}
