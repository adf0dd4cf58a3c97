use std::collections::HashMap;

use ab_glyph::{Font, FontArc, OutlineCurve, PxScale, ScaleFont};
use egui::{Vec2, vec2};
use log::{error, info};
use tiny_skia::{Path, PathBuilder};

use crate::error::{RenderError, RenderResult};
use crate::scene::TextObject;

/// Line advance as a multiple of the font size
pub const LINE_HEIGHT: f32 = 1.16;

/// Advance used for measurement when no face could be loaded
const FALLBACK_ADVANCE_EM: f32 = 0.6;

/// Font faces keyed by family name, with a bundled face for everything else.
#[derive(Clone)]
pub struct FontBook {
    faces: HashMap<String, FontArc>,
    fallback: Option<FontArc>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.faces.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl Default for FontBook {
    fn default() -> Self {
        let fallback = match FontArc::try_from_slice(epaint_default_fonts::UBUNTU_LIGHT) {
            Ok(face) => Some(face),
            Err(err) => {
                error!("Bundled font failed to load: {err}");
                None
            }
        };
        Self {
            faces: HashMap::new(),
            fallback,
        }
    }
}

impl FontBook {
    /// Register a TrueType/OpenType face for `family`.
    pub fn register(&mut self, family: impl Into<String>, data: Vec<u8>) -> RenderResult<()> {
        let family = family.into();
        let face = FontArc::try_from_vec(data).map_err(|err| RenderError::Font(format!("{family}: {err}")))?;
        info!("Registered font family {family}");
        self.faces.insert(family, face);
        Ok(())
    }

    pub fn has_family(&self, family: &str) -> bool {
        self.faces.contains_key(family)
    }

    pub fn face(&self, family: &str) -> Option<&FontArc> {
        self.faces.get(family).or(self.fallback.as_ref())
    }

    /// Size of the laid-out text box in scene units.
    pub fn measure(&self, text: &str, family: &str, font_size: f32) -> Vec2 {
        let lines = text.split('\n');
        let line_count = text.split('\n').count() as f32;
        let height = line_count * font_size * LINE_HEIGHT;

        let width = match self.face(family) {
            Some(face) => {
                let scaled = face.as_scaled(px_scale(face, font_size));
                lines
                    .map(|line| line_advance(&scaled, line))
                    .fold(0.0, f32::max)
            }
            None => lines
                .map(|line| line.chars().count() as f32 * font_size * FALLBACK_ADVANCE_EM)
                .fold(0.0, f32::max),
        };
        vec2(width, height)
    }

    /// Glyph outlines of a text object in scene units, ready to be filled.
    pub fn text_path(&self, text: &TextObject) -> Option<Path> {
        let face = self.face(text.font_family())?;
        let scaled = face.as_scaled(px_scale(face, text.font_size()));
        let (h_scale, v_scale) = (scaled.h_scale_factor(), scaled.v_scale_factor());
        let line_height = text.font_size() * LINE_HEIGHT;
        let origin = text.position();

        let mut builder = PathBuilder::new();
        for (row, line) in text.text().split('\n').enumerate() {
            let baseline = origin.y + row as f32 * line_height + scaled.ascent();
            let mut caret = origin.x;
            let mut previous = None;

            for ch in line.chars() {
                let id = scaled.glyph_id(ch);
                if let Some(prev) = previous {
                    caret += scaled.kern(prev, id);
                }
                previous = Some(id);

                if let Some(outline) = face.outline(id) {
                    let map = |p: ab_glyph::Point| (caret + p.x * h_scale, baseline - p.y * v_scale);
                    let mut pen: Option<(f32, f32)> = None;
                    for curve in &outline.curves {
                        let (start, end) = match *curve {
                            OutlineCurve::Line(a, b) => (map(a), map(b)),
                            OutlineCurve::Quad(a, _, c) => (map(a), map(c)),
                            OutlineCurve::Cubic(a, _, _, d) => (map(a), map(d)),
                        };
                        if pen != Some(start) {
                            if pen.is_some() {
                                builder.close();
                            }
                            builder.move_to(start.0, start.1);
                        }
                        match *curve {
                            OutlineCurve::Line(_, _) => builder.line_to(end.0, end.1),
                            OutlineCurve::Quad(_, b, _) => {
                                let b = map(b);
                                builder.quad_to(b.0, b.1, end.0, end.1);
                            }
                            OutlineCurve::Cubic(_, b, c, _) => {
                                let (b, c) = (map(b), map(c));
                                builder.cubic_to(b.0, b.1, c.0, c.1, end.0, end.1);
                            }
                        }
                        pen = Some(end);
                    }
                    if pen.is_some() {
                        builder.close();
                    }
                }
                caret += scaled.h_advance(id);
            }
        }
        builder.finish()
    }
}

// Font sizes are em sizes; ab_glyph scales by ascent-to-descent height.
fn px_scale(face: &FontArc, font_size: f32) -> PxScale {
    let units_per_em = face.units_per_em().unwrap_or(1000.0);
    PxScale::from(font_size * face.height_unscaled() / units_per_em)
}

fn line_advance<F: Font, SF: ScaleFont<F>>(scaled: &SF, line: &str) -> f32 {
    let mut width = 0.0;
    let mut previous = None;
    for ch in line.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        previous = Some(id);
    }
    width
}
