//! Software rasterization of scenes.
//!
//! Scenes are re-rendered from their vector form at whatever pixel size the
//! caller asks for, so a 450x600 editing surface can be printed at 300 DPI
//! without upscaling a bitmap.

mod fonts;

pub use fonts::{FontBook, LINE_HEIGHT};

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use egui::{Color32, Pos2};
use image::{ImageFormat, RgbaImage};
use log::debug;
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use crate::error::{RenderError, RenderResult};
use crate::scene::{PathObject, Scene, SceneObject};

pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Clone, Default)]
pub struct Rasterizer {
    fonts: FontBook,
}

impl Rasterizer {
    pub fn new(fonts: FontBook) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    /// Render `scene` into a `width` x `height` pixmap, scaling the scene
    /// uniformly so it fits.
    pub fn render(&self, scene: &Scene, width: u32, height: u32) -> RenderResult<Pixmap> {
        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Allocation { width, height })?;
        pixmap.fill(skia_color(scene.background));

        let scale = (width as f32 / scene.width).min(height as f32 / scene.height);
        let transform = Transform::from_scale(scale, scale);
        debug!(
            "Rendering {} objects at {width}x{height} (scale {scale:.3})",
            scene.objects.len()
        );

        for object in &scene.objects {
            match object {
                SceneObject::Path(path) => self.draw_path(&mut pixmap, path, transform),
                SceneObject::Text(text) => {
                    if let Some(outline) = self.fonts.text_path(text) {
                        let paint = solid_paint(text.fill());
                        pixmap.fill_path(&outline, &paint, FillRule::Winding, transform, None);
                    }
                }
            }
        }
        Ok(pixmap)
    }

    /// Render at `multiplier` times the scene's own size.
    pub fn render_scaled(&self, scene: &Scene, multiplier: f32) -> RenderResult<Pixmap> {
        let width = (scene.width * multiplier).round().max(1.0) as u32;
        let height = (scene.height * multiplier).round().max(1.0) as u32;
        self.render(scene, width, height)
    }

    fn draw_path(&self, pixmap: &mut Pixmap, path: &PathObject, transform: Transform) {
        let paint = solid_paint(path.stroke());
        let points = path.points();

        if let [only] = points {
            if let Some(dot) = PathBuilder::from_circle(only.x, only.y, path.stroke_width() / 2.0) {
                pixmap.fill_path(&dot, &paint, FillRule::Winding, transform, None);
            }
            return;
        }

        let Some(outline) = smooth_polyline(points) else {
            return;
        };
        let stroke = Stroke {
            width: path.stroke_width(),
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        pixmap.stroke_path(&outline, &paint, &stroke, transform, None);
    }
}

// Quadratic segments through the midpoints of consecutive samples, the way
// freehand brushes smooth pointer input.
fn smooth_polyline(points: &[Pos2]) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut builder = PathBuilder::new();
    builder.move_to(first.x, first.y);

    let mut control = *first;
    for point in rest {
        let mid = control + (*point - control) / 2.0;
        builder.quad_to(control.x, control.y, mid.x, mid.y);
        control = *point;
    }
    builder.line_to(control.x, control.y);
    builder.finish()
}

fn skia_color(color: Color32) -> tiny_skia::Color {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    tiny_skia::Color::from_rgba8(r, g, b, a)
}

fn solid_paint(color: Color32) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(skia_color(color));
    paint.anti_alias = true;
    paint
}

/// Straight-alpha RGBA copy of a pixmap.
pub fn to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let data = pixmap
        .pixels()
        .iter()
        .flat_map(|pixel| {
            let c = pixel.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    // The buffer length always matches the pixmap dimensions
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
        .unwrap_or_else(|| RgbaImage::new(pixmap.width(), pixmap.height()))
}

pub fn encode_png(image: &RgbaImage) -> RenderResult<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

pub fn png_data_url(image: &RgbaImage) -> RenderResult<String> {
    let png = encode_png(image)?;
    Ok(format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(png)))
}

/// Rotate 180 degrees about the image center.
pub fn rotate_180(image: &RgbaImage) -> RgbaImage {
    image::imageops::rotate180(image)
}
