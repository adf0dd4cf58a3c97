//! Print composite.
//!
//! Every panel is re-rendered from its scene at the print resolution of one
//! grid cell, top-row panels are turned 180 degrees so they read upright once
//! the sheet is folded, and the result is laid out on a landscape page with
//! cut guides.

mod pdf;

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use log::{info, warn};

use crate::config::PrintConfig;
use crate::error::RenderResult;
use crate::layout::{PageGeometry, Row};
use crate::raster::{self, Rasterizer};
use crate::scene::Scene;
use crate::zine::{PanelPosition, PanelSet, Zine};

/// Scene size assumed for panels that have no usable scene
const BLANK_SCENE_WIDTH: f32 = 450.0;
const BLANK_SCENE_HEIGHT: f32 = 600.0;

/// One rasterized panel and where it sits on the page.
#[derive(Debug, Clone)]
pub struct RenderedPanel {
    pub position: PanelPosition,
    pub row: usize,
    pub col: usize,
    pub rotated: bool,
    /// The stored scene could not be read and a blank panel was used
    pub substituted: bool,
    pub image: RgbaImage,
}

/// Stroke settings of the cut guides, in inches.
#[derive(Debug, Clone, PartialEq)]
pub struct GuideStyle {
    pub gray: u8,
    pub width_in: f32,
    pub dash_in: [f32; 2],
}

impl From<&PrintConfig> for GuideStyle {
    fn from(config: &PrintConfig) -> Self {
        Self {
            gray: config.guide_gray,
            width_in: config.guide_width_in,
            dash_in: config.guide_dash_in,
        }
    }
}

/// All eight panels placed on the page, in placement order.
#[derive(Debug, Clone)]
pub struct Composite {
    pub geometry: PageGeometry,
    pub guides: GuideStyle,
    pub panels: Vec<RenderedPanel>,
    /// Download name used by [`Composite::save_pdf_in`]
    pub file_name: String,
}

impl Composite {
    pub fn panel(&self, position: PanelPosition) -> Option<&RenderedPanel> {
        self.panels.iter().find(|p| p.position == position)
    }

    pub fn panel_at(&self, row: usize, col: usize) -> Option<&RenderedPanel> {
        self.panels.iter().find(|p| p.row == row && p.col == col)
    }

    /// Positions whose scenes were replaced by blank panels
    pub fn substituted(&self) -> Vec<PanelPosition> {
        self.panels
            .iter()
            .filter(|p| p.substituted)
            .map(|p| p.position)
            .collect()
    }

    pub fn to_pdf(&self) -> RenderResult<Vec<u8>> {
        pdf::write_pdf(self)
    }

    pub fn save_pdf(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let bytes = self.to_pdf()?;
        fs::write(path.as_ref(), bytes)?;
        info!("Wrote {}", path.as_ref().display());
        Ok(())
    }

    /// Save under the configured download name inside `dir`.
    pub fn save_pdf_in(&self, dir: impl AsRef<Path>) -> RenderResult<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        self.save_pdf(&path)?;
        Ok(path)
    }
}

#[derive(Debug, Clone)]
pub struct CompositeRenderer {
    geometry: PageGeometry,
    guides: GuideStyle,
    file_name: String,
    rasterizer: Rasterizer,
}

impl CompositeRenderer {
    pub fn new(config: &PrintConfig) -> Self {
        Self {
            geometry: PageGeometry::new(config),
            guides: GuideStyle::from(config),
            file_name: config.file_name.clone(),
            rasterizer: Rasterizer::default(),
        }
    }

    pub fn with_rasterizer(mut self, rasterizer: Rasterizer) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Rasterize one scene at cell resolution.
    ///
    /// Returns the image and whether the scene had to be replaced by a blank
    /// panel because it could not be read.
    pub fn render_panel(&self, scene_json: Option<&str>, upside_down: bool) -> RenderResult<(RgbaImage, bool)> {
        let (scene, substituted) = match scene_json.map(Scene::from_json) {
            Some(Ok(scene)) => (scene, false),
            Some(Err(err)) => {
                warn!("Unreadable panel scene, printing it blank: {err}");
                (blank_scene(), true)
            }
            None => (blank_scene(), false),
        };

        let (width, height) = self.geometry.render_size();
        let pixmap = self.rasterizer.render(&scene, width, height)?;
        let mut image = raster::to_rgba_image(&pixmap);
        drop(pixmap);
        if upside_down {
            image = raster::rotate_180(&image);
        }
        Ok((image, substituted))
    }

    /// Render all eight scenes, one at a time, top row first.
    pub fn render(&self, scenes: &PanelSet<Option<String>>) -> RenderResult<Composite> {
        let mut panels = Vec::with_capacity(8);
        for row in [Row::Top, Row::Bottom] {
            for (col, position) in row.positions().into_iter().enumerate() {
                let rotated = position.is_upside_down();
                let (image, substituted) = self.render_panel(scenes[position].as_deref(), rotated)?;
                panels.push(RenderedPanel {
                    position,
                    row: row.index(),
                    col,
                    rotated,
                    substituted,
                    image,
                });
            }
        }

        let composite = Composite {
            geometry: self.geometry,
            guides: self.guides.clone(),
            panels,
            file_name: self.file_name.clone(),
        };
        let substituted = composite.substituted();
        if substituted.is_empty() {
            info!("Rendered composite");
        } else {
            warn!("Rendered composite with blank substitutes for {substituted:?}");
        }
        Ok(composite)
    }

    pub fn render_zine(&self, zine: &Zine) -> RenderResult<Composite> {
        self.render(&zine.scenes())
    }
}

fn blank_scene() -> Scene {
    Scene::blank(egui::vec2(BLANK_SCENE_WIDTH, BLANK_SCENE_HEIGHT))
}
