//! Fold layout of the zine sheet and the print page geometry derived from it.
//!
//! The sheet is folded so that the top row ends up upside down and in reverse
//! reading order. This mapping is fixed; nothing here is derived at runtime
//! from stored data.

use egui::{Rect, pos2, vec2};
use serde::{Deserialize, Serialize};

use crate::config::PrintConfig;
use crate::zine::PanelPosition;

pub const COLUMNS: usize = 4;
pub const ROWS: usize = 2;

/// Width over height of every panel (3:4 portrait).
pub const PANEL_ASPECT: f32 = 0.75;

/// Top row as seen on the printed sheet, left to right.
pub const TOP_ROW: [PanelPosition; COLUMNS] = [
    PanelPosition::Four,
    PanelPosition::Three,
    PanelPosition::Two,
    PanelPosition::One,
];

/// Bottom row as seen on the printed sheet, left to right.
pub const BOTTOM_ROW: [PanelPosition; COLUMNS] = [
    PanelPosition::Five,
    PanelPosition::Six,
    PanelPosition::Back,
    PanelPosition::Front,
];

/// Fully unfolded reading sequence used by the flip-book preview.
pub const READING_ORDER: [PanelPosition; 8] = [
    PanelPosition::Front,
    PanelPosition::One,
    PanelPosition::Two,
    PanelPosition::Three,
    PanelPosition::Four,
    PanelPosition::Five,
    PanelPosition::Six,
    PanelPosition::Back,
];

/// Order the panel editor steps through with next/previous.
pub const GRID_ORDER: [PanelPosition; 8] = [
    PanelPosition::Four,
    PanelPosition::Three,
    PanelPosition::Two,
    PanelPosition::One,
    PanelPosition::Five,
    PanelPosition::Six,
    PanelPosition::Back,
    PanelPosition::Front,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Row {
    Top,
    Bottom,
}

impl Row {
    pub fn index(self) -> usize {
        match self {
            Row::Top => 0,
            Row::Bottom => 1,
        }
    }

    pub fn positions(self) -> [PanelPosition; COLUMNS] {
        match self {
            Row::Top => TOP_ROW,
            Row::Bottom => BOTTOM_ROW,
        }
    }
}

impl PanelPosition {
    pub fn row(self) -> Row {
        if TOP_ROW.contains(&self) {
            Row::Top
        } else {
            Row::Bottom
        }
    }

    /// Column within the row, left to right as printed
    pub fn order(self) -> usize {
        self.row()
            .positions()
            .iter()
            .position(|p| *p == self)
            .unwrap_or_default()
    }

    /// `(row, column)` on the printed sheet
    pub fn grid_cell(self) -> (usize, usize) {
        (self.row().index(), self.order())
    }

    pub fn is_upside_down(self) -> bool {
        self.row() == Row::Top
    }

    pub fn next(self) -> Self {
        let index = grid_index(self);
        GRID_ORDER[(index + 1) % GRID_ORDER.len()]
    }

    pub fn prev(self) -> Self {
        let index = grid_index(self);
        GRID_ORDER[(index + GRID_ORDER.len() - 1) % GRID_ORDER.len()]
    }
}

fn grid_index(position: PanelPosition) -> usize {
    GRID_ORDER
        .iter()
        .position(|p| *p == position)
        .unwrap_or_default()
}

/// Physical placement of the panel grid on the print page, in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub cell_width: f32,
    pub cell_height: f32,
    /// Top-left corner of the grid, measured from the top-left of the page
    pub origin_x: f32,
    pub origin_y: f32,
    pub dpi: u32,
    /// Whether the cell size had to be derived from the row height
    pub height_constrained: bool,
}

impl PageGeometry {
    /// Fit a 4 × 2 grid of 3:4 cells inside the page margins.
    ///
    /// Cells start width-constrained. Only when the derived height is strictly
    /// larger than the row allowance is the size recomputed from the height, so
    /// an exact tie stays width-constrained.
    pub fn new(config: &PrintConfig) -> Self {
        let available_width = config.page_width_in - config.margin_in * 2.0;
        let available_height = config.page_height_in - config.margin_in * 2.0;

        let mut cell_width = available_width / COLUMNS as f32;
        let mut cell_height = cell_width / PANEL_ASPECT;
        let row_allowance = available_height / ROWS as f32;
        let height_constrained = cell_height > row_allowance;
        if height_constrained {
            cell_height = row_allowance;
            cell_width = cell_height * PANEL_ASPECT;
        }

        let grid_width = cell_width * COLUMNS as f32;
        let grid_height = cell_height * ROWS as f32;

        Self {
            page_width: config.page_width_in,
            page_height: config.page_height_in,
            cell_width,
            cell_height,
            origin_x: (config.page_width_in - grid_width) / 2.0,
            origin_y: (config.page_height_in - grid_height) / 2.0,
            dpi: config.dpi,
            height_constrained,
        }
    }

    pub fn grid_width(&self) -> f32 {
        self.cell_width * COLUMNS as f32
    }

    pub fn grid_height(&self) -> f32 {
        self.cell_height * ROWS as f32
    }

    /// Outer rectangle of the grid in page inches (y grows downwards)
    pub fn grid_rect(&self) -> Rect {
        Rect::from_min_size(
            pos2(self.origin_x, self.origin_y),
            vec2(self.grid_width(), self.grid_height()),
        )
    }

    /// Rectangle of one cell in page inches (y grows downwards)
    pub fn cell_rect(&self, row: usize, col: usize) -> Rect {
        Rect::from_min_size(
            pos2(
                self.origin_x + col as f32 * self.cell_width,
                self.origin_y + row as f32 * self.cell_height,
            ),
            vec2(self.cell_width, self.cell_height),
        )
    }

    /// Pixel size each panel is rasterized at
    pub fn render_size(&self) -> (u32, u32) {
        let dpi = self.dpi as f32;
        (
            (self.cell_width * dpi).round() as u32,
            (self.cell_height * dpi).round() as u32,
        )
    }
}
