use std::fmt;
use std::ops::RangeInclusive;

use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::scene::color;

pub const BRUSH_WIDTH_RANGE: RangeInclusive<f32> = 1.0..=50.0;
pub const FONT_SIZE_RANGE: RangeInclusive<f32> = 12.0..=72.0;
/// Increment used by the font size stepper
pub const FONT_SIZE_STEP: f32 = 2.0;

pub const DEFAULT_BRUSH_WIDTH: f32 = 5.0;
pub const DEFAULT_ERASER_WIDTH: f32 = 20.0;
pub const DEFAULT_FONT_SIZE: f32 = 24.0;

/// Swatches offered by the color picker.
pub const COLOR_PALETTE: [Color32; 10] = [
    Color32::from_rgb(0x00, 0x00, 0x00),
    Color32::from_rgb(0xff, 0xff, 0xff),
    Color32::from_rgb(0xef, 0x44, 0x44),
    Color32::from_rgb(0xf9, 0x73, 0x16),
    Color32::from_rgb(0xea, 0xb3, 0x08),
    Color32::from_rgb(0x22, 0xc5, 0x5e),
    Color32::from_rgb(0x3b, 0x82, 0xf6),
    Color32::from_rgb(0x8b, 0x5c, 0xf6),
    Color32::from_rgb(0xec, 0x48, 0x99),
    Color32::from_rgb(0x6b, 0x72, 0x80),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Pencil,
    Eraser,
    Text,
}

impl Tool {
    pub fn captures_strokes(self) -> bool {
        matches!(self, Tool::Pencil | Tool::Eraser)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tool::Pencil => "pencil",
            Tool::Eraser => "eraser",
            Tool::Text => "text",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Inter,
    Playfair,
    Dancing,
    Caveat,
}

impl FontFamily {
    pub const ALL: [FontFamily; 4] = [
        FontFamily::Inter,
        FontFamily::Playfair,
        FontFamily::Dancing,
        FontFamily::Caveat,
    ];

    /// Family name written into text objects
    pub fn display_name(self) -> &'static str {
        match self {
            FontFamily::Inter => "Inter",
            FontFamily::Playfair => "Playfair",
            FontFamily::Dancing => "Dancing Script",
            FontFamily::Caveat => "Caveat",
        }
    }
}

/// Stroke parameters handed to the surface for pencil and eraser.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub width: f32,
    pub color: Color32,
}

/// Ephemeral tool state of one editing session.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSettings {
    tool: Tool,
    brush_width: f32,
    eraser_width: f32,
    color: Color32,
    font_family: FontFamily,
    font_size: f32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: Tool::default(),
            brush_width: DEFAULT_BRUSH_WIDTH,
            eraser_width: DEFAULT_ERASER_WIDTH,
            color: Color32::BLACK,
            font_family: FontFamily::default(),
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

fn clamp_to(value: f32, range: &RangeInclusive<f32>) -> f32 {
    value.clamp(*range.start(), *range.end())
}

impl ToolSettings {
    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn brush_width(&self) -> f32 {
        self.brush_width
    }

    pub fn eraser_width(&self) -> f32 {
        self.eraser_width
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn font_family(&self) -> FontFamily {
        self.font_family
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub(crate) fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn set_brush_width(&mut self, width: f32) {
        self.brush_width = clamp_to(width, &BRUSH_WIDTH_RANGE);
    }

    pub fn set_eraser_width(&mut self, width: f32) {
        self.eraser_width = clamp_to(width, &BRUSH_WIDTH_RANGE);
    }

    pub fn set_color(&mut self, color: Color32) {
        self.color = color;
    }

    pub fn set_font_family(&mut self, family: FontFamily) {
        self.font_family = family;
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.font_size = clamp_to(size, &FONT_SIZE_RANGE);
    }

    /// Move the font size `steps` increments up (or down when negative).
    pub fn step_font_size(&mut self, steps: i32) {
        self.set_font_size(self.font_size + steps as f32 * FONT_SIZE_STEP);
    }

    /// Stroke for the active tool; `None` in text mode.
    /// The eraser paints with the background color.
    pub fn brush(&self) -> Option<Brush> {
        match self.tool {
            Tool::Pencil => Some(Brush {
                width: self.brush_width,
                color: self.color,
            }),
            Tool::Eraser => Some(Brush {
                width: self.eraser_width,
                color: color::WHITE,
            }),
            Tool::Text => None,
        }
    }
}
