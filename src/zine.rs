use std::ops::{Index, IndexMut};

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One of the eight fixed regions of a folded zine sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelPosition {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Back,
    Front,
}

impl PanelPosition {
    /// Every position, in declaration order.
    pub const ALL: [PanelPosition; 8] = [
        PanelPosition::One,
        PanelPosition::Two,
        PanelPosition::Three,
        PanelPosition::Four,
        PanelPosition::Five,
        PanelPosition::Six,
        PanelPosition::Back,
        PanelPosition::Front,
    ];

    /// Key used in persisted state and share tokens
    pub fn key(self) -> &'static str {
        match self {
            Self::One => "one",
            Self::Two => "two",
            Self::Three => "three",
            Self::Four => "four",
            Self::Five => "five",
            Self::Six => "six",
            Self::Back => "back",
            Self::Front => "front",
        }
    }

    /// Display label printed on the grid
    pub fn label(self) -> &'static str {
        match self {
            Self::One => "ONE",
            Self::Two => "TWO",
            Self::Three => "THREE",
            Self::Four => "FOUR",
            Self::Five => "FIVE",
            Self::Six => "SIX",
            Self::Back => "BACK",
            Self::Front => "FRONT",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }
}

impl std::fmt::Display for PanelPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Exactly one `T` per panel position.
///
/// Used for the stored panels and for the scene map carried by share tokens,
/// so a partially populated zine cannot be represented.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelSet<T> {
    pub one: T,
    pub two: T,
    pub three: T,
    pub four: T,
    pub five: T,
    pub six: T,
    pub back: T,
    pub front: T,
}

impl<T> PanelSet<T> {
    pub fn from_fn(mut f: impl FnMut(PanelPosition) -> T) -> Self {
        Self {
            one: f(PanelPosition::One),
            two: f(PanelPosition::Two),
            three: f(PanelPosition::Three),
            four: f(PanelPosition::Four),
            five: f(PanelPosition::Five),
            six: f(PanelPosition::Six),
            back: f(PanelPosition::Back),
            front: f(PanelPosition::Front),
        }
    }

    pub fn get(&self, position: PanelPosition) -> &T {
        match position {
            PanelPosition::One => &self.one,
            PanelPosition::Two => &self.two,
            PanelPosition::Three => &self.three,
            PanelPosition::Four => &self.four,
            PanelPosition::Five => &self.five,
            PanelPosition::Six => &self.six,
            PanelPosition::Back => &self.back,
            PanelPosition::Front => &self.front,
        }
    }

    pub fn get_mut(&mut self, position: PanelPosition) -> &mut T {
        match position {
            PanelPosition::One => &mut self.one,
            PanelPosition::Two => &mut self.two,
            PanelPosition::Three => &mut self.three,
            PanelPosition::Four => &mut self.four,
            PanelPosition::Five => &mut self.five,
            PanelPosition::Six => &mut self.six,
            PanelPosition::Back => &mut self.back,
            PanelPosition::Front => &mut self.front,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PanelPosition, &T)> {
        PanelPosition::ALL.into_iter().map(move |p| (p, self.get(p)))
    }

    pub fn map<U>(&self, mut f: impl FnMut(PanelPosition, &T) -> U) -> PanelSet<U> {
        PanelSet::from_fn(|p| f(p, self.get(p)))
    }
}

impl<T> Index<PanelPosition> for PanelSet<T> {
    type Output = T;

    fn index(&self, position: PanelPosition) -> &T {
        self.get(position)
    }
}

impl<T> IndexMut<PanelPosition> for PanelSet<T> {
    fn index_mut(&mut self, position: PanelPosition) -> &mut T {
        self.get_mut(position)
    }
}

/// A single drawable panel of the zine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Panel {
    pub id: PanelPosition,
    pub label: String,
    /// Serialized scene, written by autosave and grid commits
    #[serde(rename = "canvasJSON")]
    pub canvas_json: Option<String>,
    /// PNG data URL, written only by grid commits
    pub thumbnail: Option<String>,
    pub is_upside_down: bool,
}

impl Panel {
    pub fn empty(position: PanelPosition) -> Self {
        Self {
            id: position,
            label: position.label().to_owned(),
            canvas_json: None,
            thumbnail: None,
            is_upside_down: position.is_upside_down(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.canvas_json.is_none()
    }
}

/// The whole document: eight panels plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zine {
    pub id: Uuid,
    pub panels: PanelSet<Panel>,
    pub show_labels: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Zine {
    /// Fresh document with eight blank panels and labels visible
    pub fn new_empty() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            panels: PanelSet::from_fn(Panel::empty),
            show_labels: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn panel(&self, position: PanelPosition) -> &Panel {
        &self.panels[position]
    }

    pub fn panel_mut(&mut self, position: PanelPosition) -> &mut Panel {
        &mut self.panels[position]
    }

    /// Scenes only, keyed by position
    pub fn scenes(&self) -> PanelSet<Option<String>> {
        self.panels.map(|_, panel| panel.canvas_json.clone())
    }

    /// Panels in flip-book order, front cover first.
    pub fn reading_order(&self) -> impl Iterator<Item = &Panel> {
        crate::layout::READING_ORDER.iter().map(move |p| self.panel(*p))
    }

    /// Panels as laid out on the sheet: `[top row, bottom row]`.
    pub fn grid_rows(&self) -> [[&Panel; 4]; 2] {
        [
            crate::layout::TOP_ROW.map(|p| self.panel(p)),
            crate::layout::BOTTOM_ROW.map(|p| self.panel(p)),
        ]
    }

    /// Re-derive the fields that are fixed by the fold layout.
    ///
    /// Returns true if anything had to be corrected.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;
        for position in PanelPosition::ALL {
            let panel = self.panel_mut(position);
            if panel.id != position
                || panel.label != position.label()
                || panel.is_upside_down != position.is_upside_down()
            {
                warn!("Panel {} had inconsistent layout fields, restoring them", position);
                panel.id = position;
                panel.label = position.label().to_owned();
                panel.is_upside_down = position.is_upside_down();
                changed = true;
            }
        }
        changed
    }
}

impl Default for Zine {
    fn default() -> Self {
        Self::new_empty()
    }
}
