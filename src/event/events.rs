use crate::zine::{PanelPosition, Zine};

/// Published by the store after every successful state change.
#[derive(Debug, Clone)]
pub enum ZineEvent {
    /// A panel's scene (and on commit, its thumbnail) changed
    PanelSaved {
        position: PanelPosition,
        zine: Zine,
    },
    /// Any other save, such as a label toggle
    Saved { zine: Zine },
    /// The zine was replaced by a fresh one
    Reset { zine: Zine },
}

impl ZineEvent {
    pub fn zine(&self) -> &Zine {
        match self {
            ZineEvent::PanelSaved { zine, .. } | ZineEvent::Saved { zine } | ZineEvent::Reset { zine } => zine,
        }
    }
}
