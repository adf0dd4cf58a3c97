#![warn(clippy::all, rust_2018_idioms)]

pub mod composite;
pub mod config;
pub mod editor;
pub mod error;
pub mod event;
pub mod layout;
pub mod raster;
pub mod scene;
pub mod share;
pub mod store;
pub mod util;
pub mod zine;

mod id_generator;

pub use composite::{Composite, CompositeRenderer, RenderedPanel};
pub use config::ZineConfig;
pub use editor::{EditorError, Key, PanelEditor, PanelSink, Tool};
pub use error::{RenderError, SceneError};
pub use event::{EventBus, ZineEvent};
pub use layout::PageGeometry;
pub use raster::{FontBook, Rasterizer};
pub use scene::Scene;
pub use share::{ShareError, SharedZine};
pub use store::{FileStorage, MemoryStorage, Storage, StoreError, ZineStore};
pub use zine::{Panel, PanelPosition, PanelSet, Zine};
