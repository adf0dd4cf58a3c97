//! Zine document store.
//!
//! Owns the single current [`Zine`], keeps it in a [`Storage`] slot and
//! publishes every change on an [`EventBus`].

mod storage;

pub use storage::{FileStorage, MemoryStorage, Storage};

use chrono::Utc;
use log::{error, info, warn};
use thiserror::Error;

use crate::editor::PanelSink;
use crate::event::{EventBus, EventHandler, ZineEvent};
use crate::zine::{PanelPosition, Zine};

/// Errors that can occur while persisting the zine
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to serialize zine: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub struct ZineStore<S: Storage> {
    storage: S,
    zine: Zine,
    events: EventBus,
}

impl<S: Storage> ZineStore<S> {
    /// Read the persisted zine, falling back to a fresh one that is
    /// persisted immediately.
    pub fn load(storage: S) -> Self {
        let loaded = match storage.read() {
            Ok(Some(json)) => match serde_json::from_str::<Zine>(&json) {
                Ok(zine) => Some(zine),
                Err(err) => {
                    warn!("Stored zine is unreadable, starting fresh: {err}");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!("Could not read stored zine, starting fresh: {err}");
                None
            }
        };

        let mut store = Self {
            storage,
            zine: Zine::new_empty(),
            events: EventBus::new(),
        };
        match loaded {
            Some(mut zine) => {
                let corrected = zine.normalize();
                info!("Loaded zine {}", zine.id);
                store.zine = zine;
                if corrected {
                    let _ = store.write_logged();
                }
            }
            None => {
                info!("Created zine {}", store.zine.id);
                let _ = store.write_logged();
            }
        }
        store
    }

    pub fn current(&self) -> &Zine {
        &self.zine
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn subscribe(&self, handler: impl EventHandler + 'static) {
        self.events.subscribe(handler);
    }

    /// Replace the current zine.
    ///
    /// The in-memory state and observers are updated even when persisting
    /// fails; the write error is still returned.
    pub fn save(&mut self, zine: Zine) -> StoreResult<()> {
        self.zine = zine;
        self.apply(|zine| ZineEvent::Saved { zine })
    }

    /// Autosave path: update the scene, keep the thumbnail.
    pub fn autosave_panel(&mut self, position: PanelPosition, scene_json: String) -> StoreResult<()> {
        self.zine.panel_mut(position).canvas_json = Some(scene_json);
        self.apply(|zine| ZineEvent::PanelSaved { position, zine })
    }

    /// Grid commit path: update scene and thumbnail together.
    pub fn commit_panel(
        &mut self,
        position: PanelPosition,
        scene_json: String,
        thumbnail: String,
    ) -> StoreResult<()> {
        let panel = self.zine.panel_mut(position);
        panel.canvas_json = Some(scene_json);
        panel.thumbnail = Some(thumbnail);
        self.apply(|zine| ZineEvent::PanelSaved { position, zine })
    }

    pub fn clear_panel(&mut self, position: PanelPosition) -> StoreResult<()> {
        self.zine.panel_mut(position).canvas_json = None;
        self.apply(|zine| ZineEvent::PanelSaved { position, zine })
    }

    pub fn toggle_labels(&mut self) -> StoreResult<()> {
        self.zine.show_labels = !self.zine.show_labels;
        self.apply(|zine| ZineEvent::Saved { zine })
    }

    /// Discard the current zine for a fresh one.
    pub fn reset(&mut self) -> StoreResult<()> {
        self.zine = Zine::new_empty();
        info!("Reset to zine {}", self.zine.id);
        let result = self.write_logged();
        self.events.emit(&ZineEvent::Reset {
            zine: self.zine.clone(),
        });
        result
    }

    fn apply(&mut self, event: impl FnOnce(Zine) -> ZineEvent) -> StoreResult<()> {
        self.zine.updated_at = Utc::now();
        let result = self.write_logged();
        self.events.emit(&event(self.zine.clone()));
        result
    }

    fn write(&mut self) -> StoreResult<()> {
        let json = serde_json::to_string(&self.zine)?;
        self.storage.write(&json)
    }

    fn write_logged(&mut self) -> StoreResult<()> {
        let result = self.write();
        if let Err(err) = &result {
            error!("Failed to persist zine {}: {err}", self.zine.id);
        }
        result
    }
}

impl<S: Storage> PanelSink for ZineStore<S> {
    fn autosave(&mut self, position: PanelPosition, scene_json: String) {
        // Failures are logged by apply; the next edit retries.
        let _ = self.autosave_panel(position, scene_json);
    }

    fn commit(&mut self, position: PanelPosition, scene_json: String, thumbnail: String) {
        let _ = self.commit_panel(position, scene_json, thumbnail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn read(&self) -> StoreResult<Option<String>> {
            Err(StoreError::Unavailable("quota exceeded".into()))
        }

        fn write(&mut self, _data: &str) -> StoreResult<()> {
            Err(StoreError::Unavailable("quota exceeded".into()))
        }
    }

    #[test]
    fn test_load_creates_and_persists_fresh_zine() {
        let storage = MemoryStorage::new();
        let store = ZineStore::load(storage.clone());
        let zine = store.current();
        assert!(zine.show_labels);
        assert!(PanelPosition::ALL.iter().all(|p| zine.panel(*p).is_blank()));
        let persisted: Zine = serde_json::from_str(&storage.contents().unwrap()).unwrap();
        assert_eq!(&persisted, zine);
    }

    #[test]
    fn test_load_replaces_garbage() {
        let storage = MemoryStorage::with_contents("{\"id\": 12");
        let store = ZineStore::load(storage.clone());
        let persisted: Zine = serde_json::from_str(&storage.contents().unwrap()).unwrap();
        assert_eq!(persisted.id, store.current().id);
    }

    #[test]
    fn test_load_restores_existing() {
        let storage = MemoryStorage::new();
        let id = {
            let mut store = ZineStore::load(storage.clone());
            store.autosave_panel(PanelPosition::Two, "{}".into()).unwrap();
            store.current().id
        };
        let store = ZineStore::load(storage);
        assert_eq!(store.current().id, id);
        assert_eq!(store.current().panel(PanelPosition::Two).canvas_json.as_deref(), Some("{}"));
    }

    #[test]
    fn test_autosave_keeps_thumbnail() {
        let mut store = ZineStore::load(MemoryStorage::new());
        store
            .commit_panel(PanelPosition::One, "a".into(), "thumb".into())
            .unwrap();
        store.autosave_panel(PanelPosition::One, "b".into()).unwrap();
        let panel = store.current().panel(PanelPosition::One);
        assert_eq!(panel.canvas_json.as_deref(), Some("b"));
        assert_eq!(panel.thumbnail.as_deref(), Some("thumb"));
    }

    #[test]
    fn test_clear_panel_and_toggle_labels() {
        let mut store = ZineStore::load(MemoryStorage::new());
        store.autosave_panel(PanelPosition::Six, "x".into()).unwrap();
        store.clear_panel(PanelPosition::Six).unwrap();
        assert!(store.current().panel(PanelPosition::Six).is_blank());
        store.toggle_labels().unwrap();
        assert!(!store.current().show_labels);
    }

    #[test]
    fn test_save_stamps_and_publishes() {
        let mut store = ZineStore::load(MemoryStorage::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |event: &ZineEvent| sink.borrow_mut().push(event.zine().updated_at));

        let before = store.current().updated_at;
        let zine = store.current().clone();
        store.save(zine).unwrap();
        assert!(store.current().updated_at >= before);
        assert_eq!(seen.borrow().as_slice(), &[store.current().updated_at]);
    }

    #[test]
    fn test_reset_replaces_identity() {
        let mut store = ZineStore::load(MemoryStorage::new());
        let old = store.current().id;
        store.autosave_panel(PanelPosition::Front, "x".into()).unwrap();
        store.reset().unwrap();
        assert_ne!(store.current().id, old);
        assert!(store.current().panel(PanelPosition::Front).is_blank());
    }

    #[test]
    fn test_broken_storage_degrades() {
        let mut store = ZineStore::load(BrokenStorage);
        assert!(store.autosave_panel(PanelPosition::One, "x".into()).is_err());
        // Memory still reflects the edit
        assert_eq!(store.current().panel(PanelPosition::One).canvas_json.as_deref(), Some("x"));
    }

    #[test]
    fn test_reset_on_broken_storage_still_notifies() {
        let mut store = ZineStore::load(BrokenStorage);
        let old = store.current().id;
        let resets = Rc::new(Cell::new(0));
        let seen = resets.clone();
        store.subscribe(move |event: &ZineEvent| {
            if matches!(event, ZineEvent::Reset { .. }) {
                seen.set(seen.get() + 1);
            }
        });

        assert!(matches!(store.reset(), Err(StoreError::Unavailable(_))));
        assert_ne!(store.current().id, old);
        assert_eq!(resets.get(), 1);
    }
}
