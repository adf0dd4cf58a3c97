use std::cell::RefCell;

use crate::event::{EventHandler, ZineEvent};

/// A simple event bus for broadcasting store events to registered handlers
pub struct EventBus {
    handlers: RefCell<Vec<Box<dyn EventHandler>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &format!("<{} handlers>", self.handlers.borrow().len()))
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Creates a new event bus
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
        }
    }

    /// Subscribe a handler to receive events
    pub fn subscribe(&self, handler: impl EventHandler + 'static) {
        self.handlers.borrow_mut().push(Box::new(handler));
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Emit an event to all registered handlers
    pub fn emit(&self, event: &ZineEvent) {
        for handler in &mut *self.handlers.borrow_mut() {
            handler.handle_event(event);
        }
    }
}
