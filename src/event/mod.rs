mod bus;
mod events;

pub use bus::EventBus;
pub use events::ZineEvent;

/// Observer of store events.
pub trait EventHandler {
    fn handle_event(&mut self, event: &ZineEvent);
}

impl<F: FnMut(&ZineEvent)> EventHandler for F {
    fn handle_event(&mut self, event: &ZineEvent) {
        self(event)
    }
}
