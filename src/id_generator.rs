use std::sync::atomic::{AtomicUsize, Ordering};

use crate::scene::ObjectId;

// Single static counter for all scene objects. Ids are runtime-only and are
// handed out again whenever a scene is loaded.
static NEXT_OBJECT_ID: AtomicUsize = AtomicUsize::new(1);

pub fn generate_id() -> ObjectId {
    ObjectId(NEXT_OBJECT_ID.fetch_add(1, Ordering::SeqCst))
}
