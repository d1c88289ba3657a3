//! In-memory stores for submitted jobs and their reported responses.
//!
//! Each store keeps its key counter and its map behind a single lock, so allocating a key
//! and inserting under it is one critical section.

mod fetch;
mod response;

pub use fetch::FetchStore;
pub use response::{ResponseStore, StoredRecord};

use std::sync::{Mutex, MutexGuard};

// A poisoned lock only means another request panicked mid-update; the tables stay usable.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
