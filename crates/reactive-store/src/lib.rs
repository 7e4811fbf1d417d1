//! Reactive key-value store.
//!
//! Values are JSON documents keyed by string. Listeners registered with
//! [`Store::connect`] receive the current value immediately and then every
//! subsequent change to their key. Writes are atomic per call: a
//! [`Store::multi_set`] or [`Store::update`] batch becomes visible all at
//! once, and listeners only run after the write lock is released.

mod error;
mod merge;
mod store;
mod update;

pub use error::{StoreError, StoreResult};
pub use merge::merge_values;
pub use store::{Connection, Listener, Store};
pub use update::{StoreUpdate, UpdateMethod};
