//! In-memory delivery log.
//!
//! Nothing here is persisted; the log lives and dies with the process.

pub mod event_store;
pub mod types;

pub use event_store::{EventStore, DEFAULT_CAPACITY};
pub use types::DeliveryRecord;
