//! Storage layer: one pretty-printed JSON file per renter, replaced atomically on save.

mod error;
mod record;

pub use error::StoreError;
pub use record::{RecordStore, load, record_path, save};
