//! Persistence for the session timeline
//!
//! - `KeyValueStorage`: the durable local key-value boundary
//! - `FileStorage` / `MemoryStorage`: backends
//! - `PersistenceAdapter`: versioned save/load of the timeline under one key
//!
//! ```text
//! Save (after each mutation, or on flush):
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────────────┐
//! │ EventLog     │───►│ JSON doc     │───►│ <data_dir>/<key>.json│
//! │ + cursor     │    │ version: 1   │    │ via .json.tmp+rename │
//! └──────────────┘    └──────────────┘    └──────────────────────┘
//!
//! Load (startup):
//!   missing → empty   unreadable → warn + empty   valid → restore
//! ```

mod adapter;
mod atomic;
mod storage;

pub use adapter::{PersistenceAdapter, RestoredTimeline, FORMAT_VERSION};
pub use atomic::{atomic_write, cleanup_temp_files};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub(crate) use storage::validate_key;
