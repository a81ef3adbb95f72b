//! Session Timeline
//!
//! The session history engine of an educational coding platform: an
//! append-only, position-addressable log of learner actions with
//! non-destructive jumps, destructive reverts, branch cuts, best-effort
//! persistence and live change notification.
//!
//! # Modules
//!
//! - `types`: Core data structures (Event, EventType, TimelineState, payloads)
//! - `history`: The timeline engine (`SessionHistory`, `EventLog`, queries)
//! - `persistence`: Key-value storage backends and the versioned save format
//! - `notifier`: Synchronous publish/subscribe for change notification
//! - `config`: Data directory, storage key and autosave settings
//! - `protocol` / `server`: Line-delimited JSON-RPC over stdio
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use session_timeline::{HistoryConfig, SessionHistory};
//!
//! let history = Arc::new(SessionHistory::new(HistoryConfig::new("data")));
//! let _sub = history.subscribe(|| println!("timeline changed"));
//!
//! let start = history.track_choice("c1", "Start Game", None);
//! history.track_lesson("l1", "Movement Basics", None);
//!
//! history.jump_to_event(start.id);
//! assert!(history.can_redo());
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod notifier;
pub mod persistence;
pub mod protocol;
pub mod server;
pub mod types;

// Re-export commonly used items at crate root
pub use config::HistoryConfig;
pub use error::{ConfigError, PersistenceError, StorageError};
pub use history::{EventLog, SessionHistory, TimelineStats};
pub use notifier::{Notifier, Subscription, SubscriptionId};
pub use persistence::{FileStorage, KeyValueStorage, MemoryStorage, PersistenceAdapter};
pub use server::HistoryServer;
pub use types::{
    ChoiceData, ComponentData, Event, EventId, EventType, LessonData, NavigationData,
    TimelineState,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
