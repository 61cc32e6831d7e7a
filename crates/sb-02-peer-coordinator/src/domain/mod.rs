//! # Domain Layer
//!
//! Pure coordination logic. Nothing here touches a store, a clock or a bus;
//! the service feeds values in and writes results back.
//!
//! - `entities` - peer ids, timestamps, queued events
//! - `identity` - id generation and format check
//! - `lock` - advisory lock record and contention assessment
//! - `registry` - heartbeat map, eviction, membership snapshot
//! - `mailbox` - outbound queue and mailbox codec
//! - `config` - timing and key layout
//! - `phase` - lifecycle phase and counters
//! - `errors` - error taxonomy

pub mod config;
pub mod entities;
pub mod errors;
pub mod identity;
pub mod lock;
pub mod mailbox;
pub mod phase;
pub mod registry;

pub use config::{CoordinatorConfig, StoreKeys};
pub use entities::{PeerId, QueuedEvent, Timestamp};
pub use errors::{ConfigError, CoordinatorError};
pub use identity::IdentityFormat;
pub use lock::{LockManager, LockOutcome, LockRecord};
pub use mailbox::{decode_mailbox, encode_mailbox, mailbox_key, OutboundQueue};
pub use phase::{CoordinatorStats, Phase};
pub use registry::{RegistryMap, RegistrySnapshot, MEMBERSHIP_EVENT};
