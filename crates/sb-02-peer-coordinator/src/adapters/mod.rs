//! # Adapters
//!
//! - `SystemTimeSource` - wall clock in milliseconds
//! - `OsRandomSource` - `rand` thread RNG
//! - `StaticConfigProvider` / `TomlConfigProvider` - configuration
//!   (TOML requires "config-file")
//! - `PollLoop` - tokio scheduler driving `tick()` (requires "runtime")

pub mod config;
pub mod random;
pub mod time;

#[cfg(feature = "runtime")]
pub mod poll_loop;

pub use config::StaticConfigProvider;
#[cfg(feature = "config-file")]
pub use config::TomlConfigProvider;
pub use random::OsRandomSource;
pub use time::SystemTimeSource;

#[cfg(feature = "runtime")]
pub use poll_loop::{PollLoop, PollLoopHandle};
