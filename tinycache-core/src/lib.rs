//! # Tinycache Core
//!
//! An in-memory key-value store with per-key time-to-live (TTL).
//!
//! ## Features
//!
//! - Thread-safe storage behind a single reader/writer lock
//! - Values are any JSON shape (`serde_json::Value`), stored untouched
//! - Lazy expiration on read plus a background sweeper per store instance
//! - Glob-style key listing (`*`, `?`, `[a-z]`, `[^...]`, `\` escapes)
//! - Terminal `close` that drops every entry and stops the sweeper
//!
//! ## Example
//!
//! ```rust,no_run
//! use tinycache_core::{Store, StoreConfig};
//! use serde_json::json;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Sweep expired entries every 250ms instead of every second
//!     let config = StoreConfig::default()
//!         .with_sweep_resolution(Duration::from_millis(250));
//!     let store = Store::with_config(config);
//!
//!     // Store a value with a 60 second TTL, and one that never expires
//!     store.set("user:123", json!({"name": "John Doe"}), Duration::from_secs(60));
//!     store.set("motd", "hello", Duration::ZERO);
//!
//!     if let Some(user) = store.get("user:123") {
//!         println!("User: {}", user["name"]);
//!     }
//!
//!     let users = store.keys("user:*").expect("valid pattern");
//!     let removed = store.delete(&users);
//!     println!("removed {removed} users");
//!
//!     store.close();
//! }
//! ```

mod config;
mod error;
mod pattern;
mod store;
mod sweeper;

pub use config::{StoreConfig, DEFAULT_INITIAL_CAPACITY, DEFAULT_SWEEP_RESOLUTION};
pub use error::PatternError;
pub use pattern::{glob_match, Pattern};
pub use store::{truncate_key_for_log, Store};

/// The value type held by the store
pub use serde_json::Value;
