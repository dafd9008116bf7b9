//! Session storage capability for formguard.
//!
//! The CSRF guard does not own session storage. The host application owns a
//! session (loaded from a cookie store, a database, Redis, ...) and lends it
//! to the guard through the [`SessionStore`] trait. The guard reads and
//! writes a single reserved key and leaves everything else alone.
//!
//! # Features
//!
//! - **[`SessionStore`]** - get/set/contains/remove over `serde_json::Value`
//! - **[`MemorySession`]** - map-backed store for tests and in-memory hosts
//! - **[`SharedSession`]** - mutex-guarded handle for concurrent requests
//!
//! # Examples
//!
//! ```
//! use formguard_session::*;
//! use serde_json::json;
//!
//! let mut session = MemorySession::new();
//! session.set("user_id", json!(123));
//! session.set_as("roles", vec!["admin"]).unwrap();
//!
//! let roles: Option<Vec<String>> = session.get_as("roles").unwrap();
//! assert_eq!(roles, Some(vec!["admin".to_string()]));
//! ```
//!
//! ## Concurrent Access
//!
//! ```
//! use formguard_session::*;
//! use serde_json::json;
//!
//! let shared = SharedSession::new(MemorySession::new());
//! let handle = shared.clone();
//!
//! // Hold the lock for the whole read-modify-write
//! {
//!     let mut session = handle.lock();
//!     let visits: u64 = session.get_as("visits").unwrap().unwrap_or(0);
//!     session.set("visits", json!(visits + 1));
//! }
//!
//! assert_eq!(shared.lock().get("visits"), Some(json!(1)));
//! ```

pub mod error;
pub mod memory;
pub mod shared;
pub mod store;

pub use error::{SessionError, SessionResult};
pub use memory::MemorySession;
pub use shared::{SessionGuard, SharedSession};
pub use store::SessionStore;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{SessionError, SessionResult};
    pub use crate::memory::MemorySession;
    pub use crate::shared::{SessionGuard, SharedSession};
    pub use crate::store::SessionStore;
}
