//! # Handoff Session
//!
//! This crate stores the short-lived sessions behind the platform's
//! delegated organisation-selection flow. A relying application opens a
//! session, sends the user's browser to the central selection page with
//! the session key, and the platform later redirects back to the
//! application's callback URL with a signed payload.
//!
//! ## Overview
//!
//! The handoff-session crate handles:
//! - **SessionData**: the camelCase JSON session shape
//! - **SessionStore**: create / retrieve / invalidate with strict expiry
//! - **DistributedCache**: the string get/set/remove backend contract
//!
//! ## Features
//!
//! - `memory` (default): in-memory cache backend for single-process use
//! - `redis`: Redis-backed cache for distributed deployments
//!
//! ## Expiry semantics
//!
//! Every session carries an absolute `expires` instant. The cache backend
//! gets that instant as an eviction hint, and retrieval additionally
//! re-checks it, so an expired session is never served even when backend
//! eviction lags or clocks drift.
//!
//! ## Usage
//!
//! ```rust
//! use handoff_session::{MemoryCache, SessionStore, SessionStoreConfig};
//! use std::sync::Arc;
//! use uuid::Uuid;
//!
//! # async fn example() {
//! let store = SessionStore::new(Arc::new(MemoryCache::new()), SessionStoreConfig::default());
//!
//! let data = store
//!     .new_session("acme", Uuid::new_v4(), "https://app.acme.example/callback")
//!     .with_prompt("Choose an organisation", "Select who to act on behalf of");
//!
//! let key = store.create(&data).await.unwrap();
//! let retrieved = store.retrieve(&key).await.unwrap();
//! assert_eq!(retrieved, Some(data));
//! # }
//! ```

pub mod cache;
pub mod data;
pub mod error;
pub mod store;

// Re-export main types
pub use cache::DistributedCache;
pub use data::{OrganisationOption, SelectionPrompt, SessionData};
pub use error::{SessionError, SessionResult};
pub use store::{SessionStore, SessionStoreConfig};

#[cfg(feature = "memory")]
pub use cache::MemoryCache;

#[cfg(feature = "redis")]
pub use cache::RedisCache;
