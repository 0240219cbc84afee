//! # subkit-store: Persistence Layer for Subkit
//!
//! Durable state of one SDK installation: identity, cached snapshots,
//! credentials.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          subkit-store                                   │
//! │                                                                         │
//! │  ┌────────────────┐                                                    │
//! │  │  ProfileStore  │  async trait, typed accessors over raw key-value   │
//! │  └───────┬────────┘                                                    │
//! │          │                                                              │
//! │     ┌────┴─────────────────┐                                           │
//! │     ▼                      ▼                                            │
//! │  ┌──────────────────┐  ┌──────────────────┐                            │
//! │  │MemoryProfileStore│  │SqliteProfileStore│                            │
//! │  │ RwLock<HashMap>  │  │ SqlitePool (WAL) │                            │
//! │  └──────────────────┘  │ profile_kv table │                            │
//! │                        └────────┬─────────┘                            │
//! │                                 ▼                                       │
//! │                        migrations/sqlite/*.sql                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use subkit_store::{DbConfig, ProfileStore, SqliteProfileStore};
//!
//! let store = SqliteProfileStore::connect(DbConfig::new("./subkit.db")).await?;
//! store.set_profile_id("p1").await?;
//! ```

pub mod error;
pub mod memory;
pub mod migrations;
pub mod sqlite;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryProfileStore;
pub use sqlite::{DbConfig, SqliteProfileStore};
pub use store::{keys, ProfileStore};
