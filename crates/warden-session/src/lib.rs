//! Server-side session management.
//!
//! This crate issues opaque session tokens and keeps per-session records:
//! - Tokens are 32 bytes from the OS CSPRNG, hex-encoded
//! - Records live behind the [`SessionStore`] trait, with [`MemoryStore`]
//!   as the built-in backend
//! - A background sweep evicts sessions idle for longer than the TTL
//!
//! # Example
//!
//! ```rust,ignore
//! use warden_session::{ManagerConfig, SessionManager};
//!
//! let config = ManagerConfig::default().with_ttl(Duration::from_secs(1800));
//! let manager = SessionManager::with_memory_store(config)?;
//!
//! let token = manager.create_session("alice", "203.0.113.7")?;
//! let session = manager.get_session(&token);
//!
//! manager.shutdown().await;
//! ```

mod config;
mod error;
mod manager;
mod record;
mod store;
mod sweep;
mod token;

pub use config::{DEFAULT_CLEANUP_INTERVAL, DEFAULT_COOKIE_NAME, DEFAULT_TTL, ManagerConfig};
pub use error::{Error, Result};
pub use manager::SessionManager;
pub use record::{AttributeValue, Attributes, SessionRecord};
pub use store::{MemoryStore, SessionStore};
pub use sweep::SweepTask;
pub use token::{TOKEN_BYTES, TOKEN_LEN, generate_token, is_well_formed};
