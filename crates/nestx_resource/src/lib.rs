//! # NestX Resource
//!
//! Physical resource boundary for NestX.
//!
//! This crate provides the lowest-level abstraction NestX builds on: a
//! connection to a transactional record store. Connections expose physical
//! begin/commit/rollback units and staged reads/writes - nothing more.
//!
//! ## Design Principles
//!
//! - Connections are simple transactional record stores
//! - No knowledge of logical scopes, propagation, or rollback-only marking
//! - Must be `Send + Sync` for shared access
//! - NestX owns all nesting and propagation semantics
//!
//! ## Available Connections
//!
//! - [`InMemoryConnection`] - For testing and ephemeral use
//! - [`FlakyConnection`] - Fault-injecting wrapper for tests
//!
//! ## Example
//!
//! ```rust
//! use nestx_resource::{InMemoryConnection, RecordKey, ResourceConnection};
//!
//! let conn = InMemoryConnection::new();
//! let h = conn.begin().unwrap();
//! conn.put(h, RecordKey::new("members", "alice"), vec![1, 2, 3]).unwrap();
//! conn.commit(h).unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod error;
mod flaky;
mod memory;
mod types;

pub use connection::ResourceConnection;
pub use error::{ResourceError, ResourceResult};
pub use flaky::FlakyConnection;
pub use memory::InMemoryConnection;
pub use types::{RecordKey, TxnHandle};
