//! # NestX Core
//!
//! Transaction-propagation manager for NestX.
//!
//! This crate provides:
//! - A [`TransactionManager`] mapping logical scopes onto physical
//!   transactions, with `Required` (join-existing) and `RequiresNew`
//!   (always-new) propagation
//! - The rollback-only protocol: a joined scope's rollback dooms the
//!   eventual owning commit, which fails with
//!   [`TxError::UnexpectedRollback`]
//! - Explicit [`ExecutionContext`] state instead of ambient
//!   current-transaction globals, with stack-disciplined suspend/resume
//! - Participant stores ([`MemberStore`], [`AuditLogStore`]) executing
//!   inside scopes, and orchestration over them ([`MemberService`],
//!   [`MemberFacade`])
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use nestx_core::{ExecutionContext, Propagation, TransactionManager, TxError};
//! use nestx_resource::InMemoryConnection;
//!
//! let manager = TransactionManager::new(Arc::new(InMemoryConnection::new()));
//! let mut ctx = ExecutionContext::new();
//!
//! let mut outer = manager.begin(&mut ctx, Propagation::Required).unwrap();
//! let mut inner = manager.begin(&mut ctx, Propagation::Required).unwrap();
//! assert!(!inner.is_new_transaction());
//!
//! // The joined scope's rollback marks the shared transaction
//! // rollback-only; the owning commit is forced into a rollback.
//! manager.rollback(&mut ctx, &mut inner).unwrap();
//! let err = manager.commit(&mut ctx, &mut outer).unwrap_err();
//! assert!(matches!(err, TxError::UnexpectedRollback));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod facade;
mod participant;
mod service;
mod transaction;
mod types;

pub use error::{TxError, TxResult};
pub use facade::MemberFacade;
pub use participant::{AuditEntry, AuditLogStore, Member, MemberStore, REJECTED_MARKER};
pub use service::MemberService;
pub use transaction::{
    ExecutionContext, PhysicalTxn, Propagation, TransactionManager, TransactionScope, TxnState,
};
pub use types::PhysicalTxnId;
