//! Logical transaction scopes over physical transactions.
//!
//! NestX separates two notions:
//!
//! - **Physical transaction**: one begin/commit/rollback unit against the
//!   underlying resource.
//! - **Logical scope**: one manager-issued begin/commit/rollback request,
//!   which may own a physical transaction or merely join one.
//!
//! The [`TransactionManager`] dispatches on [`Propagation`] to decide
//! which: `Required` joins the active transaction, `RequiresNew` suspends
//! it and starts an independent one. A joined scope's rollback marks the
//! shared transaction rollback-only; the owning commit then fails with
//! an unexpected-rollback error instead of silently losing the rollback.

mod context;
mod manager;
mod state;

pub use context::ExecutionContext;
pub use manager::TransactionManager;
pub use state::{PhysicalTxn, Propagation, TransactionScope, TxnState};
