//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per entity kind.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate the model before persistence.
//! - Missing parents and duplicate keys surface as `ReferentialIntegrity`,
//!   never as raw SQLite errors.
//! - Multi-statement writes are atomic: they join the caller's transaction
//!   or open their own.

pub mod company_repo;
pub mod employee_repo;
pub mod error;
pub mod phone_repo;
mod schema;

pub(crate) use schema::{ensure_connection_ready, in_write_scope};
