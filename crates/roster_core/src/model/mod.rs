//! Domain model for companies, employees and phones.
//!
//! # Responsibility
//! - Define the records persisted by the roster store.
//! - Keep identity rules (single and composite keys) explicit and testable.
//!
//! # Invariants
//! - `Company` is identified by a user-assigned `CompanyId`.
//! - `Employee` is identified by the composite `EmployeeId`.
//! - `Phone` is identified by its globally unique number.

pub mod child_diff;
pub mod company;
pub mod employee;
pub mod identity;
pub mod phone;
pub mod validation;
