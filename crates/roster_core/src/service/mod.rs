//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into transactional units of work.
//! - Keep callers decoupled from storage details.

pub mod roster_service;
pub mod unit_of_work;
