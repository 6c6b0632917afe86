//! Core domain logic for the roster store.
//! Companies own employees keyed by `(company, employee number)`; phones
//! reference employees through that composite key.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::DbOptions;
pub use logging::{
    default_log_level, init_logging, init_logging_with, logging_status, LoggingConfig, LoggingError,
};
pub use model::child_diff::ChildSetDiff;
pub use model::company::{Company, CompanyGraph, CompanyId};
pub use model::employee::{Employee, EmployeeId};
pub use model::identity::{CompanyEquality, CompanyIdentity, EmployeeKeyIdentity};
pub use model::phone::{validate_phone_number, Phone};
pub use model::validation::ValidationError;
pub use repo::company_repo::{CompanyRepository, SqliteCompanyRepository};
pub use repo::employee_repo::{EmployeeRepository, SqliteEmployeeRepository};
pub use repo::error::{EntityKey, RepoError, RepoResult};
pub use repo::phone_repo::{PhoneRepository, SqlitePhoneRepository};
pub use service::roster_service::RosterService;
pub use service::unit_of_work::{run_in_transaction, run_in_transaction_with, UnitOfWork};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
