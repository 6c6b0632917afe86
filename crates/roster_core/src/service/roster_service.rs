//! Roster use-case service.
//!
//! # Responsibility
//! - Own a migrated connection and the company equality strategy.
//! - Offer one-call use cases, each running in its own unit of work.
//!
//! # Invariants
//! - Every public use case is atomic.
//! - Service APIs never bypass repository validation.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::model::child_diff::ChildSetDiff;
use crate::model::company::{CompanyGraph, CompanyId};
use crate::model::employee::{Employee, EmployeeId};
use crate::model::identity::CompanyEquality;
use crate::model::phone::Phone;
use crate::repo::error::RepoResult;
use crate::service::unit_of_work::{run_in_transaction_with, UnitOfWork};
use rusqlite::Connection;
use std::path::Path;

/// Transactional entry point for roster callers.
pub struct RosterService {
    conn: Connection,
    equality: CompanyEquality,
}

impl RosterService {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            equality: CompanyEquality::default(),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    /// Selects how companies embedded in keys are compared.
    pub fn with_equality(mut self, equality: CompanyEquality) -> Self {
        self.equality = equality;
        self
    }

    pub fn equality(&self) -> CompanyEquality {
        self.equality
    }

    /// Runs arbitrary work in one unit of work.
    pub fn run_in_transaction<T, F>(&mut self, work: F) -> RepoResult<T>
    where
        F: FnOnce(&UnitOfWork<'_>) -> RepoResult<T>,
    {
        run_in_transaction_with(&mut self.conn, self.equality, work)
    }

    /// Creates a company together with its initial employees.
    pub fn register_company(&mut self, graph: &CompanyGraph) -> RepoResult<()> {
        self.run_in_transaction(|uow| uow.persist_company(graph))
    }

    /// Adds one employee to an existing company.
    pub fn hire(
        &mut self,
        company_id: CompanyId,
        employee_number: i64,
        name: &str,
    ) -> RepoResult<Employee> {
        let employee = Employee::new(EmployeeId::new(company_id, employee_number), name);
        self.run_in_transaction(|uow| {
            uow.persist_employee(&employee)?;
            uow.require_employee(employee.id())
        })
    }

    /// Assigns a new phone number to an existing employee.
    pub fn assign_phone(&mut self, number: &str, employee: EmployeeId) -> RepoResult<Phone> {
        let phone = Phone::new(number, employee);
        self.run_in_transaction(|uow| {
            uow.persist_phone(&phone)?;
            uow.require_phone(phone.number())
        })
    }

    /// Replaces a company's whole employee set.
    pub fn replace_employees(
        &mut self,
        company_id: CompanyId,
        employees: &[Employee],
    ) -> RepoResult<ChildSetDiff> {
        self.run_in_transaction(|uow| uow.set_employees(company_id, employees))
    }

    /// Merges a detached company graph and returns the managed state.
    pub fn merge_company(&mut self, graph: &CompanyGraph) -> RepoResult<CompanyGraph> {
        self.run_in_transaction(|uow| uow.merge_company(graph))
    }

    pub fn company(&mut self, id: CompanyId) -> RepoResult<Option<CompanyGraph>> {
        self.run_in_transaction(|uow| uow.find_company_graph(id))
    }

    pub fn phone(&mut self, number: &str) -> RepoResult<Option<Phone>> {
        self.run_in_transaction(|uow| uow.find_phone(number))
    }

    /// Releases the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }
}
