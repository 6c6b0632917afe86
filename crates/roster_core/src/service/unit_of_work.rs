//! Transactional unit of work over the roster repositories.
//!
//! # Responsibility
//! - Scope reads and writes to one IMMEDIATE SQLite transaction.
//! - Expose `find`/`persist`/`merge`/`remove` per entity kind.
//!
//! # Invariants
//! - Work that returns `Ok` is committed; work that returns `Err` is rolled
//!   back and the original error is returned.
//! - A panic inside the work drops the transaction, which rolls it back.
//! - Writes are invisible to other units until commit.

use crate::model::child_diff::ChildSetDiff;
use crate::model::company::{Company, CompanyGraph, CompanyId};
use crate::model::employee::{Employee, EmployeeId};
use crate::model::identity::{CompanyEquality, EmployeeKeyIdentity};
use crate::model::phone::Phone;
use crate::repo::company_repo::{CompanyRepository, SqliteCompanyRepository};
use crate::repo::employee_repo::{EmployeeRepository, SqliteEmployeeRepository};
use crate::repo::ensure_connection_ready;
use crate::repo::error::{EntityKey, RepoError, RepoResult};
use crate::repo::phone_repo::{PhoneRepository, SqlitePhoneRepository};
use log::{debug, error, warn};
use rusqlite::{Connection, TransactionBehavior};
use std::time::Instant;

/// Runs `work` in one transaction using name-based company equality.
pub fn run_in_transaction<T, F>(conn: &mut Connection, work: F) -> RepoResult<T>
where
    F: FnOnce(&UnitOfWork<'_>) -> RepoResult<T>,
{
    run_in_transaction_with(conn, CompanyEquality::default(), work)
}

/// Runs `work` in one transaction.
///
/// # Errors
/// - Returns whatever `work` returns, after rolling back.
/// - Returns `Db` errors from begin/commit.
/// - Returns `UninitializedConnection`/`Missing*` when `conn` is not migrated.
pub fn run_in_transaction_with<T, F>(
    conn: &mut Connection,
    equality: CompanyEquality,
    work: F,
) -> RepoResult<T>
where
    F: FnOnce(&UnitOfWork<'_>) -> RepoResult<T>,
{
    let started_at = Instant::now();
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    debug!("event=uow module=service status=start");

    let outcome = {
        let uow = UnitOfWork::try_new(&tx, equality)?;
        work(&uow)
    };

    match outcome {
        Ok(value) => {
            tx.commit()?;
            debug!(
                "event=uow module=service status=commit duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                error!(
                    "event=uow module=service status=error error_code=rollback_failed error={}",
                    rollback_err
                );
            }
            warn!(
                "event=uow module=service status=rollback duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Persistence facade bound to one open transaction.
pub struct UnitOfWork<'tx> {
    companies: SqliteCompanyRepository<'tx>,
    employees: SqliteEmployeeRepository<'tx>,
    phones: SqlitePhoneRepository<'tx>,
    equality: CompanyEquality,
}

impl<'tx> UnitOfWork<'tx> {
    fn try_new(conn: &'tx Connection, equality: CompanyEquality) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self {
            companies: SqliteCompanyRepository::from_ready(conn),
            employees: SqliteEmployeeRepository::from_ready(conn),
            phones: SqlitePhoneRepository::from_ready(conn),
            equality,
        })
    }

    pub fn equality(&self) -> CompanyEquality {
        self.equality
    }

    pub fn find_company(&self, id: CompanyId) -> RepoResult<Option<Company>> {
        self.companies.get_company(id)
    }

    /// Loads a company with its employee collection.
    pub fn find_company_graph(&self, id: CompanyId) -> RepoResult<Option<CompanyGraph>> {
        self.companies.get_graph(id)
    }

    /// Exact key lookup. A key whose company does not exist is not found.
    pub fn find_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        self.employees.get_employee(id)
    }

    pub fn find_phone(&self, number: &str) -> RepoResult<Option<Phone>> {
        self.phones.get_phone(number)
    }

    pub fn require_company(&self, id: CompanyId) -> RepoResult<Company> {
        self.find_company(id)?
            .ok_or(RepoError::NotFound(EntityKey::Company(id)))
    }

    pub fn require_company_graph(&self, id: CompanyId) -> RepoResult<CompanyGraph> {
        self.find_company_graph(id)?
            .ok_or(RepoError::NotFound(EntityKey::Company(id)))
    }

    pub fn require_employee(&self, id: EmployeeId) -> RepoResult<Employee> {
        self.find_employee(id)?
            .ok_or(RepoError::NotFound(EntityKey::Employee(id)))
    }

    pub fn require_phone(&self, number: &str) -> RepoResult<Phone> {
        self.find_phone(number)?
            .ok_or_else(|| RepoError::NotFound(EntityKey::Phone(number.to_string())))
    }

    pub fn list_employees(&self, company_id: CompanyId) -> RepoResult<Vec<Employee>> {
        self.employees.list_by_company(company_id)
    }

    pub fn list_phones(&self, employee: EmployeeId) -> RepoResult<Vec<Phone>> {
        self.phones.list_by_employee(employee)
    }

    /// Inserts a company and every employee in its collection.
    pub fn persist_company(&self, graph: &CompanyGraph) -> RepoResult<()> {
        self.companies.persist_graph(graph)
    }

    pub fn persist_employee(&self, employee: &Employee) -> RepoResult<EmployeeId> {
        self.employees.insert_employee(employee)
    }

    pub fn persist_phone(&self, phone: &Phone) -> RepoResult<()> {
        self.phones.insert_phone(phone)
    }

    /// Upserts only the company row; the employee collection is untouched.
    pub fn save_company(&self, company: &Company) -> RepoResult<()> {
        self.companies.save_company(company)
    }

    pub fn save_employee(&self, employee: &Employee) -> RepoResult<()> {
        self.employees.save_employee(employee)
    }

    pub fn save_phone(&self, phone: &Phone) -> RepoResult<()> {
        self.phones.save_phone(phone)
    }

    /// Replaces a company's employees, deleting orphans.
    pub fn set_employees(
        &self,
        company_id: CompanyId,
        employees: &[Employee],
    ) -> RepoResult<ChildSetDiff> {
        self.companies.set_employees(company_id, employees)
    }

    /// Reconciles a detached graph and returns the managed state.
    pub fn merge_company(&self, graph: &CompanyGraph) -> RepoResult<CompanyGraph> {
        self.companies.merge_graph(graph)
    }

    pub fn remove_company(&self, id: CompanyId) -> RepoResult<()> {
        self.companies.remove_company(id)
    }

    pub fn remove_employee(&self, id: EmployeeId) -> RepoResult<()> {
        self.employees.delete_employee(id)
    }

    pub fn remove_phone(&self, number: &str) -> RepoResult<()> {
        self.phones.delete_phone(number)
    }

    /// Resolves `id` with this unit's company equality strategy.
    pub fn resolve_employee_key(&self, id: EmployeeId) -> RepoResult<EmployeeKeyIdentity> {
        self.employees.resolve_key(id, self.equality)
    }

    /// Whether two stored keys denote the same employee under this unit's
    /// company equality strategy.
    pub fn same_employee_key(&self, left: EmployeeId, right: EmployeeId) -> RepoResult<bool> {
        Ok(self.resolve_employee_key(left)? == self.resolve_employee_key(right)?)
    }
}
