//! Company repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist companies and cascade writes to their employee collection.
//! - Own the diff-and-apply replacement of a company's employees.
//!
//! # Invariants
//! - The employee collection is owned: children dropped from it are
//!   deleted (orphan removal), new children are inserted under the company.
//! - Removing a company removes all of its employees first.
//! - Every multi-statement write here is atomic.

use crate::model::child_diff::ChildSetDiff;
use crate::model::company::{Company, CompanyGraph, CompanyId};
use crate::model::employee::{Employee, EmployeeId};
use crate::repo::employee_repo::{
    phone_numbers_for, EmployeeRepository, SqliteEmployeeRepository,
};
use crate::repo::error::{EntityKey, RepoError, RepoResult};
use crate::repo::{ensure_connection_ready, in_write_scope};
use log::{debug, info};
use rusqlite::{params, Connection, Row};
use std::collections::BTreeSet;

/// Repository interface for company aggregate operations.
pub trait CompanyRepository {
    /// Inserts a company row. Fails if the id is taken.
    fn insert_company(&self, company: &Company) -> RepoResult<CompanyId>;
    /// Inserts or updates a company row by id.
    fn save_company(&self, company: &Company) -> RepoResult<()>;
    fn get_company(&self, id: CompanyId) -> RepoResult<Option<Company>>;
    /// Loads a company together with its employees.
    fn get_graph(&self, id: CompanyId) -> RepoResult<Option<CompanyGraph>>;
    /// Inserts a company and cascades the insert to its employees.
    fn persist_graph(&self, graph: &CompanyGraph) -> RepoResult<()>;
    /// Replaces the company's employee set and returns the applied diff.
    fn set_employees(&self, id: CompanyId, employees: &[Employee]) -> RepoResult<ChildSetDiff>;
    /// Reconciles a detached graph into storage and returns the stored state.
    fn merge_graph(&self, graph: &CompanyGraph) -> RepoResult<CompanyGraph>;
    /// Deletes a company and cascades the delete to its employees.
    fn remove_company(&self, id: CompanyId) -> RepoResult<()>;
}

/// SQLite-backed company repository.
pub struct SqliteCompanyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCompanyRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn from_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CompanyRepository for SqliteCompanyRepository<'_> {
    fn insert_company(&self, company: &Company) -> RepoResult<CompanyId> {
        insert_company_row(self.conn, company)?;
        Ok(company.id)
    }

    fn save_company(&self, company: &Company) -> RepoResult<()> {
        company.validate()?;
        self.conn
            .execute(
                "INSERT INTO company (id, name)
                 VALUES (?1, ?2)
                 ON CONFLICT (id) DO UPDATE SET name = excluded.name;",
                params![company.id, company.name.as_str()],
            )
            .map_err(|err| RepoError::from_write(err, EntityKey::Company(company.id)))?;
        Ok(())
    }

    fn get_company(&self, id: CompanyId) -> RepoResult<Option<Company>> {
        load_company(self.conn, id)
    }

    fn get_graph(&self, id: CompanyId) -> RepoResult<Option<CompanyGraph>> {
        load_graph(self.conn, id)
    }

    fn persist_graph(&self, graph: &CompanyGraph) -> RepoResult<()> {
        graph.company.validate()?;
        for employee in &graph.employees {
            employee.validate()?;
        }

        let mut seen = BTreeSet::new();
        for employee in &graph.employees {
            if !seen.insert(employee.id().employee_number()) {
                return Err(RepoError::duplicate(EntityKey::Employee(
                    employee.reparented(graph.company.id).id(),
                )));
            }
        }

        in_write_scope(self.conn, |conn| {
            insert_company_row(conn, &graph.company)?;
            let employees = SqliteEmployeeRepository::from_ready(conn);
            let cascade = ChildSetDiff::compute(graph.company.id, &[], &graph.employees);
            for employee in &cascade.added {
                employees.insert_employee(employee)?;
            }
            debug!(
                "event=cascade_persist module=repo status=ok company_id={} employees={}",
                graph.company.id,
                cascade.added.len()
            );
            Ok(())
        })
    }

    fn set_employees(&self, id: CompanyId, employees: &[Employee]) -> RepoResult<ChildSetDiff> {
        in_write_scope(self.conn, |conn| replace_employees(conn, id, employees))
    }

    fn merge_graph(&self, graph: &CompanyGraph) -> RepoResult<CompanyGraph> {
        in_write_scope(self.conn, |conn| {
            let companies = SqliteCompanyRepository::from_ready(conn);
            companies.save_company(&graph.company)?;
            replace_employees(conn, graph.company.id, &graph.employees)?;
            load_graph(conn, graph.company.id)?
                .ok_or(RepoError::NotFound(EntityKey::Company(graph.company.id)))
        })
    }

    fn remove_company(&self, id: CompanyId) -> RepoResult<()> {
        in_write_scope(self.conn, |conn| {
            if !company_exists(conn, id)? {
                return Err(RepoError::NotFound(EntityKey::Company(id)));
            }

            let employees = SqliteEmployeeRepository::from_ready(conn);
            let owned = employees.list_by_company(id)?;
            let owned_ids: Vec<EmployeeId> = owned.iter().map(Employee::id).collect();
            ensure_no_phone_holders(conn, &owned_ids)?;
            for employee in &owned {
                employees.delete_employee(employee.id())?;
            }
            conn.execute("DELETE FROM company WHERE id = ?1;", [id])?;

            info!(
                "event=cascade_remove module=repo status=ok company_id={} employees_removed={}",
                id,
                owned.len()
            );
            Ok(())
        })
    }
}

pub(crate) fn company_exists(conn: &Connection, id: CompanyId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM company WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn load_company(conn: &Connection, id: CompanyId) -> RepoResult<Option<Company>> {
    let mut stmt = conn.prepare("SELECT id, name FROM company WHERE id = ?1;")?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_company_row(row)?));
    }
    Ok(None)
}

fn load_graph(conn: &Connection, id: CompanyId) -> RepoResult<Option<CompanyGraph>> {
    let Some(company) = load_company(conn, id)? else {
        return Ok(None);
    };
    let employees = SqliteEmployeeRepository::from_ready(conn).list_by_company(id)?;
    Ok(Some(CompanyGraph { company, employees }))
}

fn insert_company_row(conn: &Connection, company: &Company) -> RepoResult<()> {
    company.validate()?;
    if company_exists(conn, company.id)? {
        return Err(RepoError::duplicate(EntityKey::Company(company.id)));
    }

    conn.execute(
        "INSERT INTO company (id, name) VALUES (?1, ?2);",
        params![company.id, company.name.as_str()],
    )
    .map_err(|err| RepoError::from_write(err, EntityKey::Company(company.id)))?;
    Ok(())
}

fn replace_employees(
    conn: &Connection,
    id: CompanyId,
    desired: &[Employee],
) -> RepoResult<ChildSetDiff> {
    if !company_exists(conn, id)? {
        return Err(RepoError::NotFound(EntityKey::Company(id)));
    }
    for employee in desired {
        employee.validate()?;
    }

    let employees = SqliteEmployeeRepository::from_ready(conn);
    let current = employees.list_by_company(id)?;
    let diff = ChildSetDiff::compute(id, &current, desired);
    ensure_no_phone_holders(conn, &diff.removed)?;

    for removed in &diff.removed {
        employees.delete_employee(*removed)?;
    }
    for updated in &diff.updated {
        employees.save_employee(updated)?;
    }
    for added in &diff.added {
        employees.insert_employee(added)?;
    }

    if !diff.removed.is_empty() {
        info!(
            "event=orphan_removal module=repo status=ok company_id={} removed={}",
            id,
            diff.removed.len()
        );
    }
    debug!(
        "event=set_employees module=repo status=ok company_id={} added={} updated={} removed={}",
        id,
        diff.added.len(),
        diff.updated.len(),
        diff.removed.len()
    );

    Ok(diff)
}

/// Fails before any delete when one of `doomed` still has phones.
fn ensure_no_phone_holders(conn: &Connection, doomed: &[EmployeeId]) -> RepoResult<()> {
    for &employee in doomed {
        let phone_numbers = phone_numbers_for(conn, employee)?;
        if !phone_numbers.is_empty() {
            return Err(RepoError::OrphanDeletion {
                employee,
                phone_numbers,
            });
        }
    }
    Ok(())
}

fn parse_company_row(row: &Row<'_>) -> RepoResult<Company> {
    let company = Company::new(row.get("id")?, row.get::<_, String>("name")?);
    company
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("invalid company row: {err}")))?;
    Ok(company)
}
