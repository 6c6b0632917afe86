//! Employee repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist employees under their `(company_id, employee_number)` key.
//! - Resolve composite keys through the company equality strategy.
//!
//! # Invariants
//! - An employee can only be written when its company exists.
//! - Removing an employee that still has phones fails with `OrphanDeletion`;
//!   phones are never cascaded.

use crate::model::company::CompanyId;
use crate::model::employee::{Employee, EmployeeId};
use crate::model::identity::{CompanyEquality, EmployeeKeyIdentity};
use crate::repo::company_repo::{company_exists, load_company};
use crate::repo::ensure_connection_ready;
use crate::repo::error::{EntityKey, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    company_id,
    employee_number,
    name
FROM employee";

/// Repository interface for employee operations.
pub trait EmployeeRepository {
    /// Inserts a new employee. Fails if the key is taken or the company is missing.
    fn insert_employee(&self, employee: &Employee) -> RepoResult<EmployeeId>;
    /// Inserts or updates by key. Fails if the company is missing.
    fn save_employee(&self, employee: &Employee) -> RepoResult<()>;
    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    /// Lists one company's employees ordered by employee number.
    fn list_by_company(&self, company_id: CompanyId) -> RepoResult<Vec<Employee>>;
    fn delete_employee(&self, id: EmployeeId) -> RepoResult<()>;
    /// Resolves `id` into an identity comparing its company by `equality`.
    fn resolve_key(
        &self,
        id: EmployeeId,
        equality: CompanyEquality,
    ) -> RepoResult<EmployeeKeyIdentity>;
}

/// SQLite-backed employee repository.
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn from_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn insert_employee(&self, employee: &Employee) -> RepoResult<EmployeeId> {
        employee.validate()?;
        let id = employee.id();
        ensure_company_for(self.conn, id)?;
        if employee_exists(self.conn, id)? {
            return Err(RepoError::duplicate(EntityKey::Employee(id)));
        }

        self.conn
            .execute(
                "INSERT INTO employee (company_id, employee_number, name)
                 VALUES (?1, ?2, ?3);",
                params![id.company_id(), id.employee_number(), employee.name.as_str()],
            )
            .map_err(|err| RepoError::from_write(err, EntityKey::Employee(id)))?;

        Ok(id)
    }

    fn save_employee(&self, employee: &Employee) -> RepoResult<()> {
        employee.validate()?;
        let id = employee.id();
        ensure_company_for(self.conn, id)?;

        self.conn
            .execute(
                "INSERT INTO employee (company_id, employee_number, name)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (company_id, employee_number)
                 DO UPDATE SET name = excluded.name;",
                params![id.company_id(), id.employee_number(), employee.name.as_str()],
            )
            .map_err(|err| RepoError::from_write(err, EntityKey::Employee(id)))?;

        Ok(())
    }

    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EMPLOYEE_SELECT_SQL}
             WHERE company_id = ?1
               AND employee_number = ?2;"
        ))?;

        let mut rows = stmt.query(params![id.company_id(), id.employee_number()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_employee_row(row)?));
        }

        Ok(None)
    }

    fn list_by_company(&self, company_id: CompanyId) -> RepoResult<Vec<Employee>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EMPLOYEE_SELECT_SQL}
             WHERE company_id = ?1
             ORDER BY employee_number ASC;"
        ))?;

        let mut rows = stmt.query([company_id])?;
        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            employees.push(parse_employee_row(row)?);
        }

        Ok(employees)
    }

    fn delete_employee(&self, id: EmployeeId) -> RepoResult<()> {
        let phone_numbers = phone_numbers_for(self.conn, id)?;
        if !phone_numbers.is_empty() {
            return Err(RepoError::OrphanDeletion {
                employee: id,
                phone_numbers,
            });
        }

        let changed = self.conn.execute(
            "DELETE FROM employee
             WHERE company_id = ?1
               AND employee_number = ?2;",
            params![id.company_id(), id.employee_number()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(EntityKey::Employee(id)));
        }

        Ok(())
    }

    fn resolve_key(
        &self,
        id: EmployeeId,
        equality: CompanyEquality,
    ) -> RepoResult<EmployeeKeyIdentity> {
        let company = load_company(self.conn, id.company_id())?
            .ok_or(RepoError::NotFound(EntityKey::Company(id.company_id())))?;

        EmployeeKeyIdentity::resolve(id, &company, equality).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "company {} loaded for key {id} has a different id",
                company.id
            ))
        })
    }
}

pub(crate) fn employee_exists(conn: &Connection, id: EmployeeId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM employee
            WHERE company_id = ?1
              AND employee_number = ?2
        );",
        params![id.company_id(), id.employee_number()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn ensure_company_for(conn: &Connection, id: EmployeeId) -> RepoResult<()> {
    if company_exists(conn, id.company_id())? {
        return Ok(());
    }
    Err(RepoError::missing_parent(
        EntityKey::Employee(id),
        EntityKey::Company(id.company_id()),
    ))
}

pub(crate) fn phone_numbers_for(conn: &Connection, id: EmployeeId) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT number
         FROM phone
         WHERE company_id = ?1
           AND employee_number = ?2
         ORDER BY number ASC;",
    )?;
    let mut rows = stmt.query(params![id.company_id(), id.employee_number()])?;
    let mut numbers = Vec::new();
    while let Some(row) = rows.next()? {
        numbers.push(row.get("number")?);
    }
    Ok(numbers)
}

fn parse_employee_row(row: &Row<'_>) -> RepoResult<Employee> {
    let id = EmployeeId::new(row.get("company_id")?, row.get("employee_number")?);
    let name: String = row.get("name")?;
    let employee = Employee::new(id, name);
    employee.validate().map_err(|err| {
        RepoError::InvalidData(format!("invalid employee row {id}: {err}"))
    })?;
    Ok(employee)
}
