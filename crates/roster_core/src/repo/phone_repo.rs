//! Phone repository contracts and SQLite implementation.
//!
//! # Invariants
//! - A phone can only be written when the employee it references exists.
//! - `number` is unique across all companies.

use crate::model::employee::EmployeeId;
use crate::model::phone::Phone;
use crate::repo::employee_repo::employee_exists;
use crate::repo::ensure_connection_ready;
use crate::repo::error::{EntityKey, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const PHONE_SELECT_SQL: &str = "SELECT
    number,
    company_id,
    employee_number
FROM phone";

/// Repository interface for phone operations.
pub trait PhoneRepository {
    fn insert_phone(&self, phone: &Phone) -> RepoResult<()>;
    /// Inserts or re-points a phone by number.
    fn save_phone(&self, phone: &Phone) -> RepoResult<()>;
    fn get_phone(&self, number: &str) -> RepoResult<Option<Phone>>;
    fn list_by_employee(&self, employee: EmployeeId) -> RepoResult<Vec<Phone>>;
    fn delete_phone(&self, number: &str) -> RepoResult<()>;
}

/// SQLite-backed phone repository.
pub struct SqlitePhoneRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePhoneRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn from_ready(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PhoneRepository for SqlitePhoneRepository<'_> {
    fn insert_phone(&self, phone: &Phone) -> RepoResult<()> {
        phone.validate()?;
        ensure_employee_for(self.conn, phone)?;
        if self.get_phone(phone.number())?.is_some() {
            return Err(RepoError::duplicate(phone_key(phone.number())));
        }

        self.conn
            .execute(
                "INSERT INTO phone (number, company_id, employee_number)
                 VALUES (?1, ?2, ?3);",
                params![
                    phone.number(),
                    phone.employee.company_id(),
                    phone.employee.employee_number(),
                ],
            )
            .map_err(|err| RepoError::from_write(err, phone_key(phone.number())))?;
        Ok(())
    }

    fn save_phone(&self, phone: &Phone) -> RepoResult<()> {
        phone.validate()?;
        ensure_employee_for(self.conn, phone)?;

        self.conn
            .execute(
                "INSERT INTO phone (number, company_id, employee_number)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (number) DO UPDATE SET
                    company_id = excluded.company_id,
                    employee_number = excluded.employee_number;",
                params![
                    phone.number(),
                    phone.employee.company_id(),
                    phone.employee.employee_number(),
                ],
            )
            .map_err(|err| RepoError::from_write(err, phone_key(phone.number())))?;
        Ok(())
    }

    fn get_phone(&self, number: &str) -> RepoResult<Option<Phone>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PHONE_SELECT_SQL} WHERE number = ?1;"))?;
        let mut rows = stmt.query([number])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_phone_row(row)?));
        }
        Ok(None)
    }

    fn list_by_employee(&self, employee: EmployeeId) -> RepoResult<Vec<Phone>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PHONE_SELECT_SQL}
             WHERE company_id = ?1
               AND employee_number = ?2
             ORDER BY number ASC;"
        ))?;
        let mut rows = stmt.query(params![employee.company_id(), employee.employee_number()])?;
        let mut phones = Vec::new();
        while let Some(row) = rows.next()? {
            phones.push(parse_phone_row(row)?);
        }
        Ok(phones)
    }

    fn delete_phone(&self, number: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM phone WHERE number = ?1;", [number])?;
        if changed == 0 {
            return Err(RepoError::NotFound(phone_key(number)));
        }
        Ok(())
    }
}

fn phone_key(number: &str) -> EntityKey {
    EntityKey::Phone(number.to_string())
}

fn ensure_employee_for(conn: &Connection, phone: &Phone) -> RepoResult<()> {
    if employee_exists(conn, phone.employee)? {
        return Ok(());
    }
    Err(RepoError::missing_parent(
        phone_key(phone.number()),
        EntityKey::Employee(phone.employee),
    ))
}

fn parse_phone_row(row: &Row<'_>) -> RepoResult<Phone> {
    let number: String = row.get("number")?;
    let employee = EmployeeId::new(row.get("company_id")?, row.get("employee_number")?);
    let phone = Phone::new(number, employee);
    phone
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("invalid phone row: {err}")))?;
    Ok(phone)
}
