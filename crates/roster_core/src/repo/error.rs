//! Repository error taxonomy.

use crate::db::DbError;
use crate::model::company::CompanyId;
use crate::model::employee::EmployeeId;
use crate::model::validation::ValidationError;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Key of any stored entity, used in error reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKey {
    Company(CompanyId),
    Employee(EmployeeId),
    Phone(String),
}

impl Display for EntityKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Company(id) => write!(f, "company {id}"),
            Self::Employee(id) => write!(f, "employee {id}"),
            Self::Phone(number) => write!(f, "phone `{number}`"),
        }
    }
}

/// Error for roster persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    /// Key lookup miss on a path that requires the entity.
    NotFound(EntityKey),
    /// Referenced parent is missing, or the key is already taken.
    ReferentialIntegrity { key: EntityKey, reason: String },
    /// Removing the employee would leave these phones dangling.
    OrphanDeletion {
        employee: EmployeeId,
        phone_numbers: Vec<String>,
    },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl RepoError {
    pub(crate) fn duplicate(key: EntityKey) -> Self {
        Self::ReferentialIntegrity {
            key,
            reason: "key already exists".to_string(),
        }
    }

    pub(crate) fn missing_parent(key: EntityKey, parent: EntityKey) -> Self {
        Self::ReferentialIntegrity {
            key,
            reason: format!("referenced {parent} does not exist"),
        }
    }

    /// Maps SQLite constraint failures on a write of `key` to
    /// `ReferentialIntegrity`; everything else stays a transport error.
    pub(crate) fn from_write(err: rusqlite::Error, key: EntityKey) -> Self {
        if err.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
            return Self::ReferentialIntegrity {
                key,
                reason: err.to_string(),
            };
        }
        Self::from(err)
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(key) => write!(f, "{key} not found"),
            Self::ReferentialIntegrity { key, reason } => {
                write!(f, "referential integrity violation for {key}: {reason}")
            }
            Self::OrphanDeletion {
                employee,
                phone_numbers,
            } => write!(
                f,
                "cannot remove employee {employee}: still referenced by phones [{}]",
                phone_numbers.join(", ")
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "roster repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "roster repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "roster repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted roster data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::ReferentialIntegrity { .. } => None,
            Self::OrphanDeletion { .. } => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
