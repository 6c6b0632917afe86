//! Employee record and its composite key.
//!
//! # Responsibility
//! - Define `EmployeeId`, the `(company_id, employee_number)` primary key.
//! - Define the `Employee` record stored in the `employee` table.
//!
//! # Invariants
//! - `EmployeeId` holds the owning company's primary key, not the company
//!   record itself. Derived equality is storage identity.
//! - An employee's key cannot be reassigned after construction.
//!
//! # See also
//! - `model::identity` for equality through the company's own rules.

use crate::model::company::{Company, CompanyId};
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Composite primary key of an employee.
///
/// Also embedded in `phone` as the `(company_id, employee_number)` foreign
/// key columns.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EmployeeId {
    company_id: CompanyId,
    employee_number: i64,
}

impl EmployeeId {
    pub fn new(company_id: CompanyId, employee_number: i64) -> Self {
        Self {
            company_id,
            employee_number,
        }
    }

    /// Builds a key owned by `company`.
    pub fn of(company: &Company, employee_number: i64) -> Self {
        Self::new(company.id, employee_number)
    }

    pub fn company_id(&self) -> CompanyId {
        self.company_id
    }

    pub fn employee_number(&self) -> i64 {
        self.employee_number
    }

    /// Returns the same employee number keyed under another company.
    pub(crate) fn under(self, company_id: CompanyId) -> Self {
        Self::new(company_id, self.employee_number)
    }
}

impl Display for EmployeeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.company_id, self.employee_number)
    }
}

/// Employee record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    id: EmployeeId,
    pub name: String,
}

impl Employee {
    pub fn new(id: EmployeeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> EmployeeId {
        self.id
    }

    /// Re-keys this employee under `company_id`, keeping its number.
    ///
    /// Used when a child is attached to a parent collection.
    pub(crate) fn reparented(&self, company_id: CompanyId) -> Self {
        Self {
            id: self.id.under(company_id),
            name: self.name.clone(),
        }
    }

    /// Checks write-path invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankEmployeeName(self.id));
        }
        Ok(())
    }
}
