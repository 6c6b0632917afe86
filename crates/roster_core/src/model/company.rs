//! Company aggregate root.
//!
//! # Responsibility
//! - Define the `Company` record and its detached `CompanyGraph` shape.
//! - Own the name-based equality used when companies appear inside keys.
//!
//! # Invariants
//! - `id` is assigned by the caller and never generated.
//! - Equality and hashing look at `name` only. Two companies with different
//!   ids and the same name compare equal.
//! - Every employee in a `CompanyGraph` is keyed under the graph's company.

use crate::model::employee::{Employee, EmployeeId};
use crate::model::identity::CompanyEquality;
use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// User-assigned primary key of a company.
pub type CompanyId = i64;

/// Company record as stored in the `company` table.
///
/// `PartialEq`/`Hash` follow [`CompanyEquality::Name`]. Use
/// [`CompanyEquality::Id`] explicitly when storage identity is needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
}

impl Company {
    pub fn new(id: CompanyId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Checks write-path invariants.
    ///
    /// # Errors
    /// - `BlankCompanyName` when `name` is empty or whitespace only.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankCompanyName(self.id));
        }
        Ok(())
    }
}

impl PartialEq for Company {
    fn eq(&self, other: &Self) -> bool {
        CompanyEquality::Name.equals(self, other)
    }
}

impl Eq for Company {}

impl Hash for Company {
    fn hash<H: Hasher>(&self, state: &mut H) {
        CompanyEquality::Name.identity(self).hash(state);
    }
}

/// Detached company together with its owned employee collection.
///
/// This is the unit passed to `merge_company`: whatever `employees` holds
/// becomes the company's complete employee set once merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyGraph {
    pub company: Company,
    pub employees: Vec<Employee>,
}

impl CompanyGraph {
    pub fn new(company: Company) -> Self {
        Self {
            company,
            employees: Vec::new(),
        }
    }

    /// Adds an employee keyed under this graph's company.
    pub fn add_employee(&mut self, employee_number: i64, name: impl Into<String>) -> EmployeeId {
        let id = EmployeeId::new(self.company.id, employee_number);
        self.employees.push(Employee::new(id, name));
        id
    }

    /// Builder form of [`CompanyGraph::add_employee`].
    pub fn with_employee(mut self, employee_number: i64, name: impl Into<String>) -> Self {
        self.add_employee(employee_number, name);
        self
    }

    /// Drops every employee from the detached collection.
    ///
    /// Once merged, the dropped employees are deleted (orphan removal).
    pub fn clear_employees(&mut self) {
        self.employees.clear();
    }

    pub fn employee_numbers(&self) -> Vec<i64> {
        self.employees
            .iter()
            .map(|employee| employee.id().employee_number())
            .collect()
    }
}
