//! Model validation errors shared by all entity kinds.

use crate::model::company::CompanyId;
use crate::model::employee::EmployeeId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failure raised before any write reaches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Company names participate in company equality and must not be blank.
    BlankCompanyName(CompanyId),
    BlankEmployeeName(EmployeeId),
    /// Phone number does not look like a dialable number.
    InvalidPhoneNumber(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankCompanyName(id) => write!(f, "company {id} must have a non-blank name"),
            Self::BlankEmployeeName(id) => write!(f, "employee {id} must have a non-blank name"),
            Self::InvalidPhoneNumber(number) => write!(f, "invalid phone number `{number}`"),
        }
    }
}

impl Error for ValidationError {}
