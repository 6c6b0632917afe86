//! Phone record keyed by its number.
//!
//! # Invariants
//! - `number` is the only identity of a phone and is globally unique.
//! - `employee` must reference an existing employee when persisted.
//!   There is no cascade from employee to phone.

use crate::model::employee::EmployeeId;
use crate::model::validation::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static PHONE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?(?:[0-9(][0-9 ().-]*)?[0-9]$").expect("valid phone number regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
    number: String,
    /// Materialized as the `(company_id, employee_number)` columns.
    pub employee: EmployeeId,
}

impl Phone {
    pub fn new(number: impl Into<String>, employee: EmployeeId) -> Self {
        Self {
            number: number.into(),
            employee,
        }
    }

    pub fn number(&self) -> &str {
        self.number.as_str()
    }

    /// Checks write-path invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_phone_number(self.number.as_str())
    }
}

/// Rejects numbers that are empty, do not end in a digit, or contain
/// characters other than digits, a leading `+` and the separators
/// ` `, `-`, `.`, `(`, `)`.
pub fn validate_phone_number(number: &str) -> Result<(), ValidationError> {
    if PHONE_NUMBER_RE.is_match(number) {
        Ok(())
    } else {
        Err(ValidationError::InvalidPhoneNumber(number.to_string()))
    }
}
