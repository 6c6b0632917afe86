//! Key-equality strategy for keys that embed a company reference.
//!
//! # Responsibility
//! - Make the company equality rule an explicit, selectable strategy.
//! - Resolve an `EmployeeId` into a hashable identity that compares the
//!   embedded company with that strategy.
//!
//! # Invariants
//! - Two resolved employee keys are equal iff their company identities are
//!   equal under the chosen strategy and their employee numbers are equal.
//! - Under `CompanyEquality::Name`, employees numbered the same under two
//!   companies that share a name collide.

use crate::model::company::{Company, CompanyId};
use crate::model::employee::EmployeeId;
use serde::{Deserialize, Serialize};

/// How two companies are compared when they appear inside a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyEquality {
    /// Compare by `name` only. Matches `Company`'s own `PartialEq`.
    #[default]
    Name,
    /// Compare by primary key.
    Id,
}

impl CompanyEquality {
    pub fn identity(self, company: &Company) -> CompanyIdentity {
        match self {
            Self::Name => CompanyIdentity::Name(company.name.clone()),
            Self::Id => CompanyIdentity::Id(company.id),
        }
    }

    pub fn equals(self, left: &Company, right: &Company) -> bool {
        match self {
            Self::Name => left.name == right.name,
            Self::Id => left.id == right.id,
        }
    }
}

/// The part of a company that takes part in equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CompanyIdentity {
    Name(String),
    Id(CompanyId),
}

/// An `EmployeeId` with its company reference resolved through a strategy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmployeeKeyIdentity {
    pub company: CompanyIdentity,
    pub employee_number: i64,
}

impl EmployeeKeyIdentity {
    /// Resolves `key` against its owning `company`.
    ///
    /// Returns `None` when `company` is not the company `key` points at.
    pub fn resolve(key: EmployeeId, company: &Company, equality: CompanyEquality) -> Option<Self> {
        if key.company_id() != company.id {
            return None;
        }
        Some(Self {
            company: equality.identity(company),
            employee_number: key.employee_number(),
        })
    }
}
