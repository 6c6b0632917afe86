//! Diff between a parent's stored children and a desired child set.
//!
//! # Responsibility
//! - Compute additions, removals and updates for one company's employees.
//! - Stay storage-free; repositories apply the result.
//!
//! # Invariants
//! - Every desired child is re-keyed under the parent before comparison.
//! - Desired children with the same employee number collapse to the first.
//! - Output vectors are ordered by employee number.

use crate::model::company::CompanyId;
use crate::model::employee::{Employee, EmployeeId};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildSetDiff {
    /// Desired children with no stored counterpart.
    pub added: Vec<Employee>,
    /// Stored children absent from the desired set (orphans).
    pub removed: Vec<EmployeeId>,
    /// Children present on both sides whose attributes changed.
    pub updated: Vec<Employee>,
}

impl ChildSetDiff {
    pub fn compute(parent: CompanyId, current: &[Employee], desired: &[Employee]) -> Self {
        let mut wanted: BTreeMap<i64, Employee> = BTreeMap::new();
        for employee in desired {
            let employee = employee.reparented(parent);
            wanted
                .entry(employee.id().employee_number())
                .or_insert(employee);
        }

        let stored: BTreeMap<i64, &Employee> = current
            .iter()
            .map(|employee| (employee.id().employee_number(), employee))
            .collect();

        let mut diff = Self::default();
        for (number, employee) in &stored {
            if !wanted.contains_key(number) {
                diff.removed.push(employee.id());
            }
        }
        for (number, employee) in wanted {
            match stored.get(&number) {
                None => diff.added.push(employee),
                Some(existing) if existing.name != employee.name => diff.updated.push(employee),
                Some(_) => {}
            }
        }
        diff
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::ChildSetDiff;
    use crate::model::employee::{Employee, EmployeeId};

    fn employee(company_id: i64, number: i64, name: &str) -> Employee {
        Employee::new(EmployeeId::new(company_id, number), name)
    }

    #[test]
    fn clear_and_readd_replaces_whole_set() {
        let current = vec![employee(1, 100, "Vlad Mihalcea")];
        let desired = vec![employee(1, 200, "Vlad Mihalcea")];

        let diff = ChildSetDiff::compute(1, &current, &desired);
        assert_eq!(diff.removed, vec![EmployeeId::new(1, 100)]);
        assert_eq!(diff.added, vec![employee(1, 200, "Vlad Mihalcea")]);
        assert!(diff.updated.is_empty());
    }

    #[test]
    fn foreign_keyed_children_are_reparented() {
        let desired = vec![employee(2, 200, "moved")];
        let diff = ChildSetDiff::compute(1, &[], &desired);
        assert_eq!(diff.added[0].id(), EmployeeId::new(1, 200));
    }

    #[test]
    fn renamed_child_is_updated_not_replaced() {
        let current = vec![employee(1, 100, "old")];
        let desired = vec![employee(1, 100, "new")];

        let diff = ChildSetDiff::compute(1, &current, &desired);
        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());
        assert_eq!(diff.updated, vec![employee(1, 100, "new")]);
    }

    #[test]
    fn duplicate_numbers_keep_first_occurrence() {
        let desired = vec![employee(1, 5, "first"), employee(1, 5, "second")];
        let diff = ChildSetDiff::compute(1, &[], &desired);
        assert_eq!(diff.added, vec![employee(1, 5, "first")]);
    }

    #[test]
    fn identical_sets_produce_empty_diff() {
        let set = vec![employee(1, 1, "a"), employee(1, 2, "b")];
        assert!(ChildSetDiff::compute(1, &set, &set).is_empty());
    }
}
