use roster_core::db::open_db_in_memory;
use roster_core::{run_in_transaction, Company, CompanyGraph, Employee, EmployeeId, Phone};

#[test]
fn phone_lookup_returns_composite_employee_key() {
    let mut conn = open_db_in_memory().unwrap();

    let company = run_in_transaction(&mut conn, |uow| {
        let company = Company::new(1, "vladmihalcea.com");
        uow.persist_company(&CompanyGraph::new(company.clone()))?;
        Ok(company)
    })
    .unwrap();

    run_in_transaction(&mut conn, |uow| {
        let employee = Employee::new(EmployeeId::of(&company, 100), "Vlad Mihalcea");
        uow.persist_employee(&employee)
    })
    .unwrap();

    run_in_transaction(&mut conn, |uow| {
        let employee = uow.require_employee(EmployeeId::of(&company, 100))?;
        uow.persist_phone(&Phone::new("012-345-6789", employee.id()))
    })
    .unwrap();

    run_in_transaction(&mut conn, |uow| {
        let phone = uow.find_phone("012-345-6789")?.expect("phone persisted");
        assert_eq!(phone.employee, EmployeeId::new(1, 100));

        let employee = uow.require_employee(phone.employee)?;
        assert_eq!(employee.name, "Vlad Mihalcea");
        let owner = uow.find_company(employee.id().company_id())?.unwrap();
        assert_eq!(owner.id, company.id);
        assert_eq!(owner, company);
        Ok(())
    })
    .unwrap();
}

#[test]
fn merge_after_clear_and_readd_replaces_only_that_company_employees() {
    let mut conn = open_db_in_memory().unwrap();

    run_in_transaction(&mut conn, |uow| {
        uow.persist_company(
            &CompanyGraph::new(Company::new(1, "A.com")).with_employee(100, "Vlad Mihalcea"),
        )
    })
    .unwrap();
    run_in_transaction(&mut conn, |uow| {
        uow.persist_company(
            &CompanyGraph::new(Company::new(2, "B.com")).with_employee(200, "Vlad Mihalcea"),
        )
    })
    .unwrap();

    run_in_transaction(&mut conn, |uow| {
        let mut company_a = uow.require_company_graph(1)?;
        assert_eq!(company_a.company.id, 1);
        assert_eq!(company_a.employee_numbers(), vec![100]);

        company_a.clear_employees();
        company_a.add_employee(200, "Vlad Mihalcea");

        let merged = uow.merge_company(&company_a)?;
        assert_eq!(merged.employees.len(), 1);
        let employee = &merged.employees[0];
        assert_eq!(employee.id().employee_number(), 200);
        assert_eq!(employee.id().company_id(), company_a.company.id);

        let company_b = uow.require_company_graph(2)?;
        assert_eq!(company_b.company.id, 2);
        assert_eq!(company_b.employees.len(), 1);
        assert_eq!(company_b.employees[0].id(), EmployeeId::new(2, 200));
        Ok(())
    })
    .unwrap();

    run_in_transaction(&mut conn, |uow| {
        assert!(uow.find_employee(EmployeeId::new(1, 100))?.is_none());
        assert!(uow.find_employee(EmployeeId::new(1, 200))?.is_some());
        assert_eq!(uow.require_company_graph(2)?.company.id, 2);
        Ok(())
    })
    .unwrap();
}

#[test]
fn find_returns_structurally_equal_employee() {
    let mut conn = open_db_in_memory().unwrap();
    let employee = Employee::new(EmployeeId::new(5, 42), "Grace Hopper");

    run_in_transaction(&mut conn, |uow| {
        uow.persist_company(&CompanyGraph::new(Company::new(5, "navy.mil")))?;
        uow.persist_employee(&employee)
    })
    .unwrap();

    let found = run_in_transaction(&mut conn, |uow| uow.find_employee(EmployeeId::new(5, 42)))
        .unwrap();
    assert_eq!(found, Some(employee));
}

#[test]
fn lookup_through_missing_company_is_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let found = run_in_transaction(&mut conn, |uow| uow.find_employee(EmployeeId::new(77, 1)))
        .unwrap();
    assert!(found.is_none());
}

#[test]
fn merge_of_unknown_company_inserts_it_with_children() {
    let mut conn = open_db_in_memory().unwrap();
    let graph = CompanyGraph::new(Company::new(3, "new.io"))
        .with_employee(1, "Ada")
        .with_employee(2, "Linus");

    let merged = run_in_transaction(&mut conn, |uow| uow.merge_company(&graph)).unwrap();
    assert_eq!(merged, graph);
}

#[test]
fn merge_renames_company_and_retained_employees() {
    let mut conn = open_db_in_memory().unwrap();
    run_in_transaction(&mut conn, |uow| {
        uow.persist_company(&CompanyGraph::new(Company::new(1, "old.com")).with_employee(7, "Old"))
    })
    .unwrap();

    let detached = CompanyGraph::new(Company::new(1, "new.com")).with_employee(7, "New");
    let merged = run_in_transaction(&mut conn, |uow| uow.merge_company(&detached)).unwrap();

    assert_eq!(merged.company.name, "new.com");
    assert_eq!(merged.employees, vec![Employee::new(EmployeeId::new(1, 7), "New")]);
}
