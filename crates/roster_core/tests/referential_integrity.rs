use roster_core::db::open_db_in_memory;
use roster_core::{
    run_in_transaction, Company, CompanyGraph, CompanyRepository, Employee, EmployeeId,
    EmployeeRepository, EntityKey, Phone, PhoneRepository, RepoError, SqliteCompanyRepository,
    SqliteEmployeeRepository, SqlitePhoneRepository, ValidationError,
};
use rusqlite::Connection;

fn seeded() -> Connection {
    let mut conn = open_db_in_memory().unwrap();
    run_in_transaction(&mut conn, |uow| {
        uow.persist_company(
            &CompanyGraph::new(Company::new(1, "acme.com"))
                .with_employee(100, "Wile")
                .with_employee(101, "Road Runner"),
        )
    })
    .unwrap();
    conn
}

#[test]
fn employee_before_company_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

    let err = repo
        .insert_employee(&Employee::new(EmployeeId::new(9, 1), "Nobody"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::ReferentialIntegrity {
            key: EntityKey::Employee(id),
            ..
        } if id == EmployeeId::new(9, 1)
    ));
}

#[test]
fn phone_before_employee_is_rejected() {
    let conn = seeded();
    let repo = SqlitePhoneRepository::try_new(&conn).unwrap();

    let err = repo
        .insert_phone(&Phone::new("555-0100", EmployeeId::new(1, 999)))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::ReferentialIntegrity {
            key: EntityKey::Phone(ref number),
            ..
        } if number == "555-0100"
    ));
}

#[test]
fn duplicate_keys_are_rejected() {
    let conn = seeded();
    let companies = SqliteCompanyRepository::try_new(&conn).unwrap();
    let employees = SqliteEmployeeRepository::try_new(&conn).unwrap();
    let phones = SqlitePhoneRepository::try_new(&conn).unwrap();

    let company_err = companies
        .insert_company(&Company::new(1, "other.com"))
        .unwrap_err();
    assert!(matches!(
        company_err,
        RepoError::ReferentialIntegrity {
            key: EntityKey::Company(1),
            ..
        }
    ));

    let employee_err = employees
        .insert_employee(&Employee::new(EmployeeId::new(1, 100), "Again"))
        .unwrap_err();
    assert!(matches!(
        employee_err,
        RepoError::ReferentialIntegrity { .. }
    ));

    phones
        .insert_phone(&Phone::new("555-0100", EmployeeId::new(1, 100)))
        .unwrap();
    let phone_err = phones
        .insert_phone(&Phone::new("555-0100", EmployeeId::new(1, 101)))
        .unwrap_err();
    assert!(matches!(phone_err, RepoError::ReferentialIntegrity { .. }));
}

#[test]
fn save_upserts_by_key() {
    let conn = seeded();
    let employees = SqliteEmployeeRepository::try_new(&conn).unwrap();
    let phones = SqlitePhoneRepository::try_new(&conn).unwrap();

    employees
        .save_employee(&Employee::new(EmployeeId::new(1, 100), "Wile E."))
        .unwrap();
    let renamed = employees.get_employee(EmployeeId::new(1, 100)).unwrap();
    assert_eq!(renamed.unwrap().name, "Wile E.");

    phones
        .save_phone(&Phone::new("555-0100", EmployeeId::new(1, 100)))
        .unwrap();
    phones
        .save_phone(&Phone::new("555-0100", EmployeeId::new(1, 101)))
        .unwrap();
    let phone = phones.get_phone("555-0100").unwrap().unwrap();
    assert_eq!(phone.employee, EmployeeId::new(1, 101));
}

#[test]
fn removing_employee_with_phones_fails_and_keeps_everything() {
    let mut conn = seeded();
    run_in_transaction(&mut conn, |uow| {
        uow.persist_phone(&Phone::new("555-0100", EmployeeId::new(1, 100)))?;
        uow.persist_phone(&Phone::new("555-0101", EmployeeId::new(1, 100)))
    })
    .unwrap();

    let err = run_in_transaction(&mut conn, |uow| uow.set_employees(1, &[])).unwrap_err();
    match err {
        RepoError::OrphanDeletion {
            employee,
            phone_numbers,
        } => {
            assert_eq!(employee, EmployeeId::new(1, 100));
            assert_eq!(phone_numbers, vec!["555-0100", "555-0101"]);
        }
        other => panic!("unexpected error: {other}"),
    }

    let remaining = run_in_transaction(&mut conn, |uow| uow.list_employees(1)).unwrap();
    assert_eq!(remaining.len(), 2);
}

#[test]
fn standalone_set_employees_rolls_back_partial_orphan_removal() {
    let conn = seeded();
    SqlitePhoneRepository::try_new(&conn)
        .unwrap()
        .insert_phone(&Phone::new("555-0101", EmployeeId::new(1, 101)))
        .unwrap();

    let companies = SqliteCompanyRepository::try_new(&conn).unwrap();
    let desired = vec![Employee::new(EmployeeId::new(1, 200), "Coyote")];
    let err = companies.set_employees(1, &desired).unwrap_err();
    assert!(matches!(err, RepoError::OrphanDeletion { .. }));

    let employees = SqliteEmployeeRepository::try_new(&conn).unwrap();
    let numbers: Vec<i64> = employees
        .list_by_company(1)
        .unwrap()
        .iter()
        .map(|employee| employee.id().employee_number())
        .collect();
    assert_eq!(numbers, vec![100, 101]);
}

#[test]
fn phones_can_be_removed_then_employee_removed() {
    let mut conn = seeded();
    run_in_transaction(&mut conn, |uow| {
        uow.persist_phone(&Phone::new("555-0100", EmployeeId::new(1, 100)))?;
        uow.remove_phone("555-0100")?;
        uow.remove_employee(EmployeeId::new(1, 100))
    })
    .unwrap();

    let (phone, employee) = run_in_transaction(&mut conn, |uow| {
        Ok((
            uow.find_phone("555-0100")?,
            uow.find_employee(EmployeeId::new(1, 100))?,
        ))
    })
    .unwrap();
    assert!(phone.is_none());
    assert!(employee.is_none());
}

#[test]
fn removing_company_cascades_to_employees() {
    let mut conn = seeded();
    run_in_transaction(&mut conn, |uow| uow.remove_company(1)).unwrap();

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM employee;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
    let missing = run_in_transaction(&mut conn, |uow| uow.find_company(1)).unwrap();
    assert!(missing.is_none());
}

#[test]
fn removing_company_with_phone_holders_is_refused() {
    let mut conn = seeded();
    run_in_transaction(&mut conn, |uow| {
        uow.persist_phone(&Phone::new("555-0101", EmployeeId::new(1, 101)))
    })
    .unwrap();

    let err = run_in_transaction(&mut conn, |uow| uow.remove_company(1)).unwrap_err();
    assert!(matches!(err, RepoError::OrphanDeletion { .. }));
    let graph = run_in_transaction(&mut conn, |uow| uow.require_company_graph(1)).unwrap();
    assert_eq!(graph.employee_numbers(), vec![100, 101]);
}

#[test]
fn missing_targets_report_not_found() {
    let mut conn = seeded();
    let errors = [
        run_in_transaction(&mut conn, |uow| uow.remove_company(42)).unwrap_err(),
        run_in_transaction(&mut conn, |uow| uow.remove_employee(EmployeeId::new(1, 5))).unwrap_err(),
        run_in_transaction(&mut conn, |uow| uow.remove_phone("000")).unwrap_err(),
        run_in_transaction(&mut conn, |uow| uow.set_employees(42, &[])).unwrap_err(),
        run_in_transaction(&mut conn, |uow| uow.require_phone("000")).unwrap_err(),
        run_in_transaction(&mut conn, |uow| uow.require_company(42)).unwrap_err(),
    ];
    for err in errors {
        assert!(matches!(err, RepoError::NotFound(_)), "unexpected error: {err}");
    }
}

#[test]
fn invalid_models_never_reach_storage() {
    let mut conn = seeded();
    let company_err = run_in_transaction(&mut conn, |uow| {
        uow.persist_company(&CompanyGraph::new(Company::new(2, " ")))
    })
    .unwrap_err();
    assert!(matches!(
        company_err,
        RepoError::Validation(ValidationError::BlankCompanyName(2))
    ));

    let phone_err = run_in_transaction(&mut conn, |uow| {
        uow.persist_phone(&Phone::new("not a number", EmployeeId::new(1, 100)))
    })
    .unwrap_err();
    assert!(matches!(
        phone_err,
        RepoError::Validation(ValidationError::InvalidPhoneNumber(_))
    ));
}

#[test]
fn recovered_orphan_error_inside_unit_keeps_every_employee() {
    let mut conn = seeded();
    run_in_transaction(&mut conn, |uow| {
        uow.persist_phone(&Phone::new("555-0101", EmployeeId::new(1, 101)))
    })
    .unwrap();

    run_in_transaction(&mut conn, |uow| {
        let replace_err = uow.set_employees(1, &[]).unwrap_err();
        assert!(matches!(replace_err, RepoError::OrphanDeletion { .. }));
        let remove_err = uow.remove_company(1).unwrap_err();
        assert!(matches!(remove_err, RepoError::OrphanDeletion { .. }));
        Ok(())
    })
    .unwrap();

    let graph = run_in_transaction(&mut conn, |uow| uow.require_company_graph(1)).unwrap();
    assert_eq!(graph.employee_numbers(), vec![100, 101]);
}

#[test]
fn recovered_merge_error_inside_unit_keeps_company_row() {
    let mut conn = seeded();
    run_in_transaction(&mut conn, |uow| {
        uow.persist_phone(&Phone::new("555-0100", EmployeeId::new(1, 100)))
    })
    .unwrap();

    run_in_transaction(&mut conn, |uow| {
        let detached = CompanyGraph::new(Company::new(1, "renamed.com"));
        let err = uow.merge_company(&detached).unwrap_err();
        assert!(matches!(err, RepoError::OrphanDeletion { .. }));
        Ok(())
    })
    .unwrap();

    let graph = run_in_transaction(&mut conn, |uow| uow.require_company_graph(1)).unwrap();
    assert_eq!(graph.company.name, "acme.com");
    assert_eq!(graph.employee_numbers(), vec![100, 101]);
}

#[test]
fn persisting_company_with_repeated_employee_number_is_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    let graph = CompanyGraph::new(Company::new(2, "twice.com"))
        .with_employee(5, "first")
        .with_employee(5, "second");

    let err = run_in_transaction(&mut conn, |uow| uow.persist_company(&graph)).unwrap_err();
    assert!(matches!(
        err,
        RepoError::ReferentialIntegrity {
            key: EntityKey::Employee(id),
            ..
        } if id == EmployeeId::new(2, 5)
    ));

    let company = run_in_transaction(&mut conn, |uow| uow.find_company(2)).unwrap();
    assert!(company.is_none());
}
