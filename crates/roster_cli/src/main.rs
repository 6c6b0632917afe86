//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `roster_core` linkage.
//! - Run the company/employee/phone walkthrough against an in-memory store.
//! - Keep output deterministic for quick local sanity checks.

use roster_core::{init_logging, Company, CompanyGraph, EmployeeId, RosterService};
use std::error::Error;
use std::process::ExitCode;

const USAGE: &str = "usage: roster_cli [ping|version|demo [--log-dir <absolute dir>]]";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        None | Some("ping") => {
            println!("roster_core ping={}", roster_core::ping());
            println!("roster_core version={}", roster_core::core_version());
            Ok(())
        }
        Some("version") => {
            println!("{}", roster_core::core_version());
            Ok(())
        }
        Some("demo") => run_demo(&args[1..]),
        Some(other) => Err(format!("unknown command `{other}`\n{USAGE}").into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_demo(args: &[String]) -> Result<(), Box<dyn Error>> {
    match args {
        [] => {}
        [flag, dir] if flag == "--log-dir" => {
            init_logging(roster_core::default_log_level(), dir)?;
        }
        _ => return Err(USAGE.into()),
    }

    let mut service = RosterService::open_in_memory()?;
    let company = Company::new(1, "vladmihalcea.com");
    service.register_company(&CompanyGraph::new(company.clone()))?;

    let employee = service.hire(company.id, 100, "Vlad Mihalcea")?;
    let phone = service.assign_phone("012-345-6789", EmployeeId::of(&company, 100))?;
    let graph = service.company(company.id)?;

    let report = serde_json::json!({
        "company": graph,
        "employee": employee,
        "phone": phone,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    log::info!("event=cli_demo module=cli status=ok");
    Ok(())
}
