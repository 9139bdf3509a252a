//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `crm_core` linkage with deterministic output.
//! - Optionally print the dashboard summary of a database file:
//!   `crm_cli [DB_PATH]`.
//! - Start file logging when `CRM_LOG_DIR` is set (`CRM_LOG_LEVEL` picks
//!   the level).

use crm_core::db::open_db;
use crm_core::{init_logging_with, CrmSnapshot, DashboardSummary, LoggingConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(err) =
        LoggingConfig::from_env().and_then(|config| config.map_or(Ok(()), init_logging_with))
    {
        eprintln!("crm_cli logging disabled: {err}");
    }

    println!("crm_core ping={}", crm_core::ping());
    println!("crm_core version={}", crm_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    match load_summary(&db_path) {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("crm_cli failed to read `{db_path}`: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_summary(db_path: &str) -> Result<DashboardSummary, String> {
    let conn = open_db(db_path).map_err(|err| err.to_string())?;
    let snapshot = CrmSnapshot::load(&conn).map_err(|err| err.to_string())?;
    Ok(snapshot.dashboard())
}

fn print_summary(summary: &DashboardSummary) {
    println!("contacts={}", summary.total_contacts);
    println!("active_deals={}", summary.active_deals);
    println!("pipeline_value={:.2}", summary.total_pipeline_value);
    println!("pending_tasks={}", summary.pending_tasks);
    println!("activities={}", summary.total_activities);
    for task in &summary.upcoming_tasks {
        println!(
            "upcoming id={} due_ms={} status={} priority={}",
            task.id, task.due_date, task.status, task.priority
        );
    }
    for activity in &summary.recent_activities {
        println!(
            "recent id={} type={} date_ms={}",
            activity.id, activity.kind, activity.date
        );
    }
}
