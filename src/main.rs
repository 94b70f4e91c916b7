mod error;
mod telemetry;

use crate::error::AppError;
use attendance_core::backup::{backup_file_name, export_backup, restore_backup, RestoreSummary};
use attendance_core::config::AppConfig;
use attendance_core::export::{
    write_attendance_report, write_incident_csv, INCIDENTS_FILE_NAME, REPORT_FILE_NAME,
};
use attendance_core::policy::{CorrectiveAction, PolicyEngine};
use attendance_core::report::{incident_listing, status_report};
use attendance_core::roster::domain::{EmployeeId, IncidentId, IncidentKind};
use attendance_core::roster::{
    EmployeeUpdate, IncidentUpdate, NewEmployee, NewIncident, Roster, RosterError,
};
use attendance_core::store::{AttendanceStore, JsonFileStore};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    name = "attendance",
    about = "Track employee attendance points and corrective actions",
    version
)]
struct Cli {
    /// Roster data file (overrides ATTENDANCE_DATA_FILE)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,
    /// Evaluation date (YYYY-MM-DD, defaults to today)
    #[arg(long, global = true, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage employees
    Employee {
        #[command(subcommand)]
        command: EmployeeCommand,
    },
    /// Manage attendance incidents
    Incident {
        #[command(subcommand)]
        command: IncidentCommand,
    },
    /// Record a manual point adjustment
    Adjust(AdjustArgs),
    /// Show point totals and recommended actions
    Status(StatusArgs),
    /// List employees with an unacknowledged corrective action
    Alerts,
    /// Record that an employee was notified of a corrective action
    Notify(NotifyArgs),
    /// Acknowledge every outstanding alert
    ClearAlerts,
    /// Re-raise an acknowledged alert
    RestoreAlert {
        /// Employee id (emp-NNNNNN)
        employee: String,
    },
    /// Write a CSV export
    Export(ExportArgs),
    /// Write a JSON backup of the roster
    Backup(BackupArgs),
    /// Replace the roster with the contents of a JSON backup
    Restore {
        /// Backup file to import
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum EmployeeCommand {
    /// Add an employee
    Add(EmployeeAddArgs),
    /// Edit an employee's details
    Edit(EmployeeEditArgs),
    /// Remove an employee and all of their incidents
    Remove { id: String },
    /// List employees sorted by last name
    List {
        /// Case-insensitive filter over name, position and center
        #[arg(long)]
        search: Option<String>,
    },
}

#[derive(Args, Debug)]
struct EmployeeAddArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    position: String,
    #[arg(long, default_value = "")]
    center: String,
    /// Hire date (YYYY-MM-DD, defaults to the evaluation date)
    #[arg(long, value_parser = parse_date)]
    hire_date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
struct EmployeeEditArgs {
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    position: Option<String>,
    #[arg(long)]
    center: Option<String>,
    #[arg(long, value_parser = parse_date)]
    hire_date: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
enum IncidentCommand {
    /// Record an incident
    Add(IncidentAddArgs),
    /// Edit an incident
    Edit(IncidentEditArgs),
    /// Remove an incident
    Remove { id: String },
    /// List incidents newest first
    List {
        /// Restrict to one employee
        #[arg(long)]
        employee: Option<String>,
    },
}

#[derive(Args, Debug)]
struct IncidentAddArgs {
    /// Employee id (emp-NNNNNN)
    #[arg(long)]
    employee: String,
    /// Incident type label, e.g. "Late Arrival"
    #[arg(long = "type")]
    kind: String,
    /// Incident date (YYYY-MM-DD, defaults to the evaluation date)
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
    /// Points for types without a fixed value
    #[arg(long, allow_negative_numbers = true)]
    points: Option<i32>,
    #[arg(long, default_value = "")]
    notes: String,
}

#[derive(Args, Debug)]
struct IncidentEditArgs {
    id: String,
    #[arg(long = "type")]
    kind: Option<String>,
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
    #[arg(long, allow_negative_numbers = true)]
    points: Option<i32>,
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Args, Debug)]
struct AdjustArgs {
    /// Employee id (emp-NNNNNN)
    employee: String,
    /// Signed point delta
    #[arg(allow_negative_numbers = true)]
    delta: i32,
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
    #[arg(long, default_value = "")]
    notes: String,
}

#[derive(Args, Debug)]
struct StatusArgs {
    /// Show the point breakdown for one employee
    #[arg(long)]
    employee: Option<String>,
}

#[derive(Args, Debug)]
struct NotifyArgs {
    /// Employee id (emp-NNNNNN)
    employee: String,
    /// Action label; defaults to the current recommendation
    #[arg(long)]
    action: Option<String>,
    /// Notification date (defaults to the evaluation date)
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
    #[arg(long, default_value = "")]
    remark: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    /// Summary and incident sections, BOM and CRLF
    Report,
    /// Flat incident table
    Incidents,
}

impl ExportFormat {
    fn default_file_name(self) -> &'static str {
        match self {
            ExportFormat::Report => REPORT_FILE_NAME,
            ExportFormat::Incidents => INCIDENTS_FILE_NAME,
        }
    }
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(long, value_enum, default_value_t = ExportFormat::Report)]
    format: ExportFormat,
    /// Destination file, `-` for stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct BackupArgs {
    /// Directory the dated backup file is written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;

    if let Some(path) = cli.data_file {
        config.storage.data_file = path;
    }

    telemetry::init(&config.telemetry, cli.verbose)?;
    debug!(
        ?config.environment,
        data_file = %config.storage.data_file.display(),
        auto_backup = config.storage.auto_backup,
        "configuration loaded"
    );

    let store =
        JsonFileStore::new(&config.storage.data_file).with_auto_backup(config.storage.auto_backup);
    let engine = PolicyEngine::new(config.policy);
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_command(&store, &engine, today, cli.command, &mut out)
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Loads the roster, applies one command and saves when it changed.
fn run_command<S: AttendanceStore>(
    store: &S,
    engine: &PolicyEngine,
    today: NaiveDate,
    command: Command,
    out: &mut dyn Write,
) -> Result<(), AppError> {
    let mut roster = store.load()?;

    let changed = match command {
        Command::Employee { command } => run_employee(&mut roster, today, command, out)?,
        Command::Incident { command } => run_incident(&mut roster, engine, today, command, out)?,
        Command::Adjust(args) => {
            let employee_id = EmployeeId(args.employee);
            let id = roster.adjust_points(
                &employee_id,
                args.delta,
                args.date.unwrap_or(today),
                args.notes,
            )?;
            let total = engine.total_points(&roster.incidents, &employee_id);
            writeln!(
                out,
                "Recorded adjustment {id} for {}; total now {total} points",
                roster.employee_name(&employee_id)
            )?;
            true
        }
        Command::Status(args) => {
            match args.employee {
                Some(id) => render_employee_status(&roster, engine, &EmployeeId(id), today, out)?,
                None => render_status(&roster, engine, today, out)?,
            }
            false
        }
        Command::Alerts => {
            render_alerts(&roster, engine, today, out)?;
            false
        }
        Command::Notify(args) => {
            notify(&mut roster, engine, today, args, out)?;
            true
        }
        Command::ClearAlerts => {
            let cleared = roster.clear_all_alerts(engine, today);
            writeln!(out, "Cleared {} alert(s)", cleared.len())?;
            !cleared.is_empty()
        }
        Command::RestoreAlert { employee } => {
            let employee_id = EmployeeId(employee);
            roster.restore_alert(&employee_id)?;
            writeln!(
                out,
                "Alert restored for {}",
                roster.employee_name(&employee_id)
            )?;
            true
        }
        Command::Export(args) => {
            export(&roster, engine, today, args, out)?;
            false
        }
        Command::Backup(args) => {
            let path = write_backup(&roster, &args.output_dir, today)?;
            writeln!(out, "Backup written to {}", path.display())?;
            false
        }
        Command::Restore { file } => {
            let raw = fs::read_to_string(&file)?;
            roster = restore_backup(&raw)?;
            let summary = RestoreSummary::of(&roster);
            info!(
                file = %file.display(),
                employees = summary.employees,
                incidents = summary.incidents,
                "backup restored"
            );
            writeln!(
                out,
                "Restored {} employee(s) and {} incident(s)",
                summary.employees, summary.incidents
            )?;
            true
        }
    };

    if changed {
        store.save(&roster)?;
    }
    Ok(())
}

fn run_employee(
    roster: &mut Roster,
    today: NaiveDate,
    command: EmployeeCommand,
    out: &mut dyn Write,
) -> Result<bool, AppError> {
    match command {
        EmployeeCommand::Add(args) => {
            let id = roster.add_employee(
                NewEmployee {
                    name: args.name,
                    position: args.position,
                    center: args.center,
                    hire_date: args.hire_date,
                },
                today,
            )?;
            writeln!(out, "Added employee {id}")?;
            Ok(true)
        }
        EmployeeCommand::Edit(args) => {
            let id = EmployeeId(args.id);
            roster.update_employee(
                &id,
                EmployeeUpdate {
                    name: args.name,
                    position: args.position,
                    center: args.center,
                    hire_date: args.hire_date,
                },
            )?;
            writeln!(out, "Updated employee {id}")?;
            Ok(true)
        }
        EmployeeCommand::Remove { id } => {
            let removed = roster.remove_employee(&EmployeeId(id))?;
            writeln!(
                out,
                "Removed {} and {} incident(s)",
                removed.employee.name, removed.incidents_removed
            )?;
            Ok(true)
        }
        EmployeeCommand::List { search } => {
            let employees = match search.as_deref() {
                Some(term) => roster.search(term),
                None => roster.sorted_employees(),
            };
            if employees.is_empty() {
                writeln!(out, "No employees")?;
            }
            for employee in employees {
                let hired = employee
                    .hire_date
                    .map(|date| format!(", hired {date}"))
                    .unwrap_or_default();
                writeln!(
                    out,
                    "- {} | {} | {} | {}{}",
                    employee.id, employee.name, employee.position, employee.center, hired
                )?;
            }
            Ok(false)
        }
    }
}

fn run_incident(
    roster: &mut Roster,
    engine: &PolicyEngine,
    today: NaiveDate,
    command: IncidentCommand,
    out: &mut dyn Write,
) -> Result<bool, AppError> {
    match command {
        IncidentCommand::Add(args) => {
            let id = roster.add_incident(NewIncident {
                employee_id: EmployeeId(args.employee),
                date: args.date.unwrap_or(today),
                kind: IncidentKind::parse(&args.kind),
                points: args.points,
                notes: args.notes,
            })?;
            writeln!(out, "Recorded incident {id}")?;
            Ok(true)
        }
        IncidentCommand::Edit(args) => {
            let id = IncidentId(args.id);
            roster.update_incident(
                &id,
                IncidentUpdate {
                    date: args.date,
                    kind: args.kind.as_deref().map(IncidentKind::parse),
                    points: args.points,
                    notes: args.notes,
                },
            )?;
            writeln!(out, "Updated incident {id}")?;
            Ok(true)
        }
        IncidentCommand::Remove { id } => {
            let removed = roster.remove_incident(&IncidentId(id))?;
            writeln!(
                out,
                "Removed {} ({}) from {}",
                removed.id,
                removed.kind,
                roster.employee_name(&removed.employee_id)
            )?;
            Ok(true)
        }
        IncidentCommand::List { employee } => {
            let filter = employee.map(EmployeeId);
            let incidents = incident_listing(engine, roster, filter.as_ref(), today);
            if incidents.is_empty() {
                writeln!(out, "No incidents")?;
            }
            for incident in incidents {
                writeln!(
                    out,
                    "- {} | {} | {} | {} | {} pts | {}",
                    incident.incident_id,
                    incident.date,
                    incident.employee_name,
                    incident.kind_label,
                    incident.points,
                    incident.delete_label
                )?;
                if !incident.notes.is_empty() {
                    writeln!(out, "    {}", incident.notes)?;
                }
            }
            Ok(false)
        }
    }
}

fn notify(
    roster: &mut Roster,
    engine: &PolicyEngine,
    today: NaiveDate,
    args: NotifyArgs,
    out: &mut dyn Write,
) -> Result<(), AppError> {
    let employee_id = EmployeeId(args.employee);
    if roster.employee(&employee_id).is_none() {
        return Err(RosterError::EmployeeNotFound(employee_id).into());
    }

    let recommendation = engine.recommend(roster, &employee_id, today);
    let action = match args.action.as_deref() {
        Some(label) => CorrectiveAction::from_label(label)
            .ok_or_else(|| AppError::Usage(format!("unknown corrective action '{label}'")))?,
        None => recommendation.action,
    };
    if !action.requires_action() {
        return Err(AppError::Usage(format!(
            "{} has no corrective action to notify",
            roster.employee_name(&employee_id)
        )));
    }

    roster.record_notification(
        &employee_id,
        action,
        args.date.unwrap_or(today),
        recommendation.points,
        args.remark,
    )?;
    writeln!(
        out,
        "Recorded {} for {} at {} points",
        action.label(),
        roster.employee_name(&employee_id),
        recommendation.points
    )?;
    Ok(())
}

fn export(
    roster: &Roster,
    engine: &PolicyEngine,
    today: NaiveDate,
    args: ExportArgs,
    out: &mut dyn Write,
) -> Result<(), AppError> {
    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(args.format.default_file_name()));

    if path.as_os_str() == "-" {
        write_export(roster, engine, today, args.format, out)?;
        return Ok(());
    }

    let file = fs::File::create(&path)?;
    write_export(roster, engine, today, args.format, BufWriter::new(file))?;
    info!(path = %path.display(), format = ?args.format, "export written");
    writeln!(out, "Export written to {}", path.display())?;
    Ok(())
}

fn write_export<W: Write>(
    roster: &Roster,
    engine: &PolicyEngine,
    today: NaiveDate,
    format: ExportFormat,
    writer: W,
) -> Result<(), AppError> {
    match format {
        ExportFormat::Report => write_attendance_report(engine, roster, today, writer)?,
        ExportFormat::Incidents => write_incident_csv(roster, writer)?,
    }
    Ok(())
}

fn write_backup(roster: &Roster, dir: &Path, today: NaiveDate) -> Result<PathBuf, AppError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(backup_file_name(today));
    fs::write(&path, export_backup(roster)?)?;
    info!(path = %path.display(), "backup written");
    Ok(path)
}

fn render_status(
    roster: &Roster,
    engine: &PolicyEngine,
    today: NaiveDate,
    out: &mut dyn Write,
) -> Result<(), AppError> {
    let statuses = status_report(engine, roster, today);
    writeln!(out, "Attendance status as of {today}")?;
    if statuses.is_empty() {
        writeln!(out, "No employees")?;
    }
    for status in statuses {
        let no_call_no_shows = if status.no_call_no_shows > 0 {
            format!(", {} no-call/no-show(s)", status.no_call_no_shows)
        } else {
            String::new()
        };
        let alert = if status.alert_outstanding {
            " [ALERT]"
        } else {
            ""
        };
        writeln!(
            out,
            "- {} ({}, {}): {} points, {}{}{}",
            status.name,
            status.position,
            status.center,
            status.points,
            status.action_label,
            no_call_no_shows,
            alert
        )?;
    }
    Ok(())
}

fn render_employee_status(
    roster: &Roster,
    engine: &PolicyEngine,
    employee_id: &EmployeeId,
    today: NaiveDate,
    out: &mut dyn Write,
) -> Result<(), AppError> {
    let employee = roster
        .employee(employee_id)
        .ok_or_else(|| RosterError::EmployeeNotFound(employee_id.clone()))?;
    let recommendation = engine.recommend(roster, employee_id, today);
    let breakdown = engine.point_breakdown(&roster.incidents, employee_id);

    writeln!(out, "{} ({})", employee.name, employee.id)?;
    writeln!(out, "Position: {}", employee.position)?;
    writeln!(out, "Center: {}", employee.center)?;
    if let Some(hire_date) = employee.hire_date {
        writeln!(out, "Hired: {hire_date}")?;
    }
    writeln!(
        out,
        "Illness: {} day(s) in {} occurrence(s) = {} points",
        breakdown.illness_days, breakdown.illness_occurrences, breakdown.illness_points
    )?;
    writeln!(out, "Other incidents: {} points", breakdown.other_points)?;
    writeln!(out, "Total: {} points", recommendation.points)?;
    writeln!(
        out,
        "No-call/no-shows in the last year: {}",
        recommendation.no_call_no_shows
    )?;
    writeln!(out, "Recommended action: {}", recommendation.action_label())?;
    if engine.has_outstanding_alert(employee, &recommendation) {
        writeln!(out, "Alert: outstanding")?;
    }

    if !employee.notifications.is_empty() {
        writeln!(out, "\nNotification history")?;
        for notification in &employee.notifications {
            let remark = if notification.remark.is_empty() {
                String::new()
            } else {
                format!(" ({})", notification.remark)
            };
            writeln!(
                out,
                "- {}: {} at {} points{}",
                notification.date, notification.action, notification.points_at_time, remark
            )?;
        }
    }
    Ok(())
}

fn render_alerts(
    roster: &Roster,
    engine: &PolicyEngine,
    today: NaiveDate,
    out: &mut dyn Write,
) -> Result<(), AppError> {
    let alerts = engine.alerts(roster, today);
    if alerts.is_empty() {
        writeln!(out, "No outstanding alerts")?;
        return Ok(());
    }

    writeln!(out, "Outstanding alerts")?;
    for alert in alerts {
        let history = match (alert.previously_notified, alert.last_notified) {
            (true, Some(date)) => format!(" (previously notified, last {date})"),
            (true, None) => " (previously notified)".to_string(),
            _ => String::new(),
        };
        writeln!(
            out,
            "- {} ({}): {} at {} points{}",
            alert.employee_name, alert.center, alert.action_label, alert.points, history
        )?;
    }
    Ok(())
}
