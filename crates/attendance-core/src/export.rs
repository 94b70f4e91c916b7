//! CSV exports of the roster.
//!
//! The incident export is a flat table. The attendance report mirrors the
//! spreadsheet supervisors open directly: UTF-8 BOM, CRLF line endings, an
//! employee summary block and then an incident block.

use crate::policy::PolicyEngine;
use crate::report::status_report;
use crate::roster::Roster;
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;

pub const REPORT_FILE_NAME: &str = "attendance-report.csv";
pub const INCIDENTS_FILE_NAME: &str = "attendance-incidents.csv";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const INCIDENT_SECTION_TITLE: &str = "Attendance Incidents";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Serialize)]
struct IncidentRow<'a> {
    #[serde(rename = "Employee")]
    employee: &'a str,
    #[serde(rename = "Center")]
    center: &'a str,
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Reason")]
    reason: &'a str,
    #[serde(rename = "Points")]
    points: i32,
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    #[serde(rename = "Employee Name")]
    name: &'a str,
    #[serde(rename = "Position")]
    position: &'a str,
    #[serde(rename = "Center")]
    center: &'a str,
    #[serde(rename = "Current Points")]
    points: u32,
    #[serde(rename = "Status")]
    status: &'a str,
    #[serde(rename = "No-Call/No-Shows")]
    no_call_no_shows: usize,
}

#[derive(Serialize)]
struct DetailRow<'a> {
    #[serde(rename = "Employee Name")]
    name: &'a str,
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Issue Type")]
    issue_type: &'a str,
    #[serde(rename = "Points")]
    points: i32,
    #[serde(rename = "Notes")]
    notes: &'a str,
}

/// `Employee,Center,Date,Reason,Points`, one row per incident in roster order.
pub fn write_incident_csv<W: Write>(roster: &Roster, writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    if roster.incidents.is_empty() {
        csv_writer.write_record(["Employee", "Center", "Date", "Reason", "Points"])?;
    }

    for incident in &roster.incidents {
        let employee = roster.employee(&incident.employee_id);
        csv_writer.serialize(IncidentRow {
            employee: roster.employee_name(&incident.employee_id),
            center: employee.map(|employee| employee.center.as_str()).unwrap_or(""),
            date: incident.date,
            reason: incident.kind.label(),
            points: incident.points(),
        })?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Two-section attendance report evaluated as of `today`.
pub fn write_attendance_report<W: Write>(
    engine: &PolicyEngine,
    roster: &Roster,
    today: NaiveDate,
    mut writer: W,
) -> Result<(), ExportError> {
    let mut summary = report_writer();
    let statuses = status_report(engine, roster, today);
    if statuses.is_empty() {
        summary.write_record([
            "Employee Name",
            "Position",
            "Center",
            "Current Points",
            "Status",
            "No-Call/No-Shows",
        ])?;
    }
    for status in &statuses {
        summary.serialize(SummaryRow {
            name: &status.name,
            position: &status.position,
            center: &status.center,
            points: status.points,
            status: status.action_label,
            no_call_no_shows: status.no_call_no_shows,
        })?;
    }

    let mut details = report_writer();
    if roster.incidents.is_empty() {
        details.write_record(["Employee Name", "Date", "Issue Type", "Points", "Notes"])?;
    }
    for incident in &roster.incidents {
        details.serialize(DetailRow {
            name: roster.employee_name(&incident.employee_id),
            date: incident.date,
            issue_type: incident.kind.label(),
            points: incident.points(),
            notes: &incident.notes,
        })?;
    }

    writer.write_all(UTF8_BOM)?;
    writer.write_all(&finish(summary)?)?;
    write!(writer, "\r\n{INCIDENT_SECTION_TITLE}\r\n")?;
    writer.write_all(&finish(details)?)?;
    writer.flush()?;
    Ok(())
}

fn report_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, ExportError> {
    writer
        .into_inner()
        .map_err(|err| std::io::Error::new(err.error().kind(), err.to_string()).into())
}
