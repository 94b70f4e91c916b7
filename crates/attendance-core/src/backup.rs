//! JSON backup documents: `{ "employees": [...], "incidents": [...] }`.

use crate::roster::domain::{Employee, Incident};
use crate::roster::{Roster, RosterError};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

const EMPLOYEES_KEY: &str = "employees";
const INCIDENTS_KEY: &str = "incidents";

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("backup is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("backup must be a JSON object with employees and incidents")]
    NotAnObject,
    #[error("employee #{index} in backup is invalid: {source}")]
    InvalidEmployee {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("incident #{index} in backup is invalid: {source}")]
    InvalidIncident {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Inconsistent(#[from] RosterError),
    #[error("failed to encode backup: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Counts reported back after a successful restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreSummary {
    pub employees: usize,
    pub incidents: usize,
}

#[derive(Serialize)]
struct BackupDocument<'a> {
    employees: &'a [Employee],
    incidents: &'a [Incident],
}

/// `attendance-backup-<YYYYMMDD>.json`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("attendance-backup-{}.json", date.format("%Y%m%d"))
}

/// Pretty-printed UTF-8 document.
pub fn export_backup(roster: &Roster) -> Result<String, BackupError> {
    let document = BackupDocument {
        employees: &roster.employees,
        incidents: &roster.incidents,
    };
    serde_json::to_string_pretty(&document).map_err(BackupError::Encode)
}

/// Parses a backup into a fresh roster.
///
/// Missing or non-array `employees`/`incidents` become empty lists; any other
/// defect rejects the whole document so the caller's state stays untouched.
pub fn restore_backup(raw: &str) -> Result<Roster, BackupError> {
    let value: Value = serde_json::from_str(raw).map_err(BackupError::Malformed)?;
    let Value::Object(mut document) = value else {
        return Err(BackupError::NotAnObject);
    };

    let employees = take_array(&mut document, EMPLOYEES_KEY)
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value::<Employee>(value)
                .map_err(|source| BackupError::InvalidEmployee { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let incidents = take_array(&mut document, INCIDENTS_KEY)
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value::<Incident>(value)
                .map_err(|source| BackupError::InvalidIncident { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let roster = Roster::new(employees, incidents);
    roster.validate()?;
    Ok(roster)
}

impl RestoreSummary {
    pub fn of(roster: &Roster) -> Self {
        Self {
            employees: roster.employees.len(),
            incidents: roster.incidents.len(),
        }
    }
}

fn take_array(document: &mut serde_json::Map<String, Value>, key: &str) -> Vec<Value> {
    match document.remove(key) {
        Some(Value::Array(items)) => items,
        None | Some(Value::Null) => Vec::new(),
        Some(other) => {
            warn!(key, kind = json_kind(&other), "ignoring non-array backup field");
            Vec::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
