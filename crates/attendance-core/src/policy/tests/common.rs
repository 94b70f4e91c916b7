use chrono::{Duration, NaiveDate};

use crate::policy::{PolicyConfig, PolicyEngine};
use crate::roster::domain::{Employee, EmployeeId, Incident, IncidentId, IncidentKind};
use crate::roster::Roster;

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 1).expect("valid date")
}

pub(super) fn days_ago(days: i64) -> NaiveDate {
    today() - Duration::days(days)
}

pub(super) fn engine() -> PolicyEngine {
    PolicyEngine::new(PolicyConfig::default())
}

pub(super) fn employee(id: &str, name: &str) -> Employee {
    Employee {
        id: EmployeeId(id.to_string()),
        name: name.to_string(),
        position: "Behavior Technician".to_string(),
        center: "Beachwood".to_string(),
        hire_date: Some(days_ago(400)),
        notifications: Vec::new(),
        notification_cleared: false,
        last_notified: None,
    }
}

pub(super) fn incident(
    seq: usize,
    employee_id: &str,
    kind: IncidentKind,
    date: NaiveDate,
) -> Incident {
    Incident {
        id: IncidentId(format!("inc-{seq:06}")),
        employee_id: EmployeeId(employee_id.to_string()),
        date,
        points: kind.base_points(),
        kind,
        notes: String::new(),
    }
}

pub(super) fn adjustment(seq: usize, employee_id: &str, points: i32, date: NaiveDate) -> Incident {
    Incident {
        points: Some(points),
        ..incident(seq, employee_id, IncidentKind::PointAdjustment, date)
    }
}

/// Roster with a single employee `e1` holding the given incidents.
pub(super) fn roster_for(incidents: Vec<Incident>) -> Roster {
    Roster::new(vec![employee("e1", "Morgan Reyes")], incidents)
}

pub(super) fn e1() -> EmployeeId {
    EmployeeId("e1".to_string())
}
