//! Presentation-ready views combining roster data with policy results.

use crate::policy::{CorrectiveAction, IncidentAge, PolicyEngine};
use crate::roster::domain::{EmployeeId, IncidentId};
use crate::roster::Roster;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeStatusView {
    pub employee_id: EmployeeId,
    pub name: String,
    pub position: String,
    pub center: String,
    pub points: u32,
    pub action: CorrectiveAction,
    pub action_label: &'static str,
    pub no_call_no_shows: usize,
    pub alert_outstanding: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_notified: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IncidentView {
    pub incident_id: IncidentId,
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub date: NaiveDate,
    pub kind_label: String,
    pub points: i32,
    pub notes: String,
    pub age: IncidentAge,
    pub delete_label: &'static str,
}

/// One row per employee, ordered by last name.
pub fn status_report(
    engine: &PolicyEngine,
    roster: &Roster,
    today: NaiveDate,
) -> Vec<EmployeeStatusView> {
    roster
        .sorted_employees()
        .into_iter()
        .map(|employee| {
            let recommendation = engine.recommend(roster, &employee.id, today);
            EmployeeStatusView {
                employee_id: employee.id.clone(),
                name: employee.name.clone(),
                position: employee.position.clone(),
                center: employee.center.clone(),
                points: recommendation.points,
                action: recommendation.action,
                action_label: recommendation.action_label(),
                no_call_no_shows: recommendation.no_call_no_shows,
                alert_outstanding: engine.has_outstanding_alert(employee, &recommendation),
                last_notified: employee.last_notified,
            }
        })
        .collect()
}

/// Incidents newest first, optionally restricted to one employee.
pub fn incident_listing(
    engine: &PolicyEngine,
    roster: &Roster,
    employee_id: Option<&EmployeeId>,
    today: NaiveDate,
) -> Vec<IncidentView> {
    let mut incidents: Vec<_> = roster
        .incidents
        .iter()
        .filter(|incident| employee_id.map_or(true, |id| &incident.employee_id == id))
        .collect();
    incidents.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));

    incidents
        .into_iter()
        .map(|incident| {
            let age = engine.incident_age(incident, today);
            IncidentView {
                incident_id: incident.id.clone(),
                employee_id: incident.employee_id.clone(),
                employee_name: roster.employee_name(&incident.employee_id).to_string(),
                date: incident.date,
                kind_label: incident.kind.label().to_string(),
                points: incident.points(),
                notes: incident.notes.clone(),
                age,
                delete_label: age.delete_label(),
            }
        })
        .collect()
}
