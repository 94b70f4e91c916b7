//! Employee roster and incident ledger.
//!
//! [`Roster`] owns both lists and is the only place they are mutated. Each
//! mutation keeps the invariants the policy engine relies on: unique ids,
//! no incidents left behind by a deleted employee, point values captured on
//! the incident, and adjustments that never push a total below zero.

pub mod domain;

use crate::policy::{points, CorrectiveAction, PolicyEngine};
use chrono::NaiveDate;
use domain::{Employee, EmployeeId, Incident, IncidentId, IncidentKind, Notification};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

/// Display name used for incidents whose employee no longer exists.
pub const UNKNOWN_EMPLOYEE: &str = "Unknown";

const BULK_CLEAR_REMARK: &str = "Cleared with all alerts";

/// Employees plus the incidents recorded against them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub employees: Vec<Employee>,
    pub incidents: Vec<Incident>,
}

/// Input for [`Roster::add_employee`].
#[derive(Debug, Clone, Default)]
pub struct NewEmployee {
    pub name: String,
    pub position: String,
    pub center: String,
    pub hire_date: Option<NaiveDate>,
}

/// Partial edit of an employee's descriptive fields.
#[derive(Debug, Clone, Default)]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub position: Option<String>,
    pub center: Option<String>,
    pub hire_date: Option<NaiveDate>,
}

/// Input for [`Roster::add_incident`].
#[derive(Debug, Clone)]
pub struct NewIncident {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub kind: IncidentKind,
    pub points: Option<i32>,
    pub notes: String,
}

/// Partial edit of an incident.
#[derive(Debug, Clone, Default)]
pub struct IncidentUpdate {
    pub date: Option<NaiveDate>,
    pub kind: Option<IncidentKind>,
    pub points: Option<i32>,
    pub notes: Option<String>,
}

/// Result of deleting an employee together with their incidents.
#[derive(Debug, Clone)]
pub struct RemovedEmployee {
    pub employee: Employee,
    pub incidents_removed: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("employee name must not be blank")]
    EmptyName,
    #[error("employee {0} not found")]
    EmployeeNotFound(EmployeeId),
    #[error("incident {0} not found")]
    IncidentNotFound(IncidentId),
    #[error("duplicate employee id {0}")]
    DuplicateEmployee(EmployeeId),
    #[error("duplicate incident id {0}")]
    DuplicateIncident(IncidentId),
    #[error("incident type '{kind}' requires a point value")]
    MissingPoints { kind: String },
    #[error("incident type '{kind}' is fixed at {expected} points (got {supplied})")]
    FixedPoints {
        kind: String,
        expected: i32,
        supplied: i32,
    },
    #[error("incident type '{kind}' cannot carry negative points ({points})")]
    NegativePoints { kind: String, points: i32 },
}

impl Roster {
    pub fn new(employees: Vec<Employee>, incidents: Vec<Incident>) -> Self {
        Self {
            employees,
            incidents,
        }
    }

    /// Checks id uniqueness across both lists.
    pub fn validate(&self) -> Result<(), RosterError> {
        let mut employee_ids = HashSet::new();
        for employee in &self.employees {
            if !employee_ids.insert(&employee.id) {
                return Err(RosterError::DuplicateEmployee(employee.id.clone()));
            }
        }

        let mut incident_ids = HashSet::new();
        for incident in &self.incidents {
            if !incident_ids.insert(&incident.id) {
                return Err(RosterError::DuplicateIncident(incident.id.clone()));
            }
        }

        Ok(())
    }

    pub fn employee(&self, id: &EmployeeId) -> Option<&Employee> {
        self.employees.iter().find(|employee| &employee.id == id)
    }

    fn employee_mut(&mut self, id: &EmployeeId) -> Result<&mut Employee, RosterError> {
        self.employees
            .iter_mut()
            .find(|employee| &employee.id == id)
            .ok_or_else(|| RosterError::EmployeeNotFound(id.clone()))
    }

    pub fn incident(&self, id: &IncidentId) -> Option<&Incident> {
        self.incidents.iter().find(|incident| &incident.id == id)
    }

    /// Name for display; orphaned references resolve to [`UNKNOWN_EMPLOYEE`].
    pub fn employee_name(&self, id: &EmployeeId) -> &str {
        self.employee(id)
            .map(|employee| employee.name.as_str())
            .unwrap_or(UNKNOWN_EMPLOYEE)
    }

    /// Incidents for one employee, newest first.
    pub fn incidents_for(&self, id: &EmployeeId) -> Vec<&Incident> {
        let mut incidents: Vec<&Incident> = self
            .incidents
            .iter()
            .filter(|incident| &incident.employee_id == id)
            .collect();
        incidents.sort_by(|a, b| b.date.cmp(&a.date));
        incidents
    }

    /// Employees ordered by last name, case-insensitive.
    pub fn sorted_employees(&self) -> Vec<&Employee> {
        let mut employees: Vec<&Employee> = self.employees.iter().collect();
        employees.sort_by_cached_key(|employee| {
            (
                employee.last_name().to_lowercase(),
                employee.name.to_lowercase(),
            )
        });
        employees
    }

    pub fn search(&self, term: &str) -> Vec<&Employee> {
        self.sorted_employees()
            .into_iter()
            .filter(|employee| employee.matches(term))
            .collect()
    }

    pub fn add_employee(
        &mut self,
        new: NewEmployee,
        today: NaiveDate,
    ) -> Result<EmployeeId, RosterError> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(RosterError::EmptyName);
        }

        let id = EmployeeId(next_id(
            "emp",
            self.employees.iter().map(|employee| employee.id.0.as_str()),
        ));

        self.employees.push(Employee {
            id: id.clone(),
            name: name.to_string(),
            position: new.position.trim().to_string(),
            center: new.center.trim().to_string(),
            hire_date: Some(new.hire_date.unwrap_or(today)),
            notifications: Vec::new(),
            notification_cleared: false,
            last_notified: None,
        });

        info!(employee_id = %id, "employee added");
        Ok(id)
    }

    pub fn update_employee(
        &mut self,
        id: &EmployeeId,
        update: EmployeeUpdate,
    ) -> Result<(), RosterError> {
        if matches!(&update.name, Some(name) if name.trim().is_empty()) {
            return Err(RosterError::EmptyName);
        }

        let employee = self.employee_mut(id)?;
        if let Some(name) = update.name {
            employee.name = name.trim().to_string();
        }
        if let Some(position) = update.position {
            employee.position = position.trim().to_string();
        }
        if let Some(center) = update.center {
            employee.center = center.trim().to_string();
        }
        if let Some(hire_date) = update.hire_date {
            employee.hire_date = Some(hire_date);
        }

        info!(employee_id = %id, "employee updated");
        Ok(())
    }

    /// Deletes an employee and every incident that references them.
    pub fn remove_employee(&mut self, id: &EmployeeId) -> Result<RemovedEmployee, RosterError> {
        let index = self
            .employees
            .iter()
            .position(|employee| &employee.id == id)
            .ok_or_else(|| RosterError::EmployeeNotFound(id.clone()))?;
        let employee = self.employees.remove(index);

        let before = self.incidents.len();
        self.incidents.retain(|incident| &incident.employee_id != id);
        let incidents_removed = before - self.incidents.len();

        info!(employee_id = %id, incidents_removed, "employee removed");
        Ok(RemovedEmployee {
            employee,
            incidents_removed,
        })
    }

    pub fn add_incident(&mut self, new: NewIncident) -> Result<IncidentId, RosterError> {
        if self.employee(&new.employee_id).is_none() {
            return Err(RosterError::EmployeeNotFound(new.employee_id));
        }

        let mut points = resolve_points(&new.kind, new.points)?;
        if new.kind == IncidentKind::PointAdjustment {
            points = self.clamp_adjustment(&new.employee_id, points, None);
        }

        let id = IncidentId(next_id(
            "inc",
            self.incidents.iter().map(|incident| incident.id.0.as_str()),
        ));
        let before = points::total_points(&self.incidents, &new.employee_id);

        self.incidents.push(Incident {
            id: id.clone(),
            employee_id: new.employee_id.clone(),
            date: new.date,
            kind: new.kind,
            points: Some(points),
            notes: new.notes.trim().to_string(),
        });

        info!(incident_id = %id, employee_id = %new.employee_id, points, "incident recorded");
        self.rearm_alert_on_point_change(&new.employee_id, before);
        Ok(id)
    }

    /// Records a manual adjustment. A negative delta larger than the current
    /// total is clamped so the total lands on exactly zero.
    pub fn adjust_points(
        &mut self,
        employee_id: &EmployeeId,
        delta: i32,
        date: NaiveDate,
        notes: String,
    ) -> Result<IncidentId, RosterError> {
        self.add_incident(NewIncident {
            employee_id: employee_id.clone(),
            date,
            kind: IncidentKind::PointAdjustment,
            points: Some(delta),
            notes,
        })
    }

    pub fn update_incident(
        &mut self,
        id: &IncidentId,
        update: IncidentUpdate,
    ) -> Result<(), RosterError> {
        let current = self
            .incident(id)
            .cloned()
            .ok_or_else(|| RosterError::IncidentNotFound(id.clone()))?;

        let kind_changed = update
            .kind
            .as_ref()
            .is_some_and(|kind| kind != &current.kind);
        let kind = update.kind.unwrap_or_else(|| current.kind.clone());

        let mut points = match update.points {
            Some(points) => resolve_points(&kind, Some(points))?,
            None if kind_changed => resolve_points(&kind, None)?,
            None => current.points(),
        };
        if kind == IncidentKind::PointAdjustment {
            points = self.clamp_adjustment(&current.employee_id, points, Some(id));
        }

        let before = points::total_points(&self.incidents, &current.employee_id);
        let incident = self
            .incidents
            .iter_mut()
            .find(|incident| &incident.id == id)
            .ok_or_else(|| RosterError::IncidentNotFound(id.clone()))?;

        if let Some(date) = update.date {
            incident.date = date;
        }
        if let Some(notes) = update.notes {
            incident.notes = notes.trim().to_string();
        }
        incident.kind = kind;
        incident.points = Some(points);

        info!(incident_id = %id, points, "incident updated");
        self.settle_adjustments(&current.employee_id);
        self.rearm_alert_on_point_change(&current.employee_id, before);
        Ok(())
    }

    pub fn remove_incident(&mut self, id: &IncidentId) -> Result<Incident, RosterError> {
        let index = self
            .incidents
            .iter()
            .position(|incident| &incident.id == id)
            .ok_or_else(|| RosterError::IncidentNotFound(id.clone()))?;

        let employee_id = self.incidents[index].employee_id.clone();
        let before = points::total_points(&self.incidents, &employee_id);
        let incident = self.incidents.remove(index);

        info!(incident_id = %id, employee_id = %employee_id, "incident removed");
        self.settle_adjustments(&employee_id);
        self.rearm_alert_on_point_change(&employee_id, before);
        Ok(incident)
    }

    /// Appends a notice to the employee's history and acknowledges the alert.
    pub fn record_notification(
        &mut self,
        employee_id: &EmployeeId,
        action: CorrectiveAction,
        date: NaiveDate,
        points_at_time: u32,
        remark: String,
    ) -> Result<(), RosterError> {
        let employee = self.employee_mut(employee_id)?;
        employee.notifications.push(Notification {
            action: action.label().to_string(),
            date,
            points_at_time,
            remark: remark.trim().to_string(),
        });
        employee.notification_cleared = true;
        employee.last_notified = Some(date);

        info!(%employee_id, action = action.label(), points_at_time, "notification recorded");
        Ok(())
    }

    /// Acknowledges every outstanding alert in one pass.
    pub fn clear_all_alerts(
        &mut self,
        engine: &PolicyEngine,
        today: NaiveDate,
    ) -> Vec<EmployeeId> {
        let alerts = engine.alerts(self, today);
        let mut cleared = Vec::with_capacity(alerts.len());

        for alert in alerts {
            let employee = match self.employee_mut(&alert.employee_id) {
                Ok(employee) => employee,
                Err(_) => continue,
            };
            employee.notifications.push(Notification {
                action: alert.action_label.to_string(),
                date: today,
                points_at_time: alert.points,
                remark: BULK_CLEAR_REMARK.to_string(),
            });
            employee.notification_cleared = true;
            employee.last_notified = Some(today);
            cleared.push(alert.employee_id);
        }

        info!(cleared = cleared.len(), "alerts cleared");
        cleared
    }

    /// Re-raises the alert for an employee whose notice was acknowledged.
    pub fn restore_alert(&mut self, employee_id: &EmployeeId) -> Result<(), RosterError> {
        let employee = self.employee_mut(employee_id)?;
        employee.notification_cleared = false;
        info!(%employee_id, "alert restored");
        Ok(())
    }

    fn clamp_adjustment(
        &self,
        employee_id: &EmployeeId,
        delta: i32,
        excluding: Option<&IncidentId>,
    ) -> i32 {
        let current = points::total_points(
            self.incidents
                .iter()
                .filter(|incident| Some(&incident.id) != excluding),
            employee_id,
        );
        let floor = -i64::from(current);
        i32::try_from(i64::from(delta).max(floor)).unwrap_or(delta)
    }

    /// Raises negative adjustments, most recent first, until the employee's
    /// raw point sum is back at zero. Adjustments only ever offset points that
    /// are still on record.
    fn settle_adjustments(&mut self, employee_id: &EmployeeId) {
        let breakdown = points::breakdown(&self.incidents, employee_id);
        let mut deficit = -(breakdown.illness_points + breakdown.other_points);
        if deficit <= 0 {
            return;
        }

        let mut negative: Vec<usize> = self
            .incidents
            .iter()
            .enumerate()
            .filter(|(_, incident)| {
                &incident.employee_id == employee_id
                    && incident.kind == IncidentKind::PointAdjustment
                    && incident.points() < 0
            })
            .map(|(index, _)| index)
            .collect();
        negative.sort_by(|a, b| {
            let (a, b) = (&self.incidents[*a], &self.incidents[*b]);
            b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id))
        });

        for index in negative {
            if deficit <= 0 {
                break;
            }
            let incident = &mut self.incidents[index];
            let stored = i64::from(incident.points());
            let raised = (-stored).min(deficit);
            deficit -= raised;
            incident.points = Some(i32::try_from(stored + raised).unwrap_or(0));
            info!(
                incident_id = %incident.id,
                %employee_id,
                points = incident.points(),
                "adjustment settled against remaining points"
            );
        }
    }

    fn rearm_alert_on_point_change(&mut self, employee_id: &EmployeeId, before: u32) {
        let after = points::total_points(&self.incidents, employee_id);
        if after == before {
            return;
        }
        if let Ok(employee) = self.employee_mut(employee_id) {
            if employee.notification_cleared {
                employee.notification_cleared = false;
                info!(%employee_id, before, after, "alert re-armed after point change");
            }
        }
    }
}

/// Point value captured on an incident of the given kind.
fn resolve_points(kind: &IncidentKind, supplied: Option<i32>) -> Result<i32, RosterError> {
    match (kind, kind.base_points(), supplied) {
        (IncidentKind::PointAdjustment, _, Some(points)) => Ok(points),
        (IncidentKind::PointAdjustment | IncidentKind::Other, _, None) => {
            Err(RosterError::MissingPoints {
                kind: kind.label().to_string(),
            })
        }
        (_, Some(expected), None) => Ok(expected),
        (_, Some(expected), Some(supplied)) if supplied != expected => {
            Err(RosterError::FixedPoints {
                kind: kind.label().to_string(),
                expected,
                supplied,
            })
        }
        (_, _, Some(points)) if points < 0 => Err(RosterError::NegativePoints {
            kind: kind.label().to_string(),
            points,
        }),
        (_, _, Some(points)) => Ok(points),
        (_, None, None) => Ok(0),
    }
}

/// Next `<prefix>-NNNNNN` id above every existing id with that prefix.
fn next_id<'a, I>(prefix: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let next = existing
        .into_iter()
        .filter_map(|id| id.strip_prefix(prefix)?.strip_prefix('-')?.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
        + 1;
    format!("{prefix}-{next:06}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 20).expect("valid date")
    }

    fn roster_with_employee() -> (Roster, EmployeeId) {
        let mut roster = Roster::default();
        let id = roster
            .add_employee(
                NewEmployee {
                    name: "  Jordan Ellis ".to_string(),
                    position: "RBT".to_string(),
                    center: "Beachwood".to_string(),
                    hire_date: None,
                },
                today(),
            )
            .expect("employee added");
        (roster, id)
    }

    fn incident(employee_id: &EmployeeId, kind: IncidentKind, points: Option<i32>) -> NewIncident {
        NewIncident {
            employee_id: employee_id.clone(),
            date: today(),
            kind,
            points,
            notes: String::new(),
        }
    }

    #[test]
    fn next_id_skips_foreign_formats() {
        let existing = ["emp-000004", "1712345678901", "emp-x", "inc-000009"];
        assert_eq!(next_id("emp", existing), "emp-000005");
        assert_eq!(next_id("inc", []), "inc-000001");
    }

    #[test]
    fn add_employee_trims_and_defaults_hire_date() {
        let (roster, id) = roster_with_employee();
        let employee = roster.employee(&id).expect("employee present");
        assert_eq!(employee.name, "Jordan Ellis");
        assert_eq!(employee.hire_date, Some(today()));
    }

    #[test]
    fn blank_names_are_rejected() {
        let mut roster = Roster::default();
        let result = roster.add_employee(NewEmployee::default(), today());
        assert!(matches!(result, Err(RosterError::EmptyName)));
    }

    #[test]
    fn points_are_captured_from_the_table() {
        let (mut roster, id) = roster_with_employee();
        let incident_id = roster
            .add_incident(incident(&id, IncidentKind::LateArrival, None))
            .expect("incident added");
        assert_eq!(
            roster.incident(&incident_id).and_then(|incident| incident.points),
            Some(2)
        );
    }

    #[test]
    fn other_requires_points_and_fixed_kinds_reject_overrides() {
        let (mut roster, id) = roster_with_employee();

        match roster.add_incident(incident(&id, IncidentKind::Other, None)) {
            Err(RosterError::MissingPoints { .. }) => {}
            other => panic!("expected missing points, got {other:?}"),
        }
        match roster.add_incident(incident(&id, IncidentKind::LateArrival, Some(5))) {
            Err(RosterError::FixedPoints { expected: 2, .. }) => {}
            other => panic!("expected fixed points error, got {other:?}"),
        }
        match roster.add_incident(incident(&id, IncidentKind::Other, Some(-1))) {
            Err(RosterError::NegativePoints { .. }) => {}
            other => panic!("expected negative points error, got {other:?}"),
        }
    }

    #[test]
    fn incidents_for_unknown_employee_are_rejected() {
        let mut roster = Roster::default();
        let ghost = EmployeeId("ghost".to_string());
        match roster.add_incident(incident(&ghost, IncidentKind::LateArrival, None)) {
            Err(RosterError::EmployeeNotFound(id)) => assert_eq!(id, ghost),
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn editing_kind_recomputes_points_and_rearms_alert() {
        let (mut roster, id) = roster_with_employee();
        let incident_id = roster
            .add_incident(incident(&id, IncidentKind::LateArrival, None))
            .expect("incident added");
        roster
            .record_notification(
                &id,
                CorrectiveAction::VerbalWarning,
                today(),
                2,
                String::new(),
            )
            .expect("notification recorded");

        roster
            .update_incident(
                &incident_id,
                IncidentUpdate {
                    kind: Some(IncidentKind::PlannedAbsence),
                    ..IncidentUpdate::default()
                },
            )
            .expect("incident updated");

        let stored = roster.incident(&incident_id).expect("incident present");
        assert_eq!(stored.points, Some(4));
        let employee = roster.employee(&id).expect("employee present");
        assert!(!employee.notification_cleared);
    }

    #[test]
    fn lowering_an_offset_incident_shrinks_the_adjustment() {
        let (mut roster, id) = roster_with_employee();
        let absence = roster
            .add_incident(incident(&id, IncidentKind::UnnotifiedAbsence, None))
            .expect("incident recorded");
        let adjustment = roster
            .adjust_points(&id, -10, today(), String::new())
            .expect("adjustment recorded");

        roster
            .update_incident(
                &absence,
                IncidentUpdate {
                    kind: Some(IncidentKind::LateArrival),
                    ..IncidentUpdate::default()
                },
            )
            .expect("incident edited");

        let stored = roster.incident(&adjustment).expect("adjustment kept");
        assert_eq!(stored.points(), -2);
        assert_eq!(points::total_points(&roster.incidents, &id), 0);

        roster
            .add_incident(incident(&id, IncidentKind::EarlyDeparture, None))
            .expect("incident recorded");
        assert_eq!(points::total_points(&roster.incidents, &id), 2);
    }

    #[test]
    fn notes_only_edit_keeps_alert_acknowledged() {
        let (mut roster, id) = roster_with_employee();
        let incident_id = roster
            .add_incident(incident(&id, IncidentKind::PlannedAbsence, None))
            .expect("incident added");
        roster
            .record_notification(
                &id,
                CorrectiveAction::VerbalWarning,
                today(),
                4,
                String::new(),
            )
            .expect("notification recorded");

        roster
            .update_incident(
                &incident_id,
                IncidentUpdate {
                    notes: Some("called in at 7:40".to_string()),
                    ..IncidentUpdate::default()
                },
            )
            .expect("incident updated");

        assert!(roster
            .employee(&id)
            .expect("employee present")
            .notification_cleared);
    }

    #[test]
    fn sorted_employees_use_last_name() {
        let mut roster = Roster::default();
        for name in ["Priya Zimmerman", "liam adams", "Noah Baker"] {
            roster
                .add_employee(
                    NewEmployee {
                        name: name.to_string(),
                        ..NewEmployee::default()
                    },
                    today(),
                )
                .expect("employee added");
        }

        let names: Vec<&str> = roster
            .sorted_employees()
            .into_iter()
            .map(|employee| employee.name.as_str())
            .collect();
        assert_eq!(names, vec!["liam adams", "Noah Baker", "Priya Zimmerman"]);
    }

    #[test]
    fn validate_flags_duplicate_ids() {
        let (mut roster, _) = roster_with_employee();
        let copy = roster.employees[0].clone();
        roster.employees.push(copy);
        assert!(matches!(
            roster.validate(),
            Err(RosterError::DuplicateEmployee(_))
        ));
    }
}
