//! Attendance point accumulation and corrective-action policy.
//!
//! Every function here is pure: callers hand in the roster and an explicit
//! reference date and get derived values back. Nothing is cached between
//! calls and no roster data is mutated.

mod actions;
mod aging;
mod alerts;
mod config;
pub mod points;

#[cfg(test)]
mod tests;

pub use actions::{CorrectiveAction, Recommendation};
pub use aging::IncidentAge;
pub use alerts::Alert;
pub use config::{ActionThreshold, PolicyConfig};
pub use points::PointBreakdown;

use crate::roster::domain::{Employee, EmployeeId, Incident};
use crate::roster::Roster;
use chrono::NaiveDate;
use tracing::debug;

/// Stateless evaluator applying a [`PolicyConfig`] to roster data.
#[derive(Debug, Clone, Default)]
pub struct PolicyEngine {
    config: PolicyConfig,
}

impl PolicyEngine {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn total_points(&self, incidents: &[Incident], employee_id: &EmployeeId) -> u32 {
        points::total_points(incidents, employee_id)
    }

    pub fn point_breakdown(
        &self,
        incidents: &[Incident],
        employee_id: &EmployeeId,
    ) -> PointBreakdown {
        points::breakdown(incidents, employee_id)
    }

    /// Threshold lookup alone, before any no-call/no-show override.
    pub fn action_for_points(&self, points: u32) -> CorrectiveAction {
        actions::threshold_action(&self.config.thresholds, points)
    }

    pub fn no_call_no_show_count(
        &self,
        incidents: &[Incident],
        employee_id: &EmployeeId,
        today: NaiveDate,
    ) -> usize {
        actions::count_no_call_no_shows(&self.config, incidents, employee_id, today)
    }

    /// Recommended action and point total. Unknown ids and employees without
    /// incidents yield `NoActionRequired` with zero points.
    pub fn recommend(
        &self,
        roster: &Roster,
        employee_id: &EmployeeId,
        today: NaiveDate,
    ) -> Recommendation {
        let employee = roster.employee(employee_id);
        let points = points::total_points(&roster.incidents, employee_id);
        let (action, no_call_no_shows) = actions::decide_action(
            &self.config,
            employee,
            &roster.incidents,
            employee_id,
            points,
            today,
        );

        debug!(
            %employee_id,
            points,
            no_call_no_shows,
            action = action.label(),
            "evaluated attendance"
        );

        Recommendation {
            employee_id: employee_id.clone(),
            action,
            points,
            no_call_no_shows,
        }
    }

    /// True while the recommended action is unacknowledged.
    pub fn has_outstanding_alert(
        &self,
        employee: &Employee,
        recommendation: &Recommendation,
    ) -> bool {
        alerts::is_outstanding(employee, recommendation)
    }

    /// Outstanding alerts in roster order.
    pub fn alerts(&self, roster: &Roster, today: NaiveDate) -> Vec<Alert> {
        roster
            .employees
            .iter()
            .filter_map(|employee| {
                let recommendation = self.recommend(roster, &employee.id, today);
                alerts::is_outstanding(employee, &recommendation)
                    .then(|| alerts::build_alert(employee, &recommendation))
            })
            .collect()
    }

    pub fn incident_age(&self, incident: &Incident, today: NaiveDate) -> IncidentAge {
        aging::classify(incident.date, today, self.config.good_behavior_removal_days)
    }
}
