use super::actions::{CorrectiveAction, Recommendation};
use crate::roster::domain::{Employee, EmployeeId};
use chrono::NaiveDate;
use serde::Serialize;

/// Unacknowledged corrective action for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub center: String,
    pub action: CorrectiveAction,
    pub action_label: &'static str,
    pub points: u32,
    /// The same action label already appears in the notification history.
    pub previously_notified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_notified: Option<NaiveDate>,
}

/// The acknowledgement flag is authoritative; history is kept for audit only.
pub(crate) fn is_outstanding(employee: &Employee, recommendation: &Recommendation) -> bool {
    recommendation.action.requires_action() && !employee.notification_cleared
}

pub(crate) fn build_alert(employee: &Employee, recommendation: &Recommendation) -> Alert {
    Alert {
        employee_id: employee.id.clone(),
        employee_name: employee.name.clone(),
        center: employee.center.clone(),
        action: recommendation.action,
        action_label: recommendation.action.label(),
        points: recommendation.points,
        previously_notified: employee.was_notified_of(recommendation.action.label()),
        last_notified: employee.last_notified,
    }
}
