use super::config::{ActionThreshold, PolicyConfig};
use crate::roster::domain::{Employee, EmployeeId, Incident};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Disciplinary label recommended by the policy, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectiveAction {
    NoActionRequired,
    VerbalWarning,
    WrittenWarning,
    WrittenWarningNoCallNoShow,
    FinalWarning,
    Termination,
    TerminationMultipleNoCallNoShows,
    TerminationProbationaryNoCallNoShow,
}

impl CorrectiveAction {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::NoActionRequired,
            Self::VerbalWarning,
            Self::WrittenWarning,
            Self::WrittenWarningNoCallNoShow,
            Self::FinalWarning,
            Self::Termination,
            Self::TerminationMultipleNoCallNoShows,
            Self::TerminationProbationaryNoCallNoShow,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NoActionRequired => "No Action Required",
            Self::VerbalWarning => "Verbal Warning",
            Self::WrittenWarning => "Written Warning",
            Self::WrittenWarningNoCallNoShow => "Written Warning (No-Call/No-Show)",
            Self::FinalWarning => "Final Warning (PIP)",
            Self::Termination => "Termination",
            Self::TerminationMultipleNoCallNoShows => "Termination (Multiple No-Call/No-Shows)",
            Self::TerminationProbationaryNoCallNoShow => {
                "Termination (No-Call/No-Show in First 90 Days)"
            }
        }
    }

    pub const fn requires_action(self) -> bool {
        !matches!(self, Self::NoActionRequired)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        Self::ordered()
            .into_iter()
            .find(|action| action.label().eq_ignore_ascii_case(trimmed))
    }
}

/// Recommendation returned for a single employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub employee_id: EmployeeId,
    pub action: CorrectiveAction,
    pub points: u32,
    pub no_call_no_shows: usize,
}

impl Recommendation {
    pub fn action_label(&self) -> &'static str {
        self.action.label()
    }
}

/// Highest qualifying threshold wins; below every threshold there is nothing to do.
pub(crate) fn threshold_action(thresholds: &[ActionThreshold], points: u32) -> CorrectiveAction {
    thresholds
        .iter()
        .filter(|threshold| points >= threshold.min_points)
        .max_by_key(|threshold| threshold.min_points)
        .map(|threshold| threshold.action)
        .unwrap_or(CorrectiveAction::NoActionRequired)
}

pub(crate) fn no_call_no_show_dates<'a>(
    incidents: &'a [Incident],
    employee_id: &'a EmployeeId,
) -> impl Iterator<Item = NaiveDate> + 'a {
    incidents
        .iter()
        .filter(move |incident| {
            &incident.employee_id == employee_id && incident.kind.is_no_call_no_show()
        })
        .map(|incident| incident.date)
}

pub(crate) fn window_start(today: NaiveDate, days: i64) -> NaiveDate {
    today
        .checked_sub_signed(Duration::days(days))
        .unwrap_or(NaiveDate::MIN)
}

pub(crate) fn count_no_call_no_shows(
    config: &PolicyConfig,
    incidents: &[Incident],
    employee_id: &EmployeeId,
    today: NaiveDate,
) -> usize {
    let cutoff = window_start(today, config.no_call_no_show_window_days);
    no_call_no_show_dates(incidents, employee_id)
        .filter(|date| *date >= cutoff)
        .count()
}

fn no_call_no_show_during_probation(
    config: &PolicyConfig,
    employee: Option<&Employee>,
    incidents: &[Incident],
    employee_id: &EmployeeId,
    today: NaiveDate,
) -> bool {
    let Some(hire_date) = employee.and_then(|employee| employee.hire_date) else {
        return false;
    };
    let probation_end = hire_date
        .checked_add_signed(Duration::days(config.probation_days))
        .unwrap_or(NaiveDate::MAX);
    let cutoff = window_start(today, config.no_call_no_show_window_days);

    no_call_no_show_dates(incidents, employee_id)
        .any(|date| date >= hire_date && date < probation_end && date >= cutoff)
}

pub(crate) fn decide_action(
    config: &PolicyConfig,
    employee: Option<&Employee>,
    incidents: &[Incident],
    employee_id: &EmployeeId,
    points: u32,
    today: NaiveDate,
) -> (CorrectiveAction, usize) {
    let base = threshold_action(&config.thresholds, points);
    let no_call_no_shows = count_no_call_no_shows(config, incidents, employee_id, today);

    if no_call_no_shows >= 2 {
        return (
            CorrectiveAction::TerminationMultipleNoCallNoShows,
            no_call_no_shows,
        );
    }

    if config.probation_no_call_no_show_removal
        && no_call_no_show_during_probation(config, employee, incidents, employee_id, today)
    {
        return (
            CorrectiveAction::TerminationProbationaryNoCallNoShow,
            no_call_no_shows,
        );
    }

    if no_call_no_shows == 1 && base == CorrectiveAction::VerbalWarning {
        return (CorrectiveAction::WrittenWarningNoCallNoShow, no_call_no_shows);
    }

    (base, no_call_no_shows)
}
