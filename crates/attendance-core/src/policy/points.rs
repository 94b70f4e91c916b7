use crate::roster::domain::{EmployeeId, Incident};
use chrono::NaiveDate;
use serde::Serialize;

/// Value of one illness occurrence, however many consecutive days it spans.
pub const ILLNESS_OCCURRENCE_POINTS: i64 = 4;

/// Audit view of how a point total was assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PointBreakdown {
    pub illness_days: usize,
    pub illness_occurrences: usize,
    pub illness_points: i64,
    pub other_points: i64,
    pub total: u32,
}

/// Counts maximal runs of consecutive calendar days.
///
/// A date exactly one day after the previous one extends the current run.
/// A repeat of the same day or a gap of two or more days opens a new one.
pub fn count_occurrences(dates: &mut [NaiveDate]) -> usize {
    dates.sort_unstable();

    let mut iter = dates.iter();
    let Some(mut previous) = iter.next() else {
        return 0;
    };

    let mut occurrences = 1;
    for current in iter {
        if (*current - *previous).num_days() != 1 {
            occurrences += 1;
        }
        previous = current;
    }
    occurrences
}

pub fn breakdown<'a, I>(incidents: I, employee_id: &EmployeeId) -> PointBreakdown
where
    I: IntoIterator<Item = &'a Incident>,
{
    let mut illness_dates = Vec::new();
    let mut other_points: i64 = 0;

    for incident in incidents
        .into_iter()
        .filter(|incident| &incident.employee_id == employee_id)
    {
        if incident.kind.is_illness() {
            illness_dates.push(incident.date);
        } else {
            other_points += i64::from(incident.points());
        }
    }

    let illness_days = illness_dates.len();
    let illness_occurrences = count_occurrences(&mut illness_dates);
    let illness_points = illness_occurrences as i64 * ILLNESS_OCCURRENCE_POINTS;
    let total = clamp_total(illness_points + other_points);

    PointBreakdown {
        illness_days,
        illness_occurrences,
        illness_points,
        other_points,
        total,
    }
}

/// Derived total for one employee, floored at zero.
pub fn total_points<'a, I>(incidents: I, employee_id: &EmployeeId) -> u32
where
    I: IntoIterator<Item = &'a Incident>,
{
    breakdown(incidents, employee_id).total
}

fn clamp_total(raw: i64) -> u32 {
    u32::try_from(raw.max(0)).unwrap_or(u32::MAX)
}
