use chrono::NaiveDate;
use serde::Serialize;

/// Read-only classification offered on the manual delete action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentAge {
    Recent,
    EligibleForRemoval,
}

impl IncidentAge {
    pub const fn delete_label(self) -> &'static str {
        match self {
            Self::Recent => "Delete",
            Self::EligibleForRemoval => "Remove (Good Behavior)",
        }
    }

    pub const fn is_eligible_for_removal(self) -> bool {
        matches!(self, Self::EligibleForRemoval)
    }
}

/// An incident ages out once it is strictly more than `days` old.
pub(crate) fn classify(date: NaiveDate, today: NaiveDate, days: i64) -> IncidentAge {
    if (today - date).num_days() > days {
        IncidentAge::EligibleForRemoval
    } else {
        IncidentAge::Recent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn boundary_day_is_still_recent() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid date");
        assert_eq!(
            classify(today - Duration::days(90), today, 90),
            IncidentAge::Recent
        );
        assert_eq!(
            classify(today - Duration::days(91), today, 90),
            IncidentAge::EligibleForRemoval
        );
    }

    #[test]
    fn future_dates_are_recent() {
        let today = NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid date");
        let age = classify(today + Duration::days(3), today, 90);
        assert_eq!(age, IncidentAge::Recent);
        assert_eq!(age.delete_label(), "Delete");
    }
}
