use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifier wrapper for roster entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub String);

/// Identifier wrapper for recorded incidents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IncidentId(pub String);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for IncidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Policy vocabulary for attendance incidents.
///
/// Serialized as the human-readable label so documents stay compatible with
/// hand-edited backups. Unrecognized labels survive as [`IncidentKind::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IncidentKind {
    UnnotifiedAbsence,
    LateArrival,
    EarlyDeparture,
    PlannedAbsence,
    UnexpectedIllness,
    Other,
    PointAdjustment,
    Custom(String),
}

impl IncidentKind {
    /// Kinds offered on the incident form, in display order.
    pub fn standard() -> [Self; 6] {
        [
            Self::UnnotifiedAbsence,
            Self::LateArrival,
            Self::EarlyDeparture,
            Self::PlannedAbsence,
            Self::UnexpectedIllness,
            Self::Other,
        ]
    }

    pub fn label(&self) -> &str {
        match self {
            Self::UnnotifiedAbsence => "Unnotified Absence",
            Self::LateArrival => "Late Arrival",
            Self::EarlyDeparture => "Early Departure",
            Self::PlannedAbsence => "Planned Absence (<24h notice)",
            Self::UnexpectedIllness => "Unexpected Illness/Last-Minute Emergency",
            Self::Other => "Other",
            Self::PointAdjustment => "Point Adjustment",
            Self::Custom(label) => label,
        }
    }

    /// Fixed table value, `None` for kinds whose points are caller-supplied.
    pub const fn base_points(&self) -> Option<i32> {
        match self {
            Self::UnnotifiedAbsence => Some(10),
            Self::LateArrival | Self::EarlyDeparture => Some(2),
            Self::PlannedAbsence | Self::UnexpectedIllness => Some(4),
            Self::Other | Self::PointAdjustment | Self::Custom(_) => None,
        }
    }

    pub const fn is_illness(&self) -> bool {
        matches!(self, Self::UnexpectedIllness)
    }

    pub const fn is_no_call_no_show(&self) -> bool {
        matches!(self, Self::UnnotifiedAbsence)
    }

    /// Accepts canonical labels plus the shorthand used on older forms.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "unnotified absence" | "no-call/no-show" | "no call/no show" | "ncns" => {
                Self::UnnotifiedAbsence
            }
            "late arrival" | "late" => Self::LateArrival,
            "early departure" | "early" => Self::EarlyDeparture,
            "planned absence" | "planned absence (<24h notice)" | "planned" => {
                Self::PlannedAbsence
            }
            "unexpected illness/last-minute emergency"
            | "unexpected illness"
            | "illness"
            | "sick" => Self::UnexpectedIllness,
            "other" => Self::Other,
            "point adjustment" | "manual adjustment" | "adjustment" => Self::PointAdjustment,
            _ => Self::Custom(trimmed.to_string()),
        }
    }
}

impl fmt::Display for IncidentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for IncidentKind {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<IncidentKind> for String {
    fn from(value: IncidentKind) -> Self {
        match value {
            IncidentKind::Custom(label) => label,
            other => other.label().to_string(),
        }
    }
}

/// Corrective-action notice delivered to an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub action: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub points_at_time: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub remark: String,
}

/// Roster entry. Sorting and display use the last word of `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "EmployeeRecord")]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub position: String,
    pub center: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hire_date: Option<NaiveDate>,
    pub notifications: Vec<Notification>,
    pub notification_cleared: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_notified: Option<NaiveDate>,
}

impl Employee {
    pub fn last_name(&self) -> &str {
        self.name.split_whitespace().last().unwrap_or(&self.name)
    }

    /// Case-insensitive substring match over name, position and center.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&self.name, &self.position, &self.center]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    pub fn was_notified_of(&self, action_label: &str) -> bool {
        self.notifications
            .iter()
            .any(|notice| notice.action == action_label)
    }
}

/// Wire shape accepted on load; tolerates the split `first`/`last` variant.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmployeeRecord {
    id: EmployeeId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    first: Option<String>,
    #[serde(default)]
    last: Option<String>,
    #[serde(default, alias = "title", deserialize_with = "null_as_default")]
    position: String,
    #[serde(default, deserialize_with = "null_as_default")]
    center: String,
    #[serde(default)]
    hire_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_as_default")]
    notifications: Vec<Notification>,
    #[serde(default, deserialize_with = "null_as_default")]
    notification_cleared: bool,
    #[serde(default)]
    last_notified: Option<NaiveDate>,
}

impl From<EmployeeRecord> for Employee {
    fn from(record: EmployeeRecord) -> Self {
        let name = match record.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => [record.first, record.last]
                .into_iter()
                .flatten()
                .filter(|part| !part.trim().is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        };

        Self {
            id: record.id,
            name,
            position: record.position,
            center: record.center,
            hire_date: record.hire_date,
            notifications: record.notifications,
            notification_cleared: record.notification_cleared,
            last_notified: record.last_notified,
        }
    }
}

/// Dated attendance record tied to one employee.
///
/// `points` is captured when the incident is recorded; documents written
/// before the field existed fall back to the kind's table value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: IncidentId,
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    #[serde(rename = "type", alias = "reason")]
    pub kind: IncidentKind,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "pts")]
    pub points: Option<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
}

impl Incident {
    pub fn points(&self) -> i32 {
        self.points
            .or_else(|| self.kind.base_points())
            .unwrap_or(0)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let opt = Option::<T>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}
