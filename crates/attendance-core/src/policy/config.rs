use super::actions::CorrectiveAction;
use serde::{Deserialize, Serialize};

/// Minimum point total at which an action applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionThreshold {
    pub min_points: u32,
    pub action: CorrectiveAction,
}

/// Tunable inputs of the attendance policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub thresholds: Vec<ActionThreshold>,
    pub no_call_no_show_window_days: i64,
    pub probation_days: i64,
    /// Removal after a single no-call/no-show during the probation period.
    pub probation_no_call_no_show_removal: bool,
    pub good_behavior_removal_days: i64,
}

impl PolicyConfig {
    pub fn standard_thresholds() -> Vec<ActionThreshold> {
        vec![
            ActionThreshold {
                min_points: 15,
                action: CorrectiveAction::Termination,
            },
            ActionThreshold {
                min_points: 12,
                action: CorrectiveAction::FinalWarning,
            },
            ActionThreshold {
                min_points: 8,
                action: CorrectiveAction::WrittenWarning,
            },
            ActionThreshold {
                min_points: 4,
                action: CorrectiveAction::VerbalWarning,
            },
        ]
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            thresholds: Self::standard_thresholds(),
            no_call_no_show_window_days: 365,
            probation_days: 90,
            probation_no_call_no_show_removal: false,
            good_behavior_removal_days: 90,
        }
    }
}
