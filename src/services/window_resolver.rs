use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::planning::ScheduleScope;

/// Closed range of dates a plan covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PlanningWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

pub fn resolve_window(scope: ScheduleScope, today: NaiveDate) -> PlanningWindow {
    match scope {
        ScheduleScope::Today => PlanningWindow {
            start: today,
            end: today,
        },
        ScheduleScope::Tomorrow => {
            let tomorrow = today.succ_opt().unwrap_or(today);
            PlanningWindow {
                start: tomorrow,
                end: tomorrow,
            }
        }
        ScheduleScope::ThisWeek => {
            let days_to_sunday = 6 - today.weekday().num_days_from_monday() as i64;
            let sunday = today
                .checked_add_signed(Duration::days(days_to_sunday))
                .unwrap_or(today);
            PlanningWindow {
                start: today,
                end: sunday,
            }
        }
    }
}
