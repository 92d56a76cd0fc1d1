use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::models::planning::{
    DayOrganization, OverduePolicy, PlacementHeuristic, PlannerInput, PrioritizationStrategy,
    ScheduleScope,
};
use crate::models::task::Task;
use crate::services::schedule_utils;

pub const DEFAULT_WORKDAY_START: u32 = 9 * 60;
pub const DEFAULT_WORKDAY_END: u32 = 18 * 60;

/// User scheduling preferences as stored by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlannerSettings {
    pub workday_start_minute: u32,
    pub workday_end_minute: u32,
    pub scope: ScheduleScope,
    pub strategy: PrioritizationStrategy,
    pub day_organization: DayOrganization,
    pub heuristic: PlacementHeuristic,
    pub allow_splitting: bool,
    pub overdue_policy: OverduePolicy,
    /// IANA timezone name used to turn a UTC clock reading into local time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            workday_start_minute: DEFAULT_WORKDAY_START,
            workday_end_minute: DEFAULT_WORKDAY_END,
            scope: ScheduleScope::default(),
            strategy: PrioritizationStrategy::default(),
            day_organization: DayOrganization::default(),
            heuristic: PlacementHeuristic::default(),
            allow_splitting: false,
            overdue_policy: OverduePolicy::default(),
            timezone: None,
        }
    }
}

impl PlannerSettings {
    pub fn work_start(&self) -> NaiveTime {
        schedule_utils::to_naive_time(self.workday_start_minute)
    }

    pub fn work_end(&self) -> NaiveTime {
        schedule_utils::to_naive_time(self.workday_end_minute)
    }

    pub fn to_input(&self, tasks: Vec<Task>) -> PlannerInput {
        PlannerInput {
            tasks,
            work_start: self.work_start(),
            work_end: self.work_end(),
            scope: self.scope,
            strategy: self.strategy,
            day_organization: self.day_organization,
            heuristic: self.heuristic,
            allow_splitting: self.allow_splitting,
            overdue_policy: self.overdue_policy,
        }
    }
}
