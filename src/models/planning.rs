use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::task::{Task, TaskRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ScheduleScope {
    #[default]
    Today,
    Tomorrow,
    ThisWeek,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum PrioritizationStrategy {
    #[default]
    UrgentFirst,
    EarlierDeadlinesFirst,
    HighPriorityFirst,
    ShortTasksFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum DayOrganization {
    #[default]
    MaximizeProductivity,
    FocusUrgentBuffer,
    LooseScheduleBreaks,
}

impl DayOrganization {
    /// Minutes of buffer inserted after each placed flexible chunk.
    pub fn buffer_minutes(self) -> Option<i64> {
        match self {
            DayOrganization::MaximizeProductivity => None,
            DayOrganization::FocusUrgentBuffer => Some(10),
            DayOrganization::LooseScheduleBreaks => Some(15),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum PlacementHeuristic {
    #[default]
    EarliestFit,
    BestFit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum OverduePolicy {
    #[default]
    AskUser,
    Postpone,
    ScheduleAnyway,
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerInput {
    pub tasks: Vec<Task>,
    pub work_start: NaiveTime,
    pub work_end: NaiveTime,
    #[serde(default)]
    pub scope: ScheduleScope,
    #[serde(default)]
    pub strategy: PrioritizationStrategy,
    #[serde(default)]
    pub day_organization: DayOrganization,
    #[serde(default)]
    pub heuristic: PlacementHeuristic,
    #[serde(default)]
    pub allow_splitting: bool,
    #[serde(default)]
    pub overdue_policy: OverduePolicy,
}

impl PlannerInput {
    pub fn new(tasks: Vec<Task>, work_start: NaiveTime, work_end: NaiveTime) -> Self {
        Self {
            tasks,
            work_start,
            work_end,
            scope: ScheduleScope::default(),
            strategy: PrioritizationStrategy::default(),
            day_organization: DayOrganization::default(),
            heuristic: PlacementHeuristic::default(),
            allow_splitting: false,
            overdue_policy: OverduePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictKind {
    FixedOverlap,
    FlexibleUnplaced,
    FixedOutsideWindow,
    PlacementFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictItem {
    pub kind: ConflictKind,
    pub tasks: Vec<TaskRef>,
    pub reason: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub requested_start: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiredTask {
    pub task: TaskRef,
    pub deadline: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlacementSource {
    Fixed,
    Flexible,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTaskItem {
    pub task: TaskRef,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub date: NaiveDate,
    pub source: PlacementSource,
}

/// One availability block on the timeline. `end > start` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeBlock {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub occupied: bool,
    #[serde(default)]
    pub task_id: Option<String>,
}

impl TimeBlock {
    pub fn free(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end,
            occupied: false,
            task_id: None,
        }
    }

    pub fn occupied_by(start: NaiveDateTime, end: NaiveDateTime, task_id: Option<String>) -> Self {
        Self {
            start,
            end,
            occupied: true,
            task_id,
        }
    }

    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn contains(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start <= start && end <= self.end
    }

    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start < end && start < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerOutput {
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
    pub schedule: BTreeMap<NaiveDate, Vec<ScheduledTaskItem>>,
    pub unresolved_expired: Vec<ExpiredTask>,
    pub unresolved_conflicts: Vec<ConflictItem>,
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default)]
    pub postponed: Vec<TaskRef>,
    #[serde(default)]
    pub timeline: BTreeMap<NaiveDate, Vec<TimeBlock>>,
}

impl PlannerOutput {
    pub fn items_for(&self, task_id: &str) -> Vec<&ScheduledTaskItem> {
        self.schedule
            .values()
            .flatten()
            .filter(|item| item.task.id == task_id)
            .collect()
    }

    pub fn conflicts_for(&self, task_id: &str) -> Vec<&ConflictItem> {
        self.unresolved_conflicts
            .iter()
            .filter(|conflict| conflict.tasks.first().map(|task| task.id.as_str()) == Some(task_id))
            .collect()
    }
}
