use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::recurrence::RecurrencePlan;

/// Duration assumed for tasks that do not carry a positive estimate.
pub const DEFAULT_DURATION_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Priority {
    #[default]
    None,
    Low,
    Medium,
    High,
}

/// Symbolic part of the day used instead of a clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DayPeriod {
    Morning,
    Afternoon,
    Evening,
    Night,
    AllDay,
}

impl DayPeriod {
    /// Start and end offsets of the period in minutes from midnight.
    pub fn minute_range(self) -> (i64, i64) {
        match self {
            DayPeriod::Morning => (6 * 60, 12 * 60),
            DayPeriod::Afternoon => (12 * 60, 18 * 60),
            DayPeriod::Evening => (18 * 60, 22 * 60),
            DayPeriod::Night => (22 * 60, 24 * 60),
            DayPeriod::AllDay => (0, 24 * 60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum PlanSlot {
    #[default]
    Unspecified,
    At(NaiveTime),
    Period(DayPeriod),
}

/// A planned start or deadline: a date plus either a clock time or a day period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePlan {
    pub date: NaiveDate,
    #[serde(default)]
    pub slot: PlanSlot,
}

impl TimePlan {
    pub fn on(date: NaiveDate) -> Self {
        Self {
            date,
            slot: PlanSlot::Unspecified,
        }
    }

    pub fn at(at: NaiveDateTime) -> Self {
        Self {
            date: at.date(),
            slot: PlanSlot::At(at.time()),
        }
    }

    pub fn period(date: NaiveDate, period: DayPeriod) -> Self {
        Self {
            date,
            slot: PlanSlot::Period(period),
        }
    }

    /// The concrete instant, only when a clock time was given.
    pub fn exact(&self) -> Option<NaiveDateTime> {
        match self.slot {
            PlanSlot::At(time) => Some(self.date.and_time(time)),
            _ => None,
        }
    }

    pub fn exact_time(&self) -> Option<NaiveTime> {
        match self.slot {
            PlanSlot::At(time) => Some(time),
            _ => None,
        }
    }

    /// Earliest instant the plan allows.
    pub fn earliest(&self) -> NaiveDateTime {
        let midnight = self.date.and_time(NaiveTime::MIN);
        match self.slot {
            PlanSlot::At(time) => self.date.and_time(time),
            PlanSlot::Period(period) => midnight + Duration::minutes(period.minute_range().0),
            PlanSlot::Unspecified => midnight,
        }
    }

    /// Instant by which a deadline expressed with this plan falls due.
    pub fn deadline(&self) -> NaiveDateTime {
        let midnight = self.date.and_time(NaiveTime::MIN);
        match self.slot {
            PlanSlot::At(time) => self.date.and_time(time),
            PlanSlot::Period(period) => midnight + Duration::minutes(period.minute_range().1),
            PlanSlot::Unspecified => midnight + Duration::days(1),
        }
    }
}

/// Input task snapshot entry. The engine never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub start: Option<TimePlan>,
    #[serde(default)]
    pub end: Option<TimePlan>,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub recurrence: Option<RecurrencePlan>,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            priority: Priority::None,
            start: None,
            end: None,
            duration_minutes: None,
            recurrence: None,
            completed: false,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_start(mut self, start: TimePlan) -> Self {
        self.start = Some(start);
        self
    }

    pub fn with_end(mut self, end: TimePlan) -> Self {
        self.end = Some(end);
        self
    }

    pub fn with_duration(mut self, minutes: i64) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    pub fn with_recurrence(mut self, recurrence: RecurrencePlan) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }

    pub fn effective_minutes(&self) -> i64 {
        self.duration_minutes
            .filter(|minutes| *minutes > 0)
            .unwrap_or(DEFAULT_DURATION_MINUTES)
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence
            .as_ref()
            .map(RecurrencePlan::is_enabled)
            .unwrap_or(false)
    }

    /// Exact start instant; a period-only start never counts as fixed.
    pub fn fixed_start(&self) -> Option<NaiveDateTime> {
        self.start.as_ref().and_then(TimePlan::exact)
    }

    pub fn deadline(&self) -> Option<NaiveDateTime> {
        self.end.as_ref().map(TimePlan::deadline)
    }

    pub fn reference(&self) -> TaskRef {
        TaskRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Lightweight pointer to a task carried in plan output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRef {
    pub id: String,
    pub name: String,
}
