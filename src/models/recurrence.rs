use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// How often a recurring task repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Frequency {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Custom,
}

/// Unit of a custom interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum IntervalUnit {
    #[default]
    Day,
    Week,
    Month,
}

/// Recurrence rule attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RecurrencePlan {
    pub frequency: Frequency,
    /// Number of units between repetitions.
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Only consulted for [`Frequency::Custom`].
    #[serde(default)]
    pub unit: IntervalUnit,
    /// Only consulted for [`Frequency::Weekly`]; empty means every day.
    #[serde(default)]
    pub weekdays: Vec<Weekday>,
    /// Last date (inclusive) on which an occurrence may fall.
    #[serde(default)]
    pub until: Option<NaiveDate>,
    /// Maximum number of occurrences to emit.
    #[serde(default)]
    pub count: Option<u32>,
}

fn default_interval() -> u32 {
    1
}

impl RecurrencePlan {
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: 1,
            ..Default::default()
        }
    }

    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_unit(mut self, unit: IntervalUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_weekdays(mut self, weekdays: Vec<Weekday>) -> Self {
        self.weekdays = weekdays;
        self
    }

    pub fn with_until(mut self, until: NaiveDate) -> Self {
        self.until = Some(until);
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.frequency != Frequency::None
    }

    /// Interval clamped to at least one.
    pub fn effective_interval(&self) -> u32 {
        self.interval.max(1)
    }
}
