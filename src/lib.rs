//! Automatic day and week planning.
//!
//! [`PlanningEngine::generate_plan`] turns a task snapshot plus working hours
//! into a per-day schedule, surfacing anything it could not place as
//! conflicts, expired tasks or messages.

pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use error::{PlannerError, PlannerResult};
pub use models::planning::{
    ConflictItem, ConflictKind, DayOrganization, ExpiredTask, OverduePolicy, PlacementHeuristic,
    PlacementSource, PlannerInput, PlannerOutput, PrioritizationStrategy, ScheduleScope,
    ScheduledTaskItem, TimeBlock,
};
pub use models::recurrence::{Frequency, IntervalUnit, RecurrencePlan};
pub use models::settings::PlannerSettings;
pub use models::task::{DayPeriod, PlanSlot, Priority, Task, TaskRef, TimePlan};
pub use services::plan_observer::{NoopObserver, PlanEvent, PlanObserver, TracingObserver};
pub use services::planning_engine::PlanningEngine;
pub use services::planning_service::{JsonFileTaskSource, PlanningService, TaskSource};
