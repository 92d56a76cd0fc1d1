use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::error::PlannerResult;
use crate::models::planning::PlannerOutput;
use crate::models::settings::PlannerSettings;
use crate::models::task::Task;
use crate::services::planning_engine::PlanningEngine;
use crate::services::window_resolver::resolve_window;

/// Supplies the task snapshot a planning call works on.
pub trait TaskSource: Send + Sync {
    fn snapshot(&self) -> PlannerResult<Vec<Task>>;
}

impl TaskSource for Vec<Task> {
    fn snapshot(&self) -> PlannerResult<Vec<Task>> {
        Ok(self.clone())
    }
}

/// Tasks stored as a JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonFileTaskSource {
    path: PathBuf,
}

impl JsonFileTaskSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl TaskSource for JsonFileTaskSource {
    fn snapshot(&self) -> PlannerResult<Vec<Task>> {
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[derive(Clone, Default)]
pub struct PlanningService {
    engine: PlanningEngine,
}

impl PlanningService {
    pub fn new(engine: PlanningEngine) -> Self {
        Self { engine }
    }

    /// Plans one snapshot from `source`. A source that fails to load gives an
    /// empty plan whose messages say why.
    pub fn generate_from_source(
        &self,
        source: &dyn TaskSource,
        settings: &PlannerSettings,
        now: NaiveDateTime,
    ) -> PlannerOutput {
        let tasks = match source.snapshot() {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!(target: "planner::service", error = %err, "task snapshot unavailable");
                let window = resolve_window(settings.scope, now.date());
                return PlannerOutput {
                    window_start: Some(window.start),
                    window_end: Some(window.end),
                    messages: vec![format!("could not load tasks: {err}")],
                    ..Default::default()
                };
            }
        };

        let input = settings.to_input(tasks);
        let output = self.engine.generate_plan(&input, now);
        info!(
            target: "planner::service",
            tasks = input.tasks.len(),
            days = output.schedule.len(),
            conflicts = output.unresolved_conflicts.len(),
            "plan generated"
        );
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlannerError;
    use chrono::NaiveDate;

    struct BrokenSource;

    impl TaskSource for BrokenSource {
        fn snapshot(&self) -> PlannerResult<Vec<Task>> {
            Err(PlannerError::other("store offline"))
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 5)
            .expect("valid date")
            .and_hms_opt(8, 0, 0)
            .expect("valid time")
    }

    #[test]
    fn failing_source_yields_empty_plan_with_message() {
        let service = PlanningService::default();
        let output = service.generate_from_source(&BrokenSource, &PlannerSettings::default(), now());
        assert!(output.schedule.is_empty());
        assert_eq!(output.window_start, Some(now().date()));
        assert_eq!(output.messages.len(), 1);
        assert!(output.messages[0].contains("store offline"));
    }

    #[test]
    fn in_memory_source_is_planned_with_settings() {
        let service = PlanningService::default();
        let tasks = vec![Task::new("a", "Inbox zero").with_duration(45)];
        let output = service.generate_from_source(&tasks, &PlannerSettings::default(), now());
        let items = output.items_for("a");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].start, now().date().and_hms_opt(9, 0, 0).expect("valid time"));
    }
}
