use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::models::planning::{OverduePolicy, PlannerInput, PlannerOutput};
use crate::services::fixed_placement::{FixedOccurrence, FixedPlacementEngine};
use crate::services::flexible_placement::{FlexibleOptions, FlexiblePlacementEngine, FlexibleRequest};
use crate::services::plan_observer::{PlanEvent, PlanObserver, TracingObserver};
use crate::services::priority_scorer::{rank_by_score, score_task};
use crate::services::recurrence_expander::RecurrenceExpander;
use crate::services::result_assembler::ResultAssembler;
use crate::services::task_classifier::classify_tasks;
use crate::services::timeline_builder::Timeline;
use crate::services::window_resolver::resolve_window;

/// Runs the whole planning pipeline over one task snapshot.
///
/// Planning never fails as a whole: anything that cannot be placed ends up
/// in the conflict, expired, or message lists of the returned output.
#[derive(Clone)]
pub struct PlanningEngine {
    observer: Arc<dyn PlanObserver>,
}

impl Default for PlanningEngine {
    fn default() -> Self {
        Self::with_observer(Arc::new(TracingObserver))
    }
}

impl PlanningEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observer(observer: Arc<dyn PlanObserver>) -> Self {
        Self { observer }
    }

    /// Builds a plan for `input`. `now` fixes both the window and every
    /// deadline comparison, so the same input and `now` give the same output.
    pub fn generate_plan(&self, input: &PlannerInput, now: NaiveDateTime) -> PlannerOutput {
        let observer = self.observer.as_ref();
        let tasks = input.tasks.as_slice();
        observer.on_event(&PlanEvent::PlanStarted { tasks: tasks.len() });

        let window = resolve_window(input.scope, now.date());
        let classified = classify_tasks(tasks, &window, input.overdue_policy);
        let mut timeline = Timeline::build(&window, input.work_start, input.work_end);
        let mut assembler = ResultAssembler::new(tasks, window, now);

        let mut occurrences: Vec<FixedOccurrence> = classified
            .fixed
            .iter()
            .filter_map(|&task_index| {
                tasks[task_index].fixed_start().map(|start| FixedOccurrence {
                    task_index,
                    start,
                    minutes: tasks[task_index].effective_minutes(),
                })
            })
            .collect();

        for &task_index in &classified.recurring {
            let task = &tasks[task_index];
            let expansion = RecurrenceExpander::expand(task, &window, input.work_start, observer);
            if let Some(reason) = expansion.truncated {
                assembler.message(format!("recurrence of {} truncated: {reason}", task.name));
            }
            occurrences.extend(expansion.occurrences.into_iter().map(|start| FixedOccurrence {
                task_index,
                start,
                minutes: task.effective_minutes(),
            }));
        }

        let fixed_report = FixedPlacementEngine::new(tasks, window, observer)
            .place_all(&mut timeline, occurrences);
        assembler.add_fixed(fixed_report);

        let mut requests: Vec<FlexibleRequest> = classified
            .flexible
            .iter()
            .map(|&task_index| FlexibleRequest {
                task_index,
                honor_deadline: true,
            })
            .collect();

        for &task_index in &classified.overdue {
            let task = &tasks[task_index];
            match input.overdue_policy {
                OverduePolicy::AskUser => assembler.expire(task),
                OverduePolicy::Postpone => {
                    assembler.postpone(task.reference());
                    assembler.message(format!("{} is overdue and was postponed", task.name));
                }
                OverduePolicy::ScheduleAnyway => {
                    assembler.message(format!(
                        "{} is overdue and was scheduled without its deadline",
                        task.name
                    ));
                    requests.push(FlexibleRequest {
                        task_index,
                        honor_deadline: false,
                    });
                }
                OverduePolicy::Ignore => {}
            }
        }

        let scored: Vec<(usize, f64)> = requests
            .iter()
            .enumerate()
            .map(|(position, request)| {
                (position, score_task(&tasks[request.task_index], input.strategy, now))
            })
            .collect();
        let ordered: Vec<FlexibleRequest> = rank_by_score(&scored)
            .into_iter()
            .map(|position| requests[position])
            .collect();

        let options = FlexibleOptions {
            allow_splitting: input.allow_splitting,
            day_organization: input.day_organization,
            heuristic: input.heuristic,
        };
        let results = FlexiblePlacementEngine::new(tasks, options, now, observer)
            .place_all(&mut timeline, &ordered);

        let attempted: HashSet<usize> = results.iter().map(|result| result.task_index).collect();
        assembler.add_flexible(results);
        assembler.sweep_unattempted(&classified.flexible, &attempted);

        debug_assert!(timeline.is_tiled());
        let output = assembler.finish(timeline.into_days());

        observer.on_event(&PlanEvent::PlanFinished {
            scheduled: output.schedule.values().map(Vec::len).sum(),
            conflicts: output.unresolved_conflicts.len(),
            expired: output.unresolved_expired.len(),
        });
        output
    }
}
