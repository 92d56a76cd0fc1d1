use std::collections::{BTreeMap, HashSet};

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::planning::{
    ConflictItem, ConflictKind, ExpiredTask, PlacementSource, PlannerOutput, ScheduledTaskItem,
    TimeBlock,
};
use crate::models::task::{Task, TaskRef};
use crate::services::fixed_placement::FixedPlacementReport;
use crate::services::flexible_placement::{FlexibleResult, PlacementOutcome};
use crate::services::window_resolver::PlanningWindow;

/// Collects stage results into a [`PlannerOutput`].
pub struct ResultAssembler<'a> {
    tasks: &'a [Task],
    window: PlanningWindow,
    now: NaiveDateTime,
    output: PlannerOutput,
}

impl<'a> ResultAssembler<'a> {
    pub fn new(tasks: &'a [Task], window: PlanningWindow, now: NaiveDateTime) -> Self {
        Self {
            tasks,
            window,
            now,
            output: PlannerOutput {
                window_start: Some(window.start),
                window_end: Some(window.end),
                ..Default::default()
            },
        }
    }

    pub fn message(&mut self, message: impl Into<String>) {
        self.output.messages.push(message.into());
    }

    pub fn postpone(&mut self, task: TaskRef) {
        self.output.postponed.push(task);
    }

    pub fn expire(&mut self, task: &Task) {
        if let Some(deadline) = task.deadline() {
            self.output.unresolved_expired.push(ExpiredTask {
                task: task.reference(),
                deadline,
            });
        }
    }

    pub fn add_fixed(&mut self, report: FixedPlacementReport) {
        for item in report.placed {
            self.push_item(item);
        }
        self.output.unresolved_conflicts.extend(report.conflicts);
    }

    pub fn add_flexible(&mut self, results: Vec<FlexibleResult>) {
        let tasks = self.tasks;
        for result in results {
            let task = &tasks[result.task_index];
            if result.attempts_exhausted {
                self.message(format!(
                    "stopped searching for {} after too many attempts",
                    task.name
                ));
            }
            match result.outcome {
                PlacementOutcome::Placed {
                    chunks,
                    shortfall_minutes,
                } => {
                    if shortfall_minutes > 0 {
                        self.message(format!(
                            "{} placed with {shortfall_minutes} of {} minutes unscheduled",
                            task.name,
                            task.effective_minutes()
                        ));
                    }
                    for chunk in chunks {
                        self.push_item(ScheduledTaskItem {
                            task: task.reference(),
                            start: chunk.start,
                            end: chunk.end,
                            date: chunk.date,
                            source: PlacementSource::Flexible,
                        });
                    }
                }
                PlacementOutcome::Conflict { competing, reason } => {
                    self.output.unresolved_conflicts.push(ConflictItem {
                        kind: ConflictKind::FlexibleUnplaced,
                        tasks: vec![task.reference(), competing],
                        reason,
                        date: None,
                        requested_start: None,
                    });
                }
                PlacementOutcome::Failed { .. } => {
                    if self.is_expired_in_scope(task) {
                        self.expire(task);
                    } else {
                        self.output.unresolved_conflicts.push(ConflictItem {
                            kind: ConflictKind::FlexibleUnplaced,
                            tasks: vec![task.reference()],
                            reason: "could not find suitable slot".to_string(),
                            date: None,
                            requested_start: None,
                        });
                    }
                }
            }
        }
    }

    /// Flexible tasks that never reached placement still surface when expired.
    pub fn sweep_unattempted(&mut self, flexible: &[usize], attempted: &HashSet<usize>) {
        let tasks = self.tasks;
        for index in flexible {
            if attempted.contains(index) {
                continue;
            }
            let task = &tasks[*index];
            if self.is_expired_in_scope(task) {
                self.expire(task);
            }
        }
    }

    fn is_expired_in_scope(&self, task: &Task) -> bool {
        task.deadline()
            .map(|deadline| deadline < self.now && deadline.date() <= self.window.end)
            .unwrap_or(false)
    }

    fn push_item(&mut self, item: ScheduledTaskItem) {
        self.output.schedule.entry(item.date).or_default().push(item);
    }

    pub fn finish(mut self, timeline: BTreeMap<NaiveDate, Vec<TimeBlock>>) -> PlannerOutput {
        for items in self.output.schedule.values_mut() {
            items.sort_by_key(|item| item.start);
        }

        let mut seen_expired = HashSet::new();
        self.output
            .unresolved_expired
            .retain(|expired| seen_expired.insert(expired.task.id.clone()));

        let mut seen_conflicts = HashSet::new();
        self.output
            .unresolved_conflicts
            .retain(|conflict| seen_conflicts.insert(conflict.clone()));

        let mut seen_postponed = HashSet::new();
        self.output
            .postponed
            .retain(|task| seen_postponed.insert(task.id.clone()));

        self.output.timeline = timeline;
        self.output
    }
}
