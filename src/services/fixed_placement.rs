use chrono::NaiveDateTime;

use crate::models::planning::{ConflictItem, ConflictKind, PlacementSource, ScheduledTaskItem};
use crate::models::task::{Task, TaskRef};
use crate::services::plan_observer::{PlanEvent, PlanObserver};
use crate::services::schedule_utils;
use crate::services::timeline_builder::Timeline;
use crate::services::window_resolver::PlanningWindow;

/// A concrete, fixed-time request for one task.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedOccurrence {
    /// Position of the task in the input snapshot; breaks start-time ties.
    pub task_index: usize,
    pub start: NaiveDateTime,
    pub minutes: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixedPlacementReport {
    pub placed: Vec<ScheduledTaskItem>,
    pub conflicts: Vec<ConflictItem>,
}

pub struct FixedPlacementEngine<'a> {
    tasks: &'a [Task],
    window: PlanningWindow,
    observer: &'a dyn PlanObserver,
}

impl<'a> FixedPlacementEngine<'a> {
    pub fn new(tasks: &'a [Task], window: PlanningWindow, observer: &'a dyn PlanObserver) -> Self {
        Self {
            tasks,
            window,
            observer,
        }
    }

    pub fn place_all(
        &self,
        timeline: &mut Timeline,
        mut occurrences: Vec<FixedOccurrence>,
    ) -> FixedPlacementReport {
        occurrences.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then_with(|| a.task_index.cmp(&b.task_index))
        });

        let mut report = FixedPlacementReport::default();
        for occurrence in occurrences {
            match self.place_one(timeline, &occurrence) {
                Ok(item) => report.placed.push(item),
                Err(conflict) => {
                    self.observer.on_event(&PlanEvent::FixedRejected {
                        task_id: self.tasks[occurrence.task_index].id.clone(),
                        at: occurrence.start,
                        reason: conflict.reason.clone(),
                    });
                    report.conflicts.push(conflict);
                }
            }
        }
        report
    }

    fn place_one(
        &self,
        timeline: &mut Timeline,
        occurrence: &FixedOccurrence,
    ) -> Result<ScheduledTaskItem, ConflictItem> {
        let task = &self.tasks[occurrence.task_index];
        let date = occurrence.start.date();
        let start = occurrence.start;
        let conflict = |kind: ConflictKind, tasks: Vec<TaskRef>, reason: String| ConflictItem {
            kind,
            tasks,
            reason,
            date: Some(date),
            requested_start: Some(start),
        };

        if !self.window.contains(date) {
            return Err(conflict(
                ConflictKind::FixedOutsideWindow,
                vec![task.reference()],
                format!("{} is scheduled on {date}, outside the planning window", task.name),
            ));
        }

        let end = match schedule_utils::add_minutes(start, occurrence.minutes) {
            Ok(end) => end,
            Err(err) => {
                return Err(conflict(
                    ConflictKind::PlacementFailed,
                    vec![task.reference()],
                    format!("{} has an unusable duration: {err}", task.name),
                ))
            }
        };

        // Ending exactly at midnight passes here and is left to the free-block search.
        let midnight = schedule_utils::add_days(date, 1)
            .map(schedule_utils::start_of_day)
            .unwrap_or(NaiveDateTime::MAX);
        let within_hours = timeline
            .bounds(date)
            .map(|(work_start, work_end)| {
                work_start <= start && start < work_end && (end <= work_end || end == midnight)
            })
            .unwrap_or(false);
        if end > midnight || !within_hours {
            return Err(conflict(
                ConflictKind::FixedOutsideWindow,
                vec![task.reference()],
                format!(
                    "{} at {} falls outside working hours",
                    task.name,
                    start.format("%H:%M")
                ),
            ));
        }

        if timeline.find_free_containing(date, start, end).is_none() {
            return Err(match timeline.find_occupied_overlapping(date, start, end) {
                Some(block) => {
                    let occupant_id = block.task_id.clone().unwrap_or_default();
                    let mut involved = vec![task.reference()];
                    if let Some(occupant) = self.tasks.iter().find(|other| other.id == occupant_id) {
                        involved.push(occupant.reference());
                    }
                    conflict(
                        ConflictKind::FixedOverlap,
                        involved,
                        format!("{} overlaps with task {occupant_id}", task.name),
                    )
                }
                None => conflict(
                    ConflictKind::PlacementFailed,
                    vec![task.reference()],
                    format!("no free time available for {}", task.name),
                ),
            });
        }

        if let Err(err) = timeline.occupy(date, start, end, Some(task.id.clone())) {
            return Err(conflict(
                ConflictKind::PlacementFailed,
                vec![task.reference()],
                err.to_string(),
            ));
        }

        Ok(ScheduledTaskItem {
            task: task.reference(),
            start,
            end,
            date,
            source: PlacementSource::Fixed,
        })
    }
}
