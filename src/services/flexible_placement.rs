use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::models::planning::{DayOrganization, PlacementHeuristic};
use crate::models::task::{Task, TaskRef};
use crate::services::plan_observer::{PlanEvent, PlanObserver};
use crate::services::timeline_builder::Timeline;

/// Smallest piece a split task may be cut into.
pub const MIN_SPLIT_CHUNK_MINUTES: i64 = 15;

/// Upper bound on slot searches per task. Protects against heavily
/// fragmented timelines; reaching it keeps whatever was placed so far.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlexibleOptions {
    pub allow_splitting: bool,
    pub day_organization: DayOrganization,
    pub heuristic: PlacementHeuristic,
}

/// One flexible task queued for placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlexibleRequest {
    pub task_index: usize,
    /// `false` drops the deadline bound (overdue tasks scheduled anyway).
    pub honor_deadline: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedChunk {
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlacementOutcome {
    Placed {
        chunks: Vec<PlacedChunk>,
        shortfall_minutes: i64,
    },
    Conflict {
        competing: TaskRef,
        reason: String,
    },
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlexibleResult {
    pub task_index: usize,
    pub outcome: PlacementOutcome,
    pub attempts_exhausted: bool,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    date: NaiveDate,
    start: NaiveDateTime,
    available_minutes: i64,
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    min_start: Option<NaiveDateTime>,
    max_end: Option<NaiveDateTime>,
}

pub struct FlexiblePlacementEngine<'a> {
    tasks: &'a [Task],
    options: FlexibleOptions,
    now: NaiveDateTime,
    observer: &'a dyn PlanObserver,
}

impl<'a> FlexiblePlacementEngine<'a> {
    pub fn new(
        tasks: &'a [Task],
        options: FlexibleOptions,
        now: NaiveDateTime,
        observer: &'a dyn PlanObserver,
    ) -> Self {
        Self {
            tasks,
            options,
            now,
            observer,
        }
    }

    /// Places requests in the given order, which callers sort by score.
    pub fn place_all(&self, timeline: &mut Timeline, requests: &[FlexibleRequest]) -> Vec<FlexibleResult> {
        requests
            .iter()
            .map(|request| self.place(timeline, request))
            .collect()
    }

    fn place(&self, timeline: &mut Timeline, request: &FlexibleRequest) -> FlexibleResult {
        let task = &self.tasks[request.task_index];
        let bounds = Bounds {
            min_start: task.start.map(|plan| plan.earliest()),
            max_end: if request.honor_deadline {
                task.deadline()
            } else {
                None
            },
        };

        if let Some(deadline) = bounds.max_end {
            if deadline < self.now {
                return self.unplaced(request, PlacementOutcome::Failed {
                    reason: format!("deadline {deadline} has already passed"),
                });
            }
        }

        let mut remaining = task.effective_minutes();
        let mut not_before = bounds.min_start;
        let mut chunks: Vec<PlacedChunk> = Vec::new();
        let mut split_mode = false;
        let mut attempts = 0usize;
        let mut attempts_exhausted = false;

        while remaining > 0 {
            if attempts >= MAX_PLACEMENT_ATTEMPTS {
                attempts_exhausted = true;
                break;
            }
            attempts += 1;

            let needed = if split_mode {
                remaining.min(MIN_SPLIT_CHUNK_MINUTES)
            } else {
                remaining
            };

            let Some(slot) = self.find_slot(timeline, not_before, bounds.max_end, needed) else {
                if !split_mode && self.options.allow_splitting {
                    split_mode = true;
                    continue;
                }
                break;
            };

            let take = slot.available_minutes.min(remaining);
            let end = slot.start + Duration::minutes(take);
            if timeline
                .occupy(slot.date, slot.start, end, Some(task.id.clone()))
                .is_err()
            {
                break;
            }
            self.observer.on_event(&PlanEvent::ChunkPlaced {
                task_id: task.id.clone(),
                start: slot.start,
                end,
            });
            if let Some(buffer) = self.options.day_organization.buffer_minutes() {
                timeline.insert_buffer(slot.date, end, buffer);
            }

            chunks.push(PlacedChunk {
                date: slot.date,
                start: slot.start,
                end,
            });
            remaining -= take;
            not_before = Some(end);
        }

        if !chunks.is_empty() {
            return FlexibleResult {
                task_index: request.task_index,
                outcome: PlacementOutcome::Placed {
                    chunks,
                    shortfall_minutes: remaining,
                },
                attempts_exhausted,
            };
        }

        let outcome = match competing_task(self.tasks, timeline, bounds) {
            Some(competing) => PlacementOutcome::Conflict {
                reason: format!("{} competes for the only allowed time", competing.name),
                competing,
            },
            None => PlacementOutcome::Failed {
                reason: "could not find suitable slot".to_string(),
            },
        };
        let mut result = self.unplaced(request, outcome);
        result.attempts_exhausted = attempts_exhausted;
        result
    }

    fn unplaced(&self, request: &FlexibleRequest, outcome: PlacementOutcome) -> FlexibleResult {
        let reason = match &outcome {
            PlacementOutcome::Conflict { reason, .. } | PlacementOutcome::Failed { reason } => {
                reason.clone()
            }
            PlacementOutcome::Placed { .. } => String::new(),
        };
        self.observer.on_event(&PlanEvent::FlexibleUnplaced {
            task_id: self.tasks[request.task_index].id.clone(),
            reason,
        });
        FlexibleResult {
            task_index: request.task_index,
            outcome,
            attempts_exhausted: false,
        }
    }

    /// Candidate free intervals of at least `needed` minutes, date by date.
    fn find_slot(
        &self,
        timeline: &Timeline,
        not_before: Option<NaiveDateTime>,
        max_end: Option<NaiveDateTime>,
        needed: i64,
    ) -> Option<Slot> {
        for date in timeline.dates() {
            let candidates: Vec<Slot> = timeline
                .blocks(date)
                .iter()
                .filter(|block| !block.occupied)
                .filter_map(|block| {
                    let start = not_before.map_or(block.start, |bound| bound.max(block.start));
                    let end = max_end.map_or(block.end, |bound| bound.min(block.end));
                    let available_minutes = (end - start).num_minutes();
                    (available_minutes >= needed && available_minutes > 0).then_some(Slot {
                        date,
                        start,
                        available_minutes,
                    })
                })
                .collect();

            let chosen = match self.options.heuristic {
                PlacementHeuristic::EarliestFit => candidates.first().copied(),
                PlacementHeuristic::BestFit => candidates
                    .iter()
                    .min_by_key(|slot| (slot.available_minutes - needed, slot.start))
                    .copied(),
            };
            if chosen.is_some() {
                return chosen;
            }
        }
        None
    }
}

/// A task block sitting inside the bounded window a task was restricted to.
fn competing_task(tasks: &[Task], timeline: &Timeline, bounds: Bounds) -> Option<TaskRef> {
    if bounds.min_start.is_none() && bounds.max_end.is_none() {
        return None;
    }
    timeline
        .dates()
        .flat_map(|date| timeline.blocks(date).iter())
        .filter(|block| block.occupied)
        .filter(|block| bounds.min_start.map_or(true, |start| block.end > start))
        .filter(|block| bounds.max_end.map_or(true, |end| block.start < end))
        .find_map(|block| {
            let owner = block.task_id.as_deref()?;
            tasks.iter().find(|task| task.id == owner).map(Task::reference)
        })
}
