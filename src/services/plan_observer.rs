use std::sync::Mutex;

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

/// Diagnostic events raised while a plan is being built.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanEvent {
    PlanStarted {
        tasks: usize,
    },
    RecurrenceTruncated {
        task_id: String,
        reason: String,
    },
    FixedRejected {
        task_id: String,
        at: NaiveDateTime,
        reason: String,
    },
    ChunkPlaced {
        task_id: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    FlexibleUnplaced {
        task_id: String,
        reason: String,
    },
    PlanFinished {
        scheduled: usize,
        conflicts: usize,
        expired: usize,
    },
}

/// Sink for [`PlanEvent`]s. Injected so the engine itself stays free of ambient output.
pub trait PlanObserver: Send + Sync {
    fn on_event(&self, event: &PlanEvent);
}

/// Forwards events to `tracing`; inert unless the host installed a subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PlanObserver for TracingObserver {
    fn on_event(&self, event: &PlanEvent) {
        match event {
            PlanEvent::PlanStarted { tasks } => {
                debug!(target: "planner::engine", tasks, "plan started");
            }
            PlanEvent::RecurrenceTruncated { task_id, reason } => {
                warn!(target: "planner::recurrence", %task_id, %reason, "recurrence expansion truncated");
            }
            PlanEvent::FixedRejected {
                task_id,
                at,
                reason,
            } => {
                debug!(target: "planner::fixed", %task_id, at = %at, %reason, "fixed occurrence rejected");
            }
            PlanEvent::ChunkPlaced {
                task_id,
                start,
                end,
            } => {
                debug!(target: "planner::flexible", %task_id, start = %start, end = %end, "chunk placed");
            }
            PlanEvent::FlexibleUnplaced { task_id, reason } => {
                debug!(target: "planner::flexible", %task_id, %reason, "flexible task unplaced");
            }
            PlanEvent::PlanFinished {
                scheduled,
                conflicts,
                expired,
            } => {
                info!(
                    target: "planner::engine",
                    scheduled,
                    conflicts,
                    expired,
                    "plan finished"
                );
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PlanObserver for NoopObserver {
    fn on_event(&self, _event: &PlanEvent) {}
}

/// Keeps every event in memory, mainly for assertions.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<PlanEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PlanEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl PlanObserver for RecordingObserver {
    fn on_event(&self, event: &PlanEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event.clone());
        }
    }
}
