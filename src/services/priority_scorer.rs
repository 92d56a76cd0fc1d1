use std::cmp::Ordering;

use chrono::NaiveDateTime;

use crate::models::planning::PrioritizationStrategy;
use crate::models::task::{Priority, Task};
use crate::services::schedule_utils;

const OVERDUE_BONUS: f64 = 50_000.0;
const NO_DEADLINE_PENALTY: f64 = 0.7;
const MIN_SCORE: f64 = 0.1;

/// Urgency score used to order flexible tasks. Always at least [`MIN_SCORE`].
pub fn score_task(task: &Task, strategy: PrioritizationStrategy, now: NaiveDateTime) -> f64 {
    let mut score = base_score(task.priority);
    let deadline = task.deadline();

    match deadline {
        Some(deadline) => score += deadline_bonus(now, deadline),
        None if task.priority != Priority::High => score *= NO_DEADLINE_PENALTY,
        None => {}
    }

    match strategy {
        PrioritizationStrategy::UrgentFirst if deadline.is_some() => score *= 1.1,
        PrioritizationStrategy::EarlierDeadlinesFirst if deadline.is_some() => score *= 1.05,
        PrioritizationStrategy::HighPriorityFirst => match task.priority {
            Priority::High => score *= 1.2,
            Priority::Medium => score *= 1.1,
            _ => {}
        },
        PrioritizationStrategy::ShortTasksFirst => {
            let hours = task.effective_minutes() as f64 / 60.0;
            score += 1000.0 / (hours + 0.1);
        }
        _ => {}
    }

    if let Some(start) = task.start.map(|plan| plan.earliest()) {
        let hours = schedule_utils::hours_between(now, start);
        if hours <= 0.0 {
            score += 100.0;
        } else if hours <= 48.0 {
            score += 200.0 / (hours + 1.0);
        }
    }

    score.max(MIN_SCORE)
}

fn base_score(priority: Priority) -> f64 {
    match priority {
        Priority::High => 10_000.0,
        Priority::Medium => 5_000.0,
        Priority::Low => 1_000.0,
        Priority::None => 100.0,
    }
}

fn deadline_bonus(now: NaiveDateTime, deadline: NaiveDateTime) -> f64 {
    if deadline < now {
        return OVERDUE_BONUS;
    }
    let hours_left = schedule_utils::hours_between(now, deadline);
    let divisor = hours_left.max(1.0) + 1.0;
    let weight = if hours_left <= 8.0 {
        20_000.0
    } else if hours_left <= 24.0 {
        10_000.0
    } else if hours_left <= 72.0 {
        5_000.0
    } else {
        1_000.0
    };
    weight / divisor
}

/// Indices ordered by descending score; equal scores keep input order.
pub fn rank_by_score(scored: &[(usize, f64)]) -> Vec<usize> {
    let mut ranked = scored.to_vec();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    ranked.into_iter().map(|(index, _)| index).collect()
}
