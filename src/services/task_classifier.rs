use crate::models::planning::OverduePolicy;
use crate::models::task::Task;
use crate::services::window_resolver::PlanningWindow;

/// Relevant tasks split into disjoint groups. Indices refer to the input snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedTasks {
    pub fixed: Vec<usize>,
    pub recurring: Vec<usize>,
    pub flexible: Vec<usize>,
    /// Deadline already passed before the window opened.
    pub overdue: Vec<usize>,
}

pub fn classify_tasks(
    tasks: &[Task],
    window: &PlanningWindow,
    policy: OverduePolicy,
) -> ClassifiedTasks {
    let mut classified = ClassifiedTasks::default();

    for (index, task) in tasks.iter().enumerate() {
        if task.completed {
            continue;
        }

        if task.start.map(|start| start.date > window.end).unwrap_or(false) {
            continue;
        }

        if task.is_recurring() {
            let ended = task
                .recurrence
                .as_ref()
                .and_then(|rule| rule.until)
                .map(|until| until < window.start)
                .unwrap_or(false);
            if !ended {
                classified.recurring.push(index);
            }
            continue;
        }

        let overdue = task
            .end
            .map(|end| end.date < window.start)
            .unwrap_or(false);
        if overdue {
            if policy != OverduePolicy::Ignore {
                classified.overdue.push(index);
            }
            continue;
        }

        if task.fixed_start().is_some() {
            classified.fixed.push(index);
        } else {
            classified.flexible.push(index);
        }
    }

    classified
}
