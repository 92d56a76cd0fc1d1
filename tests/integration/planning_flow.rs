use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use cognical_planner::{
    ConflictKind, DayOrganization, Frequency, NoopObserver, PlannerInput, PlanningEngine,
    RecurrencePlan, ScheduleScope, Task, TimePlan,
};

fn dt(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 5, day)
        .expect("valid date")
        .and_hms_opt(hour, minute, 0)
        .expect("valid time")
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

fn engine() -> PlanningEngine {
    PlanningEngine::with_observer(Arc::new(NoopObserver))
}

fn eight_to_eight(tasks: Vec<Task>) -> PlannerInput {
    PlannerInput::new(tasks, hm(8, 0), hm(20, 0))
}

// 2025-05-05 is a Monday.
fn monday_morning() -> NaiveDateTime {
    dt(5, 7, 0)
}

#[test]
fn simple_flexible_task_takes_first_slot() {
    let input = eight_to_eight(vec![Task::new("report", "Write report").with_duration(60)]);
    let output = engine().generate_plan(&input, monday_morning());

    let items = output.items_for("report");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].date, monday_morning().date());
    assert_eq!(items[0].start, dt(5, 8, 0));
    assert_eq!(items[0].end, dt(5, 9, 0));
}

#[test]
fn second_fixed_task_at_same_time_conflicts_with_first() {
    let tasks = vec![
        Task::new("first", "Dentist").with_start(TimePlan::at(dt(5, 9, 0))).with_duration(60),
        Task::new("second", "Call bank").with_start(TimePlan::at(dt(5, 9, 0))).with_duration(60),
    ];
    let output = engine().generate_plan(&eight_to_eight(tasks), monday_morning());

    assert_eq!(output.items_for("first").len(), 1);
    assert!(output.items_for("second").is_empty());

    let conflicts = output.conflicts_for("second");
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].kind, ConflictKind::FixedOverlap);
    assert!(conflicts[0].tasks.iter().any(|task| task.id == "first"));
}

#[test]
fn fixed_task_outside_work_hours_is_reported() {
    let tasks = vec![Task::new("late", "Late call").with_start(TimePlan::at(dt(5, 23, 30)))];
    let output = engine().generate_plan(&eight_to_eight(tasks), monday_morning());

    assert!(output.items_for("late").is_empty());
    let conflicts = output.conflicts_for("late");
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].kind, ConflictKind::FixedOutsideWindow);
}

#[test]
fn task_due_yesterday_is_expired_not_conflicted() {
    let tasks = vec![Task::new("tax", "File taxes")
        .with_end(TimePlan::at(dt(4, 17, 0)))
        .with_duration(60)];
    let output = engine().generate_plan(&eight_to_eight(tasks), monday_morning());

    assert_eq!(output.unresolved_expired.len(), 1);
    assert_eq!(output.unresolved_expired[0].task.id, "tax");
    assert!(output.unresolved_conflicts.is_empty());
}

#[test]
fn weekly_recurrence_on_monday_and_friday() {
    let task = Task::new("review", "Weekly review")
        .with_start(TimePlan::at(dt(1, 10, 0)))
        .with_duration(30)
        .with_recurrence(
            RecurrencePlan::new(Frequency::Weekly).with_weekdays(vec![Weekday::Mon, Weekday::Fri]),
        );
    let mut input = eight_to_eight(vec![task]);
    input.scope = ScheduleScope::ThisWeek;
    let output = engine().generate_plan(&input, monday_morning());

    assert_eq!(output.window_start, Some(dt(5, 0, 0).date()));
    assert_eq!(output.window_end, Some(dt(11, 0, 0).date()));
    let items = output.items_for("review");
    let weekdays: Vec<Weekday> = items.iter().map(|item| item.date.weekday()).collect();
    assert_eq!(weekdays, vec![Weekday::Mon, Weekday::Fri]);
}

#[test]
fn focus_buffer_follows_placed_task() {
    let mut input = PlannerInput::new(
        vec![Task::new("email", "Email triage").with_duration(30)],
        hm(9, 0),
        hm(17, 0),
    );
    input.day_organization = DayOrganization::FocusUrgentBuffer;
    let output = engine().generate_plan(&input, monday_morning());

    let items = output.items_for("email");
    assert_eq!(items[0].start, dt(5, 9, 0));
    assert_eq!(items[0].end, dt(5, 9, 30));

    let blocks = &output.timeline[&dt(5, 0, 0).date()];
    let buffer = blocks
        .iter()
        .find(|block| block.start == dt(5, 9, 30))
        .expect("block after task");
    assert!(buffer.occupied);
    assert_eq!(buffer.task_id, None);
    assert_eq!(buffer.end, dt(5, 9, 40));
}

#[test]
fn timeline_tiles_every_day_of_the_week() {
    let tasks = vec![
        Task::new("a", "Deep work").with_duration(180),
        Task::new("b", "Gym")
            .with_start(TimePlan::at(dt(1, 18, 0)))
            .with_duration(60)
            .with_recurrence(RecurrencePlan::new(Frequency::Daily)),
        Task::new("c", "Groceries").with_end(TimePlan::on(dt(8, 0, 0).date())),
    ];
    let mut input = eight_to_eight(tasks);
    input.scope = ScheduleScope::ThisWeek;
    input.day_organization = DayOrganization::LooseScheduleBreaks;
    let output = engine().generate_plan(&input, monday_morning());

    assert_eq!(output.timeline.len(), 7);
    for (date, blocks) in &output.timeline {
        assert_eq!(blocks.first().map(|block| block.start), Some(date.and_time(hm(8, 0))));
        assert_eq!(blocks.last().map(|block| block.end), Some(date.and_time(hm(20, 0))));
        for pair in blocks.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "gap on {date}");
        }
    }
    assert_eq!(output.items_for("b").len(), 7);
}

#[test]
fn repeated_runs_produce_identical_output() {
    let tasks = vec![
        Task::new("a", "A").with_duration(50),
        Task::new("b", "B").with_end(TimePlan::at(dt(5, 12, 0))),
        Task::new("c", "C").with_start(TimePlan::at(dt(5, 11, 0))).with_duration(90),
    ];
    let input = eight_to_eight(tasks);
    let first = engine().generate_plan(&input, monday_morning());
    let second = engine().generate_plan(&input, monday_morning());
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).expect("serialize"),
        serde_json::to_string(&second).expect("serialize")
    );
}
