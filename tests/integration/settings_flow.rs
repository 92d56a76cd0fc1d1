use std::fs;

use chrono::{NaiveDate, NaiveTime};
use cognical_planner::services::settings_service::load_settings;
use cognical_planner::{
    JsonFileTaskSource, OverduePolicy, PlacementHeuristic, PlannerError, PlannerSettings,
    PlanningService, ScheduleScope, Task,
};
use tempfile::tempdir;

#[test]
fn yaml_settings_drive_a_plan() {
    let dir = tempdir().expect("temp dir");
    let settings_path = dir.path().join("planner.yaml");
    fs::write(
        &settings_path,
        "workdayStartMinute: 420\nworkdayEndMinute: 660\nscope: tomorrow\nheuristic: bestFit\n",
    )
    .expect("write settings");

    let settings = load_settings(&settings_path).expect("load settings");
    assert_eq!(settings.work_start(), NaiveTime::from_hms_opt(7, 0, 0).expect("time"));
    assert_eq!(settings.scope, ScheduleScope::Tomorrow);
    assert_eq!(settings.heuristic, PlacementHeuristic::BestFit);
    assert_eq!(settings.overdue_policy, OverduePolicy::AskUser);

    let tasks_path = dir.path().join("tasks.json");
    let tasks = vec![Task::new("run", "Morning run").with_duration(45)];
    fs::write(&tasks_path, serde_json::to_string(&tasks).expect("serialize tasks"))
        .expect("write tasks");

    let now = NaiveDate::from_ymd_opt(2025, 5, 5)
        .expect("date")
        .and_hms_opt(21, 0, 0)
        .expect("time");
    let output = PlanningService::default().generate_from_source(
        &JsonFileTaskSource::new(&tasks_path),
        &settings,
        now,
    );
    let items = output.items_for("run");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].date, NaiveDate::from_ymd_opt(2025, 5, 6).expect("date"));
}

#[test]
fn json_settings_with_invalid_minutes_are_rejected() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("planner.json");
    fs::write(&path, r#"{"workdayStartMinute": 2000}"#).expect("write settings");

    let err = load_settings(&path).expect_err("out of range");
    assert!(matches!(err, PlannerError::Validation { .. }));
}

#[test]
fn missing_settings_file_is_an_io_error() {
    let dir = tempdir().expect("temp dir");
    let err = load_settings(dir.path().join("absent.yml")).expect_err("missing file");
    assert!(matches!(err, PlannerError::Io(_)));
}

#[test]
fn unreadable_task_file_yields_message_not_panic() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("tasks.json");
    fs::write(&path, "not json").expect("write tasks");

    let now = NaiveDate::from_ymd_opt(2025, 5, 5)
        .expect("date")
        .and_hms_opt(8, 0, 0)
        .expect("time");
    let output = PlanningService::default().generate_from_source(
        &JsonFileTaskSource::new(&path),
        &PlannerSettings::default(),
        now,
    );
    assert!(output.schedule.is_empty());
    assert_eq!(output.messages.len(), 1);
}
