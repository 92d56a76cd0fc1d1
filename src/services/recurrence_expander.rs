use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{PlannerError, PlannerResult};
use crate::models::recurrence::{Frequency, IntervalUnit, RecurrencePlan};
use crate::models::task::{PlanSlot, Task};
use crate::services::plan_observer::{PlanEvent, PlanObserver};
use crate::services::schedule_utils;
use crate::services::window_resolver::PlanningWindow;

/// Upper bound on loop iterations per task. Guards against malformed or
/// cyclic rules; hitting it truncates the occurrence list with a warning.
pub const MAX_EXPANSION_ITERATIONS: usize = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Days(i64),
    Months(u32),
}

/// Occurrences of one recurring task plus the reason expansion stopped early, if it did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    pub occurrences: Vec<NaiveDateTime>,
    pub truncated: Option<String>,
}

pub struct RecurrenceExpander;

impl RecurrenceExpander {
    /// Concrete occurrence instants of `task` inside `window`, in order.
    ///
    /// `fallback_time` is used when the task has no exact clock time and no
    /// day period to derive one from.
    pub fn expand(
        task: &Task,
        window: &PlanningWindow,
        fallback_time: NaiveTime,
        observer: &dyn PlanObserver,
    ) -> Expansion {
        let Some(rule) = task.recurrence.as_ref().filter(|rule| rule.is_enabled()) else {
            return Expansion::default();
        };

        let mut expansion = Expansion::default();
        let truncated = match Self::expand_into(task, rule, window, fallback_time, &mut expansion.occurrences) {
            Ok(truncated) => truncated,
            Err(err) => Some(err.to_string()),
        };
        if let Some(reason) = &truncated {
            observer.on_event(&PlanEvent::RecurrenceTruncated {
                task_id: task.id.clone(),
                reason: reason.clone(),
            });
        }
        expansion.truncated = truncated;
        expansion
    }

    fn expand_into(
        task: &Task,
        rule: &RecurrencePlan,
        window: &PlanningWindow,
        fallback_time: NaiveTime,
        occurrences: &mut Vec<NaiveDateTime>,
    ) -> PlannerResult<Option<String>> {
        let anchor = task.start.map(|plan| plan.date).unwrap_or(window.start);
        let time_of_day = occurrence_time(task, fallback_time);
        let last_date = match rule.until {
            Some(until) => until.min(window.end),
            None => window.end,
        };
        let cap = rule.count.map(|count| count as usize);
        let step = step_for(rule);
        let first = anchor.max(window.start);

        let mut index = first_step_index(anchor, first, step)?;
        let mut date = date_at(anchor, step, index)?;
        let mut iterations = 0usize;

        while date <= last_date {
            if cap.map(|cap| occurrences.len() >= cap).unwrap_or(false) {
                break;
            }
            iterations += 1;
            if iterations > MAX_EXPANSION_ITERATIONS {
                return Ok(Some(format!(
                    "exceeded {MAX_EXPANSION_ITERATIONS} iterations"
                )));
            }

            if matches_day_filter(rule, anchor, date) {
                occurrences.push(date.and_time(time_of_day));
            }

            index += 1;
            date = date_at(anchor, step, index)?;
        }

        Ok(None)
    }
}

fn occurrence_time(task: &Task, fallback_time: NaiveTime) -> NaiveTime {
    match task.start.map(|plan| plan.slot) {
        Some(PlanSlot::At(time)) => time,
        Some(PlanSlot::Period(period)) => {
            schedule_utils::to_naive_time(period.minute_range().0 as u32)
        }
        _ => fallback_time,
    }
}

fn step_for(rule: &RecurrencePlan) -> Step {
    let interval = rule.effective_interval();
    match rule.frequency {
        Frequency::None | Frequency::Daily => Step::Days(1),
        Frequency::Weekly if !rule.weekdays.is_empty() => Step::Days(1),
        Frequency::Weekly => Step::Days(7 * interval as i64),
        Frequency::Monthly => Step::Months(interval),
        Frequency::Yearly => Step::Months(12 * interval),
        Frequency::Custom => match rule.unit {
            IntervalUnit::Day => Step::Days(interval as i64),
            IntervalUnit::Week => Step::Days(7 * interval as i64),
            IntervalUnit::Month => Step::Months(interval),
        },
    }
}

fn matches_day_filter(rule: &RecurrencePlan, anchor: NaiveDate, date: NaiveDate) -> bool {
    if rule.frequency != Frequency::Weekly || rule.weekdays.is_empty() {
        return true;
    }
    if !rule.weekdays.contains(&date.weekday()) {
        return false;
    }
    let weeks = (schedule_utils::week_start(date) - schedule_utils::week_start(anchor)).num_weeks();
    weeks.rem_euclid(rule.effective_interval() as i64) == 0
}

/// The k-th date is always computed from the anchor so month ends do not drift.
fn date_at(anchor: NaiveDate, step: Step, index: i64) -> PlannerResult<NaiveDate> {
    match step {
        Step::Days(days) => {
            let offset = days
                .checked_mul(index)
                .ok_or_else(|| PlannerError::date_arithmetic("recurrence day offset overflow"))?;
            schedule_utils::add_days(anchor, offset)
        }
        Step::Months(months) => {
            let offset = u32::try_from(index)
                .ok()
                .and_then(|index| months.checked_mul(index))
                .ok_or_else(|| PlannerError::date_arithmetic("recurrence month offset overflow"))?;
            schedule_utils::add_months(anchor, offset)
        }
    }
}

/// Smallest step index whose date is on or after `first`.
fn first_step_index(anchor: NaiveDate, first: NaiveDate, step: Step) -> PlannerResult<i64> {
    if first <= anchor {
        return Ok(0);
    }
    let mut index = match step {
        Step::Days(days) => {
            let gap = (first - anchor).num_days();
            (gap + days - 1) / days
        }
        Step::Months(months) => (schedule_utils::months_between(anchor, first) / months as i64).max(0),
    };
    while date_at(anchor, step, index)? < first {
        index += 1;
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::{DayPeriod, TimePlan};
    use crate::services::plan_observer::{NoopObserver, RecordingObserver};
    use chrono::Weekday;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, day).expect("valid date")
    }

    fn nine() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).expect("valid time")
    }

    fn window(start: NaiveDate, end: NaiveDate) -> PlanningWindow {
        PlanningWindow { start, end }
    }

    fn recurring(start: NaiveDate, rule: RecurrencePlan) -> Task {
        Task::new("r", "Recurring")
            .with_start(TimePlan::at(start.and_hms_opt(7, 30, 0).expect("valid time")))
            .with_recurrence(rule)
    }

    #[test]
    fn weekly_on_selected_weekdays_only() {
        // 2025-05-05 is a Monday.
        let task = recurring(
            date(4, 1),
            RecurrencePlan::new(Frequency::Weekly).with_weekdays(vec![Weekday::Mon, Weekday::Fri]),
        );
        let out = RecurrenceExpander::expand(&task, &window(date(5, 5), date(5, 11)), nine(), &NoopObserver).occurrences;
        assert_eq!(
            out,
            vec![
                date(5, 5).and_hms_opt(7, 30, 0).expect("time"),
                date(5, 9).and_hms_opt(7, 30, 0).expect("time"),
            ]
        );
    }

    #[test]
    fn biweekly_skips_off_weeks() {
        let task = recurring(
            date(5, 5),
            RecurrencePlan::new(Frequency::Weekly)
                .with_interval(2)
                .with_weekdays(vec![Weekday::Wed]),
        );
        let out = RecurrenceExpander::expand(&task, &window(date(5, 5), date(5, 25)), nine(), &NoopObserver).occurrences;
        let days: Vec<u32> = out.iter().map(|dt| dt.day()).collect();
        assert_eq!(days, vec![7, 21]);
    }

    #[test]
    fn daily_respects_until_and_count() {
        let until = recurring(date(5, 1), RecurrencePlan::new(Frequency::Daily).with_until(date(5, 3)));
        let out = RecurrenceExpander::expand(&until, &window(date(5, 2), date(5, 10)), nine(), &NoopObserver).occurrences;
        assert_eq!(out.len(), 2);

        let count = recurring(date(5, 1), RecurrencePlan::new(Frequency::Daily).with_count(3));
        let out = RecurrenceExpander::expand(&count, &window(date(5, 2), date(5, 10)), nine(), &NoopObserver).occurrences;
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn monthly_stays_anchored_to_day_of_month() {
        let task = recurring(date(1, 15), RecurrencePlan::new(Frequency::Monthly));
        let out = RecurrenceExpander::expand(&task, &window(date(5, 1), date(5, 31)), nine(), &NoopObserver).occurrences;
        assert_eq!(out, vec![date(5, 15).and_hms_opt(7, 30, 0).expect("time")]);

        let off_day = RecurrenceExpander::expand(&task, &window(date(5, 16), date(5, 31)), nine(), &NoopObserver).occurrences;
        assert!(off_day.is_empty());
    }

    #[test]
    fn month_end_anchor_does_not_drift() {
        let task = recurring(date(1, 31), RecurrencePlan::new(Frequency::Monthly));
        let out = RecurrenceExpander::expand(&task, &window(date(3, 1), date(3, 31)), nine(), &NoopObserver).occurrences;
        assert_eq!(out, vec![date(3, 31).and_hms_opt(7, 30, 0).expect("time")]);
    }

    #[test]
    fn custom_every_three_days() {
        let task = recurring(
            date(5, 1),
            RecurrencePlan::new(Frequency::Custom)
                .with_interval(3)
                .with_unit(IntervalUnit::Day),
        );
        let out = RecurrenceExpander::expand(&task, &window(date(5, 2), date(5, 10)), nine(), &NoopObserver).occurrences;
        let days: Vec<u32> = out.iter().map(|dt| dt.day()).collect();
        assert_eq!(days, vec![4, 7, 10]);
    }

    #[test]
    fn period_start_and_fallback_times() {
        let evening = Task::new("e", "Stretch")
            .with_start(TimePlan::period(date(5, 1), DayPeriod::Evening))
            .with_recurrence(RecurrencePlan::new(Frequency::Daily));
        let out = RecurrenceExpander::expand(&evening, &window(date(5, 2), date(5, 2)), nine(), &NoopObserver).occurrences;
        assert_eq!(out, vec![date(5, 2).and_hms_opt(18, 0, 0).expect("time")]);

        let untimed = Task::new("u", "Water plants").with_recurrence(RecurrencePlan::new(Frequency::Daily));
        let out = RecurrenceExpander::expand(&untimed, &window(date(5, 2), date(5, 2)), nine(), &NoopObserver).occurrences;
        assert_eq!(out, vec![date(5, 2).and_time(nine())]);
    }

    #[test]
    fn iteration_ceiling_truncates_with_warning() {
        let task = recurring(date(1, 1), RecurrencePlan::new(Frequency::Daily));
        let observer = RecordingObserver::new();
        let out = RecurrenceExpander::expand(
            &task,
            &window(date(1, 1), NaiveDate::from_ymd_opt(2026, 12, 31).expect("date")),
            nine(),
            &observer,
        );
        assert_eq!(out.occurrences.len(), MAX_EXPANSION_ITERATIONS);
        assert!(out.truncated.is_some());
        assert!(observer
            .events()
            .iter()
            .any(|event| matches!(event, PlanEvent::RecurrenceTruncated { .. })));
    }

    #[test]
    fn date_overflow_near_calendar_end_truncates() {
        let last_days = NaiveDate::MAX.pred_opt().expect("date");
        let observer = RecordingObserver::new();
        for rule in [
            RecurrencePlan::new(Frequency::Monthly),
            RecurrencePlan::new(Frequency::Yearly),
        ] {
            let task = recurring(last_days, rule);
            let out = RecurrenceExpander::expand(&task, &window(last_days, NaiveDate::MAX), nine(), &observer);
            assert_eq!(out.occurrences, vec![last_days.and_hms_opt(7, 30, 0).expect("time")]);
            assert!(out.truncated.is_some());
        }
        let truncations = observer
            .events()
            .iter()
            .filter(|event| matches!(event, PlanEvent::RecurrenceTruncated { .. }))
            .count();
        assert_eq!(truncations, 2);
    }

    #[test]
    fn frequency_none_never_produces_occurrences() {
        let task = recurring(date(5, 1), RecurrencePlan::new(Frequency::None));
        let out = RecurrenceExpander::expand(&task, &window(date(5, 1), date(5, 7)), nine(), &NoopObserver).occurrences;
        assert!(out.is_empty());
    }
}
