use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{PlannerError, PlannerResult};
use crate::models::planning::TimeBlock;
use crate::services::schedule_utils;
use crate::services::window_resolver::PlanningWindow;

/// Per-date availability. Each date's blocks are sorted by start and tile
/// that date's work window without gaps or overlaps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    days: BTreeMap<NaiveDate, Vec<TimeBlock>>,
    bounds: BTreeMap<NaiveDate, (NaiveDateTime, NaiveDateTime)>,
}

/// Work window on `date`. `work_end <= work_start` wraps into the next day;
/// equal times mean a full 24 hours.
pub fn work_bounds(
    date: NaiveDate,
    work_start: NaiveTime,
    work_end: NaiveTime,
) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let start = date.and_time(work_start);
    let end = if work_end <= work_start {
        date.succ_opt()?.and_time(work_end)
    } else {
        date.and_time(work_end)
    };
    (start < end).then_some((start, end))
}

impl Timeline {
    pub fn build(window: &PlanningWindow, work_start: NaiveTime, work_end: NaiveTime) -> Self {
        let mut timeline = Timeline::default();
        for date in schedule_utils::dates_in(window.start, window.end) {
            if let Some((start, end)) = work_bounds(date, work_start, work_end) {
                timeline.days.insert(date, vec![TimeBlock::free(start, end)]);
                timeline.bounds.insert(date, (start, end));
            }
        }
        timeline
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn blocks(&self, date: NaiveDate) -> &[TimeBlock] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn bounds(&self, date: NaiveDate) -> Option<(NaiveDateTime, NaiveDateTime)> {
        self.bounds.get(&date).copied()
    }

    pub fn find_free_containing(
        &self,
        date: NaiveDate,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Option<&TimeBlock> {
        self.blocks(date)
            .iter()
            .find(|block| !block.occupied && block.contains(start, end))
    }

    pub fn find_occupied_overlapping(
        &self,
        date: NaiveDate,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Option<&TimeBlock> {
        self.blocks(date)
            .iter()
            .find(|block| block.occupied && block.overlaps(start, end))
    }

    /// Carve `[start, end)` out of the free block containing it.
    pub fn occupy(
        &mut self,
        date: NaiveDate,
        start: NaiveDateTime,
        end: NaiveDateTime,
        task_id: Option<String>,
    ) -> PlannerResult<()> {
        if end <= start {
            return Err(PlannerError::timeline("block end must be after its start"));
        }
        let blocks = self
            .days
            .get_mut(&date)
            .ok_or_else(|| PlannerError::timeline(format!("{date} is not on the timeline")))?;
        let position = blocks
            .iter()
            .position(|block| !block.occupied && block.contains(start, end))
            .ok_or_else(|| PlannerError::timeline("no free block contains the interval"))?;

        let host = blocks.remove(position);
        if host.start < start {
            blocks.push(TimeBlock::free(host.start, start));
        }
        blocks.push(TimeBlock::occupied_by(start, end, task_id));
        if end < host.end {
            blocks.push(TimeBlock::free(end, host.end));
        }
        blocks.sort_by_key(|block| block.start);
        Ok(())
    }

    /// Occupy up to `minutes` right after `after` as an ownerless buffer, when
    /// the free block starting there is long enough.
    pub fn insert_buffer(&mut self, date: NaiveDate, after: NaiveDateTime, minutes: i64) -> bool {
        let fits = self
            .blocks(date)
            .iter()
            .any(|block| !block.occupied && block.start == after && block.minutes() >= minutes);
        if !fits {
            return false;
        }
        self.occupy(date, after, after + Duration::minutes(minutes), None)
            .is_ok()
    }

    pub fn into_days(self) -> BTreeMap<NaiveDate, Vec<TimeBlock>> {
        self.days
    }

    /// Whether every date still tiles its work window exactly.
    pub fn is_tiled(&self) -> bool {
        self.days.iter().all(|(date, blocks)| {
            let Some((start, end)) = self.bounds(*date) else {
                return false;
            };
            let mut cursor = start;
            for block in blocks {
                if block.start != cursor || block.end <= block.start {
                    return false;
                }
                cursor = block.end;
            }
            cursor == end
        })
    }
}
