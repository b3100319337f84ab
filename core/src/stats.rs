//! Daily detection statistics.

use std::collections::VecDeque;

use chrono::{DateTime, Local, NaiveDate};
use parking_lot::Mutex;

/// How many recent file names are retained.
pub const RECENT_FILES_CAP: usize = 5;

/// Daily detection counters behind an internal lock.
///
/// The counter belongs to one calendar day and resets lazily: the first
/// recording or rollover check on a new day zeroes it. The recent-file
/// history survives the reset, so "what arrived last" stays answerable
/// across midnight.
pub struct DetectionStats {
    inner: Mutex<StatsInner>,
}

struct StatsInner {
    current_date: NaiveDate,
    count_today: u64,
    recent_files: VecDeque<String>,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Day the counter applies to.
    pub date: NaiveDate,

    /// Files detected so far today.
    pub count_today: u64,

    /// Most recent file names, newest first.
    pub recent_files: Vec<String>,
}

impl DetectionStats {
    /// Create stats anchored to the given day.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            inner: Mutex::new(StatsInner {
                current_date: today,
                count_today: 0,
                recent_files: VecDeque::with_capacity(RECENT_FILES_CAP),
            }),
        }
    }

    /// Record one detected file and return the updated daily total.
    pub fn record(&self, file_name: &str, now: DateTime<Local>) -> u64 {
        let mut inner = self.inner.lock();
        inner.roll_over(now.date_naive());
        inner.count_today += 1;
        inner.recent_files.push_front(file_name.to_string());
        inner.recent_files.truncate(RECENT_FILES_CAP);
        inner.count_today
    }

    /// Reset the daily counter if the calendar day changed.
    ///
    /// Returns whether a reset happened, so a periodic caller can announce
    /// the new day exactly once.
    pub fn roll_over_if_new_day(&self, today: NaiveDate) -> bool {
        self.inner.lock().roll_over(today)
    }

    /// Copy of the current counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = self.inner.lock();
        StatsSnapshot {
            date: inner.current_date,
            count_today: inner.count_today,
            recent_files: inner.recent_files.iter().cloned().collect(),
        }
    }
}

impl StatsInner {
    fn roll_over(&mut self, today: NaiveDate) -> bool {
        if today == self.current_date {
            return false;
        }
        self.current_date = today;
        self.count_today = 0;
        true
    }
}

impl Default for DetectionStats {
    fn default() -> Self {
        Self::new(Local::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(year, month, day, 9, 30, 0).unwrap()
    }

    #[test]
    fn recording_increments_the_daily_total() {
        let stats = DetectionStats::new(at(2026, 3, 10).date_naive());

        for n in 1..=4 {
            assert_eq!(stats.record("scan.csv", at(2026, 3, 10)), n);
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.count_today, 4);
        assert_eq!(snapshot.date, at(2026, 3, 10).date_naive());
    }

    #[test]
    fn new_day_resets_the_counter_before_counting() {
        let stats = DetectionStats::new(at(2026, 3, 10).date_naive());
        for _ in 0..7 {
            stats.record("old.txt", at(2026, 3, 10));
        }
        assert_eq!(stats.snapshot().count_today, 7);

        // First event of the next day lands on a fresh counter.
        assert_eq!(stats.record("fresh.txt", at(2026, 3, 11)), 1);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.count_today, 1);
        assert_eq!(snapshot.date, at(2026, 3, 11).date_naive());
    }

    #[test]
    fn recent_files_keep_newest_first_capped() {
        let stats = DetectionStats::new(at(2026, 3, 10).date_naive());
        for name in ["a", "b", "c", "d", "e", "f"] {
            stats.record(name, at(2026, 3, 10));
        }

        assert_eq!(stats.snapshot().recent_files, ["f", "e", "d", "c", "b"]);
    }

    #[test]
    fn rollover_preserves_recent_files() {
        let stats = DetectionStats::new(at(2026, 3, 10).date_naive());
        stats.record("yesterday.log", at(2026, 3, 10));

        assert!(stats.roll_over_if_new_day(at(2026, 3, 11).date_naive()));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.count_today, 0);
        assert_eq!(snapshot.recent_files, ["yesterday.log"]);
    }

    #[test]
    fn rollover_fires_once_per_day() {
        let stats = DetectionStats::new(at(2026, 3, 10).date_naive());

        assert!(stats.roll_over_if_new_day(at(2026, 3, 11).date_naive()));
        assert!(!stats.roll_over_if_new_day(at(2026, 3, 11).date_naive()));
    }

    #[test]
    fn same_day_check_is_a_no_op() {
        let stats = DetectionStats::new(at(2026, 3, 10).date_naive());
        stats.record("kept.txt", at(2026, 3, 10));

        assert!(!stats.roll_over_if_new_day(at(2026, 3, 10).date_naive()));
        assert_eq!(stats.snapshot().count_today, 1);
    }
}
