//! Focus analytics reported by the task service.
//!
//! The service aggregates the focused time the session records. This module
//! holds the typed reports and the shaping applied to them: per-day series
//! cover exactly the last seven days (missing days filled with zero) and
//! focused seconds are shown as minutes with two decimals.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::task::TaskStatus;

/// Number of days covered by the focus reports, today included.
pub const REPORT_DAYS: u64 = 7;

/// How many of a user's tasks sit in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatusCount {
    #[serde(rename = "Todo", default)]
    pub todo: u64,
    #[serde(rename = "In Progress", default)]
    pub in_progress: u64,
    #[serde(rename = "Completed", default)]
    pub completed: u64,
    #[serde(rename = "Expired", default)]
    pub expired: u64,
}

impl TaskStatusCount {
    pub fn get(&self, status: TaskStatus) -> u64 {
        match status {
            TaskStatus::Todo => self.todo,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Completed => self.completed,
            TaskStatus::Expired => self.expired,
        }
    }

    pub fn total(&self) -> u64 {
        self.todo + self.in_progress + self.completed + self.expired
    }
}

/// One row of the service's per-day focus report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusedTimeByDate {
    pub date: NaiveDate,
    #[serde(rename = "totalSeconds")]
    pub total_seconds: u64,
}

/// Focused minutes on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyFocus {
    pub date: NaiveDate,
    pub minutes: f64,
}

/// Service payload for the seven-day totals. Focus is in seconds.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FocusedTimeSummaryWire {
    #[serde(default)]
    pub total_focused_time_in_7_days: u64,
    #[serde(default)]
    pub total_estimated_time_in_7_days: u64,
}

/// Seven-day focused time against the estimates of the same tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusSummary {
    pub focused_minutes: f64,
    /// Sum of task estimates, passed through as the service reports it.
    pub estimated_time: u64,
}

impl From<FocusedTimeSummaryWire> for FocusSummary {
    fn from(wire: FocusedTimeSummaryWire) -> Self {
        Self {
            focused_minutes: seconds_to_minutes(wire.total_focused_time_in_7_days),
            estimated_time: wire.total_estimated_time_in_7_days,
        }
    }
}

/// Everything `task analytics` shows, fetched together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusReport {
    pub status_count: TaskStatusCount,
    pub daily: Vec<DailyFocus>,
    pub summary: FocusSummary,
}

/// Seconds as minutes, rounded to two decimals.
pub fn seconds_to_minutes(seconds: u64) -> f64 {
    (seconds as f64 / 60.0 * 100.0).round() / 100.0
}

/// The last [`REPORT_DAYS`] days ending at `today`, oldest first.
pub fn last_days(today: NaiveDate) -> Vec<NaiveDate> {
    (0..REPORT_DAYS)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .collect()
}

/// Shape the service's per-day rows into a full week ending at `today`.
///
/// Days the service left out get zero minutes. Rows outside the window are
/// dropped, and rows sharing a date are added up.
pub fn fill_last_days(rows: &[FocusedTimeByDate], today: NaiveDate) -> Vec<DailyFocus> {
    let mut by_date: HashMap<NaiveDate, u64> = HashMap::new();
    for row in rows {
        *by_date.entry(row.date).or_default() += row.total_seconds;
    }
    last_days(today)
        .into_iter()
        .map(|date| DailyFocus {
            date,
            minutes: seconds_to_minutes(by_date.get(&date).copied().unwrap_or(0)),
        })
        .collect()
}
