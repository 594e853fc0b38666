//! Display helpers for the timer view.

use chrono::{DateTime, Utc};

use crate::task::Task;

/// `MM:SS` countdown display. Minutes above 99 are printed in full.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// `DD/MM/YYYY - HH:MM` in UTC.
pub fn format_schedule(at: &DateTime<Utc>) -> String {
    at.format("%d/%m/%Y - %H:%M").to_string()
}

/// The task's scheduling window as shown under its name, e.g.
/// `From 05/01/2025 - 19:01 To 05/01/2025 - 21:00`.
/// Missing ends are left blank.
pub fn format_window(task: &Task) -> String {
    let from = task.opened_at.as_ref().map(format_schedule).unwrap_or_default();
    let to = task.dued_at.as_ref().map(format_schedule).unwrap_or_default();
    format!("From {from} To {to}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;
    use chrono::TimeZone;

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(1500), "25:00");
        assert_eq!(format_clock(299), "04:59");
    }

    #[test]
    fn clock_keeps_long_minutes() {
        assert_eq!(format_clock(120 * 60 + 7), "120:07");
    }

    #[test]
    fn schedule_uses_day_first() {
        let at = Utc.with_ymd_and_hms(2025, 1, 5, 19, 1, 0).unwrap();
        assert_eq!(format_schedule(&at), "05/01/2025 - 19:01");
    }

    #[test]
    fn window_tolerates_missing_ends() {
        let mut task = Task::new("t1", "Essay", TaskStatus::Todo);
        task.opened_at = Some(Utc.with_ymd_and_hms(2025, 3, 9, 8, 30, 0).unwrap());
        assert_eq!(format_window(&task), "From 09/03/2025 - 08:30 To ");
    }
}
