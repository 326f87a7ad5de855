use chrono::{NaiveDateTime, Timelike};

use super::model::InputValidationError;

// ---------------------------------------------------------------------------
// Hour-of-day window
// ---------------------------------------------------------------------------

/// Inclusive hour-of-day range. The date part of a timestamp is ignored, so
/// a window recurs on every day a file spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourWindow {
    start: u32,
    end: u32,
}

impl HourWindow {
    /// The whole day; what the UI uses when the time interval is disabled.
    pub const FULL_DAY: HourWindow = HourWindow { start: 0, end: 24 };

    pub fn new(start: u32, end: u32) -> Result<Self, InputValidationError> {
        if start >= end || end > 24 {
            return Err(InputValidationError::HourRange { start, end });
        }
        Ok(HourWindow { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Whether the timestamp's hour lies in `[start, end]`.
    pub fn contains(&self, timestamp: &NaiveDateTime) -> bool {
        let hour = timestamp.hour();
        hour >= self.start && hour <= self.end
    }
}

/// Return indices of timestamps that fall inside the window.
pub fn filtered_indices(timestamps: &[NaiveDateTime], window: &HourWindow) -> Vec<usize> {
    timestamps
        .iter()
        .enumerate()
        .filter(|(_, ts)| window.contains(ts))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 6, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn bounds_are_inclusive() {
        let window = HourWindow::new(6, 9).unwrap();
        assert!(!window.contains(&ts(1, 5, 59)));
        assert!(window.contains(&ts(1, 6, 0)));
        assert!(window.contains(&ts(1, 9, 59)));
        assert!(!window.contains(&ts(1, 10, 0)));
    }

    #[test]
    fn filter_ignores_the_date() {
        let stamps = vec![ts(1, 7, 0), ts(1, 12, 0), ts(2, 7, 30), ts(3, 8, 0), ts(3, 23, 0)];
        let window = HourWindow::new(7, 8).unwrap();
        assert_eq!(filtered_indices(&stamps, &window), vec![0, 2, 3]);
    }

    #[test]
    fn full_day_keeps_everything() {
        let stamps: Vec<_> = (0..24).map(|h| ts(1, h, 0)).collect();
        assert_eq!(filtered_indices(&stamps, &HourWindow::FULL_DAY).len(), 24);
    }

    #[test]
    fn rejects_degenerate_windows() {
        assert!(HourWindow::new(5, 5).is_err());
        assert!(HourWindow::new(10, 2).is_err());
        assert!(HourWindow::new(0, 25).is_err());
    }
}
