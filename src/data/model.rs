use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Vertical spacing between MTP-5 altitude levels, in meters.
pub const ALTITUDE_STEP_M: i32 = 50;

// ---------------------------------------------------------------------------
// Sample – one retained row of a log file
// ---------------------------------------------------------------------------

/// A single radiometer scan: timestamp plus one temperature per altitude level.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    /// Temperatures in °C, lowest level first.
    pub temperatures: Vec<f64>,
}

impl Sample {
    /// Timestamp as seconds since the Unix epoch (the numeric time axis).
    pub fn time_seconds(&self) -> f64 {
        self.timestamp.and_utc().timestamp() as f64
    }
}

// ---------------------------------------------------------------------------
// TimeSeries – the result of loading one file
// ---------------------------------------------------------------------------

/// Chronological scans sharing the same number of temperature columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    samples: Vec<Sample>,
    column_count: usize,
}

impl TimeSeries {
    /// Build a series, rejecting samples whose width differs from the first one.
    pub fn from_samples(samples: Vec<Sample>) -> Result<Self, ColumnMismatch> {
        let column_count = samples.first().map_or(0, |s| s.temperatures.len());
        if let Some((index, sample)) = samples
            .iter()
            .enumerate()
            .find(|(_, s)| s.temperatures.len() != column_count)
        {
            return Err(ColumnMismatch {
                index,
                expected: column_count,
                found: sample.temperatures.len(),
            });
        }
        Ok(TimeSeries {
            samples,
            column_count,
        })
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Number of temperature columns per sample (0 for an empty series).
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Numeric time axis, one entry per sample.
    pub fn time_axis(&self) -> Vec<f64> {
        self.samples.iter().map(Sample::time_seconds).collect()
    }

    /// All readings of one temperature column, in time order.
    pub fn column(&self, index: usize) -> Vec<f64> {
        self.samples
            .iter()
            .map(|s| s.temperatures[index])
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("sample {index} has {found} temperature columns, expected {expected}")]
pub struct ColumnMismatch {
    pub index: usize,
    pub expected: usize,
    pub found: usize,
}

// ---------------------------------------------------------------------------
// AltitudeAxis
// ---------------------------------------------------------------------------

/// Altitude levels in meters: `start, start + 50, …` up to and including `end`
/// when it falls on the step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AltitudeAxis {
    levels: Vec<i32>,
}

impl AltitudeAxis {
    pub fn new(start: i32, end: i32) -> Result<Self, InputValidationError> {
        if start >= end {
            return Err(InputValidationError::AltitudeRange { start, end });
        }
        let levels = (start..=end)
            .step_by(ALTITUDE_STEP_M as usize)
            .collect();
        Ok(AltitudeAxis { levels })
    }

    pub fn levels(&self) -> &[i32] {
        &self.levels
    }

    /// Never zero: `new` rejects empty ranges.
    pub fn len(&self) -> usize {
        self.levels.len()
    }
}

// ---------------------------------------------------------------------------
// ChartRequest
// ---------------------------------------------------------------------------

/// Everything needed for one render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub path: PathBuf,
    pub hour_start: u32,
    pub hour_end: u32,
    pub altitude_start: i32,
    pub altitude_end: i32,
}

impl ChartRequest {
    /// Reject inverted or empty ranges before anything is loaded.
    pub fn validate(&self) -> Result<(), InputValidationError> {
        if self.hour_start >= self.hour_end {
            return Err(InputValidationError::HourRange {
                start: self.hour_start,
                end: self.hour_end,
            });
        }
        if self.altitude_start >= self.altitude_end {
            return Err(InputValidationError::AltitudeRange {
                start: self.altitude_start,
                end: self.altitude_end,
            });
        }
        Ok(())
    }
}

/// Caller-supplied ranges that cannot produce a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputValidationError {
    #[error("start hour {start:02}:00 must be before end hour {end:02}:00")]
    HourRange { start: u32, end: u32 },
    #[error("start altitude {start} m must be below end altitude {end} m")]
    AltitudeRange { start: i32, end: i32 },
}

/// Which chart the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Contour,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartKind::Line => write!(f, "line chart"),
            ChartKind::Contour => write!(f, "contour chart"),
        }
    }
}
