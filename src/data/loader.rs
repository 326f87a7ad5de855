use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use csv::ByteRecord;
use thiserror::Error;

use super::filter::{HourWindow, filtered_indices};
use super::model::{InputValidationError, Sample, TimeSeries};

/// Number of header lines an MTP-5 export starts with. They are discarded
/// without being looked at.
pub const PREAMBLE_LINES: u64 = 26;

/// Timestamp layout of column 0, e.g. `15/06/2019 13:05:42`.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("reading log preamble")]
    Read(#[source] std::io::Error),
    #[error("reading log records")]
    Csv(#[from] csv::Error),
    #[error("line {line}, column {column}: '{value}' is not a temperature")]
    Temperature {
        line: u64,
        column: usize,
        value: String,
    },
    #[error("line {line}: {found} temperature columns, expected {expected}")]
    ColumnCount {
        line: u64,
        expected: usize,
        found: usize,
    },
    #[error(transparent)]
    InvalidHourWindow(#[from] InputValidationError),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an MTP-5 log, keeping scans whose hour of day lies in
/// `[hour_start, hour_end]`.
///
/// An empty series is not an error: it means the file was readable but no
/// row survived timestamp parsing and the hour filter.
pub fn load(path: &Path, hour_start: u32, hour_end: u32) -> Result<TimeSeries, LoadError> {
    let window = HourWindow::new(hour_start, hour_end)?;
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let series = parse_reader(file, window).map_err(|err| match err {
        LoadError::Read(source) => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;

    log::info!(
        "Loaded {} scans x {} levels from {} (hours {:02}-{:02})",
        series.len(),
        series.column_count(),
        path.display(),
        window.start(),
        window.end()
    );
    Ok(series)
}

/// Parse an MTP-5 log from any reader. See [`load`].
///
/// Layout after the preamble, one scan per line:
///
/// ```text
/// 15/06/2019 13:05:42<TAB>18,42<TAB>18,01<TAB>...<TAB>12,77
/// ```
pub fn parse_reader<R: Read>(reader: R, window: HourWindow) -> Result<TimeSeries, LoadError> {
    let mut reader = BufReader::new(reader);
    skip_preamble(&mut reader)?;

    let mut records = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    // Timestamps first; rows that fail here are dropped, not reported.
    let mut rows: Vec<(u64, NaiveDateTime, ByteRecord)> = Vec::new();
    for result in records.byte_records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line()) + PREAMBLE_LINES;
        match record.get(0).and_then(parse_timestamp) {
            Some(timestamp) => rows.push((line, timestamp, record)),
            None => log::debug!("line {line}: no valid timestamp, row dropped"),
        }
    }

    let timestamps: Vec<NaiveDateTime> = rows.iter().map(|(_, ts, _)| *ts).collect();
    let keep = filtered_indices(&timestamps, &window);

    let mut lines = Vec::with_capacity(keep.len());
    let mut samples = Vec::with_capacity(keep.len());
    for idx in keep {
        let (line, timestamp, record) = &rows[idx];
        samples.push(Sample {
            timestamp: *timestamp,
            temperatures: parse_temperatures(record, *line)?,
        });
        lines.push(*line);
    }

    TimeSeries::from_samples(samples).map_err(|mismatch| LoadError::ColumnCount {
        line: lines[mismatch.index],
        expected: mismatch.expected,
        found: mismatch.found,
    })
}

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

fn skip_preamble<R: BufRead>(reader: &mut R) -> Result<(), LoadError> {
    let mut discard = Vec::new();
    for _ in 0..PREAMBLE_LINES {
        discard.clear();
        if reader.read_until(b'\n', &mut discard).map_err(LoadError::Read)? == 0 {
            break;
        }
    }
    Ok(())
}

/// Parse a `dd/mm/YYYY HH:MM:SS` field.
pub fn parse_timestamp(field: &[u8]) -> Option<NaiveDateTime> {
    let text = std::str::from_utf8(field).ok()?.trim();
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).ok()
}

/// Parse a decimal-comma reading such as `12,5`. `nan` and `inf` spellings
/// are rejected like any other malformed field.
pub fn parse_temperature(field: &str) -> Option<f64> {
    field
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn parse_temperatures(record: &ByteRecord, line: u64) -> Result<Vec<f64>, LoadError> {
    let mut fields: Vec<&[u8]> = record.iter().skip(1).collect();
    // A trailing tab leaves an empty last field.
    while fields.last().is_some_and(|f| f.trim_ascii().is_empty()) {
        fields.pop();
    }

    fields
        .into_iter()
        .enumerate()
        .map(|(i, raw)| {
            let text = String::from_utf8_lossy(raw);
            parse_temperature(&text).ok_or_else(|| LoadError::Temperature {
                line,
                column: i + 1,
                value: text.into_owned(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::{NaiveDate, Timelike};

    use super::*;

    fn preamble() -> String {
        (1..=PREAMBLE_LINES)
            .map(|i| format!("header line {i}\n"))
            .collect()
    }

    fn parse(body: &str, window: HourWindow) -> Result<TimeSeries, LoadError> {
        let text = format!("{}{body}", preamble());
        parse_reader(text.as_bytes(), window)
    }

    #[test]
    fn parses_timestamp_exactly() {
        let ts = parse_timestamp(b"15/06/2019 13:05:42").unwrap();
        assert_eq!(
            ts,
            NaiveDate::from_ymd_opt(2019, 6, 15)
                .unwrap()
                .and_hms_opt(13, 5, 42)
                .unwrap()
        );
        assert!(parse_timestamp(b"2019-06-15 13:05:42").is_none());
        assert!(parse_timestamp(b"15/06/2019").is_none());
        assert!(parse_timestamp(b"").is_none());
    }

    #[test]
    fn decimal_comma_temperatures() {
        assert_eq!(parse_temperature("12,5"), Some(12.5));
        assert_eq!(parse_temperature(" -3,25 "), Some(-3.25));
        assert_eq!(parse_temperature("7"), Some(7.0));
        assert_eq!(parse_temperature("abc"), None);
        assert_eq!(parse_temperature(""), None);
        assert_eq!(parse_temperature("nan"), None);
        assert_eq!(parse_temperature("NaN"), None);
        assert_eq!(parse_temperature("inf"), None);
        assert_eq!(parse_temperature("-infinity"), None);
    }

    #[test]
    fn loads_rows_after_preamble() {
        let body = "15/06/2019 00:00:00\t12,5\t12,1\t11,8\n\
                    15/06/2019 00:05:00\t12,4\t12,0\t11,7\n";
        let series = parse(body, HourWindow::FULL_DAY).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.column_count(), 3);
        assert_eq!(series.samples()[0].temperatures, vec![12.5, 12.1, 11.8]);
        assert_eq!(series.samples()[1].timestamp.minute(), 5);
    }

    #[test]
    fn preamble_is_skipped_even_when_it_looks_like_data() {
        // 22 plain header lines + 4 parseable rows = 26 preamble lines.
        let mut text: String = (1..=22).map(|i| format!("header {i}\n")).collect();
        for h in 0..4 {
            text.push_str(&format!("15/06/2019 0{h}:00:00\t99,0\t99,0\n"));
        }
        text.push_str("15/06/2019 10:00:00\t1,0\t2,0\n");
        let series = parse_reader(text.as_bytes(), HourWindow::FULL_DAY).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.samples()[0].temperatures, vec![1.0, 2.0]);
    }

    #[test]
    fn rows_with_bad_timestamps_are_dropped() {
        let body = "15/06/2019 01:00:00\t1,0\n\
                    garbage\t2,0\n\
                    32/06/2019 01:00:00\t3,0\n\
                    15/06/2019 02:00:00\t4,0\n\
                    end of file\n";
        let series = parse(body, HourWindow::FULL_DAY).unwrap();
        assert_eq!(series.len(), 2);
        assert!(series.len() <= 5);
        assert_eq!(series.column(0), vec![1.0, 4.0]);
    }

    #[test]
    fn hour_filter_is_inclusive_and_date_agnostic() {
        let body = "15/06/2019 05:59:59\t1,0\n\
                    15/06/2019 06:00:00\t2,0\n\
                    15/06/2019 08:59:59\t3,0\n\
                    15/06/2019 09:00:00\t4,0\n\
                    16/06/2019 07:30:00\t5,0\n";
        let series = parse(body, HourWindow::new(6, 8).unwrap()).unwrap();
        assert_eq!(series.column(0), vec![2.0, 3.0, 5.0]);
    }

    #[test]
    fn malformed_temperature_fails_the_row() {
        let body = "15/06/2019 01:00:00\t1,0\t2,0\n\
                    15/06/2019 01:05:00\t1,0\tabc\n";
        match parse(body, HourWindow::FULL_DAY) {
            Err(LoadError::Temperature { line, column, value }) => {
                assert_eq!(line, PREAMBLE_LINES + 2);
                assert_eq!(column, 2);
                assert_eq!(value, "abc");
            }
            other => panic!("expected temperature error, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_temperature_fails_the_row() {
        let body = "15/06/2019 01:00:00\tnan\tinf\n";
        match parse(body, HourWindow::FULL_DAY) {
            Err(LoadError::Temperature { line, column, value }) => {
                assert_eq!(line, PREAMBLE_LINES + 1);
                assert_eq!(column, 1);
                assert_eq!(value, "nan");
            }
            other => panic!("expected temperature error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_temperature_outside_window_is_ignored() {
        let body = "15/06/2019 01:00:00\t1,0\n\
                    15/06/2019 20:00:00\tabc\n";
        let series = parse(body, HourWindow::new(0, 2).unwrap()).unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn ragged_rows_are_reported() {
        let body = "15/06/2019 01:00:00\t1,0\t2,0\n\
                    15/06/2019 01:05:00\t1,0\n";
        assert!(matches!(
            parse(body, HourWindow::FULL_DAY),
            Err(LoadError::ColumnCount { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn trailing_tab_is_tolerated() {
        let body = "15/06/2019 01:00:00\t1,0\t2,0\t\n";
        let series = parse(body, HourWindow::FULL_DAY).unwrap();
        assert_eq!(series.column_count(), 2);
    }

    #[test]
    fn no_rows_in_range_is_an_empty_series() {
        let body = "15/06/2019 01:00:00\t1,0\n";
        let series = parse(body, HourWindow::new(12, 18).unwrap()).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.column_count(), 0);

        let series = parse_reader("only\na\nshort\nheader\n".as_bytes(), HourWindow::FULL_DAY)
            .unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("mtp_20190615.txt");
        match load(&missing, 0, 24) {
            Err(LoadError::Io { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected IO error, got {other:?}"),
        }
    }

    #[test]
    fn load_rejects_inverted_hours() {
        assert!(matches!(
            load(Path::new("unused.txt"), 10, 10),
            Err(LoadError::InvalidHourWindow(_))
        ));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", preamble()).unwrap();
        writeln!(file, "15/06/2019 12:00:00\t20,5\t19,5").unwrap();
        let series = load(file.path(), 0, 24).unwrap();
        assert_eq!(series.samples()[0].temperatures, vec![20.5, 19.5]);
    }
}
