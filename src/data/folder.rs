use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

/// Byte range of the `YYYYMMDD` date inside an MTP-5 file name,
/// e.g. `TPR_20190615.txt`.
const DATE_RANGE: std::ops::Range<usize> = 4..12;

#[derive(Debug, Error)]
#[error("cannot list {}", path.display())]
pub struct FolderError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// One daily log file found in a data folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayFile {
    pub file_name: String,
    pub path: PathBuf,
    pub date: NaiveDate,
}

impl DayFile {
    /// Date shown in the file selector, `YYYY-MM-DD`.
    pub fn display_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Extract the date encoded at characters 4..12 of a file name.
pub fn date_from_file_name(file_name: &str) -> Option<NaiveDate> {
    let digits = file_name.get(DATE_RANGE)?;
    NaiveDate::parse_from_str(digits, "%Y%m%d").ok()
}

/// List the `*.txt` logs of a folder, sorted by file name.
///
/// Files whose name does not carry a date are skipped.
pub fn scan_folder(dir: &Path) -> Result<Vec<DayFile>, FolderError> {
    let to_err = |source| FolderError {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(to_err)? {
        let entry = entry.map_err(to_err)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !file_name.ends_with(".txt") {
            continue;
        }
        match date_from_file_name(file_name) {
            Some(date) => files.push(DayFile {
                file_name: file_name.to_string(),
                path: path.clone(),
                date,
            }),
            None => log::warn!("Skipping {file_name}: no YYYYMMDD date at characters 4-11"),
        }
    }

    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(files)
}

/// Map a `YYYY-MM-DD` selector entry back to its file.
pub fn find_by_date<'a>(files: &'a [DayFile], display_date: &str) -> Option<&'a DayFile> {
    let needle = display_date.replace('-', "");
    files.iter().find(|f| f.file_name.contains(&needle))
}
