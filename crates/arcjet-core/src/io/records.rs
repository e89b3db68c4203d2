//! Result-record files.
//!
//! A records file is a JSON array of flat per-frame objects. Its name ends in
//! the inclusive frame range it covers (`run_000_500.json`); records whose
//! `INDEX` falls outside that range are dropped on every read and write.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::ops::RangeInclusive;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{ArcjetError, Result};
use crate::record::ResultRecord;

/// `<stem>_<first>_<last>.json` with indices zero-padded to three digits.
pub fn records_file_name(stem: &str, first: usize, last: usize) -> String {
    format!("{stem}_{first:03}_{last:03}.json")
}

/// Inclusive frame range encoded in the last two `_`-separated tokens of the
/// file stem.
pub fn parse_index_range(path: &Path) -> Result<RangeInclusive<usize>> {
    let invalid = || ArcjetError::InvalidRecordFilename(path.display().to_string());
    let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(invalid)?;

    let mut tokens = stem.rsplit('_');
    let last = tokens.next().and_then(|t| t.parse::<usize>().ok());
    let first = tokens.next().and_then(|t| t.parse::<usize>().ok());
    match (first, last) {
        (Some(first), Some(last)) if first <= last => Ok(first..=last),
        _ => Err(invalid()),
    }
}

fn retain_in_range(records: Vec<ResultRecord>, range: &RangeInclusive<usize>) -> Vec<ResultRecord> {
    let before = records.len();
    let kept: Vec<ResultRecord> = records
        .into_iter()
        .filter(|r| range.contains(&r.index))
        .collect();
    if kept.len() != before {
        debug!(
            dropped = before - kept.len(),
            first = range.start(),
            last = range.end(),
            "Dropped records outside file range"
        );
    }
    kept
}

/// Write `records` (sorted by index) to `path`.
pub fn save_records(path: &Path, records: &[ResultRecord]) -> Result<()> {
    let range = parse_index_range(path)?;
    let mut records = retain_in_range(records.to_vec(), &range);
    records.sort_by_key(|r| r.index);

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &records)?;
    writer.flush()?;
    info!(path = %path.display(), records = records.len(), "Saved records");
    Ok(())
}

/// Read the records of `path` that fall inside its file-name range.
pub fn load_records(path: &Path) -> Result<Vec<ResultRecord>> {
    let range = parse_index_range(path)?;
    let reader = BufReader::new(File::open(path)?);
    let records: Vec<ResultRecord> = serde_json::from_reader(reader)?;
    Ok(retain_in_range(records, &range))
}

/// Merge `new` into the file at `path`, creating it if needed.
///
/// A new record replaces a stored one with the same index. Returns the
/// merged list as written.
pub fn append_records(path: &Path, new: &[ResultRecord]) -> Result<Vec<ResultRecord>> {
    let range = parse_index_range(path)?;
    let existing = if path.exists() {
        load_records(path)?
    } else {
        Vec::new()
    };

    let mut merged: BTreeMap<usize, ResultRecord> =
        existing.into_iter().map(|r| (r.index, r)).collect();
    for record in retain_in_range(new.to_vec(), &range) {
        merged.insert(record.index, record);
    }

    let records: Vec<ResultRecord> = merged.into_values().collect();
    save_records(path, &records)?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_round_trip() {
        let name = records_file_name("run", 0, 500);
        assert_eq!(name, "run_000_500.json");
        assert_eq!(parse_index_range(Path::new(&name)).unwrap(), 0..=500);
    }

    #[test]
    fn stem_with_underscores() {
        let range = parse_index_range(Path::new("/tmp/test_article_7_0012_1234.json")).unwrap();
        assert_eq!(range, 12..=1234);
    }

    #[test]
    fn bad_names_are_configuration_errors() {
        for name in ["run.json", "run_a_10.json", "run_10_2.json", "500.json"] {
            assert!(
                matches!(
                    parse_index_range(Path::new(name)),
                    Err(ArcjetError::InvalidRecordFilename(_))
                ),
                "{name}"
            );
        }
    }

    #[test]
    fn append_replaces_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(records_file_name("run", 0, 10));

        append_records(&path, &[ResultRecord::new(5), ResultRecord::new(2)]).unwrap();
        let mut replacement = ResultRecord::new(5);
        replacement.flags.dim_shock = Some(true);
        let merged = append_records(&path, &[replacement, ResultRecord::new(11)]).unwrap();

        let indices: Vec<usize> = merged.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![2, 5]);
        assert_eq!(merged[1].flags.dim_shock, Some(true));
        assert_eq!(load_records(&path).unwrap(), merged);
    }
}
