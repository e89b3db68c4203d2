#[allow(dead_code)]
mod common;

use arcjet_core::io::{
    append_records, load_or_derive, load_records, parse_index_range, records_file_name,
    save_records, sidecar_path, VideoMetadata,
};
use arcjet_core::record::{ResultRecord, Target};
use tempfile::TempDir;

use common::model_record;

fn records(range: std::ops::RangeInclusive<usize>) -> Vec<ResultRecord> {
    range
        .map(|i| model_record(i, 400.0 + i as f64, 30.0 + i as f64, 12.0, 50.0))
        .collect()
}

#[test]
fn test_records_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(records_file_name("shot", 0, 10));
    assert!(path.ends_with("shot_000_010.json"));

    let original = records(0..=10);
    save_records(&path, &original).unwrap();
    let loaded = load_records(&path).unwrap();
    assert_eq!(loaded.len(), 11);
    for (a, b) in loaded.iter().zip(&original) {
        assert_eq!(a.index, b.index);
        assert_eq!(a.area(Target::Model), b.area(Target::Model));
        assert_eq!(a.position_at(Target::Model, 0.0), b.position_at(Target::Model, 0.0));
    }
}

#[test]
fn test_disjoint_file_name_loads_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(records_file_name("shot", 0, 10));
    save_records(&path, &records(0..=10)).unwrap();

    let renamed = dir.path().join(records_file_name("shot", 20, 30));
    std::fs::copy(&path, &renamed).unwrap();
    assert!(load_records(&renamed).unwrap().is_empty());
}

#[test]
fn test_save_drops_records_outside_name_range() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(records_file_name("shot", 3, 5));
    save_records(&path, &records(0..=10)).unwrap();
    let indices: Vec<usize> = load_records(&path).unwrap().iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![3, 4, 5]);
}

#[test]
fn test_append_merges_by_index() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(records_file_name("shot", 0, 9));
    append_records(&path, &records(0..=4)).unwrap();

    let mut update = records(4..=9);
    update[0] = model_record(4, 999.0, 0.0, 12.0, 50.0);
    let merged = append_records(&path, &update).unwrap();

    assert_eq!(merged.len(), 10);
    assert_eq!(merged[4].area(Target::Model), Some(999.0));
    assert_eq!(load_records(&path).unwrap(), merged);
}

#[test]
fn test_range_parsed_from_file_name() {
    let range = parse_index_range(std::path::Path::new("/data/run_b_012_345.json")).unwrap();
    assert_eq!(range, 12..=345);
    assert!(parse_index_range(std::path::Path::new("run.json")).is_err());
    assert!(parse_index_range(std::path::Path::new("run_9_3.json")).is_err());
}

#[test]
fn test_sidecar_derived_once() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("frames");
    std::fs::create_dir(&input).unwrap();

    let first = load_or_derive(&input, || {
        Ok(VideoMetadata {
            width: 64,
            height: 48,
            channels: 3,
            frame_count: 10,
            first_good_frame: Some(2),
            last_good_frame: Some(8),
            flow: None,
            crop: None,
            brightness: vec![0.5; 10],
            brightness_stride: 1,
        })
    })
    .unwrap();
    assert!(sidecar_path(&input).exists());

    let second = load_or_derive(&input, || panic!("sidecar should be reused")).unwrap();
    assert_eq!(first, second);
    assert_eq!(second.good_range(), Some((2, 8)));
}
