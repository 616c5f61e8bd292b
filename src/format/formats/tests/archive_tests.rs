//! Tests for the ZIP archive generator.

use std::io::{Cursor, Read};

use serde_json::Value;
use zip::ZipArchive;

use super::{STAMP, batch_report, image_report};
use crate::format::ExportReport;
use crate::format::formats::{ANNOTATIONS_ENTRY, ArchiveFormat, SUMMARY_ENTRY, image_entry_name};
use crate::format::traits::DocumentGenerator;
use crate::model::VehiclePanel;

fn open(report: &ExportReport) -> ZipArchive<Cursor<Vec<u8>>> {
    let bytes = ArchiveFormat.generate(report).unwrap();
    ZipArchive::new(Cursor::new(bytes)).unwrap()
}

fn read_json(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Value {
    let mut contents = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    serde_json::from_str(&contents).unwrap()
}

fn entry_names(archive: &ZipArchive<Cursor<Vec<u8>>>) -> Vec<String> {
    let mut names: Vec<String> = archive.file_names().map(String::from).collect();
    names.sort();
    names
}

#[test]
fn test_batch_archive_layout() {
    let mut archive = open(&batch_report());

    assert_eq!(
        entry_names(&archive),
        vec![
            "hood/001_hood_front.json",
            "hood/002_hood_left.json",
            "right_rear_door/001_door.json",
            "summary.json",
        ]
    );

    let image = read_json(&mut archive, "hood/001_hood_front.json");
    assert_eq!(image["file_name"], "hood_front.jpg");
    assert_eq!(image["total_dents"], 2);
    assert_eq!(image["annotations"][1]["category"], "quarter");
}

#[test]
fn test_batch_summary() {
    let mut archive = open(&batch_report());
    let summary = read_json(&mut archive, SUMMARY_ENTRY);

    assert_eq!(summary["timestamp"], STAMP);
    assert_eq!(summary["total_dents"], 3);
    assert_eq!(summary["panels"][0]["image_count"], 2);
    assert_eq!(summary["panels"][1]["top_category"], "oversized");
    assert!(summary.get("annotations").is_none());
}

#[test]
fn test_single_image_archive() {
    let mut archive = open(&image_report());

    assert_eq!(entry_names(&archive), vec![ANNOTATIONS_ENTRY, SUMMARY_ENTRY]);

    let summary = read_json(&mut archive, SUMMARY_ENTRY);
    assert_eq!(summary["image_name"], "door.jpg");
    assert!(summary.get("panels").is_none());

    let annotations = read_json(&mut archive, ANNOTATIONS_ENTRY);
    assert_eq!(annotations.as_array().unwrap().len(), 3);
}

#[test]
fn test_entries_are_compressed() {
    let mut archive = open(&batch_report());
    let entry = archive.by_name(SUMMARY_ENTRY).unwrap();
    assert_eq!(entry.compression(), zip::CompressionMethod::Deflated);
}

#[test]
fn test_image_entry_name() {
    assert_eq!(
        image_entry_name(VehiclePanel::LeftQuarterPanel, 9, "scans/IMG_0042.JPG"),
        "left_quarter_panel/010_IMG_0042.json"
    );
    assert_eq!(image_entry_name(VehiclePanel::Roof, 0, "roof"), "roof/001_roof.json");
}
