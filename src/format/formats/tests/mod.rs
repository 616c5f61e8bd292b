//! Unit tests for document generator implementations.
//!
//! Generated documents are decoded again and checked against the report
//! they were built from.

mod archive_tests;

use crate::batch::{ImageResult, PanelBatch};
use crate::format::{ExportAssembler, ExportReport};
use crate::model::{Annotation, DentCategory, ImageDimensions, Point, Size, VehiclePanel};
use crate::service::{ImageUrl, fixture_detections};
use crate::state::{ImageSession, ViewSettings};

const STAMP: &str = "2024-05-01T12:00:00Z";

fn image_report() -> ExportReport {
    let mut session = ImageSession::new(
        "door.jpg",
        ImageDimensions::new(800, 600),
        (1024.0, 768.0),
        ViewSettings::default(),
    );
    session.apply_detections(fixture_detections());
    session.store_mut().add_manual(
        Point::new(50.0, 50.0),
        Size::new(15.0, 15.0),
        DentCategory::Nickel,
    );
    ExportAssembler::assemble_image(&session, STAMP)
}

fn batch_report() -> ExportReport {
    let mut batch = PanelBatch::new();
    batch.record_panel_result(
        VehiclePanel::Hood,
        vec![
            ImageResult::new(
                "hood_front.jpg",
                ImageUrl::Hosted("https://img.example/1".to_string()),
                fixture_detections(),
            )
            .with_dimensions(ImageDimensions::new(640, 480)),
            ImageResult::new("hood_left.jpg", ImageUrl::local("hood_left.jpg"), Vec::new()),
        ],
    );
    batch.record_panel_result(
        VehiclePanel::RightRearDoor,
        vec![ImageResult::new(
            "door.png",
            ImageUrl::local("door.png"),
            vec![Annotation::new(
                "dent_7",
                Point::new(10.0, 10.0),
                Size::new(40.0, 40.0),
                DentCategory::Oversized,
            )],
        )],
    );
    ExportAssembler::assemble_batch(&batch, STAMP)
}
