//! Upload checks and pre-export review of annotation sets.

use std::io::Cursor;

use image::ImageReader;

use crate::constants::SAME_CATEGORY_REVIEW_THRESHOLD;
use crate::model::{Annotation, AnnotationId, DentCategory, ImageDimensions, ImageFile};

/// Supported image extensions
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff", "tif", "webp", "gif"];

/// Check if a filename (string) has a supported image extension.
pub fn is_image_filename(name: &str) -> bool {
    let lower = name.to_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext)))
}

/// Check whether a selected file is an image.
///
/// The MIME type wins when the browser supplied one; otherwise the
/// extension decides.
pub fn is_image_file(file: &ImageFile) -> bool {
    match &file.mime {
        Some(mime) => mime.starts_with("image/"),
        None => is_image_filename(&file.name),
    }
}

/// Reasons an upload is rejected before any state changes.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// The file is not an image
    #[error("'{name}' is not an image file")]
    NotAnImage { name: String },

    /// The file is empty
    #[error("'{name}' is empty")]
    Empty { name: String },

    /// The image data could not be read
    #[error("Failed to read image '{name}': {source}")]
    Undecodable {
        name: String,
        #[source]
        source: image::ImageError,
    },

    /// The image is below the configured minimum size
    #[error("Image '{name}' is {actual}, must be at least {min}")]
    TooSmall {
        name: String,
        actual: ImageDimensions,
        min: ImageDimensions,
    },
}

/// Read the natural pixel dimensions from encoded image bytes.
///
/// Only the header is decoded.
pub fn read_dimensions(bytes: &[u8]) -> Result<ImageDimensions, image::ImageError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?;
    let (width, height) = reader.into_dimensions()?;
    Ok(ImageDimensions::new(width, height))
}

/// Validate a single-image upload and return its dimensions.
pub fn validate_upload(
    file: &ImageFile,
    min_size: Option<ImageDimensions>,
) -> Result<ImageDimensions, InputError> {
    if !is_image_file(file) {
        return Err(InputError::NotAnImage {
            name: file.name.clone(),
        });
    }
    if file.bytes.is_empty() {
        return Err(InputError::Empty {
            name: file.name.clone(),
        });
    }

    let dimensions = read_dimensions(&file.bytes).map_err(|source| InputError::Undecodable {
        name: file.name.clone(),
        source,
    })?;

    if let Some(min) = min_size.filter(|min| !dimensions.covers(*min)) {
        return Err(InputError::TooSmall {
            name: file.name.clone(),
            actual: dimensions,
            min,
        });
    }

    log::debug!("Accepted upload '{}' ({})", file.name, dimensions);
    Ok(dimensions)
}

/// Something worth a second look before exporting.
///
/// Warnings never block an export.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewWarning {
    NoAnnotations,
    Overlapping {
        first: AnnotationId,
        second: AnnotationId,
    },
    SingleCategory {
        category: DentCategory,
        count: usize,
    },
}

impl ReviewWarning {
    pub fn message(&self) -> String {
        match self {
            ReviewWarning::NoAnnotations => "No dents have been labeled yet".to_string(),
            ReviewWarning::Overlapping { first, second } => {
                format!("Annotations {first} and {second} may be overlapping")
            }
            ReviewWarning::SingleCategory { category, count } => format!(
                "All {count} dents are marked as {}. Please verify this is correct.",
                category.label()
            ),
        }
    }
}

/// Review an annotation set for likely labeling mistakes.
pub fn review_annotations(annotations: &[Annotation]) -> Vec<ReviewWarning> {
    let mut warnings = Vec::new();

    if annotations.is_empty() {
        warnings.push(ReviewWarning::NoAnnotations);
        return warnings;
    }

    for (i, first) in annotations.iter().enumerate() {
        let bounds = first.bounds();
        for second in &annotations[i + 1..] {
            if bounds.intersects(&second.bounds()) {
                warnings.push(ReviewWarning::Overlapping {
                    first: first.id.clone(),
                    second: second.id.clone(),
                });
            }
        }
    }

    let category = annotations[0].category;
    if annotations.len() > SAME_CATEGORY_REVIEW_THRESHOLD
        && annotations.iter().all(|a| a.category == category)
    {
        warnings.push(ReviewWarning::SingleCategory {
            category,
            count: annotations.len(),
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Point, Size};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        image::RgbImage::new(width, height)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("Failed to encode test PNG");
        bytes
    }

    fn dent(id: &str, x: f64, category: DentCategory) -> Annotation {
        Annotation::new(id, Point::new(x, 50.0), Size::new(10.0, 10.0), category)
    }

    #[test]
    fn test_is_image_filename() {
        assert!(is_image_filename("photo.JPG"));
        assert!(is_image_filename("dir/scan.tiff"));
        assert!(!is_image_filename("report.pdf"));
        assert!(!is_image_filename("png"));
    }

    #[test]
    fn test_mime_overrides_extension() {
        let file = ImageFile::new("upload", Vec::new()).with_mime("image/png");
        assert!(is_image_file(&file));
        let file = ImageFile::new("photo.jpg", Vec::new()).with_mime("application/pdf");
        assert!(!is_image_file(&file));
    }

    #[test]
    fn test_validate_upload_reads_dimensions() {
        let file = ImageFile::new("door.png", png_bytes(32, 24));
        assert_eq!(
            validate_upload(&file, None).unwrap(),
            ImageDimensions::new(32, 24)
        );
    }

    #[test]
    fn test_validate_upload_rejections() {
        let pdf = ImageFile::new("claim.pdf", vec![1, 2, 3]);
        assert!(matches!(
            validate_upload(&pdf, None),
            Err(InputError::NotAnImage { .. })
        ));

        let empty = ImageFile::new("empty.png", Vec::new());
        assert!(matches!(
            validate_upload(&empty, None),
            Err(InputError::Empty { .. })
        ));

        let garbage = ImageFile::new("garbage.png", vec![0u8; 64]);
        assert!(matches!(
            validate_upload(&garbage, None),
            Err(InputError::Undecodable { .. })
        ));

        let small = ImageFile::new("small.png", png_bytes(16, 16));
        let err = validate_upload(&small, Some(ImageDimensions::new(800, 600))).unwrap_err();
        assert!(matches!(err, InputError::TooSmall { .. }));
        assert!(err.to_string().contains("16x16"));
    }

    #[test]
    fn test_review_empty_set() {
        assert_eq!(review_annotations(&[]), vec![ReviewWarning::NoAnnotations]);
    }

    #[test]
    fn test_review_overlap_and_single_category() {
        let annotations = vec![
            dent("a", 0.0, DentCategory::Dime),
            dent("b", 5.0, DentCategory::Dime),
            dent("c", 100.0, DentCategory::Dime),
            dent("d", 200.0, DentCategory::Dime),
        ];
        let warnings = review_annotations(&annotations);
        assert_eq!(
            warnings,
            vec![
                ReviewWarning::Overlapping {
                    first: "a".into(),
                    second: "b".into()
                },
                ReviewWarning::SingleCategory {
                    category: DentCategory::Dime,
                    count: 4
                },
            ]
        );
    }

    #[test]
    fn test_review_clean_set() {
        let annotations = vec![
            dent("a", 0.0, DentCategory::Dime),
            dent("b", 100.0, DentCategory::Quarter),
        ];
        assert!(review_annotations(&annotations).is_empty());
    }
}
