//! Image files selected by the user.

/// Image data loaded from a file picker, drop, or folder scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageFile {
    /// Filename of the image
    pub name: String,
    /// MIME type reported by the browser, when known
    pub mime: Option<String>,
    /// Raw image data bytes
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: None,
            bytes,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Filename without its extension.
    pub fn stem(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem() {
        assert_eq!(ImageFile::new("door.left.jpg", Vec::new()).stem(), "door.left");
        assert_eq!(ImageFile::new("hood", Vec::new()).stem(), "hood");
        assert_eq!(ImageFile::new(".hidden", Vec::new()).stem(), ".hidden");
    }
}
