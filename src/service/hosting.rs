//! Image hosting boundary.
//!
//! Uploaded images are given a durable URL by a hosting service. When that
//! fails, a session-scoped local reference is used so annotation can go on.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::model::ImageFile;

/// Errors from an image upload.
#[derive(Debug, thiserror::Error)]
pub enum HostingError {
    /// The hosting service could not be reached
    #[error("Image host unreachable: {0}")]
    Transport(String),

    /// The hosting service answered with a non-success status
    #[error("Image host returned status {0}")]
    Status(u16),

    /// Writing the image failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where an image can be viewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum ImageUrl {
    /// Durable URL from the hosting service
    Hosted(String),
    /// Reference valid only for the current session
    Local(String),
}

impl ImageUrl {
    /// A session-scoped reference for an image that was not hosted.
    pub fn local(name: &str) -> Self {
        ImageUrl::Local(format!("local:{name}"))
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImageUrl::Hosted(url) | ImageUrl::Local(url) => url,
        }
    }

    pub fn is_durable(&self) -> bool {
        matches!(self, ImageUrl::Hosted(_))
    }
}

/// A service that stores images and hands back a URL.
pub trait ImageHost {
    fn upload(&self, image: &ImageFile) -> impl Future<Output = Result<ImageUrl, HostingError>>;
}

/// Upload an image, falling back to a local reference on failure.
pub async fn host_or_local<H: ImageHost>(host: &H, image: &ImageFile) -> ImageUrl {
    match host.upload(image).await {
        Ok(url) => url,
        Err(e) => {
            log::warn!(
                "Failed to host '{}' ({}), using a local reference",
                image.name,
                e
            );
            ImageUrl::local(&image.name)
        }
    }
}

/// Host that never uploads; every image gets a local reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalOnlyHost;

impl ImageHost for LocalOnlyHost {
    async fn upload(&self, image: &ImageFile) -> Result<ImageUrl, HostingError> {
        Ok(ImageUrl::local(&image.name))
    }
}

/// Host that copies images into a directory and returns `file://` URLs.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct DirectoryHost {
    root: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl DirectoryHost {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ImageHost for DirectoryHost {
    async fn upload(&self, image: &ImageFile) -> Result<ImageUrl, HostingError> {
        std::fs::create_dir_all(&self.root)?;
        let file_name = std::path::Path::new(&image.name)
            .file_name()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("'{}' has no file name", image.name),
                )
            })?;
        let path = self.root.join(file_name);
        std::fs::write(&path, &image.bytes)?;
        let path = std::fs::canonicalize(&path)?;
        log::debug!("Hosted '{}' at {:?}", image.name, path);
        Ok(ImageUrl::Hosted(format!("file://{}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DownHost;

    impl ImageHost for DownHost {
        async fn upload(&self, _image: &ImageFile) -> Result<ImageUrl, HostingError> {
            Err(HostingError::Transport("connection refused".to_string()))
        }
    }

    #[test]
    fn test_failed_upload_falls_back_to_local() {
        let image = ImageFile::new("hood.png", vec![1, 2, 3]);
        let url = pollster::block_on(host_or_local(&DownHost, &image));
        assert_eq!(url, ImageUrl::Local("local:hood.png".to_string()));
        assert!(!url.is_durable());
    }

    #[test]
    fn test_local_only_host() {
        let image = ImageFile::new("roof.jpg", Vec::new());
        let url = pollster::block_on(host_or_local(&LocalOnlyHost, &image));
        assert_eq!(url.as_str(), "local:roof.jpg");
    }

    #[test]
    fn test_url_serialization() {
        let json = serde_json::to_string(&ImageUrl::Hosted("https://img/1".to_string())).unwrap();
        assert_eq!(json, r#"{"kind":"hosted","url":"https://img/1"}"#);
    }

    #[test]
    fn test_directory_host_writes_file() {
        let root = std::env::temp_dir().join(format!("dentlens-host-{}", std::process::id()));
        let host = DirectoryHost::new(&root);
        let image = ImageFile::new("trunk.png", vec![9, 8, 7]);
        let url = pollster::block_on(host.upload(&image)).unwrap();

        assert!(url.is_durable());
        assert!(url.as_str().starts_with("file://"));
        assert_eq!(std::fs::read(root.join("trunk.png")).unwrap(), vec![9, 8, 7]);
        let _ = std::fs::remove_dir_all(&root);
    }
}
