//! Lookup of uploaded images by host-relative path.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Resolves a URL path such as `/uploads/cat.png` to the stored image's
/// pixel dimensions, or `None` when no such image exists. Paths arrive as
/// they appear in the URL, still percent-encoded.
pub trait AssetStore: Send + Sync {
    fn dimensions(&self, path: &str) -> Option<ImageDimensions>;
}

/// Store with no assets: every figure fails `ImageNonExistent`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAssets;

impl AssetStore for NoAssets {
    fn dimensions(&self, _path: &str) -> Option<ImageDimensions> {
        None
    }
}

/// Images on disk beneath a root directory.
#[derive(Clone, Debug)]
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a URL path beneath the root; refuses anything that could
    /// escape it.
    fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        let decoded = percent_decode_str(url_path).decode_utf8().ok()?;
        if decoded.contains(['\\', '\0']) {
            return None;
        }
        let relative = Path::new(decoded.trim_start_matches('/'));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        (resolved != self.root).then_some(resolved)
    }
}

impl AssetStore for FsAssetStore {
    fn dimensions(&self, path: &str) -> Option<ImageDimensions> {
        let file = self.resolve(path)?;
        match image::image_dimensions(&file) {
            Ok((width, height)) => Some(ImageDimensions { width, height }),
            Err(err) => {
                log::debug!(target: "sanitizer.assets", "{}: {err}", file.display());
                None
            }
        }
    }
}

/// In-memory store keyed by (encoded) URL path.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssetStore {
    images: HashMap<String, ImageDimensions>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, width: u32, height: u32) {
        self.images
            .insert(path.to_string(), ImageDimensions { width, height });
    }

    pub fn with_image(mut self, path: &str, width: u32, height: u32) -> Self {
        self.insert(path, width, height);
        self
    }
}

impl AssetStore for MemoryAssetStore {
    fn dimensions(&self, path: &str) -> Option<ImageDimensions> {
        self.images.get(path).copied()
    }
}
