//! The asset collaborator consumed by the filter

use std::path::{Path, PathBuf};

use crate::infra::FileSystem;

use super::error::OptimizeError;

/// A piece of JavaScript flowing through an asset pipeline.
///
/// The filter reads the content, hands it to the optimizer and writes the
/// optimized result back. The source root and path are only consulted to
/// work out which declared module an asset belongs to.
pub trait Asset {
    /// Current content of the asset
    fn content(&self) -> &str;

    /// Replace the content of the asset
    fn set_content(&mut self, content: String);

    /// Directory the asset was loaded from, if any
    fn source_root(&self) -> Option<&Path>;

    /// Path of the asset relative to its source root, if any
    fn source_path(&self) -> Option<&Path>;

    /// Source root and source path joined, when both are known.
    fn source_location(&self) -> Option<PathBuf> {
        match (self.source_root(), self.source_path()) {
            (Some(root), Some(path)) => Some(root.join(path)),
            _ => None,
        }
    }
}

/// In-memory asset, optionally tied to a file on disk.
///
/// # Examples
///
/// ```
/// use rjs_filter::filter::{Asset, SourceAsset};
///
/// let mut asset = SourceAsset::new("define(['jquery'], function ($) {});");
/// assert!(asset.source_location().is_none());
///
/// asset.set_content("define(['jquery'],function(n){});".to_string());
/// assert!(asset.content().starts_with("define"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAsset {
    content: String,
    source_root: Option<PathBuf>,
    source_path: Option<PathBuf>,
}

impl SourceAsset {
    /// Create an asset with no source location
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source_root: None,
            source_path: None,
        }
    }

    /// Attach a source root and a path relative to it
    pub fn with_source(mut self, root: impl Into<PathBuf>, path: impl Into<PathBuf>) -> Self {
        self.source_root = Some(root.into());
        self.source_path = Some(path.into());
        self
    }

    /// Load `root/path` from disk
    pub fn load<FS: FileSystem>(
        root: impl Into<PathBuf>,
        path: impl Into<PathBuf>,
        fs: &FS,
    ) -> Result<Self, OptimizeError> {
        let root = root.into();
        let path = path.into();
        let full = root.join(&path);
        let content = fs
            .read_to_string(&full)
            .map_err(|e| OptimizeError::io(format!("reading {}", full.display()), e))?;
        Ok(Self::new(content).with_source(root, path))
    }

    /// Consume the asset and return its content
    pub fn into_content(self) -> String {
        self.content
    }
}

impl Asset for SourceAsset {
    fn content(&self) -> &str {
        &self.content
    }

    fn set_content(&mut self, content: String) {
        self.content = content;
    }

    fn source_root(&self) -> Option<&Path> {
        self.source_root.as_deref()
    }

    fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::RealFileSystem;
    use tempfile::TempDir;

    #[test]
    fn test_source_location_joins_root_and_path() {
        let asset = SourceAsset::new("").with_source("/srv/web/js", "app/main.js");
        assert_eq!(
            asset.source_location(),
            Some(PathBuf::from("/srv/web/js/app/main.js"))
        );
    }

    #[test]
    fn test_source_location_requires_both_parts() {
        let asset = SourceAsset::new("x");
        assert_eq!(asset.source_root(), None);
        assert_eq!(asset.source_location(), None);
    }

    #[test]
    fn test_load_reads_content_and_keeps_source() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("app")).unwrap();
        std::fs::write(temp.path().join("app/main.js"), "require(['a']);").unwrap();

        let asset = SourceAsset::load(temp.path(), "app/main.js", &RealFileSystem).unwrap();
        assert_eq!(asset.content(), "require(['a']);");
        assert_eq!(asset.source_path(), Some(Path::new("app/main.js")));
    }

    #[test]
    fn test_load_missing_file_returns_io_error() {
        let temp = TempDir::new().unwrap();
        let result = SourceAsset::load(temp.path(), "missing.js", &RealFileSystem);
        assert!(matches!(result, Err(OptimizeError::Io { .. })));
    }
}
