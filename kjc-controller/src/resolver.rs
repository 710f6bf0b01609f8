//! Asset id → local path resolution

use crate::error::{Error, Result};
use std::path::PathBuf;

/// Maps an opaque asset id to a playable local file
pub trait AssetResolver: Send + Sync {
    fn resolve(&self, asset_id: &str) -> Result<PathBuf>;
}

/// Resolves `<video_dir>/<asset_id>.<extension>`
pub struct DirectoryResolver {
    video_dir: PathBuf,
    extension: String,
}

impl DirectoryResolver {
    pub fn new(video_dir: PathBuf, extension: impl Into<String>) -> Self {
        Self {
            video_dir,
            extension: extension.into(),
        }
    }

    pub fn video_dir(&self) -> &PathBuf {
        &self.video_dir
    }
}

/// Asset ids are generated names; anything else could escape the video dir
fn validate_asset_id(asset_id: &str) -> Result<()> {
    let valid = !asset_id.is_empty()
        && asset_id.len() <= 64
        && asset_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("invalid asset id '{}'", asset_id)))
    }
}

impl AssetResolver for DirectoryResolver {
    fn resolve(&self, asset_id: &str) -> Result<PathBuf> {
        validate_asset_id(asset_id)?;

        let path = self
            .video_dir
            .join(format!("{}.{}", asset_id, self.extension));

        if path.is_file() {
            Ok(path)
        } else {
            Err(Error::NotFound(asset_id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolves_existing_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("abc12345.mp4");
        std::fs::write(&file, b"fake").unwrap();

        let resolver = DirectoryResolver::new(dir.path().to_path_buf(), "mp4");
        assert_eq!(resolver.resolve("abc12345").unwrap(), file);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let resolver = DirectoryResolver::new(dir.path().to_path_buf(), "mp4");

        assert!(matches!(resolver.resolve("zzzz9999"), Err(Error::NotFound(id)) if id == "zzzz9999"));
    }

    #[test]
    fn test_directory_with_asset_name_is_not_found() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("abc12345.mp4")).unwrap();
        let resolver = DirectoryResolver::new(dir.path().to_path_buf(), "mp4");

        assert!(matches!(resolver.resolve("abc12345"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_path_traversal_is_rejected() {
        let dir = TempDir::new().unwrap();
        let resolver = DirectoryResolver::new(dir.path().to_path_buf(), "mp4");

        for bad in ["../etc/passwd", "a/b", "", "abc 123", "abc.mp4"] {
            assert!(
                matches!(resolver.resolve(bad), Err(Error::InvalidInput(_))),
                "expected {:?} to be rejected",
                bad
            );
        }
    }
}
