use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use kinema_core::{KinemaError, Result};

/// Reads asset files relative to a root directory.
#[derive(Debug, Clone)]
pub struct FileAssetReader {
    root_path: PathBuf,
}

impl FileAssetReader {
    /// A file path roots the reader at its parent directory.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let root_path = if path.is_file() {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            path.to_path_buf()
        };
        Self { root_path }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    #[must_use]
    pub fn resolve(&self, uri: &str) -> PathBuf {
        self.root_path.join(uri)
    }

    pub async fn read_to_string(&self, uri: &str) -> Result<String> {
        let path = self.resolve(uri);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| map_io_error(uri, err))
    }

    pub async fn write(&self, uri: &str, contents: String) -> Result<()> {
        let path = self.resolve(uri);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, contents).await?;
        Ok(())
    }
}

fn map_io_error(uri: &str, err: std::io::Error) -> KinemaError {
    if err.kind() == ErrorKind::NotFound {
        KinemaError::AssetNotFound(uri.to_string())
    } else {
        KinemaError::IoError(err)
    }
}
