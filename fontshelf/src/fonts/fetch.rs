//! Reads font files from disk for previewing.

use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::locations::{canonical_or_original, platform_font_dirs};
use crate::preview::{FetchError, FontMime, PreviewSrc, ResourceFetcher};

/// Largest font file that will be loaded for preview (25 MiB).
pub const DEFAULT_MAX_FONT_FILE_SIZE: u64 = 25 * 1024 * 1024;

/// Which directories font files may be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryPolicy {
    /// Any readable path
    Anywhere,
    /// Only paths inside one of these directories
    Only(Vec<PathBuf>),
}

impl DirectoryPolicy {
    /// Restrict to the platform's system and per-user font directories.
    pub fn platform() -> Self {
        Self::Only(platform_font_dirs())
    }

    /// Restrict to `dirs`, or to the platform directories when `dirs` is empty.
    pub fn from_config(dirs: &[PathBuf]) -> Self {
        if dirs.is_empty() {
            Self::platform()
        } else {
            Self::Only(dirs.to_vec())
        }
    }
}

/// [`ResourceFetcher`] for local `.ttf` and `.otf` files.
///
/// A path is only read when it exists, has a supported extension, resolves
/// inside an allowed directory and is no larger than the size limit.
pub struct FontFileFetcher {
    /// Canonicalized allowed roots; `None` allows any path
    allowed_roots: Option<Vec<PathBuf>>,
    max_file_size: u64,
}

impl FontFileFetcher {
    pub fn new(policy: DirectoryPolicy, max_file_size: u64) -> Self {
        let allowed_roots = match policy {
            DirectoryPolicy::Anywhere => None,
            DirectoryPolicy::Only(dirs) => {
                Some(dirs.iter().map(|d| canonical_or_original(d)).collect())
            }
        };
        Self {
            allowed_roots,
            max_file_size,
        }
    }

    /// Fetcher limited to the platform font directories.
    pub fn platform() -> Self {
        Self::new(DirectoryPolicy::platform(), DEFAULT_MAX_FONT_FILE_SIZE)
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    fn is_allowed(&self, canonical: &Path) -> bool {
        match &self.allowed_roots {
            None => true,
            Some(roots) => roots.iter().any(|root| canonical.starts_with(root)),
        }
    }

    /// Read and validate the font at `path`.
    pub async fn read(&self, path: &Path) -> Result<PreviewSrc, FetchError> {
        match tokio::fs::try_exists(path).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(FetchError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => return Err(FetchError::io(path, &e)),
        }

        let mime = FontMime::from_path(path).ok_or_else(|| FetchError::UnsupportedType {
            extension: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_lowercase(),
        })?;

        let canonical = tokio::fs::canonicalize(path)
            .await
            .map_err(|e| FetchError::io(path, &e))?;

        if !self.is_allowed(&canonical) {
            warn!(path = %canonical.display(), "Refusing to read font outside allowed directories");
            return Err(FetchError::OutsideAllowedDirectory { path: canonical });
        }

        let size = tokio::fs::metadata(&canonical)
            .await
            .map_err(|e| FetchError::io(&canonical, &e))?
            .len();
        if size > self.max_file_size {
            return Err(FetchError::TooLarge {
                size,
                limit: self.max_file_size,
            });
        }

        let bytes = tokio::fs::read(&canonical)
            .await
            .map_err(|e| FetchError::io(&canonical, &e))?;

        debug!(path = %canonical.display(), bytes = bytes.len(), mime = %mime, "Read font file");
        Ok(PreviewSrc::new(mime, bytes))
    }
}

impl ResourceFetcher for FontFileFetcher {
    fn fetch(&self, identity: &str) -> impl Future<Output = Result<PreviewSrc, FetchError>> + Send {
        let path = PathBuf::from(identity);
        async move { self.read(&path).await }
    }
}
