use std::io;
use std::path::Path;

use thiserror::Error;

/// Edge length requested from the system cache, in pixels.
pub static THUMBNAIL_SIZE: u32 = 256;

#[derive(Debug, Error)]
pub enum WarmError {
    #[error("could not resolve path: {0}")]
    Resolve(#[from] io::Error),
    #[error("{0}")]
    Platform(String),
}

#[derive(Debug, Error)]
#[error("no thumbnail cache is available on {0}")]
pub struct Unavailable(pub &'static str);

/// Anything that can be asked to produce and store a thumbnail for a file.
///
/// The returned image is never needed; a successful call means the entry now
/// lives in the cache.
pub trait ThumbnailCache: Send + Sync {
    fn warm(&self, path: &Path, size: u32) -> Result<(), WarmError>;
}

#[cfg(windows)]
pub fn platform_cache() -> Result<Box<dyn ThumbnailCache>, Unavailable> {
    Ok(Box::new(crate::shell::ShellThumbnailCache))
}

#[cfg(not(windows))]
pub fn platform_cache() -> Result<Box<dyn ThumbnailCache>, Unavailable> {
    Err(Unavailable(std::env::consts::OS))
}
