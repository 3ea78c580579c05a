//! # Content Cache
//!
//! Persists the most recently accepted raw frame per offset as one PNG file,
//! and rehydrates frames into memory without network access. The key domain
//! is finite and small, so this is a permanent replacement cache with no
//! eviction.

use std::io::Cursor;
use std::path::PathBuf;

use image::{DynamicImage, ImageFormat};
use tokio::fs;
use tokio::io;
use tracing::{debug, warn};

use crate::offsets::HourOffset;

/// One-PNG-per-offset file cache under a single directory.
#[derive(Debug, Clone)]
pub struct ContentCache {
    cache_dir: PathBuf,
}

impl ContentCache {
    /// Open the cache, creating the directory if needed. Creation is
    /// idempotent.
    pub async fn open(cache_dir: impl Into<PathBuf>) -> io::Result<Self> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir).await?;
        Ok(Self { cache_dir })
    }

    /// Deterministic file path for an offset.
    pub fn path_for(&self, offset: HourOffset) -> PathBuf {
        self.cache_dir.join(format!("ECMWF_{offset:03}.png"))
    }

    /// Read and decode the cached frame for `offset`. A missing file or a
    /// failed decode is a cache miss, never an error.
    pub async fn load(&self, offset: HourOffset) -> Option<DynamicImage> {
        let path = self.path_for(offset);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = ?path, error = %e, "Failed to read cached frame");
                return None;
            }
        };

        match image::load_from_memory(&bytes) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(path = ?path, error = %e, "Cached frame failed to decode, treating as miss");
                None
            }
        }
    }

    /// Encode `frame` losslessly as PNG and overwrite the per-offset file.
    pub async fn save(&self, offset: HourOffset, frame: &DynamicImage) -> io::Result<()> {
        let mut encoded = Vec::new();
        frame
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
            .map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Failed to encode frame as PNG: {e}"),
                )
            })?;

        let path = self.path_for(offset);
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &encoded).await?;
        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        debug!(offset, bytes = encoded.len(), "Cached frame to file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    fn test_frame() -> DynamicImage {
        let mut img = RgbaImage::new(4, 3);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(3, 2, Rgba([0, 128, 255, 255]));
        DynamicImage::ImageRgba8(img)
    }

    #[tokio::test]
    async fn test_save_then_load_is_pixel_equal() {
        let dir = tempdir().unwrap();
        let cache = ContentCache::open(dir.path()).await.unwrap();

        let frame = test_frame();
        cache.save(90, &frame).await.unwrap();

        let loaded = cache.load(90).await.unwrap();
        assert_eq!(loaded.to_rgba8(), frame.to_rgba8());
    }

    #[tokio::test]
    async fn test_missing_file_is_a_miss() {
        let dir = tempdir().unwrap();
        let cache = ContentCache::open(dir.path()).await.unwrap();
        assert!(cache.load(6).await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_miss() {
        let dir = tempdir().unwrap();
        let cache = ContentCache::open(dir.path()).await.unwrap();
        fs::write(cache.path_for(12), b"definitely not a png")
            .await
            .unwrap();
        assert!(cache.load(12).await.is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_content() {
        let dir = tempdir().unwrap();
        let cache = ContentCache::open(dir.path()).await.unwrap();

        cache.save(18, &test_frame()).await.unwrap();
        let replacement = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            2,
            2,
            Rgba([1, 2, 3, 255]),
        ));
        cache.save(18, &replacement).await.unwrap();

        let loaded = cache.load(18).await.unwrap();
        assert_eq!(loaded.to_rgba8(), replacement.to_rgba8());
    }

    #[tokio::test]
    async fn test_filenames_are_zero_padded() {
        let dir = tempdir().unwrap();
        let cache = ContentCache::open(dir.path()).await.unwrap();
        assert!(cache.path_for(6).ends_with("ECMWF_006.png"));
        assert!(cache.path_for(240).ends_with("ECMWF_240.png"));
    }
}
