//! # Frame Table
//!
//! Maps every offset in the fixed domain to "no image yet" or the most
//! recently accepted decoded frame. Seeded from the content cache at startup;
//! the engine is the sole writer afterwards.

use std::sync::Arc;

use image::DynamicImage;
use parking_lot::RwLock;

use crate::cache::ContentCache;
use crate::offsets::{HourOffset, OffsetDomain};

pub struct FrameTable {
    domain: OffsetDomain,
    frames: RwLock<Vec<Option<Arc<DynamicImage>>>>,
}

impl FrameTable {
    /// Empty table covering the whole domain.
    pub fn new(domain: OffsetDomain) -> Self {
        let frames = RwLock::new(vec![None; domain.len()]);
        Self { domain, frames }
    }

    /// Seed the table by rehydrating every offset from the content cache.
    pub async fn hydrate(domain: OffsetDomain, cache: &ContentCache) -> Self {
        let table = Self::new(domain);
        for offset in table.domain.iter() {
            if let Some(frame) = cache.load(offset).await {
                table.insert(offset, Arc::new(frame));
            }
        }
        table
    }

    pub fn domain(&self) -> &OffsetDomain {
        &self.domain
    }

    /// Store the frame for `offset`. Unknown offsets are ignored.
    pub fn insert(&self, offset: HourOffset, frame: Arc<DynamicImage>) {
        if let Some(index) = self.domain.index_of(offset) {
            self.frames.write()[index] = Some(frame);
        }
    }

    pub fn get(&self, offset: HourOffset) -> Option<Arc<DynamicImage>> {
        let index = self.domain.index_of(offset)?;
        self.frames.read()[index].clone()
    }

    /// Number of offsets that currently have a decoded frame.
    pub fn loaded_count(&self) -> usize {
        self.frames
            .read()
            .iter()
            .filter(|frame| frame.is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    fn frame(size: u32) -> Arc<DynamicImage> {
        Arc::new(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            size,
            size,
            Rgba([9, 9, 9, 255]),
        )))
    }

    #[test]
    fn test_insert_and_get() {
        let table = FrameTable::new(OffsetDomain::new());
        assert!(table.get(90).is_none());
        assert_eq!(table.loaded_count(), 0);

        table.insert(90, frame(2));
        assert!(table.get(90).is_some());
        assert_eq!(table.loaded_count(), 1);

        // Offsets outside the domain are ignored.
        table.insert(7, frame(2));
        assert_eq!(table.loaded_count(), 1);
    }

    #[tokio::test]
    async fn test_hydrate_from_content_cache() {
        let dir = tempdir().unwrap();
        let cache = ContentCache::open(dir.path()).await.unwrap();
        cache.save(6, &frame(3)).await.unwrap();
        cache.save(240, &frame(4)).await.unwrap();

        let table = FrameTable::hydrate(OffsetDomain::new(), &cache).await;
        assert_eq!(table.loaded_count(), 2);
        assert!(table.get(6).is_some());
        assert!(table.get(240).is_some());
        assert!(table.get(12).is_none());
    }
}
