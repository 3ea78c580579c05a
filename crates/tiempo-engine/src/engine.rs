//! # Engine Facade
//!
//! Wires the planner, transport, stores, frame table and scheduler together:
//! one `refresh` call revalidates every frame in the domain, front-loading
//! the currently viewed offset, and persists validator metadata when the
//! batch finishes.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{info, warn};

use crate::cache::{ContentCache, ValidatorRecord, ValidatorStore};
use crate::config::FetcherConfig;
use crate::error::FetchError;
use crate::events::{EventCallback, FetchEvent};
use crate::frames::FrameTable;
use crate::offsets::{HourOffset, OffsetDomain};
use crate::planner;
use crate::scheduler::{BatchSummary, FetchScheduler};
use crate::transport::{HttpResourceFetch, ResourceFetch, create_client};

pub struct TimelapseEngine {
    config: FetcherConfig,
    scheduler: FetchScheduler,
    validators: Arc<ValidatorStore>,
    frames: Arc<FrameTable>,
    current_index: AtomicUsize,
}

impl TimelapseEngine {
    /// Create an engine with an HTTP transport built from `config`.
    pub async fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let client = create_client(&config)?;
        let transport = Arc::new(HttpResourceFetch::new(client, &config.url_template)?);
        Self::with_transport(config, transport).await
    }

    /// Create an engine over an arbitrary transport. Hydrates the frame
    /// table from the content cache before returning.
    pub async fn with_transport(
        config: FetcherConfig,
        transport: Arc<dyn ResourceFetch>,
    ) -> Result<Self, FetchError> {
        let domain = OffsetDomain::new();
        let content_cache = Arc::new(ContentCache::open(config.cache_dir.clone()).await?);
        let validators = Arc::new(ValidatorStore::load(config.cache_dir.join("metadata.json")).await);
        let frames = Arc::new(FrameTable::hydrate(domain, &content_cache).await);
        info!(
            cached = frames.loaded_count(),
            total = frames.domain().len(),
            "Frame table hydrated from disk"
        );

        let scheduler = FetchScheduler::new(
            transport,
            content_cache,
            Arc::clone(&validators),
            config.max_concurrent,
        );

        Ok(Self {
            config,
            scheduler,
            validators,
            frames,
            current_index: AtomicUsize::new(0),
        })
    }

    pub fn domain(&self) -> &OffsetDomain {
        self.frames.domain()
    }

    pub fn frames(&self) -> &FrameTable {
        &self.frames
    }

    /// The offset index the user is currently viewing; steers the planner.
    pub fn set_current_index(&self, index: usize) {
        let clamped = index.min(self.domain().len().saturating_sub(1));
        self.current_index.store(clamped, Ordering::Relaxed);
    }

    pub fn current_index(&self) -> usize {
        self.current_index.load(Ordering::Relaxed)
    }

    pub fn current_offset(&self) -> Option<HourOffset> {
        self.domain().get(self.current_index())
    }

    /// Adjust the concurrency cap for subsequent batches.
    pub fn set_max_concurrent(&self, value: usize) {
        self.scheduler.set_max_concurrent(value);
    }

    pub fn is_refreshing(&self) -> bool {
        self.scheduler.is_active()
    }

    /// Revalidate every frame in the domain. The frame table is updated from
    /// each accepted response before the event reaches `on_event`, and the
    /// validator store is saved once the batch finishes. Refused with
    /// [`FetchError::BatchInProgress`] while another refresh is running.
    pub async fn refresh(
        &self,
        force_network: bool,
        on_event: Option<EventCallback>,
    ) -> Result<BatchSummary, FetchError> {
        let domain = self.domain();
        let plan = planner::plan(domain, self.current_index(), self.config.neighbor_radius);

        let headers_by_offset: HashMap<HourOffset, ValidatorRecord> = if force_network {
            HashMap::new()
        } else {
            domain
                .iter()
                .map(|offset| (offset, self.validators.headers_for(offset)))
                .filter(|(_, record)| !record.is_empty())
                .collect()
        };

        let frames = Arc::clone(&self.frames);
        let callback: EventCallback = Arc::new(move |event: FetchEvent| {
            if let FetchEvent::Loaded { offset, image, .. } = &event {
                frames.insert(*offset, Arc::clone(image));
            }
            if let Some(subscriber) = &on_event {
                subscriber(event);
            }
        });

        let summary = self
            .scheduler
            .run_batch(plan, headers_by_offset, force_network, &callback)
            .await?;

        // Persisting validators is best-effort: a full disk must not fail
        // the refresh that already updated the in-memory state.
        if let Err(e) = self.validators.save().await {
            warn!(error = %e, "Failed to persist validator metadata");
        }

        info!(
            accepted = summary.accepted,
            unchanged = summary.unchanged,
            failed = summary.failed,
            "Refresh finished"
        );
        Ok(summary)
    }
}
