//! # Fetch Scheduler
//!
//! Drains a priority-ordered batch of offsets under a concurrency cap. A
//! single owner task admits requests and classifies every completion
//! serially, so counters and the two stores are never touched from two
//! response handlers at once; the outstanding network requests are the only
//! suspension points. Responses may complete in any order.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tracing::{debug, warn};

use crate::FetchError;
use crate::cache::{ContentCache, ValidatorRecord, ValidatorStore};
use crate::events::{EventCallback, FetchEvent};
use crate::offsets::HourOffset;
use crate::transport::{FetchOutcome, ResourceFetch};

/// Progress counters for one batch, reset when the batch starts and advanced
/// monotonically to completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub completed: usize,
    pub accepted: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }
}

/// Bounded-concurrency batch scheduler with write-through to the content
/// cache and validator store.
pub struct FetchScheduler {
    transport: Arc<dyn ResourceFetch>,
    content_cache: Arc<ContentCache>,
    validators: Arc<ValidatorStore>,
    max_concurrent: AtomicUsize,
    active: AtomicBool,
}

impl FetchScheduler {
    pub fn new(
        transport: Arc<dyn ResourceFetch>,
        content_cache: Arc<ContentCache>,
        validators: Arc<ValidatorStore>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            transport,
            content_cache,
            validators,
            max_concurrent: AtomicUsize::new(max_concurrent.max(1)),
            active: AtomicBool::new(false),
        }
    }

    /// Adjust the concurrency cap, clamped to a minimum of 1. Takes effect
    /// for subsequent batches; the cap of a running batch is fixed.
    pub fn set_max_concurrent(&self, value: usize) {
        self.max_concurrent.store(value.max(1), Ordering::Relaxed);
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent.load(Ordering::Relaxed)
    }

    /// Whether a batch is currently running or draining.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Run one batch over `offsets` (already in priority order). Only one
    /// batch may be active at a time; a concurrent call is refused.
    ///
    /// `headers_by_offset` supplies the conditional-request validators per
    /// offset. With `force_network` no conditional headers are sent and
    /// intermediate caches are bypassed.
    pub async fn run_batch(
        &self,
        offsets: Vec<HourOffset>,
        headers_by_offset: HashMap<HourOffset, ValidatorRecord>,
        force_network: bool,
        on_event: &EventCallback,
    ) -> Result<BatchSummary, FetchError> {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(FetchError::BatchInProgress);
        }

        let summary = self
            .drive_batch(offsets, headers_by_offset, force_network, on_event)
            .await;
        self.active.store(false, Ordering::Release);
        Ok(summary)
    }

    async fn drive_batch(
        &self,
        offsets: Vec<HourOffset>,
        headers_by_offset: HashMap<HourOffset, ValidatorRecord>,
        force_network: bool,
        on_event: &EventCallback,
    ) -> BatchSummary {
        let total = offsets.len();
        let mut summary = BatchSummary::new(total);
        if total == 0 {
            on_event(FetchEvent::BatchFinished);
            return summary;
        }

        let cap = self.max_concurrent();
        debug!(total, cap, force_network, "Starting fetch batch");

        let mut queue: VecDeque<HourOffset> = offsets.into();
        let mut in_flight = FuturesUnordered::new();

        loop {
            // Admit queued offsets up to the cap.
            while in_flight.len() < cap {
                let Some(offset) = queue.pop_front() else {
                    break;
                };
                let conditions = if force_network {
                    ValidatorRecord::default()
                } else {
                    headers_by_offset.get(&offset).cloned().unwrap_or_default()
                };
                let transport = Arc::clone(&self.transport);
                in_flight.push(async move {
                    let outcome = transport.fetch(offset, &conditions, force_network).await;
                    (offset, outcome)
                });
            }

            let Some((offset, outcome)) = in_flight.next().await else {
                break;
            };

            self.classify(offset, outcome, &mut summary, on_event).await;
            summary.completed += 1;
            on_event(FetchEvent::Progress {
                completed: summary.completed,
                total,
            });
            if summary.completed == total {
                debug!(?summary, "Fetch batch finished");
                on_event(FetchEvent::BatchFinished);
                break;
            }
        }

        summary
    }

    /// Classify one terminal outcome. Runs on the owner task only.
    async fn classify(
        &self,
        offset: HourOffset,
        outcome: FetchOutcome,
        summary: &mut BatchSummary,
        on_event: &EventCallback,
    ) {
        match outcome {
            FetchOutcome::NotModified => {
                summary.unchanged += 1;
                on_event(FetchEvent::NotModified { offset });
            }
            FetchOutcome::Content {
                body,
                etag,
                last_modified,
            } => match image::load_from_memory(&body) {
                Ok(decoded) => {
                    let image = Arc::new(decoded);
                    // Disk trouble must not break response handling.
                    if let Err(e) = self.content_cache.save(offset, &image).await {
                        warn!(offset, error = %e, "Failed to cache frame, continuing");
                    }
                    self.validators
                        .update(offset, etag.clone(), last_modified.clone());
                    summary.accepted += 1;
                    on_event(FetchEvent::Loaded {
                        offset,
                        image,
                        validators: ValidatorRecord {
                            etag,
                            last_modified,
                        },
                    });
                }
                Err(e) => {
                    summary.failed += 1;
                    on_event(FetchEvent::Failed {
                        offset,
                        reason: format!("invalid image data: {e}"),
                    });
                }
            },
            FetchOutcome::Failed { reason } => {
                warn!(offset, reason = %reason, "Frame fetch failed");
                summary.failed += 1;
                on_event(FetchEvent::Failed { offset, reason });
            }
        }
    }
}
