use std::sync::Arc;

use image::DynamicImage;

use crate::cache::ValidatorRecord;
use crate::offsets::HourOffset;

/// Notifications emitted by the fetch scheduler at well-defined points.
/// Delivery is serialized: the owner task invokes the callback for one event
/// at a time, never concurrently.
#[derive(Debug, Clone)]
pub enum FetchEvent {
    /// New content was accepted for an offset, with any validators the
    /// response carried.
    Loaded {
        offset: HourOffset,
        image: Arc<DynamicImage>,
        validators: ValidatorRecord,
    },
    /// The server confirmed the cached content is still valid.
    NotModified { offset: HourOffset },
    /// Transport failure or undecodable content; terminal for this offset
    /// within the batch.
    Failed { offset: HourOffset, reason: String },
    /// One more offset resolved.
    Progress { completed: usize, total: usize },
    /// Every offset in the batch has resolved.
    BatchFinished,
}

/// Subscriber callback for batch notifications.
pub type EventCallback = Arc<dyn Fn(FetchEvent) + Send + Sync>;
