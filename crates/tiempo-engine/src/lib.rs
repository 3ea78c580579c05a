//! # Tiempo Engine
//!
//! Fetch engine for a forecast-chart timelapse: revalidates a fixed set of
//! forecast-hour frames against a remote image server under a concurrency
//! cap, using conditional HTTP requests backed by a two-tier on-disk cache
//! (raw PNG per frame plus validator metadata).
//!
//! ## Features
//!
//! - Priority-ordered batches biased toward the currently viewed frame
//! - Conditional revalidation (`If-None-Match` / `If-Modified-Since`)
//! - Persistent frame cache rehydrated into memory at startup
//! - Serialized event notifications for display/status collaborators

pub mod builder;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod frames;
pub mod offsets;
pub mod planner;
pub mod scheduler;
pub mod transport;

pub use builder::FetcherConfigBuilder;
pub use cache::{ContentCache, ValidatorRecord, ValidatorStore};
pub use config::{
    DEFAULT_MAX_CONCURRENT, DEFAULT_NEIGHBOR_RADIUS, DEFAULT_URL_TEMPLATE, FetcherConfig,
};
pub use engine::TimelapseEngine;
pub use error::FetchError;
pub use events::{EventCallback, FetchEvent};
pub use frames::FrameTable;
pub use offsets::{HourOffset, MAX_OFFSET, OFFSET_STEP, OffsetDomain, last_cycle_utc};
pub use planner::plan;
pub use scheduler::{BatchSummary, FetchScheduler};
pub use transport::{FetchOutcome, HttpResourceFetch, ResourceFetch, create_client};
