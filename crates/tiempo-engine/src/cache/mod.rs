//! # Persistence Cache
//!
//! Two-tier on-disk cache: raw frame images (one PNG per offset) and the
//! validator metadata document used for conditional HTTP revalidation.

pub mod content;
pub mod validators;

pub use content::ContentCache;
pub use validators::{ValidatorRecord, ValidatorStore};
