//! # Forecast Offset Domain
//!
//! The model publishes one chart per forecast-hour offset, every 6 hours out
//! to +240h. The set is fixed: offsets are never created or destroyed at
//! runtime, only their associated content changes.

use chrono::{DateTime, Duration, NaiveTime, Timelike, Utc};

/// A forecast-hour offset identifying one timelapse frame.
pub type HourOffset = u16;

/// Spacing between consecutive forecast offsets, in hours.
pub const OFFSET_STEP: HourOffset = 6;

/// Largest published forecast offset, in hours.
pub const MAX_OFFSET: HourOffset = 240;

/// The fixed, ordered set of forecast-hour offsets published per model run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetDomain {
    offsets: Vec<HourOffset>,
}

impl Default for OffsetDomain {
    fn default() -> Self {
        Self::new()
    }
}

impl OffsetDomain {
    /// Create the standard domain: every multiple of 6 in `6..=240`.
    pub fn new() -> Self {
        Self {
            offsets: (1..=(MAX_OFFSET / OFFSET_STEP))
                .map(|step| step * OFFSET_STEP)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Offset at a given position, if the position is in range.
    pub fn get(&self, index: usize) -> Option<HourOffset> {
        self.offsets.get(index).copied()
    }

    /// Position of an offset within the domain.
    pub fn index_of(&self, offset: HourOffset) -> Option<usize> {
        self.offsets.iter().position(|&candidate| candidate == offset)
    }

    pub fn iter(&self) -> impl Iterator<Item = HourOffset> + '_ {
        self.offsets.iter().copied()
    }

    pub fn as_slice(&self) -> &[HourOffset] {
        &self.offsets
    }
}

/// Start time of the most recent model cycle (00Z or 12Z) relative to `now`.
pub fn last_cycle_utc(now: DateTime<Utc>) -> DateTime<Utc> {
    let cycle_hour = if now.hour() >= 12 { 12 } else { 0 };
    now.date_naive().and_time(NaiveTime::MIN).and_utc() + Duration::hours(cycle_hour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_domain_shape() {
        let domain = OffsetDomain::new();
        assert_eq!(domain.len(), 40);
        assert_eq!(domain.get(0), Some(6));
        assert_eq!(domain.get(39), Some(240));
        assert!(domain.iter().all(|offset| offset % OFFSET_STEP == 0));
    }

    #[test]
    fn test_index_of() {
        let domain = OffsetDomain::new();
        assert_eq!(domain.index_of(6), Some(0));
        assert_eq!(domain.index_of(90), Some(14));
        assert_eq!(domain.index_of(240), Some(39));
        assert_eq!(domain.index_of(7), None);
        assert_eq!(domain.index_of(0), None);
    }

    #[test]
    fn test_last_cycle_utc() {
        let morning = Utc.with_ymd_and_hms(2026, 3, 14, 11, 59, 0).unwrap();
        assert_eq!(
            last_cycle_utc(morning),
            Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap()
        );

        let afternoon = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
        assert_eq!(
            last_cycle_utc(afternoon),
            Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
        );
    }
}
