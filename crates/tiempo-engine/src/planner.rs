//! # Priority Planner
//!
//! Computes the fetch order for a batch: the currently viewed offset first,
//! then its temporal neighbors alternating forward/backward with wrap-around,
//! then everything else in domain order. The output is always a permutation
//! of the domain.

use crate::offsets::{HourOffset, OffsetDomain};

/// Plan the batch order for `domain`, front-loading `current_index` and its
/// `neighbor_radius` nearest neighbors in both directions.
pub fn plan(domain: &OffsetDomain, current_index: usize, neighbor_radius: usize) -> Vec<HourOffset> {
    let total = domain.len();
    if total == 0 {
        return Vec::new();
    }

    let current = current_index % total;
    let mut order = Vec::with_capacity(total);
    // Seen markers parallel to the domain, first placement wins.
    let mut seen = vec![false; total];

    place(domain, &mut seen, &mut order, current);
    for delta in 1..=neighbor_radius {
        let step = delta % total;
        place(domain, &mut seen, &mut order, (current + step) % total);
        place(domain, &mut seen, &mut order, (current + total - step) % total);
    }
    for index in 0..total {
        place(domain, &mut seen, &mut order, index);
    }

    order
}

fn place(domain: &OffsetDomain, seen: &mut [bool], order: &mut Vec<HourOffset>, index: usize) {
    if !seen[index] {
        seen[index] = true;
        order.push(domain.as_slice()[index]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_front_loads_current_and_neighbors() {
        let domain = OffsetDomain::new();
        let current = domain.index_of(90).unwrap();
        let order = plan(&domain, current, 2);
        assert_eq!(&order[..5], &[90, 96, 84, 102, 78]);
    }

    #[test]
    fn test_output_is_permutation() {
        let domain = OffsetDomain::new();
        for radius in [0, 2, 7, 40, 100] {
            let mut order = plan(&domain, 14, radius);
            assert_eq!(order.len(), domain.len());
            order.sort_unstable();
            assert_eq!(order, domain.as_slice());
        }
    }

    #[test]
    fn test_wraps_around_domain_edges() {
        let domain = OffsetDomain::new();
        let order = plan(&domain, 0, 2);
        assert_eq!(&order[..5], &[6, 12, 240, 18, 234]);
    }

    #[test]
    fn test_zero_radius_keeps_domain_order_after_current() {
        let domain = OffsetDomain::new();
        let order = plan(&domain, 3, 0);
        assert_eq!(order[0], 24);
        assert_eq!(&order[1..4], &[6, 12, 18]);
    }

    #[test]
    fn test_out_of_range_index_wraps() {
        let domain = OffsetDomain::new();
        let order = plan(&domain, domain.len() + 1, 0);
        assert_eq!(order[0], 12);
    }
}
