use crate::core::collapse::merge_intervals;
use crate::core::network::{
    AddressBits, AddressRange, Cidr, Interval, Ipv4Cidr, Ipv6Cidr, NetworkError, common_family,
    split_by_family,
};

/// Partition of a primary list. Both sides keep the primary's relative order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome<T> {
    pub kept: Vec<T>,
    pub removed: Vec<T>,
}

impl<T> Default for FilterOutcome<T> {
    fn default() -> Self {
        Self {
            kept: Vec::new(),
            removed: Vec::new(),
        }
    }
}

/// Remove every primary entry that shares at least one address with an
/// exclusion entry.
///
/// A partially overlapping entry is removed whole; it is never split into a
/// kept remainder. Exclusions need not be collapsed.
pub fn filter<B: AddressBits>(
    primary: &[Cidr<B>],
    exclusions: &[Cidr<B>],
) -> FilterOutcome<Cidr<B>> {
    let excluded = merge_intervals(
        &exclusions
            .iter()
            .copied()
            .map(Cidr::interval)
            .collect::<Vec<_>>(),
    );

    let mut outcome = FilterOutcome::default();
    for cidr in primary.iter().copied() {
        if intersects_any(cidr.interval(), &excluded) {
            outcome.removed.push(cidr);
        } else {
            outcome.kept.push(cidr);
        }
    }

    outcome
}

pub fn filter_ipv4(primary: &[Ipv4Cidr], exclusions: &[Ipv4Cidr]) -> FilterOutcome<Ipv4Cidr> {
    filter(primary, exclusions)
}

pub fn filter_ipv6(primary: &[Ipv6Cidr], exclusions: &[Ipv6Cidr]) -> FilterOutcome<Ipv6Cidr> {
    filter(primary, exclusions)
}

/// Filter a single-family primary list against exclusions of the same family.
pub fn filter_ranges(
    primary: &[AddressRange],
    exclusions: &[AddressRange],
) -> Result<FilterOutcome<AddressRange>, NetworkError> {
    common_family(primary.iter().chain(exclusions))?;

    let primary = split_by_family(primary);
    let exclusions = split_by_family(exclusions);
    let v4 = filter_ipv4(&primary.ipv4, &exclusions.ipv4);
    let v6 = filter_ipv6(&primary.ipv6, &exclusions.ipv6);

    Ok(FilterOutcome {
        kept: v4
            .kept
            .into_iter()
            .map(AddressRange::V4)
            .chain(v6.kept.into_iter().map(AddressRange::V6))
            .collect(),
        removed: v4
            .removed
            .into_iter()
            .map(AddressRange::V4)
            .chain(v6.removed.into_iter().map(AddressRange::V6))
            .collect(),
    })
}

/// `sorted` must be disjoint and ascending, as produced by `merge_intervals`.
fn intersects_any<B: AddressBits>(target: Interval<B>, sorted: &[Interval<B>]) -> bool {
    let idx = sorted.partition_point(|entry| entry.end < target.start);
    sorted.get(idx).is_some_and(|entry| entry.intersects(target))
}
