use crate::core::collapse::{collapse_by_family, collapse_ipv4, collapse_ipv6};
use crate::core::config::FilterOptions;
use crate::core::filter::{filter_ipv4, filter_ipv6};
use crate::core::network::{AddressRange, FamilyCidrs, Ipv4Cidr, Ipv6Cidr, split_by_family};
use crate::core::reserved::reserved_catalog;

/// Collapsed exclusion ranges, one list per family.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExclusionSet {
    ipv4: Vec<Ipv4Cidr>,
    ipv6: Vec<Ipv6Cidr>,
}

impl ExclusionSet {
    pub fn build(include_reserved: bool, extra: &[AddressRange]) -> Self {
        if include_reserved {
            Self::from_catalog(reserved_catalog(), extra)
        } else {
            Self::from_catalog(&FamilyCidrs::default(), extra)
        }
    }

    pub fn from_catalog(catalog: &FamilyCidrs, extra: &[AddressRange]) -> Self {
        let extra = split_by_family(extra);

        let mut ipv4 = catalog.ipv4.clone();
        ipv4.extend(extra.ipv4);
        let mut ipv6 = catalog.ipv6.clone();
        ipv6.extend(extra.ipv6);

        Self {
            ipv4: collapse_ipv4(&ipv4),
            ipv6: collapse_ipv6(&ipv6),
        }
    }

    pub fn ipv4(&self) -> &[Ipv4Cidr] {
        &self.ipv4
    }

    pub fn ipv6(&self) -> &[Ipv6Cidr] {
        &self.ipv6
    }

    pub fn is_empty(&self) -> bool {
        self.ipv4.is_empty() && self.ipv6.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ipv4.len() + self.ipv6.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Admission {
    pub admitted: Vec<AddressRange>,
    pub rejected: Vec<AddressRange>,
}

/// Split entries by the minimum prefix length policy, keeping input order.
pub fn admit(entries: &[AddressRange], options: FilterOptions) -> Admission {
    let (admitted, rejected): (Vec<_>, Vec<_>) = entries
        .iter()
        .copied()
        .partition(|range| options.admits(*range));

    Admission { admitted, rejected }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AggregateOutcome {
    /// Collapsed and filtered entries, IPv4 before IPv6.
    pub result: Vec<AddressRange>,
    /// List entries refused by the prefix length policy, in input order.
    pub rejected: Vec<AddressRange>,
    /// Collapsed entries removed by the exclusion set.
    pub filtered: Vec<AddressRange>,
}

impl AggregateOutcome {
    pub fn delta(&self) -> Vec<AddressRange> {
        self.rejected
            .iter()
            .chain(&self.filtered)
            .copied()
            .collect()
    }
}

/// Merge `initial` with the admitted part of `list`, collapse per family and
/// drop every collapsed entry touching `exclusions`.
///
/// `initial` entries are trusted and bypass the prefix length policy.
pub fn aggregate(
    initial: &[AddressRange],
    list: &[AddressRange],
    exclusions: &ExclusionSet,
    options: FilterOptions,
) -> AggregateOutcome {
    let admission = admit(list, options);

    let mut candidates = initial.to_vec();
    candidates.extend(admission.admitted);

    let collapsed = collapse_by_family(&candidates);
    let v4 = filter_ipv4(&collapsed.ipv4, &exclusions.ipv4);
    let v6 = filter_ipv6(&collapsed.ipv6, &exclusions.ipv6);

    let result = FamilyCidrs {
        ipv4: v4.kept,
        ipv6: v6.kept,
    };
    let filtered = FamilyCidrs {
        ipv4: v4.removed,
        ipv6: v6.removed,
    };

    AggregateOutcome {
        result: result.to_ranges(),
        rejected: admission.rejected,
        filtered: filtered.to_ranges(),
    }
}
