use std::sync::LazyLock;

use crate::core::collapse::collapse_by_family;
use crate::core::network::{FamilyCidrs, Ipv4Cidr, Ipv6Cidr, parse_all};

// IANA IPv4/IPv6 special-purpose address registries plus multicast and the
// IPv4 "future use" block.
pub const RESERVED_IPV4_PREFIXES: [&str; 19] = [
    "0.0.0.0/8",
    "10.0.0.0/8",
    "100.64.0.0/10",
    "127.0.0.0/8",
    "169.254.0.0/16",
    "172.16.0.0/12",
    "192.0.0.0/24",
    "192.0.2.0/24",
    "192.31.196.0/24",
    "192.52.193.0/24",
    "192.88.99.0/24",
    "192.168.0.0/16",
    "192.175.48.0/24",
    "198.18.0.0/15",
    "198.51.100.0/24",
    "203.0.113.0/24",
    "224.0.0.0/4",
    "240.0.0.0/4",
    "255.255.255.255/32",
];

pub const RESERVED_IPV6_PREFIXES: [&str; 14] = [
    "::/128",
    "::1/128",
    "::ffff:0.0.0.0/96",
    "64:ff9b::/96",
    "64:ff9b:1::/48",
    "100::/64",
    "2001::/23",
    "2001:db8::/32",
    "2002::/16",
    "2620:4f:8000::/48",
    "3fff::/20",
    "fc00::/7",
    "fe80::/10",
    "ff00::/8",
];

static CATALOG: LazyLock<FamilyCidrs> = LazyLock::new(|| {
    let parsed = parse_all(
        RESERVED_IPV4_PREFIXES
            .iter()
            .chain(RESERVED_IPV6_PREFIXES.iter()),
    );
    debug_assert!(parsed.rejected.is_empty());
    collapse_by_family(&parsed.ranges)
});

/// Collapsed reserved ranges for both families, built once per process.
pub fn reserved_catalog() -> &'static FamilyCidrs {
    &CATALOG
}

pub fn reserved_ipv4() -> &'static [Ipv4Cidr] {
    &CATALOG.ipv4
}

pub fn reserved_ipv6() -> &'static [Ipv6Cidr] {
    &CATALOG.ipv6
}

#[cfg(test)]
mod tests {
    use super::{
        RESERVED_IPV4_PREFIXES, RESERVED_IPV6_PREFIXES, reserved_catalog, reserved_ipv4,
        reserved_ipv6,
    };
    use crate::core::collapse::{collapse_ipv4, collapse_ipv6};
    use crate::core::filter::filter_ranges;
    use crate::core::network::{AddressRange, parse_all_strict, parse_range};

    #[test]
    fn every_catalog_literal_parses_canonically() {
        for literal in RESERVED_IPV4_PREFIXES
            .iter()
            .chain(RESERVED_IPV6_PREFIXES.iter())
        {
            let parsed = parse_range(literal).expect("catalog literal must parse");
            assert_eq!(parsed.to_string(), *literal, "catalog literal is canonical");
        }
    }

    #[test]
    fn catalog_is_collapsed_and_split_by_family() {
        assert_eq!(collapse_ipv4(reserved_ipv4()), reserved_ipv4());
        assert_eq!(collapse_ipv6(reserved_ipv6()), reserved_ipv6());
        assert!(!reserved_catalog().is_empty());
        assert!(reserved_ipv4().len() <= RESERVED_IPV4_PREFIXES.len());
        assert!(reserved_ipv6().len() <= RESERVED_IPV6_PREFIXES.len());
    }

    #[test]
    fn catalog_filters_private_and_documentation_space() {
        let primary = parse_all_strict(["10.1.0.0/16", "8.8.8.0/24", "203.0.113.5"])
            .expect("parse");
        let exclusions = reserved_catalog()
            .to_ranges()
            .into_iter()
            .filter(|range| matches!(range, AddressRange::V4(_)))
            .collect::<Vec<_>>();

        let outcome = filter_ranges(&primary, &exclusions).expect("filter");
        assert_eq!(
            outcome
                .kept
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            vec!["8.8.8.0/24"]
        );
        assert_eq!(outcome.removed.len(), 2);
    }
}
