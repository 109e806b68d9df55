use crate::core::network::{
    AddressBits, AddressRange, Cidr, FamilyCidrs, Interval, Ipv4Cidr, Ipv6Cidr, NetworkError,
    common_family, split_by_family,
};

/// Minimal set of CIDR blocks covering exactly the union of `cidrs`.
///
/// Output is sorted by address, contains no block nested in another and no
/// pair of siblings that could be merged into their parent.
pub fn collapse<B: AddressBits>(cidrs: &[Cidr<B>]) -> Vec<Cidr<B>> {
    let intervals: Vec<Interval<B>> = cidrs.iter().copied().map(Cidr::interval).collect();
    merge_intervals(&intervals)
        .into_iter()
        .flat_map(interval_to_cidrs)
        .collect()
}

pub fn collapse_ipv4(cidrs: &[Ipv4Cidr]) -> Vec<Ipv4Cidr> {
    collapse(cidrs)
}

pub fn collapse_ipv6(cidrs: &[Ipv6Cidr]) -> Vec<Ipv6Cidr> {
    collapse(cidrs)
}

pub fn collapse_by_family(ranges: &[AddressRange]) -> FamilyCidrs {
    let separated = split_by_family(ranges);
    FamilyCidrs {
        ipv4: collapse_ipv4(&separated.ipv4),
        ipv6: collapse_ipv6(&separated.ipv6),
    }
}

/// Collapse a single-family slice of ranges.
pub fn collapse_ranges(ranges: &[AddressRange]) -> Result<Vec<AddressRange>, NetworkError> {
    common_family(ranges)?;
    Ok(collapse_by_family(ranges).to_ranges())
}

/// Merge overlapping or touching intervals into disjoint, sorted intervals.
pub fn merge_intervals<B: AddressBits>(intervals: &[Interval<B>]) -> Vec<Interval<B>> {
    let mut sorted = intervals.to_vec();
    // Widest interval first on equal starts, so nested ones fold immediately.
    sorted.sort_unstable_by(|a, b| a.start.cmp(&b.start).then_with(|| b.end.cmp(&a.end)));

    let mut iter = sorted.into_iter();
    let Some(mut current) = iter.next() else {
        return Vec::new();
    };

    let mut merged = Vec::new();
    for interval in iter {
        let touches = match current.end.successor() {
            Some(next) => interval.start <= next,
            None => true,
        };

        if touches {
            current.end = current.end.max(interval.end);
        } else {
            merged.push(current);
            current = interval;
        }
    }

    merged.push(current);
    merged
}

/// Re-express one interval as the fewest aligned CIDR blocks.
pub fn interval_to_cidrs<B: AddressBits>(interval: Interval<B>) -> Vec<Cidr<B>> {
    let mut out = Vec::new();
    let mut start = interval.start;

    loop {
        let block = largest_block(start, interval.end);
        out.push(block);

        let block_end = block.interval().end;
        match block_end.successor() {
            Some(next) if block_end < interval.end => start = next,
            _ => break,
        }
    }

    out
}

fn largest_block<B: AddressBits>(start: B, end: B) -> Cidr<B> {
    let mut prefix = B::WIDTH - start.alignment();
    while (start | B::host_mask(prefix)) > end {
        prefix += 1;
    }

    Cidr::from_parts(start, prefix)
}

#[cfg(test)]
mod tests {
    use super::{
        collapse, collapse_by_family, collapse_ipv4, collapse_ipv6, collapse_ranges,
        interval_to_cidrs, merge_intervals,
    };
    use crate::core::AddressFamily;
    use crate::core::network::{
        AddressRange, Interval, Ipv4Cidr, Ipv6Cidr, NetworkError, parse_all_strict,
    };

    fn ranges(inputs: &[&str]) -> Vec<AddressRange> {
        parse_all_strict(inputs).expect("valid test input")
    }

    fn render(ranges: &[AddressRange]) -> Vec<String> {
        ranges.iter().map(ToString::to_string).collect()
    }

    fn collapse_text(inputs: &[&str]) -> Vec<String> {
        render(&collapse_ranges(&ranges(inputs)).expect("single family"))
    }

    fn covered_v4(cidrs: &[Ipv4Cidr]) -> Vec<u32> {
        let mut addresses: Vec<u32> = cidrs
            .iter()
            .flat_map(|cidr| {
                let interval = cidr.interval();
                interval.start..=interval.end
            })
            .collect();
        addresses.sort_unstable();
        addresses.dedup();
        addresses
    }

    #[test]
    fn adjacent_siblings_merge_into_parent() {
        assert_eq!(
            collapse_text(&["10.0.0.0/24", "10.0.1.0/24"]),
            vec!["10.0.0.0/23"]
        );
    }

    #[test]
    fn nested_range_is_absorbed() {
        assert_eq!(
            collapse_text(&["10.0.0.0/24", "10.0.0.128/25"]),
            vec!["10.0.0.0/24"]
        );
    }

    #[test]
    fn ipv6_halves_merge_into_parent() {
        assert_eq!(
            collapse_text(&["2001:db8::/33", "2001:db8:8000::/33"]),
            vec!["2001:db8::/32"]
        );
    }

    #[test]
    fn adjacent_but_unaligned_blocks_stay_split() {
        assert_eq!(
            collapse_text(&["10.0.1.0/24", "10.0.2.0/24"]),
            vec!["10.0.1.0/24", "10.0.2.0/24"]
        );
        assert_eq!(
            collapse_text(&["10.0.1.0/24", "10.0.2.0/23", "10.0.4.0/24"]),
            vec!["10.0.1.0/24", "10.0.2.0/23", "10.0.4.0/24"]
        );
    }

    #[test]
    fn duplicates_and_empty_input() {
        assert_eq!(
            collapse_text(&["192.0.2.1", "192.0.2.1", "192.0.2.1/32"]),
            vec!["192.0.2.1/32"]
        );
        assert!(collapse_ipv4(&[]).is_empty());
        assert!(collapse_ipv6(&[]).is_empty());
        assert_eq!(collapse_ranges(&[]), Ok(Vec::new()));
    }

    #[test]
    fn full_address_space_does_not_overflow() {
        assert_eq!(
            collapse_text(&["0.0.0.0/1", "128.0.0.0/1", "255.255.255.255"]),
            vec!["0.0.0.0/0"]
        );
        assert_eq!(collapse_text(&["::/1", "8000::/1"]), vec!["::/0"]);
        assert_eq!(
            collapse_text(&["255.255.255.254", "255.255.255.255"]),
            vec!["255.255.255.254/31"]
        );
        assert_eq!(
            collapse_text(&["ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff", "::/0"]),
            vec!["::/0"]
        );
    }

    #[test]
    fn mixed_families_are_rejected() {
        let err = collapse_ranges(&ranges(&["10.0.0.0/8", "::/0"])).expect_err("must fail");
        assert_eq!(
            err,
            NetworkError::FamilyMismatch {
                expected: AddressFamily::Ipv4,
                found: AddressFamily::Ipv6,
            }
        );
    }

    #[test]
    fn collapse_by_family_keeps_families_apart() {
        let collapsed = collapse_by_family(&ranges(&[
            "2001:db8::/33",
            "10.0.1.0/24",
            "2001:db8:8000::/33",
            "10.0.0.0/24",
        ]));
        assert_eq!(collapsed.ipv4, vec![Ipv4Cidr::from_parts(0x0a000000, 23)]);
        assert_eq!(
            collapsed.ipv6,
            vec![Ipv6Cidr::from_parts(0x20010db8000000000000000000000000, 32)]
        );
    }

    #[test]
    fn collapse_is_idempotent_and_order_independent() {
        let input = ranges(&[
            "10.0.0.0/25",
            "10.0.3.0/24",
            "10.0.0.128/25",
            "10.0.1.7",
            "10.0.1.0/24",
            "172.16.5.0/24",
            "172.16.4.0/23",
            "10.0.2.0/24",
            "10.0.0.64/26",
        ]);
        let once = collapse_ranges(&input).expect("collapse");
        assert_eq!(render(&once), vec!["10.0.0.0/22", "172.16.4.0/23"]);
        assert_eq!(collapse_ranges(&once).expect("collapse"), once);

        let mut reversed = input.clone();
        reversed.reverse();
        assert_eq!(collapse_ranges(&reversed).expect("collapse"), once);

        let mut rotated = input.clone();
        rotated.rotate_left(4);
        assert_eq!(collapse_ranges(&rotated).expect("collapse"), once);
    }

    #[test]
    fn collapse_preserves_union_without_redundancy() {
        let input = vec![
            Ipv4Cidr::from_parts(0x0a000003, 32),
            Ipv4Cidr::from_parts(0x0a000004, 30),
            Ipv4Cidr::from_parts(0x0a000010, 29),
            Ipv4Cidr::from_parts(0x0a000012, 31),
            Ipv4Cidr::from_parts(0x0a000018, 32),
            Ipv4Cidr::from_parts(0x0a000019, 32),
            Ipv4Cidr::from_parts(0x0a00001a, 31),
            Ipv4Cidr::from_parts(0x0a000040, 27),
        ];
        let collapsed = collapse(&input);

        assert_eq!(covered_v4(&collapsed), covered_v4(&input));

        for (idx, outer) in collapsed.iter().enumerate() {
            for (other_idx, inner) in collapsed.iter().enumerate() {
                if idx != other_idx {
                    assert!(
                        !outer.interval().contains(inner.interval()),
                        "{outer} contains {inner}"
                    );
                    assert!(!outer.interval().intersects(inner.interval()));
                }
            }
        }

        assert_eq!(
            collapsed
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
            vec![
                "10.0.0.3/32",
                "10.0.0.4/30",
                "10.0.0.16/29",
                "10.0.0.24/30",
                "10.0.0.64/27",
            ]
        );
    }

    #[test]
    fn merge_intervals_handles_adjacency_and_nesting() {
        let merged = merge_intervals(&[
            Interval { start: 21_u32, end: 30 },
            Interval { start: 10, end: 20 },
            Interval { start: 10, end: 12 },
            Interval { start: 40, end: 41 },
        ]);
        assert_eq!(
            merged,
            vec![
                Interval { start: 10, end: 30 },
                Interval { start: 40, end: 41 },
            ]
        );

        let merged = merge_intervals(&[
            Interval {
                start: 0_u128,
                end: u128::MAX,
            },
            Interval { start: 5, end: 6 },
        ]);
        assert_eq!(
            merged,
            vec![Interval {
                start: 0,
                end: u128::MAX,
            }]
        );
    }

    #[test]
    fn minimal_cidr_regeneration_from_intervals() {
        assert_eq!(
            interval_to_cidrs(Interval {
                start: 0x0a000002_u32,
                end: 0x0a000005,
            }),
            vec![
                Ipv4Cidr::from_parts(0x0a000002, 31),
                Ipv4Cidr::from_parts(0x0a000004, 31),
            ]
        );

        assert_eq!(
            interval_to_cidrs(Interval {
                start: 0x20010db8000000000000000000000002_u128,
                end: 0x20010db8000000000000000000000003,
            }),
            vec![Ipv6Cidr::from_parts(
                0x20010db8000000000000000000000002,
                127
            )]
        );

        assert_eq!(
            interval_to_cidrs(Interval {
                start: 1_u32,
                end: u32::MAX,
            })
            .len(),
            32
        );
    }
}
