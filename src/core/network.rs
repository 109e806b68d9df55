use std::fmt;
use std::hash::Hash;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::ops::{BitAnd, BitOr, Not};
use std::str::FromStr;

use thiserror::Error;

use crate::core::AddressFamily;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("malformed entry `{entry}`")]
    Malformed { entry: String },

    #[error("invalid prefix length in `{entry}`: must be between 0 and {max}")]
    InvalidPrefixLength { entry: String, max: u8 },

    #[error("cannot mix {expected} and {found} ranges in one operation")]
    FamilyMismatch {
        expected: AddressFamily,
        found: AddressFamily,
    },
}

/// Fixed-width unsigned integer backing one address family.
///
/// All arithmetic the collapser and the filter need is expressed through this
/// trait so that IPv4 (`u32`) and IPv6 (`u128`) share one implementation and
/// neither can overflow at the top of its address space.
pub trait AddressBits:
    Copy
    + Ord
    + Hash
    + fmt::Debug
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + Not<Output = Self>
{
    type Addr: Copy + fmt::Display;

    const WIDTH: u8;
    const FAMILY: AddressFamily;

    fn from_addr(addr: Self::Addr) -> Self;

    fn to_addr(self) -> Self::Addr;

    /// Mask with every bit past `prefix` set. `prefix >= WIDTH` yields zero.
    fn host_mask(prefix: u8) -> Self;

    /// Number of trailing zero bits, `WIDTH` for zero.
    fn alignment(self) -> u8;

    fn successor(self) -> Option<Self>;
}

impl AddressBits for u32 {
    type Addr = Ipv4Addr;

    const WIDTH: u8 = 32;
    const FAMILY: AddressFamily = AddressFamily::Ipv4;

    fn from_addr(addr: Ipv4Addr) -> Self {
        u32::from(addr)
    }

    fn to_addr(self) -> Ipv4Addr {
        Ipv4Addr::from(self)
    }

    fn host_mask(prefix: u8) -> Self {
        if prefix >= Self::WIDTH {
            0
        } else {
            u32::MAX >> prefix
        }
    }

    fn alignment(self) -> u8 {
        self.trailing_zeros() as u8
    }

    fn successor(self) -> Option<Self> {
        self.checked_add(1)
    }
}

impl AddressBits for u128 {
    type Addr = Ipv6Addr;

    const WIDTH: u8 = 128;
    const FAMILY: AddressFamily = AddressFamily::Ipv6;

    fn from_addr(addr: Ipv6Addr) -> Self {
        u128::from(addr)
    }

    fn to_addr(self) -> Ipv6Addr {
        Ipv6Addr::from(self)
    }

    fn host_mask(prefix: u8) -> Self {
        if prefix >= Self::WIDTH {
            0
        } else {
            u128::MAX >> prefix
        }
    }

    fn alignment(self) -> u8 {
        self.trailing_zeros() as u8
    }

    fn successor(self) -> Option<Self> {
        self.checked_add(1)
    }
}

/// Closed interval `[start, end]` of raw address values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interval<B> {
    pub start: B,
    pub end: B,
}

impl<B: AddressBits> Interval<B> {
    pub fn intersects(self, other: Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn contains(self, other: Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// One canonical CIDR prefix: host bits are always clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cidr<B> {
    network: B,
    prefix: u8,
}

pub type Ipv4Cidr = Cidr<u32>;
pub type Ipv6Cidr = Cidr<u128>;

impl<B: AddressBits> Cidr<B> {
    pub fn new(address: B::Addr, prefix: u8) -> Option<Self> {
        if prefix > B::WIDTH {
            return None;
        }

        Some(Self::from_parts(B::from_addr(address), prefix))
    }

    pub fn from_parts(network: B, prefix: u8) -> Self {
        debug_assert!(prefix <= B::WIDTH);
        Self {
            network: network & !B::host_mask(prefix),
            prefix,
        }
    }

    pub fn network(self) -> B::Addr {
        self.network.to_addr()
    }

    pub fn bits(self) -> B {
        self.network
    }

    pub fn prefix(self) -> u8 {
        self.prefix
    }

    pub fn family(self) -> AddressFamily {
        B::FAMILY
    }

    pub fn interval(self) -> Interval<B> {
        Interval {
            start: self.network,
            end: self.network | B::host_mask(self.prefix),
        }
    }
}

impl<B: AddressBits> fmt::Display for Cidr<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix)
    }
}

impl<B: AddressBits> From<Cidr<B>> for Interval<B> {
    fn from(value: Cidr<B>) -> Self {
        value.interval()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AddressRange {
    V4(Ipv4Cidr),
    V6(Ipv6Cidr),
}

impl AddressRange {
    pub fn family(self) -> AddressFamily {
        match self {
            Self::V4(_) => AddressFamily::Ipv4,
            Self::V6(_) => AddressFamily::Ipv6,
        }
    }

    pub fn prefix(self) -> u8 {
        match self {
            Self::V4(cidr) => cidr.prefix(),
            Self::V6(cidr) => cidr.prefix(),
        }
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4(cidr) => write!(f, "{cidr}"),
            Self::V6(cidr) => write!(f, "{cidr}"),
        }
    }
}

impl FromStr for AddressRange {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_range(s)
    }
}

impl From<Ipv4Cidr> for AddressRange {
    fn from(value: Ipv4Cidr) -> Self {
        Self::V4(value)
    }
}

impl From<Ipv6Cidr> for AddressRange {
    fn from(value: Ipv6Cidr) -> Self {
        Self::V6(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FamilyCidrs {
    pub ipv4: Vec<Ipv4Cidr>,
    pub ipv6: Vec<Ipv6Cidr>,
}

impl FamilyCidrs {
    pub fn is_empty(&self) -> bool {
        self.ipv4.is_empty() && self.ipv6.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ipv4.len() + self.ipv6.len()
    }

    /// IPv4 entries first, then IPv6, each in stored order.
    pub fn to_ranges(&self) -> Vec<AddressRange> {
        self.ipv4
            .iter()
            .copied()
            .map(AddressRange::V4)
            .chain(self.ipv6.iter().copied().map(AddressRange::V6))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    pub line: usize,
    pub error: NetworkError,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedLines {
    pub ranges: Vec<AddressRange>,
    pub rejected: Vec<RejectedLine>,
}

/// Parse one `address[/prefix]` entry.
///
/// Host bits past the prefix are masked rather than rejected, so
/// `10.0.0.5/24` yields `10.0.0.0/24`. A bare address is a host route.
pub fn parse_range(input: &str) -> Result<AddressRange, NetworkError> {
    let token = input.trim();
    if token.is_empty() {
        return Err(malformed(token));
    }

    if let Ok(ip) = token.parse::<IpAddr>() {
        return Ok(match ip {
            IpAddr::V4(v4) => AddressRange::V4(Ipv4Cidr::from_parts(u32::from(v4), 32)),
            IpAddr::V6(v6) => AddressRange::V6(Ipv6Cidr::from_parts(u128::from(v6), 128)),
        });
    }

    let (addr_part, prefix_part) = token.split_once('/').ok_or_else(|| malformed(token))?;
    let ip = addr_part
        .parse::<IpAddr>()
        .map_err(|_| malformed(token))?;

    if prefix_part.is_empty() || !prefix_part.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(malformed(token));
    }

    let max = match ip {
        IpAddr::V4(_) => u32::WIDTH,
        IpAddr::V6(_) => u128::WIDTH,
    };
    let prefix = prefix_part
        .parse::<u8>()
        .ok()
        .filter(|prefix| *prefix <= max)
        .ok_or_else(|| NetworkError::InvalidPrefixLength {
            entry: token.to_string(),
            max,
        })?;

    Ok(match ip {
        IpAddr::V4(v4) => AddressRange::V4(Ipv4Cidr::from_parts(u32::from(v4), prefix)),
        IpAddr::V6(v6) => AddressRange::V6(Ipv6Cidr::from_parts(u128::from(v6), prefix)),
    })
}

/// Parse every entry, keeping failures alongside their 1-based position.
pub fn parse_all<I, S>(inputs: I) -> ParsedLines
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = ParsedLines::default();

    for (idx, value) in inputs.into_iter().enumerate() {
        match parse_range(value.as_ref()) {
            Ok(range) => parsed.ranges.push(range),
            Err(error) => parsed.rejected.push(RejectedLine {
                line: idx + 1,
                error,
            }),
        }
    }

    parsed
}

pub fn parse_all_strict<I, S>(inputs: I) -> Result<Vec<AddressRange>, NetworkError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    inputs
        .into_iter()
        .map(|value| parse_range(value.as_ref()))
        .collect()
}

pub fn split_by_family(ranges: &[AddressRange]) -> FamilyCidrs {
    let mut separated = FamilyCidrs::default();

    for range in ranges {
        match range {
            AddressRange::V4(v4) => separated.ipv4.push(*v4),
            AddressRange::V6(v6) => separated.ipv6.push(*v6),
        }
    }

    separated
}

/// Family shared by every range, `None` when there are no ranges.
pub fn common_family<'a, I>(ranges: I) -> Result<Option<AddressFamily>, NetworkError>
where
    I: IntoIterator<Item = &'a AddressRange>,
{
    let mut family = None;

    for range in ranges {
        match family {
            None => family = Some(range.family()),
            Some(expected) if expected != range.family() => {
                return Err(NetworkError::FamilyMismatch {
                    expected,
                    found: range.family(),
                });
            }
            Some(_) => {}
        }
    }

    Ok(family)
}

fn malformed(token: &str) -> NetworkError {
    NetworkError::Malformed {
        entry: token.to_string(),
    }
}
