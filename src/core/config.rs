use serde::Deserialize;
use thiserror::Error;

use crate::core::AddressFamily;
use crate::core::network::{AddressBits, AddressRange, parse_all_strict};

pub const DEFAULT_MIN_IPV4_PREFIX: u8 = 8;
pub const DEFAULT_MIN_IPV6_PREFIX: u8 = 8;
pub const DEFAULT_FILTER_RESERVED: bool = false;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to parse TOML config: {reason}")]
    Parse { reason: String },

    #[error("invalid config value for `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Minimum prefix length a list entry must have to be admitted, per family.
/// Zero disables the check for that family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOptions {
    min_ipv4_prefix: u8,
    min_ipv6_prefix: u8,
}

impl FilterOptions {
    pub fn new(min_ipv4_prefix: u8, min_ipv6_prefix: u8) -> Result<Self, ConfigError> {
        if min_ipv4_prefix > u32::WIDTH {
            return Err(ConfigError::InvalidField {
                field: "filter.min_ipv4_prefix",
                reason: format!("must be between 0 and {}", u32::WIDTH),
            });
        }
        if min_ipv6_prefix > u128::WIDTH {
            return Err(ConfigError::InvalidField {
                field: "filter.min_ipv6_prefix",
                reason: format!("must be between 0 and {}", u128::WIDTH),
            });
        }

        Ok(Self {
            min_ipv4_prefix,
            min_ipv6_prefix,
        })
    }

    pub fn min_ipv4_prefix(self) -> u8 {
        self.min_ipv4_prefix
    }

    pub fn min_ipv6_prefix(self) -> u8 {
        self.min_ipv6_prefix
    }

    pub fn min_prefix(self, family: AddressFamily) -> u8 {
        match family {
            AddressFamily::Ipv4 => self.min_ipv4_prefix,
            AddressFamily::Ipv6 => self.min_ipv6_prefix,
        }
    }

    pub fn admits(self, range: AddressRange) -> bool {
        range.prefix() >= self.min_prefix(range.family())
    }
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            min_ipv4_prefix: DEFAULT_MIN_IPV4_PREFIX,
            min_ipv6_prefix: DEFAULT_MIN_IPV6_PREFIX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    #[default]
    Skip,
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    pub filter: FilterConfig,
    pub input: InputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    pub options: FilterOptions,
    pub reserved: bool,
    pub exclude: Vec<AddressRange>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            options: FilterOptions::default(),
            reserved: DEFAULT_FILTER_RESERVED,
            exclude: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputConfig {
    pub on_malformed: MalformedPolicy,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    filter: Option<RawFilterConfig>,
    input: Option<RawInputConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct RawFilterConfig {
    min_ipv4_prefix: Option<i64>,
    min_ipv6_prefix: Option<i64>,
    reserved: Option<bool>,
    exclude: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
struct RawInputConfig {
    on_malformed: Option<String>,
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(contents).map_err(|err| ConfigError::Parse {
            reason: err.to_string(),
        })?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let filter = parse_filter(raw.filter.unwrap_or_default())?;
        let input = parse_input(raw.input.unwrap_or_default())?;

        Ok(Self { filter, input })
    }
}

fn parse_filter(raw: RawFilterConfig) -> Result<FilterConfig, ConfigError> {
    let min_ipv4_prefix = bounded_u8(
        raw.min_ipv4_prefix
            .unwrap_or(i64::from(DEFAULT_MIN_IPV4_PREFIX)),
        "filter.min_ipv4_prefix",
        u32::WIDTH,
    )?;
    let min_ipv6_prefix = bounded_u8(
        raw.min_ipv6_prefix
            .unwrap_or(i64::from(DEFAULT_MIN_IPV6_PREFIX)),
        "filter.min_ipv6_prefix",
        u128::WIDTH,
    )?;
    let options = FilterOptions::new(min_ipv4_prefix, min_ipv6_prefix)?;

    let exclude = parse_all_strict(raw.exclude.unwrap_or_default()).map_err(|err| {
        ConfigError::InvalidField {
            field: "filter.exclude",
            reason: err.to_string(),
        }
    })?;

    Ok(FilterConfig {
        options,
        reserved: raw.reserved.unwrap_or(DEFAULT_FILTER_RESERVED),
        exclude,
    })
}

fn parse_input(raw: RawInputConfig) -> Result<InputConfig, ConfigError> {
    let on_malformed = match raw.on_malformed.as_deref().map(str::trim) {
        None => MalformedPolicy::default(),
        Some(value) if value.eq_ignore_ascii_case("skip") => MalformedPolicy::Skip,
        Some(value) if value.eq_ignore_ascii_case("abort") => MalformedPolicy::Abort,
        Some(_) => {
            return Err(ConfigError::InvalidField {
                field: "input.on_malformed",
                reason: "must be `skip` or `abort`".to_string(),
            });
        }
    };

    Ok(InputConfig { on_malformed })
}

fn bounded_u8(value: i64, field: &'static str, max: u8) -> Result<u8, ConfigError> {
    u8::try_from(value)
        .ok()
        .filter(|value| *value <= max)
        .ok_or_else(|| ConfigError::InvalidField {
            field,
            reason: format!("must be between 0 and {max}"),
        })
}
