use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;

use crate::core::AddressFamily;
use crate::core::config::MalformedPolicy;

#[derive(Debug, Parser)]
#[command(
    name = "iplist",
    version,
    about = "Aggregate, collapse and filter IP prefix lists",
    long_about = "Aggregate IPv4/IPv6 prefix lists into a minimal covering set and remove entries that touch reserved or user-supplied exclusion ranges."
)]
pub struct Cli {
    #[arg(
        long = "log-level",
        value_enum,
        default_value_t = LogLevel::Info,
        global = true,
        help = "Set stderr log verbosity"
    )]
    pub log_level: LogLevel,

    #[arg(
        long,
        value_name = "PATH",
        global = true,
        help = "TOML config file with filter and input defaults"
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnMalformed {
    Skip,
    Abort,
}

impl From<OnMalformed> for MalformedPolicy {
    fn from(value: OnMalformed) -> Self {
        match value {
            OnMalformed::Skip => MalformedPolicy::Skip,
            OnMalformed::Abort => MalformedPolicy::Abort,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Family {
    Ipv4,
    Ipv6,
}

impl From<Family> for AddressFamily {
    fn from(value: Family) -> Self {
        match value {
            Family::Ipv4 => AddressFamily::Ipv4,
            Family::Ipv6 => AddressFamily::Ipv6,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(
        about = "Collapse lists and filter them against exclusion ranges",
        long_about = "Load every LIST, drop entries whose prefix is shorter than the per-family minimum, collapse the rest into a minimal covering set and remove entries touching the exclusion set.\n\nThe result goes to --result (stdout when absent); discarded and filtered entries go to --delta. With --in-place each LIST is processed on its own and rewritten."
    )]
    Aggregate(AggregateArgs),
    #[command(
        about = "Collapse lists without any filtering",
        long_about = "Collapse the union of every LIST into a minimal covering set and print it to stdout, IPv4 before IPv6."
    )]
    Collapse {
        #[arg(value_name = "LIST", required = true, num_args = 1.., help = "Prefix list file(s)")]
        lists: Vec<PathBuf>,
    },
    #[command(
        about = "Print the built-in reserved address catalog",
        long_about = "Print the collapsed reserved address catalog used by --filter-reserved-ips."
    )]
    Reserved {
        #[arg(long, value_enum, help = "Only print one address family")]
        family: Option<Family>,
    },
}

#[derive(Debug, Args)]
pub struct AggregateArgs {
    #[arg(value_name = "LIST", required = true, num_args = 1.., help = "Prefix list file(s)")]
    pub lists: Vec<PathBuf>,

    #[arg(
        long,
        value_name = "PATH",
        help = "List merged into the result before filtering, exempt from the prefix minimum"
    )]
    pub initval: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help = "List of ranges to filter out")]
    pub filter: Option<PathBuf>,

    #[arg(long, help = "Also filter out reserved address ranges")]
    pub filter_reserved_ips: bool,

    #[arg(
        long,
        value_name = "N",
        value_parser = clap::value_parser!(u8).range(0..=32),
        help = "Discard IPv4 entries with a shorter prefix (0 disables)"
    )]
    pub min_ipv4_prefix: Option<u8>,

    #[arg(
        long,
        value_name = "N",
        value_parser = clap::value_parser!(u8).range(0..=128),
        help = "Discard IPv6 entries with a shorter prefix (0 disables)"
    )]
    pub min_ipv6_prefix: Option<u8>,

    #[arg(long, value_name = "PATH", help = "Write the result here instead of stdout")]
    pub result: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help = "Write discarded and filtered entries here")]
    pub delta: Option<PathBuf>,

    #[arg(
        long,
        conflicts_with_all = ["initval", "result", "delta"],
        help = "Rewrite every LIST with its own collapsed and filtered entries"
    )]
    pub in_place: bool,

    #[arg(long, value_enum, help = "What to do with unparseable entries")]
    pub on_malformed: Option<OnMalformed>,
}
