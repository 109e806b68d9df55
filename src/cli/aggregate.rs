use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::adapters::list_file::{read_list, render_list, write_list};
use crate::cli::args::AggregateArgs;
use crate::cli::interrupt::ensure_not_interrupted;
use crate::core::collapse::collapse_by_family;
use crate::core::config::{Config, FilterOptions, MalformedPolicy};
use crate::core::network::AddressRange;
use crate::core::pipeline::{AggregateOutcome, ExclusionSet, aggregate};
use crate::error::IplistError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AggregateSettings {
    options: FilterOptions,
    filter_reserved: bool,
    on_malformed: MalformedPolicy,
}

pub fn run_aggregate_command(args: &AggregateArgs, config: &Config) -> Result<(), IplistError> {
    let settings = resolve_settings(args, config)?;
    let exclusions = build_exclusions(args.filter.as_deref(), settings, config)?;

    if args.in_place {
        run_in_place(&args.lists, &exclusions, settings)
    } else {
        run_to_outputs(args, &exclusions, settings)
    }
}

pub fn run_collapse_command(lists: &[PathBuf], config: &Config) -> Result<(), IplistError> {
    let mut entries = Vec::new();
    for path in lists {
        ensure_not_interrupted()?;
        info!("loading list from {}", path.display());
        entries.extend(load_entries(path, config.input.on_malformed)?);
    }

    let collapsed = collapse_by_family(&entries);
    info!(
        "collapse completed: input_entries={} ipv4_entries={} ipv6_entries={}",
        entries.len(),
        collapsed.ipv4.len(),
        collapsed.ipv6.len()
    );

    write_stdout(&collapsed.to_ranges())
}

fn resolve_settings(
    args: &AggregateArgs,
    config: &Config,
) -> Result<AggregateSettings, IplistError> {
    let defaults = config.filter.options;
    let options = FilterOptions::new(
        args.min_ipv4_prefix
            .unwrap_or_else(|| defaults.min_ipv4_prefix()),
        args.min_ipv6_prefix
            .unwrap_or_else(|| defaults.min_ipv6_prefix()),
    )?;

    Ok(AggregateSettings {
        options,
        filter_reserved: args.filter_reserved_ips || config.filter.reserved,
        on_malformed: args
            .on_malformed
            .map_or(config.input.on_malformed, MalformedPolicy::from),
    })
}

fn build_exclusions(
    filter: Option<&Path>,
    settings: AggregateSettings,
    config: &Config,
) -> Result<ExclusionSet, IplistError> {
    let mut extra = config.filter.exclude.clone();

    if settings.filter_reserved {
        info!("loading reserved IP ranges");
    }

    if let Some(path) = filter {
        info!("loading filter entries from {}", path.display());
        extra.extend(load_entries(path, settings.on_malformed)?);
    }

    let exclusions = ExclusionSet::build(settings.filter_reserved, &extra);
    debug!(
        "exclusion set ready: ipv4_entries={} ipv6_entries={}",
        exclusions.ipv4().len(),
        exclusions.ipv6().len()
    );

    Ok(exclusions)
}

fn run_to_outputs(
    args: &AggregateArgs,
    exclusions: &ExclusionSet,
    settings: AggregateSettings,
) -> Result<(), IplistError> {
    let initial = match &args.initval {
        Some(path) => {
            info!("loading initval from {}", path.display());
            load_entries(path, settings.on_malformed)?
        }
        None => Vec::new(),
    };

    let mut list = Vec::new();
    for path in &args.lists {
        ensure_not_interrupted()?;
        info!("loading list from {}", path.display());
        list.extend(load_entries(path, settings.on_malformed)?);
    }

    info!("aggregating and collapsing the list");
    let outcome = aggregate(&initial, &list, exclusions, settings.options);
    report_discards(&outcome);

    match &args.result {
        Some(path) => write_list(path, &outcome.result)?,
        None => write_stdout(&outcome.result)?,
    }

    let delta = outcome.delta();
    if let Some(path) = &args.delta {
        write_list(path, &delta)?;
    }

    info!(
        "aggregate completed: result_entries={} delta_entries={}",
        outcome.result.len(),
        delta.len()
    );

    Ok(())
}

fn run_in_place(
    lists: &[PathBuf],
    exclusions: &ExclusionSet,
    settings: AggregateSettings,
) -> Result<(), IplistError> {
    for path in lists {
        ensure_not_interrupted()?;
        info!("processing list from {}", path.display());

        let entries = load_entries(path, settings.on_malformed)?;
        let outcome = aggregate(&[], &entries, exclusions, settings.options);
        report_discards(&outcome);
        write_list(path, &outcome.result)?;

        info!(
            "rewrote {}: input_entries={} result_entries={}",
            path.display(),
            entries.len(),
            outcome.result.len()
        );
    }

    Ok(())
}

fn load_entries(path: &Path, policy: MalformedPolicy) -> Result<Vec<AddressRange>, IplistError> {
    let parsed = read_list(path)?;

    for rejected in parsed.rejected {
        match policy {
            MalformedPolicy::Skip => warn!(
                "{}:{}: skipping {}",
                path.display(),
                rejected.line,
                rejected.error
            ),
            MalformedPolicy::Abort => {
                return Err(IplistError::MalformedEntry {
                    path: path.to_path_buf(),
                    line: rejected.line,
                    source: rejected.error,
                });
            }
        }
    }

    Ok(parsed.ranges)
}

fn report_discards(outcome: &AggregateOutcome) {
    for entry in &outcome.rejected {
        warn!("discarding {entry}, prefix length too short");
    }

    if !outcome.filtered.is_empty() {
        warn!("entries {} filtered", join_entries(&outcome.filtered));
    }
}

fn join_entries(entries: &[AddressRange]) -> String {
    entries
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_stdout(entries: &[AddressRange]) -> Result<(), IplistError> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(render_list(entries).as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|err| IplistError::ListWrite {
            path: PathBuf::from("<stdout>"),
            reason: err.to_string(),
        })
}
