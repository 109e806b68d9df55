use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::adapters::config::load_config;
use crate::adapters::list_file::render_list;
use crate::cli::aggregate::{run_aggregate_command, run_collapse_command};
use crate::cli::args::Command;
use crate::core::AddressFamily;
use crate::core::network::AddressRange;
use crate::core::reserved::reserved_catalog;
use crate::error::IplistError;

pub fn dispatch(command: Command, config_path: Option<&Path>) -> Result<(), IplistError> {
    match command {
        Command::Aggregate(args) => {
            let config = load_config(config_path)?;
            run_aggregate_command(&args, &config)
        }
        Command::Collapse { lists } => {
            let config = load_config(config_path)?;
            run_collapse_command(&lists, &config)
        }
        Command::Reserved { family } => {
            let entries = reserved_entries(family.map(AddressFamily::from));
            io::stdout()
                .lock()
                .write_all(render_list(&entries).as_bytes())
                .map_err(|err| IplistError::ListWrite {
                    path: PathBuf::from("<stdout>"),
                    reason: err.to_string(),
                })
        }
    }
}

fn reserved_entries(family: Option<AddressFamily>) -> Vec<AddressRange> {
    reserved_catalog()
        .to_ranges()
        .into_iter()
        .filter(|range| family.is_none_or(|family| range.family() == family))
        .collect()
}
