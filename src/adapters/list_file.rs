use std::fs;
use std::path::Path;

use crate::adapters::limited_io::read_to_string_with_limit;
use crate::core::network::{AddressRange, ParsedLines, RejectedLine, parse_range};
use crate::error::IplistError;

const LIST_READ_LIMIT: usize = 64 * 1024 * 1024;

/// Entry text of one list line: the first whitespace-separated token before
/// any `#` comment. Blank and comment-only lines have none.
pub fn entry_token(line: &str) -> Option<&str> {
    let content = match line.split_once('#') {
        Some((before, _)) => before,
        None => line,
    };
    content.split_whitespace().next()
}

/// Parse list contents, numbering rejected entries by their file line.
pub fn parse_list_contents(contents: &str) -> ParsedLines {
    let mut parsed = ParsedLines::default();

    for (idx, line) in contents.lines().enumerate() {
        let Some(token) = entry_token(line) else {
            continue;
        };

        match parse_range(token) {
            Ok(range) => parsed.ranges.push(range),
            Err(error) => parsed.rejected.push(RejectedLine {
                line: idx + 1,
                error,
            }),
        }
    }

    parsed
}

pub fn read_list(path: &Path) -> Result<ParsedLines, IplistError> {
    let contents =
        read_to_string_with_limit(path, LIST_READ_LIMIT).map_err(|err| IplistError::ListRead {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

    Ok(parse_list_contents(&contents))
}

pub fn render_list(entries: &[AddressRange]) -> String {
    let mut contents = entries
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    if !contents.is_empty() {
        contents.push('\n');
    }
    contents
}

pub fn write_list(path: &Path, entries: &[AddressRange]) -> Result<(), IplistError> {
    fs::write(path, render_list(entries)).map_err(|err| IplistError::ListWrite {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}
