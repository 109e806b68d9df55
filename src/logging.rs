use std::env;
use std::ffi::OsStr;
use std::io::{IsTerminal, Write};

use env_logger::WriteStyle;
use log::{Level, LevelFilter};

use crate::error::IplistError;

pub fn init(level: LevelFilter) -> Result<(), IplistError> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    builder.write_style(WriteStyle::Never);
    let format = select_log_format(
        env::var_os("IPLIST_LOG_FORMAT").as_deref(),
        std::io::stderr().is_terminal(),
        running_under_github_actions(),
    );
    builder.format(move |buf, record| {
        writeln!(buf, "{}", render(format, record.level(), &record.args().to_string()))
    });
    builder.try_init().map_err(|err| IplistError::LoggerInit {
        reason: err.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Human,
    Plain,
    Github,
}

fn running_under_github_actions() -> bool {
    env::var_os("GITHUB_ACTIONS").is_some_and(|value| value == "true")
}

fn select_log_format(
    configured: Option<&OsStr>,
    stderr_is_terminal: bool,
    under_github: bool,
) -> LogFormat {
    match configured
        .and_then(OsStr::to_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        Some(value) if value.eq_ignore_ascii_case("human") => LogFormat::Human,
        Some(value) if value.eq_ignore_ascii_case("plain") => LogFormat::Plain,
        Some(value) if value.eq_ignore_ascii_case("github") => LogFormat::Github,
        Some(_) | None => auto_log_format(stderr_is_terminal, under_github),
    }
}

fn auto_log_format(stderr_is_terminal: bool, under_github: bool) -> LogFormat {
    if under_github {
        LogFormat::Github
    } else if stderr_is_terminal {
        LogFormat::Human
    } else {
        LogFormat::Plain
    }
}

/// Workflow commands only exist for warnings, errors and debug output;
/// everything else is written as a bare line.
fn render(format: LogFormat, level: Level, message: &str) -> String {
    match format {
        LogFormat::Human => format!("{level}: {message}"),
        LogFormat::Plain => format!("level={level} msg={message}"),
        LogFormat::Github => match level {
            Level::Error => format!("::error::{}", escape_workflow_data(message)),
            Level::Warn => format!("::warning::{}", escape_workflow_data(message)),
            Level::Debug | Level::Trace => {
                format!("::debug::{}", escape_workflow_data(message))
            }
            Level::Info => message.to_string(),
        },
    }
}

fn escape_workflow_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
