use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::Level;

pub const ARG_LOG_LEVEL: &str = "log-level";
pub const ARG_VERBOSE: &str = "verbose";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// `None` leaves the subscriber at its error-only default.
    pub level: Option<Level>,
}

impl Options {
    /// Resolve the log level from `--log-level` and repeated `-v` flags,
    /// keeping whichever is more verbose.
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        let named = matches.get_one::<Level>(ARG_LOG_LEVEL).copied();
        let counted = level_for_count(matches.get_count(ARG_VERBOSE));

        Self {
            level: named.max(counted),
        }
    }
}

const fn level_for_count(count: u8) -> Option<Level> {
    match count {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

fn parse_level(value: &str) -> Result<Level, String> {
    value.trim().parse::<Level>().map_err(|_| {
        format!("unknown log level '{value}', expected error, warn, info, debug or trace")
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_LOG_LEVEL)
                .long(ARG_LOG_LEVEL)
                .help("Log level: error, warn, info, debug or trace (default: error)")
                .env("AUTHGATE_LOG_LEVEL")
                .global(true)
                .value_parser(parse_level),
        )
        .arg(
            Arg::new(ARG_VERBOSE)
                .short('v')
                .long(ARG_VERBOSE)
                .help("Raise the log level once per occurrence")
                .global(true)
                .action(ArgAction::Count),
        )
}
