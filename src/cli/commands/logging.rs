use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

/// Level names in verbosity order: no `-v` is `error`, `-vvvv` is `trace`.
const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accepts a level name or its count (`WARDEN_LOG_LEVEL=debug` or `=3`).
#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(|level: &str| -> Result<u8, String> {
        if let Ok(count) = level.parse::<u8>() {
            return if usize::from(count) < LEVELS.len() {
                Ok(count)
            } else {
                Err(format!("log level out of range: {count}"))
            };
        }

        let wanted = level.to_lowercase();
        LEVELS
            .iter()
            .position(|name| *name == wanted)
            .and_then(|index| u8::try_from(index).ok())
            .ok_or_else(|| format!("invalid log level: {level}"))
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("WARDEN_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_level() {
        temp_env::with_var("WARDEN_LOG_LEVEL", Some("loud"), || {
            let result = with_args(Command::new("warden")).try_get_matches_from(vec!["warden"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn accepts_numeric_level() {
        temp_env::with_var("WARDEN_LOG_LEVEL", Some("3"), || {
            let matches = with_args(Command::new("warden")).get_matches_from(vec!["warden"]);
            assert_eq!(matches.get_one::<u8>(ARG_VERBOSITY).copied(), Some(3));
        });
    }
}
