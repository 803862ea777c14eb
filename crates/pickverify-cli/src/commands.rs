//! Operator commands read from stdin.

use anyhow::{Context, Result, bail};
use pickverify_hardware::Symbology;

/// Prefix that marks a line as a command instead of typed input.
const COMMAND_PREFIX: char = ':';

const SCAN_USAGE: &str = "usage: :scan <symbology> <payload>";

/// One parsed stdin line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Type the text, then the terminator.
    Type(String),

    /// Press Escape.
    Escape,

    /// Dismiss the completion notice.
    Acknowledge,

    /// Inject a decoded report through the mock scanner.
    Scan { symbology: Symbology, payload: String },

    /// Simulate another process asking for the scanner.
    Release,

    /// Print command help.
    Help,

    /// Leave the simulator.
    Quit,
}

/// Parse one input line.
///
/// Lines not starting with `:` are typed verbatim, so an empty line types a
/// bare terminator. A literal leading colon is typed with `::`.
pub fn parse(line: &str) -> Result<Command> {
    let line = line.trim_end_matches(['\r', '\n']);

    let Some(rest) = line.strip_prefix(COMMAND_PREFIX) else {
        return Ok(Command::Type(line.to_string()));
    };

    if rest.starts_with(COMMAND_PREFIX) {
        return Ok(Command::Type(rest.to_string()));
    }

    let mut words = rest.split_whitespace();
    let name = words.next().unwrap_or_default();

    match name {
        "esc" | "escape" => Ok(Command::Escape),
        "ack" => Ok(Command::Acknowledge),
        "release" => Ok(Command::Release),
        "help" | "h" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        "scan" => {
            let symbology: Symbology = words.next().context(SCAN_USAGE)?.parse()?;
            let payload = words.collect::<Vec<_>>().join(" ");
            if payload.is_empty() {
                bail!(SCAN_USAGE);
            }
            Ok(Command::Scan { symbology, payload })
        }
        other => bail!("unknown command ':{other}' (try :help)"),
    }
}

/// Help text printed for `:help`.
pub const HELP: &str = "\
<text>                    type text followed by Enter
:esc                      press Escape (reset to New)
:ack                      acknowledge the completion notice
:scan <symbology> <data>  inject a decoded device scan (e.g. :scan upca 123456)
:release                  simulate a competing claim on the scanner
:quit                     exit";

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("5QCPCM0QW", "5QCPCM0QW")]
    #[case("", "")]
    #[case("AB#CD\n", "AB#CD")]
    #[case("::colon", ":colon")]
    fn test_plain_lines_are_typed(#[case] line: &str, #[case] expected: &str) {
        assert_eq!(parse(line).unwrap(), Command::Type(expected.to_string()));
    }

    #[rstest]
    #[case(":esc", Command::Escape)]
    #[case(":ack", Command::Acknowledge)]
    #[case(":release", Command::Release)]
    #[case(":help", Command::Help)]
    #[case(":quit", Command::Quit)]
    #[case(":q", Command::Quit)]
    fn test_commands(#[case] line: &str, #[case] expected: Command) {
        assert_eq!(parse(line).unwrap(), expected);
    }

    #[test]
    fn test_scan_command() {
        assert_eq!(
            parse(":scan upca 123456").unwrap(),
            Command::Scan {
                symbology: Symbology::Upca,
                payload: "123456".to_string(),
            }
        );
    }

    #[rstest]
    #[case(":scan")]
    #[case(":scan upca")]
    #[case(":scan nosuchcode 123")]
    #[case(":frobnicate")]
    fn test_invalid_commands(#[case] line: &str) {
        assert!(parse(line).is_err());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(parse(":scan").unwrap_err().to_string(), SCAN_USAGE);
        assert_eq!(
            parse(":scan morse 123").unwrap_err().to_string(),
            "Invalid data: unknown symbology 'morse'"
        );
        assert_eq!(
            parse(":frobnicate").unwrap_err().to_string(),
            "unknown command ':frobnicate' (try :help)"
        );
    }
}
