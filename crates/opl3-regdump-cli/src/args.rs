//! Command-line argument parsing for the register dump tool.

use std::env;

use log::LevelFilter;
use opl3::ParameterSurface;

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Script to run; `None` reads stdin
    pub script_path: Option<String>,
    /// JSON configuration file
    pub config_path: Option<String>,
    /// Sample rate override
    pub sample_rate: Option<f32>,
    /// Parameter surface override
    pub surface: Option<ParameterSurface>,
    /// Release notes by clearing only the key-on bit
    pub clear_key_only: bool,
    /// Number of `-v` flags
    pub verbosity: u8,
    /// Whether help was requested
    pub show_help: bool,
    /// Whether an argument could not be parsed
    pub invalid: bool,
}

impl CliArgs {
    /// Parse arguments from command line.
    pub fn parse() -> Self {
        Self::parse_from(env::args().skip(1))
    }

    /// Parse arguments from an iterator (program name already skipped).
    pub fn parse_from<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Self::default();
        let mut iter = args.into_iter();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--help" | "-h" => parsed.show_help = true,
                "--mono" => parsed.surface = Some(ParameterSurface::Monotimbral),
                "--clear-key-only" => parsed.clear_key_only = true,
                "-v" | "--verbose" => parsed.verbosity = parsed.verbosity.saturating_add(1),
                "-vv" => parsed.verbosity = parsed.verbosity.saturating_add(2),
                "--config" => match iter.next() {
                    Some(path) => parsed.config_path = Some(path),
                    None => parsed.fail("--config requires a file path"),
                },
                "--rate" => match iter.next() {
                    Some(value) => parsed.set_rate(&value),
                    None => parsed.fail("--rate requires a value in Hz"),
                },
                _ if arg.starts_with("--rate=") => parsed.set_rate(&arg["--rate=".len()..]),
                _ if arg.starts_with("--config=") => {
                    parsed.config_path = Some(arg["--config=".len()..].to_string());
                }
                _ if arg.starts_with('-') && arg != "-" => {
                    parsed.fail(&format!("Unknown flag: {arg}"));
                }
                _ => {
                    if parsed.script_path.is_some() {
                        parsed.fail(&format!("Unexpected argument: {arg}"));
                    } else if arg != "-" {
                        parsed.script_path = Some(arg);
                    }
                }
            }
        }

        parsed
    }

    fn set_rate(&mut self, value: &str) {
        match value.parse::<f32>() {
            Ok(rate) if rate.is_finite() && rate > 0.0 => self.sample_rate = Some(rate),
            _ => self.fail(&format!("Invalid sample rate: {value}")),
        }
    }

    fn fail(&mut self, message: &str) {
        eprintln!("{message}");
        self.invalid = true;
        self.show_help = true;
    }

    /// Log level selected by the `-v` count.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// Print help text to stderr.
    pub fn print_help() {
        eprintln!(
            "Usage:\n  opl3-regdump [--rate <hz>] [--config <file.json>] [--mono] [--clear-key-only] [-v] [script|-]\n\n\
             Flags:\n\
             \x20 --rate <hz>          Output sample rate (default 44100)\n\
             \x20 --config <file>      JSON configuration (sample_rate, surface, note_off_mode)\n\
             \x20 --mono               Address the 30-parameter monotimbral surface\n\
             \x20 --clear-key-only     NoteOff clears only the key-on bit\n\
             \x20 -v, -vv              Debug / trace logging to stderr\n\
             \x20 -h, --help           Show this help\n\n\
             Script commands (one per line, # starts a comment):\n\
             \x20 on <note> <velocity>   off <note>   cc <controller> <value>\n\
             \x20 param <index> <value>  rate <hz>    midi <status> <data1> <data2> (hex)\n\
             \x20 allnotesoff            allsoundoff\n\n\
             Examples:\n\
             \x20 opl3-regdump chord.txt\n\
             \x20 echo 'on 69 100' | opl3-regdump --rate 48000\n"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::parse_from(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert!(args.script_path.is_none());
        assert!(!args.show_help);
        assert_eq!(args.log_level(), LevelFilter::Warn);
    }

    #[test]
    fn test_all_flags() {
        let args = parse(&[
            "--rate",
            "48000",
            "--config",
            "synth.json",
            "--mono",
            "--clear-key-only",
            "-v",
            "notes.txt",
        ]);
        assert_eq!(args.sample_rate, Some(48_000.0));
        assert_eq!(args.config_path.as_deref(), Some("synth.json"));
        assert_eq!(args.surface, Some(ParameterSurface::Monotimbral));
        assert!(args.clear_key_only);
        assert_eq!(args.log_level(), LevelFilter::Debug);
        assert_eq!(args.script_path.as_deref(), Some("notes.txt"));
        assert!(!args.invalid);
    }

    #[test]
    fn test_equals_forms() {
        let args = parse(&["--rate=22050", "--config=a.json", "-"]);
        assert_eq!(args.sample_rate, Some(22_050.0));
        assert_eq!(args.config_path.as_deref(), Some("a.json"));
        assert!(args.script_path.is_none());
    }

    #[test]
    fn test_invalid_input() {
        assert!(parse(&["--rate", "fast"]).invalid);
        assert!(parse(&["--rate", "-1"]).invalid);
        assert!(parse(&["--rate"]).invalid);
        assert!(parse(&["--bogus"]).invalid);
        assert!(parse(&["a.txt", "b.txt"]).invalid);
        let help = parse(&["-h"]);
        assert!(help.show_help && !help.invalid);
    }
}
