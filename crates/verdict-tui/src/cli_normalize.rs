//! Pre-parse argument handling: output mode sniffing, flag spelling repair,
//! and the human failure notice.

use crate::cli_contract::OutputMode;
use std::fmt;

/// Misspellings `verdict` repairs before clap sees them.
const FLAG_REPAIRS: &[(&str, &str)] = &[
    ("--timeout_secs", "--timeout-secs"),
    ("--timeout", "--timeout-secs"),
    ("--out", "--output"),
];

/// Human-readable failure block printed to stderr.
pub(crate) struct FailureNotice<'a> {
    pub(crate) what: &'a str,
    pub(crate) likely_cause: &'a str,
    pub(crate) next_commands: &'a [String],
    pub(crate) location: &'a str,
}

impl fmt::Display for FailureNotice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Error: {}", self.what)?;
        write!(f, "Likely cause: {}", self.likely_cause)?;
        if !self.next_commands.is_empty() {
            write!(f, "\nNext command(s):")?;
            for (n, cmd) in self.next_commands.iter().enumerate() {
                write!(f, "\n  {}. {cmd}", n + 1)?;
            }
        }
        if !self.location.is_empty() {
            write!(f, "\nEvidence:\n  - {}", self.location)?;
        }
        Ok(())
    }
}

/// Output mode from raw arguments, for failures that happen before clap
/// has parsed anything.
pub(crate) fn sniff_output_mode(args: &[String], stdout_is_tty: bool) -> OutputMode {
    let flag = |name: &str| args.iter().skip(1).any(|a| a == name);
    OutputMode::resolve(flag("--json"), flag("--human"), stdout_is_tty)
}

/// Rewrite known flag misspellings. Returns the repaired args and one note
/// per rewrite. Arguments after `--` are positionals and left alone.
pub(crate) fn normalize_args(args: Vec<String>) -> (Vec<String>, Vec<String>) {
    let mut notes = Vec::new();
    let mut after_separator = false;

    let repaired = args
        .into_iter()
        .enumerate()
        .map(|(position, arg)| {
            if position == 0 || after_separator {
                return arg;
            }
            if arg == "--" {
                after_separator = true;
                return arg;
            }
            match FLAG_REPAIRS.iter().find(|(wrong, _)| *wrong == arg) {
                Some((_, right)) => {
                    notes.push(format!("normalized `{arg}` -> `{right}`"));
                    right.to_string()
                }
                None => arg,
            }
        })
        .collect();

    (repaired, notes)
}
