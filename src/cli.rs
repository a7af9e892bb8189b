//! Clap binding for the flag adapter.
//!
//! Compiled only when the `clap` Cargo feature is enabled (on by default).
//! [`FlagAdapter::augment`] adds one `--name <VALUE>` argument per adapted
//! slot to a clap [`Command`]; after parsing, [`FlagAdapter::apply_matches`]
//! feeds every argument that was actually given on the command line back
//! into its slot. Defaults shown in `--help` come from the nodes; values
//! that clap filled in from those defaults are never applied.
//!
//! Boolean nodes accept an optional value, so `--debug` means
//! `--debug=true` and `--debug=no` turns the flag off.
//!
//! ```ignore
//! let mut flags = FlagAdapter::new();
//! flags.adapt(default_registry());
//! let matches = flags.augment(Command::new("myapp")).get_matches();
//! let report = flags.apply_matches(&matches);
//! ```

use std::collections::HashSet;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::flag::{FlagAdapter, FlagSlot};
use crate::priority::ApplyReport;

impl FlagAdapter {
    /// Add an argument to `cmd` for every slot.
    ///
    /// A slot whose long name is already taken is skipped with a warning.
    /// Taken names are the long names of `cmd`'s arguments, clap's generated
    /// `--help` and `--version` flags when the command will get them, and
    /// earlier slots.
    pub fn augment(&self, mut cmd: Command) -> Command {
        let mut taken: HashSet<String> = cmd
            .get_arguments()
            .filter_map(|a| a.get_long())
            .map(str::to_string)
            .collect();
        if !cmd.is_disable_help_flag_set() {
            taken.insert("help".to_string());
        }
        if cmd.get_version().is_some() && !cmd.is_disable_version_flag_set() {
            taken.insert("version".to_string());
        }

        for slot in self.slots() {
            if !taken.insert(slot.name().to_string()) {
                tracing::warn!(event = "nexus.flag.name_conflict", name = slot.name());
                continue;
            }
            cmd = cmd.arg(slot_arg(slot));
        }
        cmd
    }

    /// Apply every slot argument given on the command line.
    pub fn apply_matches(&self, matches: &ArgMatches) -> ApplyReport {
        let mut report = ApplyReport::default();
        let mut seen = HashSet::new();

        for slot in self.slots() {
            if !seen.insert(slot.name()) {
                continue;
            }
            let id = slot_id(slot);
            let Ok(Some(raw)) = matches.try_get_one::<String>(&id) else {
                continue;
            };
            if matches.value_source(&id) != Some(ValueSource::CommandLine) {
                continue;
            }
            report.record(slot.name(), slot.set(raw));
        }

        tracing::debug!(
            event = "nexus.flag.applied",
            accepted = report.accepted.len(),
            rejected = report.rejected.len(),
            failed = report.failures.len()
        );
        report
    }
}

/// Slot arguments live under their own id namespace, so they can never be
/// confused with arguments the application defined itself.
fn slot_id(slot: &FlagSlot) -> String {
    format!("nexus:{}", slot.name())
}

fn slot_arg(slot: &FlagSlot) -> Arg {
    let arg = Arg::new(slot_id(slot))
        .long(slot.name().to_string())
        .help(slot.usage().to_string())
        .value_name("VALUE")
        .action(ArgAction::Set)
        .default_value(slot.default_text());

    if slot.is_bool() {
        arg.num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
    } else {
        arg
    }
}
