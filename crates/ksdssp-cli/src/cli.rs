use crate::config::defaults::Preset;
use clap::{Args, Parser};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "The KSDSSP Developers",
    version,
    about = "KSDSSP - Kabsch-Sander secondary structure assignment. Reads PDB coordinates and writes HELIX and SHEET records.",
    help_template = HELP_TEMPLATE,
)]
pub struct Cli {
    /// Input PDB file. Reads standard input when omitted or '-'.
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Output file for HELIX/SHEET records. Writes standard output when omitted or '-'.
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    // --- Assignment Parameters ---
    /// Hydrogen bond energy cutoff in kcal/mol; pairs strictly below it are bonded.
    #[arg(short = 'c', long, value_name = "FLOAT", allow_negative_numbers = true)]
    pub cutoff: Option<f64>,

    /// Minimum number of residues in a reported helix.
    #[arg(short = 'm', long, value_name = "INT")]
    pub min_helix_length: Option<usize>,

    /// Minimum number of residues on each side of a ladder.
    #[arg(short = 's', long, value_name = "INT")]
    pub min_strand_length: Option<usize>,

    /// Do not merge ladders across beta bulges.
    #[arg(short = 'B', long)]
    pub ignore_bulges: bool,

    /// Override pi helix detection.
    #[command(flatten)]
    pub pi_helices: PiHelices,

    /// Parameter preset the other settings start from.
    #[arg(long, value_enum, value_name = "PRESET")]
    pub preset: Option<Preset>,

    /// Configuration file in TOML format.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S helix.min-length=4
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,

    /// Also write a text summary of helices, ladders, sheets and residues.
    #[arg(long, value_name = "PATH")]
    pub summary: Option<PathBuf>,

    // --- Logging & Execution ---
    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for hydrogen bond detection.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, value_name = "NUM")]
    pub threads: Option<usize>,
}

/// Mutually exclusive flags for pi helix detection.
#[derive(Args, Debug, Clone, Copy)]
#[group(required = false, multiple = false)]
pub struct PiHelices {
    /// Look for i -> i+5 turns and report pi helices.
    #[arg(long)]
    pub pi_helices: bool,
    /// Skip pi helix detection.
    #[arg(long)]
    pub no_pi_helices: bool,
}

impl PiHelices {
    pub fn value(self) -> Option<bool> {
        if self.pi_helices {
            Some(true)
        } else if self.no_pi_helices {
            Some(false)
        } else {
            None
        }
    }
}
