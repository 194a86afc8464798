pub mod defaults;

use crate::cli::Cli;
use crate::error::{CliError, Result};
use clap::ValueEnum;
use defaults::Preset;
use ksdssp::engine::config::{AssignmentConfig, AssignmentConfigBuilder};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialHBondConfig {
    #[serde(rename = "energy-cutoff")]
    energy_cutoff: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialHelixConfig {
    #[serde(rename = "min-length")]
    min_length: Option<usize>,
    #[serde(rename = "pi-helices")]
    pi_helices: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialStrandConfig {
    #[serde(rename = "min-length")]
    min_length: Option<usize>,
    #[serde(rename = "beta-bulges")]
    beta_bulges: Option<bool>,
}

/// Assignment settings as read from a TOML file, every field optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialAssignmentConfig {
    preset: Option<Preset>,
    hbond: Option<PartialHBondConfig>,
    helix: Option<PartialHelixConfig>,
    strand: Option<PartialStrandConfig>,
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value))
    })
}

impl PartialAssignmentConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Resolves the final configuration. Precedence, highest first: command
    /// line flags, `--set` values, the config file, the preset.
    pub fn merge_with_cli(mut self, args: &Cli) -> Result<AssignmentConfig> {
        self.apply_set_values(&args.set_values)?;

        let preset = args.preset.or(self.preset).unwrap_or_default();
        debug!(?preset, "Resolved parameter preset.");
        let hbond = self.hbond.take().unwrap_or_default();
        let helix = self.helix.take().unwrap_or_default();
        let strand = self.strand.take().unwrap_or_default();

        let mut builder = AssignmentConfigBuilder::from_config(&preset.config());
        if let Some(cutoff) = args.cutoff.or(hbond.energy_cutoff) {
            builder = builder.hbond_cutoff(cutoff);
        }
        if let Some(length) = args.min_helix_length.or(helix.min_length) {
            builder = builder.min_helix_length(length);
        }
        if let Some(length) = args.min_strand_length.or(strand.min_length) {
            builder = builder.min_strand_length(length);
        }
        if let Some(enabled) = args.pi_helices.value().or(helix.pi_helices) {
            builder = builder.detect_pi_helices(enabled);
        }
        let bulges = if args.ignore_bulges {
            Some(false)
        } else {
            strand.beta_bulges
        };
        if let Some(enabled) = bulges {
            builder = builder.detect_beta_bulges(enabled);
        }

        Ok(builder.build()?)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();

            match key {
                "preset" => {
                    let preset = <Preset as ValueEnum>::from_str(value_str.trim(), true)
                        .map_err(|_| {
                            CliError::Config(format!("Unknown preset for {}: {}", key, value_str))
                        })?;
                    self.preset = Some(preset);
                }
                "hbond.energy-cutoff" => {
                    self.hbond.get_or_insert_with(Default::default).energy_cutoff =
                        Some(parse_value(key, value_str, "float")?);
                }
                "helix.min-length" => {
                    self.helix.get_or_insert_with(Default::default).min_length =
                        Some(parse_value(key, value_str, "integer")?);
                }
                "helix.pi-helices" => {
                    self.helix.get_or_insert_with(Default::default).pi_helices =
                        Some(parse_value(key, value_str, "boolean")?);
                }
                "strand.min-length" => {
                    self.strand.get_or_insert_with(Default::default).min_length =
                        Some(parse_value(key, value_str, "integer")?);
                }
                "strand.beta-bulges" => {
                    self.strand.get_or_insert_with(Default::default).beta_bulges =
                        Some(parse_value(key, value_str, "boolean")?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn cli(extra: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("ksdssp").chain(extra.iter().copied()))
    }

    #[test]
    fn no_file_and_no_flags_gives_the_ksdssp_preset() {
        let config = PartialAssignmentConfig::default()
            .merge_with_cli(&cli(&[]))
            .unwrap();
        assert_eq!(config, AssignmentConfig::ksdssp_compatible());
    }

    #[test]
    fn file_values_override_the_preset() {
        let partial = PartialAssignmentConfig::from_toml(
            r#"
            preset = "standard"

            [hbond]
            energy-cutoff = -0.7

            [helix]
            min-length = 5
            "#,
        )
        .unwrap();
        let config = partial.merge_with_cli(&cli(&[])).unwrap();

        assert_eq!(config.hbond_cutoff, -0.7);
        assert_eq!(config.min_helix_length, 5);
        assert_eq!(config.min_strand_length, 2);
        assert!(config.detect_pi_helices);
    }

    #[test]
    fn set_values_override_the_file_and_flags_override_both() {
        let partial = PartialAssignmentConfig::from_toml(
            r#"
            [helix]
            min-length = 5
            pi-helices = true

            [strand]
            min-length = 4
            beta-bulges = true
            "#,
        )
        .unwrap();
        let args = cli(&[
            "-S",
            "helix.min-length=6",
            "-S",
            "strand.min-length=2",
            "-m",
            "7",
            "--no-pi-helices",
            "-B",
        ]);
        let config = partial.merge_with_cli(&args).unwrap();

        assert_eq!(config.min_helix_length, 7);
        assert_eq!(config.min_strand_length, 2);
        assert!(!config.detect_pi_helices);
        assert!(!config.detect_beta_bulges);
    }

    #[test]
    fn preset_flag_beats_preset_in_file() {
        let partial = PartialAssignmentConfig::from_toml("preset = \"ksdssp\"").unwrap();
        let config = partial
            .merge_with_cli(&cli(&["--preset", "standard"]))
            .unwrap();
        assert_eq!(config, AssignmentConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(PartialAssignmentConfig::from_toml("[helix]\nmin-lenght = 3").is_err());
        assert!(PartialAssignmentConfig::from_toml("threads = 3").is_err());

        let result = PartialAssignmentConfig::default()
            .merge_with_cli(&cli(&["-S", "helix.max-length=3"]));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        for bad in ["helix.min-length", "helix.min-length=three", "preset=fast"] {
            let result = PartialAssignmentConfig::default().merge_with_cli(&cli(&["-S", bad]));
            assert!(matches!(result, Err(CliError::Config(_))), "{} was accepted", bad);
        }
    }

    #[test]
    fn invalid_values_fail_validation() {
        let result = PartialAssignmentConfig::default().merge_with_cli(&cli(&["-m", "0"]));
        assert!(matches!(result, Err(CliError::InvalidParameters(_))));
    }

    #[test]
    fn config_is_loaded_from_a_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ksdssp.toml");
        fs::write(&path, "[strand]\nbeta-bulges = false\n").unwrap();

        let config = PartialAssignmentConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&cli(&[]))
            .unwrap();
        assert!(!config.detect_beta_bulges);

        fs::write(&path, "[strand]\nbeta-bulges = 3\n").unwrap();
        assert!(matches!(
            PartialAssignmentConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));
    }
}
