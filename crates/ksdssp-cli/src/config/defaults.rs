use clap::ValueEnum;
use ksdssp::engine::config::AssignmentConfig;
use serde::Deserialize;

/// Named parameter sets the remaining settings are layered on.
#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// 4-residue helices, 2-residue strands, pi helices on.
    Standard,
    /// Output of the classic ksdssp program: 3-residue helices and strands, no pi helices.
    #[default]
    Ksdssp,
}

impl Preset {
    pub fn config(self) -> AssignmentConfig {
        match self {
            Preset::Standard => AssignmentConfig::default(),
            Preset::Ksdssp => AssignmentConfig::ksdssp_compatible(),
        }
    }
}
