use thiserror::Error;

use super::config::ConfigError;
use crate::core::models::segment::ResidueKey;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Structure contains no chains")]
    EmptyStructure,

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal logic error: {0}")]
    Internal(String),
}

/// Problems in the input that exclude a chain or a residue from the
/// assignment without aborting the run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error(
        "Residue {} {}{} is missing backbone atoms: {}",
        .residue.name,
        .residue.chain_id,
        .residue.seq_num,
        .missing.join(", ")
    )]
    InputIncomplete {
        residue: ResidueKey,
        missing: Vec<&'static str>,
    },

    #[error("Chain '{chain_id}' contains no residues")]
    EmptyChain { chain_id: char },

    #[error("Chain '{chain_id}' has only {residues} residue(s); at least 2 are required")]
    TooShortChain { chain_id: char, residues: usize },

    #[error("Chain '{chain_id}' is malformed: {reason}")]
    MalformedStructure { chain_id: char, reason: String },
}

impl StructuralError {
    /// Whether the error excludes a whole chain rather than a single residue.
    pub fn excludes_chain(&self) -> bool {
        !matches!(self, StructuralError::InputIncomplete { .. })
    }
}
