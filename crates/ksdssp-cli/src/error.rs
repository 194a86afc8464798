use ksdssp::core::io::pdb::PdbError;
use ksdssp::engine::config::ConfigError;
use ksdssp::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid assignment parameters: {0}")]
    InvalidParameters(#[from] ConfigError),

    #[error("Failed to parse configuration file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to read structure from '{input}': {source}")]
    Structure {
        input: String,
        #[source]
        source: PdbError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
