use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

/// Tunable parameters of a secondary structure assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentConfig {
    /// Hydrogen bond energy threshold in kcal/mol; a pair is bonded when its
    /// energy is strictly below this value.
    pub hbond_cutoff: f64,
    /// Shortest helix segment that is reported.
    pub min_helix_length: usize,
    /// Shortest ladder side that is kept.
    pub min_strand_length: usize,
    /// Merge ladders separated by a beta bulge.
    pub detect_beta_bulges: bool,
    /// Look for i → i+5 turns and pi helices.
    pub detect_pi_helices: bool,
}

pub const DEFAULT_HBOND_CUTOFF: f64 = -0.5;

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            hbond_cutoff: DEFAULT_HBOND_CUTOFF,
            min_helix_length: 4,
            min_strand_length: 2,
            detect_beta_bulges: true,
            detect_pi_helices: true,
        }
    }
}

impl AssignmentConfig {
    /// Parameters reproducing the classic `ksdssp` executable: 3-residue
    /// helices and strands, bulges merged, no pi helices.
    pub fn ksdssp_compatible() -> Self {
        Self {
            hbond_cutoff: DEFAULT_HBOND_CUTOFF,
            min_helix_length: 3,
            min_strand_length: 3,
            detect_beta_bulges: true,
            detect_pi_helices: false,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.hbond_cutoff.is_finite() {
            return Err(ConfigError::InvalidValue {
                parameter: "hbond_cutoff",
                reason: format!("must be a finite number, got {}", self.hbond_cutoff),
            });
        }
        if self.min_helix_length == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "min_helix_length",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.min_strand_length == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "min_strand_length",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct AssignmentConfigBuilder {
    hbond_cutoff: Option<f64>,
    min_helix_length: Option<usize>,
    min_strand_length: Option<usize>,
    detect_beta_bulges: Option<bool>,
    detect_pi_helices: Option<bool>,
}

impl AssignmentConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds every parameter from an existing configuration.
    pub fn from_config(config: &AssignmentConfig) -> Self {
        Self {
            hbond_cutoff: Some(config.hbond_cutoff),
            min_helix_length: Some(config.min_helix_length),
            min_strand_length: Some(config.min_strand_length),
            detect_beta_bulges: Some(config.detect_beta_bulges),
            detect_pi_helices: Some(config.detect_pi_helices),
        }
    }

    pub fn hbond_cutoff(mut self, cutoff: f64) -> Self {
        self.hbond_cutoff = Some(cutoff);
        self
    }
    pub fn min_helix_length(mut self, length: usize) -> Self {
        self.min_helix_length = Some(length);
        self
    }
    pub fn min_strand_length(mut self, length: usize) -> Self {
        self.min_strand_length = Some(length);
        self
    }
    pub fn detect_beta_bulges(mut self, enabled: bool) -> Self {
        self.detect_beta_bulges = Some(enabled);
        self
    }
    pub fn detect_pi_helices(mut self, enabled: bool) -> Self {
        self.detect_pi_helices = Some(enabled);
        self
    }

    pub fn build(self) -> Result<AssignmentConfig, ConfigError> {
        let config = AssignmentConfig {
            hbond_cutoff: self
                .hbond_cutoff
                .ok_or(ConfigError::MissingParameter("hbond_cutoff"))?,
            min_helix_length: self
                .min_helix_length
                .ok_or(ConfigError::MissingParameter("min_helix_length"))?,
            min_strand_length: self
                .min_strand_length
                .ok_or(ConfigError::MissingParameter("min_strand_length"))?,
            detect_beta_bulges: self
                .detect_beta_bulges
                .ok_or(ConfigError::MissingParameter("detect_beta_bulges"))?,
            detect_pi_helices: self
                .detect_pi_helices
                .ok_or(ConfigError::MissingParameter("detect_pi_helices"))?,
        };
        config.validate()?;
        Ok(config)
    }
}
