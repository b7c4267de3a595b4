//! Oracle parameters
//!
//! Parameters are plain serde data so they can travel in genesis files and be
//! loaded from TOML. Fractions are integer ratios; nothing on the consensus
//! path uses floating point.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::errors::{OracleError, Result};

/// An exact fraction `numerator / denominator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ratio {
    /// Numerator
    pub numerator: u64,
    /// Denominator, never zero in a validated configuration
    pub denominator: u64,
}

impl Ratio {
    /// Build a ratio without validation.
    pub const fn new(numerator: u64, denominator: u64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Two thirds, the classic Byzantine supermajority.
    pub const fn two_thirds() -> Self {
        Self::new(2, 3)
    }

    /// One half.
    pub const fn one_half() -> Self {
        Self::new(1, 2)
    }

    /// True when `part / whole >= numerator / denominator`.
    ///
    /// Equivalent to `part >= ceil(whole * numerator / denominator)` for
    /// integer `part`, evaluated without rounding in 128-bit arithmetic.
    pub fn reached(&self, part: u64, whole: u64) -> bool {
        u128::from(part) * u128::from(self.denominator)
            >= u128::from(whole) * u128::from(self.numerator)
    }

    /// `floor(value * numerator / denominator)`.
    pub fn floor_of(&self, value: u64) -> u64 {
        if self.denominator == 0 {
            return 0;
        }
        let scaled = u128::from(value) * u128::from(self.numerator) / u128::from(self.denominator);
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }

    fn is_unit_fraction(&self) -> bool {
        self.denominator > 0 && self.numerator > 0 && self.numerator <= self.denominator
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Parameter validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamsValidationError {
    /// Value is out of acceptable range
    #[error("Field '{field}' must be at least {min} (got {actual})")]
    TooSmall {
        /// Offending field
        field: &'static str,
        /// Smallest accepted value
        min: u64,
        /// Value found
        actual: u64,
    },
    /// Ratio is not in `(0, 1]`
    #[error("Field '{field}' must be a fraction in (0, 1] (got {actual})")]
    InvalidFraction {
        /// Offending field
        field: &'static str,
        /// Ratio found
        actual: Ratio,
    },
    /// A phase of the vote period would contain no heights
    #[error("Precommit share {share} of a {vote_period}-block period leaves an empty phase")]
    EmptyPhase {
        /// Configured precommit share
        share: Ratio,
        /// Configured period length
        vote_period: u64,
    },
}

impl From<ParamsValidationError> for OracleError {
    fn from(err: ParamsValidationError) -> Self {
        OracleError::invalid_params(err.to_string())
    }
}

/// Tunable oracle parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleParams {
    /// Length of a vote period in blocks (`end_height - start_height`)
    pub vote_period: u64,
    /// Fraction of the period, from its start, that accepts precommits
    pub precommit_share: Ratio,
    /// Fraction of total voting power that must commit for aggregation
    pub vote_threshold: Ratio,
    /// Fraction of committed power that must include a tick-range index
    /// for that index to survive aggregation
    pub presence_threshold: Ratio,
}

impl Default for OracleParams {
    fn default() -> Self {
        Self {
            vote_period: 10,
            precommit_share: Ratio::one_half(),
            vote_threshold: Ratio::two_thirds(),
            presence_threshold: Ratio::two_thirds(),
        }
    }
}

impl OracleParams {
    /// Number of heights, counted from the period start, in the precommit phase.
    pub fn precommit_blocks(&self) -> u64 {
        self.precommit_share.floor_of(self.vote_period)
    }

    /// Validate the parameter set.
    pub fn validate(&self) -> std::result::Result<(), ParamsValidationError> {
        if self.vote_period < 2 {
            return Err(ParamsValidationError::TooSmall {
                field: "vote_period",
                min: 2,
                actual: self.vote_period,
            });
        }
        for (field, ratio) in [
            ("precommit_share", self.precommit_share),
            ("vote_threshold", self.vote_threshold),
            ("presence_threshold", self.presence_threshold),
        ] {
            if !ratio.is_unit_fraction() {
                return Err(ParamsValidationError::InvalidFraction {
                    field,
                    actual: ratio,
                });
            }
        }
        // Reveal phase covers [split, end] so it is non-empty whenever the
        // precommit phase stops at or before the period end.
        let precommit_blocks = self.precommit_blocks();
        if precommit_blocks == 0 || precommit_blocks > self.vote_period {
            return Err(ParamsValidationError::EmptyPhase {
                share: self.precommit_share,
                vote_period: self.vote_period,
            });
        }
        Ok(())
    }

    /// Parse and validate parameters from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let params: OracleParams = toml::from_str(content)?;
        params.validate()?;
        Ok(params)
    }

    /// Load and validate parameters from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            OracleError::invalid_params(format!(
                "failed to read params file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Render the parameters as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| OracleError::invalid_params(format!("failed to serialize params: {e}")))
    }
}
