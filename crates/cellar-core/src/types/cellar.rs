//! Cellar configuration types
//!
//! A cellar is a managed vault whose liquidity bands (tick ranges) are set by
//! oracle consensus. The order of `tick_ranges` is significant: it feeds the
//! commitment hash and positional aggregation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{OracleError, Result};

/// One liquidity band proposed for a cellar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickRange {
    /// Upper tick bound (exclusive of `lower`, strictly greater)
    pub upper: u64,
    /// Lower tick bound
    pub lower: u64,
    /// Relative share of liquidity assigned to this band
    pub weight: u64,
}

impl TickRange {
    /// Create a new tick range. Call [`TickRange::validate`] before trusting it.
    pub const fn new(upper: u64, lower: u64, weight: u64) -> Self {
        Self {
            upper,
            lower,
            weight,
        }
    }

    /// Check `upper > lower`.
    pub fn validate(&self) -> Result<()> {
        if self.upper <= self.lower {
            return Err(OracleError::invalid_message(format!(
                "tick range upper {} must be greater than lower {}",
                self.upper, self.lower
            )));
        }
        Ok(())
    }
}

impl fmt::Display for TickRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}) w={}", self.lower, self.upper, self.weight)
    }
}

/// A managed vault and its ordered tick ranges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cellar {
    /// Cellar identity
    pub id: String,
    /// Ordered liquidity bands
    pub tick_ranges: Vec<TickRange>,
}

impl Cellar {
    /// Create a cellar from an id and its ranges.
    pub fn new(id: impl Into<String>, tick_ranges: Vec<TickRange>) -> Self {
        Self {
            id: id.into(),
            tick_ranges,
        }
    }

    /// Check the id is non-empty and every range is well formed.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(OracleError::invalid_message("cellar id cannot be empty"));
        }
        for (index, range) in self.tick_ranges.iter().enumerate() {
            range.validate().map_err(|e| {
                OracleError::invalid_message(format!("cellar {} range {index}: {e}", self.id))
            })?;
        }
        Ok(())
    }
}

/// A proposed cellar configuration plus the submitter's salt.
///
/// Never persisted on its own: its digest is stored by a precommit and its
/// content inside a commit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Allocation {
    /// Proposed cellar configuration
    pub cellar: Cellar,
    /// Submitter-chosen salt mixed into the commitment
    pub salt: String,
}

impl Allocation {
    /// Pair a cellar proposal with a salt.
    pub fn new(cellar: Cellar, salt: impl Into<String>) -> Self {
        Self {
            cellar,
            salt: salt.into(),
        }
    }

    /// Id of the cellar this allocation targets.
    pub fn cellar_id(&self) -> &str {
        &self.cellar.id
    }

    /// Validate the cellar and require a non-empty salt.
    pub fn validate(&self) -> Result<()> {
        self.cellar.validate()?;
        if self.salt.is_empty() {
            return Err(OracleError::invalid_message(format!(
                "allocation for cellar {} has an empty salt",
                self.cellar.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_range_validation() {
        assert!(TickRange::new(200, 100, 10).validate().is_ok());
        assert!(TickRange::new(100, 100, 10).validate().is_err());
        assert!(TickRange::new(50, 100, 0).validate().is_err());
    }

    #[test]
    fn test_cellar_validation_reports_index() {
        let cellar = Cellar::new(
            "cellar-1",
            vec![TickRange::new(200, 100, 10), TickRange::new(1, 2, 3)],
        );
        let err = cellar.validate().unwrap_err();
        assert!(err.to_string().contains("range 1"));
    }

    #[test]
    fn test_allocation_requires_salt() {
        let cellar = Cellar::new("cellar-1", vec![TickRange::new(200, 100, 10)]);
        assert!(Allocation::new(cellar.clone(), "").validate().is_err());
        assert!(Allocation::new(cellar, "salt").validate().is_ok());
    }
}
