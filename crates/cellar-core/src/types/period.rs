//! Vote period bounds and phase derivation

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::params::Ratio;

/// Block height.
pub type Height = u64;

/// Phase of a vote period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Hash-only commitments are accepted
    Precommit,
    /// Revealed allocations are accepted
    Reveal,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Precommit => f.write_str("precommit"),
            Phase::Reveal => f.write_str("reveal"),
        }
    }
}

/// Current vote period bounds.
///
/// The period covers heights `start_height..=end_height`. It is derived from
/// height notifications only; submitters never move it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VotePeriod {
    /// First height of the period; also its identifier in store keys
    pub start_height: Height,
    /// Last height of the period
    pub end_height: Height,
    /// Latest height seen
    pub current_height: Height,
}

impl VotePeriod {
    /// Open a period at `height` lasting `vote_period` blocks.
    pub fn starting_at(height: Height, vote_period: u64) -> Self {
        Self {
            start_height: height,
            end_height: height.saturating_add(vote_period),
            current_height: height,
        }
    }

    /// Whether `height` lies inside this period.
    pub fn contains(&self, height: Height) -> bool {
        (self.start_height..=self.end_height).contains(&height)
    }

    /// First height of the reveal phase.
    pub fn reveal_start(&self, precommit_share: Ratio) -> Height {
        let length = self.end_height - self.start_height;
        self.start_height + precommit_share.floor_of(length)
    }

    /// Phase at `height`, or `None` when the height is outside the period.
    pub fn phase_at(&self, height: Height, precommit_share: Ratio) -> Option<Phase> {
        phase(height, self, precommit_share)
    }
}

impl fmt::Display for VotePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "period [{}, {}] at {}",
            self.start_height, self.end_height, self.current_height
        )
    }
}

/// Phase of `period` at `height`.
///
/// Heights `[start, split)` accept precommits and `[split, end]` accept
/// reveals, where `split = start + floor(length * precommit_share)`.
pub fn phase(height: Height, period: &VotePeriod, precommit_share: Ratio) -> Option<Phase> {
    if !period.contains(height) {
        return None;
    }
    if height < period.reveal_start(precommit_share) {
        Some(Phase::Precommit)
    } else {
        Some(Phase::Reveal)
    }
}
