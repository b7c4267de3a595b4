//! Period scheduler
//!
//! Pure transition from one vote period to the next driven only by height
//! notifications. Persistence of the current period is a thin wrapper around
//! the store; the rollover rule itself touches nothing but its arguments.

use cellar_core::{Height, Result, VotePeriod};
use tracing::warn;

use crate::store::{self, keys, OracleStore};

/// Outcome of feeding one height to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleStep {
    /// Period in force after the height was applied
    pub period: VotePeriod,
    /// The period that just closed, if the height rolled it over
    pub ended: Option<VotePeriod>,
}

impl ScheduleStep {
    /// Whether this step closed a period.
    pub fn rolled_over(&self) -> bool {
        self.ended.is_some()
    }
}

/// Apply `height` to `period`.
///
/// Heights at or below the last seen height are ignored. A height past
/// `end_height` closes the period and opens `[height, height + vote_period]`.
pub fn advance(period: &VotePeriod, height: Height, vote_period: u64) -> ScheduleStep {
    if height <= period.current_height {
        warn!(
            height,
            current_height = period.current_height,
            "ignoring non-increasing height"
        );
        return ScheduleStep {
            period: *period,
            ended: None,
        };
    }

    let mut current = *period;
    current.current_height = height;
    if height > current.end_height {
        ScheduleStep {
            period: VotePeriod::starting_at(height, vote_period),
            ended: Some(current),
        }
    } else {
        ScheduleStep {
            period: current,
            ended: None,
        }
    }
}

/// Current vote period, if one has been opened.
pub fn load_period(store: &dyn OracleStore) -> Result<Option<VotePeriod>> {
    store::get_typed(store, keys::PERIOD_KEY)
}

/// Persist the current vote period.
pub fn save_period(store: &mut dyn OracleStore, period: &VotePeriod) -> Result<()> {
    store::set_typed(store, keys::PERIOD_KEY, period)
}
