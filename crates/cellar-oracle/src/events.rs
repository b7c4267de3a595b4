//! Oracle events
//!
//! Events are the externally observable trace of every state transition.
//! They are collected per block or per transaction in an [`EventLog`] and
//! handed to the host chain alongside the transition result.

use cellar_core::{Hash32, Height, ValidatorAddress, VotePeriod};
use serde::{Deserialize, Serialize};

/// An observable oracle state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleEvent {
    /// A new vote period opened
    PeriodStarted {
        /// The new period
        period: VotePeriod,
    },
    /// A vote period closed and was aggregated
    PeriodEnded {
        /// The closed period
        period: VotePeriod,
    },
    /// A precommit was accepted
    PrecommitAccepted {
        /// Committing validator
        validator: ValidatorAddress,
        /// Target cellar
        cellar_id: String,
        /// Commitment digest
        hash: Hash32,
        /// Acceptance height
        height: Height,
    },
    /// A commit was accepted
    CommitAccepted {
        /// Revealing validator
        validator: ValidatorAddress,
        /// Target cellar
        cellar_id: String,
        /// Acceptance height
        height: Height,
    },
    /// Aggregated tick ranges became canonical
    RebalancePublished {
        /// Updated cellar
        cellar_id: String,
        /// Number of published tick ranges
        tick_ranges: usize,
        /// Period whose commits produced the result
        period_start: Height,
    },
    /// Aggregation failed for lack of committed voting power
    QuorumNotReached {
        /// Cellar left unchanged
        cellar_id: String,
        /// Voting power behind the commits
        committed: u64,
        /// Total voting power
        total: u64,
        /// Period that failed to reach quorum
        period_start: Height,
    },
    /// An aggregate reached quorum but was not a valid cellar state
    AggregateRejected {
        /// Cellar left unchanged
        cellar_id: String,
        /// Error code of the rejection
        code: String,
        /// Rejection message
        reason: String,
        /// Period whose commits produced the aggregate
        period_start: Height,
    },
}

impl OracleEvent {
    /// Short event type name.
    pub fn kind(&self) -> &'static str {
        match self {
            OracleEvent::PeriodStarted { .. } => "period_started",
            OracleEvent::PeriodEnded { .. } => "period_ended",
            OracleEvent::PrecommitAccepted { .. } => "precommit_accepted",
            OracleEvent::CommitAccepted { .. } => "commit_accepted",
            OracleEvent::RebalancePublished { .. } => "rebalance_published",
            OracleEvent::QuorumNotReached { .. } => "quorum_not_reached",
            OracleEvent::AggregateRejected { .. } => "aggregate_rejected",
        }
    }
}

/// Ordered event buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<OracleEvent>,
}

impl EventLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn emit(&mut self, event: OracleEvent) {
        self.events.push(event);
    }

    /// Append every event from `other`, preserving order.
    pub fn extend(&mut self, other: EventLog) {
        self.events.extend(other.events);
    }

    /// Events in emission order.
    pub fn events(&self) -> &[OracleEvent] {
        &self.events
    }

    /// Remove and return all events.
    pub fn take(&mut self) -> Vec<OracleEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of buffered events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events of the given kind.
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a OracleEvent> + 'a {
        self.events.iter().filter(move |e| e.kind() == kind)
    }
}

impl IntoIterator for EventLog {
    type Item = OracleEvent;
    type IntoIter = std::vec::IntoIter<OracleEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}
