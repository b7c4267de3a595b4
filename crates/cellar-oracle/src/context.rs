//! Execution context for the state-transition function
//!
//! A [`Context`] carries everything a transition may touch: the store, the
//! read-only collaborators and the event buffer. It is passed explicitly to
//! every operation so the oracle holds no hidden global state.

use cellar_core::{CellarRegistry, Result, VotingPowerTable};

use crate::events::{EventLog, OracleEvent};
use crate::store::{OracleStore, StoreTransaction};

/// Borrowed state and collaborators for one block or transaction.
pub struct Context<'a> {
    /// Module state
    pub store: &'a mut dyn OracleStore,
    /// Validator voting power
    pub powers: &'a dyn VotingPowerTable,
    /// Registered cellars
    pub cellars: &'a dyn CellarRegistry,
    /// Events emitted so far
    pub events: EventLog,
}

impl<'a> Context<'a> {
    /// Build a context with an empty event log.
    pub fn new(
        store: &'a mut dyn OracleStore,
        powers: &'a dyn VotingPowerTable,
        cellars: &'a dyn CellarRegistry,
    ) -> Self {
        Self {
            store,
            powers,
            cellars,
            events: EventLog::new(),
        }
    }

    /// Record an event.
    pub fn emit(&mut self, event: OracleEvent) {
        self.events.emit(event);
    }

    /// Run `f` against a buffered copy of this context.
    ///
    /// Store writes and events produced by `f` are kept only if it returns
    /// `Ok`; on error the context is exactly as it was before the call.
    pub fn atomically<T>(&mut self, f: impl FnOnce(&mut Context<'_>) -> Result<T>) -> Result<T> {
        let mut tx = StoreTransaction::new(&mut *self.store);
        let (value, events) = {
            let mut scoped = Context::new(&mut tx, self.powers, self.cellars);
            let value = f(&mut scoped)?;
            (value, scoped.events)
        };
        tx.commit()?;
        self.events.extend(events);
        Ok(value)
    }
}
