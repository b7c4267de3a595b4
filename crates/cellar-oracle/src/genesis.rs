//! Genesis state import and export

use cellar_core::{Cellar, Height, OracleError, OracleParams, Result, VotePeriod};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

use crate::publish::{all_cellars, write_cellar};
use crate::schedule::save_period;
use crate::store::{self, keys, OracleStore};

/// Initial oracle state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisState {
    /// Oracle parameters
    pub params: OracleParams,
    /// Initial canonical cellar state
    pub cellars: Vec<Cellar>,
}

impl GenesisState {
    /// Check parameters, cellar ids are unique and every cellar is well formed.
    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;
        let mut seen = BTreeSet::new();
        for cellar in &self.cellars {
            cellar.validate()?;
            if !seen.insert(cellar.id.as_str()) {
                return Err(OracleError::invalid_message(format!(
                    "duplicate cellar {} in genesis",
                    cellar.id
                )));
            }
        }
        Ok(())
    }

    /// Parse genesis from JSON.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Render genesis as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Write `genesis` into `store` and open the first vote period at `height`.
pub fn init(store: &mut dyn OracleStore, genesis: &GenesisState, height: Height) -> Result<VotePeriod> {
    genesis.validate()?;

    store::set_typed(store, keys::PARAMS_KEY, &genesis.params)?;
    for cellar in &genesis.cellars {
        write_cellar(store, cellar)?;
    }
    let period = VotePeriod::starting_at(height, genesis.params.vote_period);
    save_period(store, &period)?;

    info!(
        cellars = genesis.cellars.len(),
        vote_period = genesis.params.vote_period,
        start_height = period.start_height,
        "genesis initialized"
    );
    Ok(period)
}

/// Parameters written at genesis.
///
/// Every state transition reads them from here.
pub fn load_params(store: &dyn OracleStore) -> Result<OracleParams> {
    store::get_typed(store, keys::PARAMS_KEY)?
        .ok_or_else(|| OracleError::store("params missing from store"))
}

/// Read the exportable state back out of `store`.
///
/// In-flight ledger entries are not part of genesis.
pub fn export(store: &dyn OracleStore) -> Result<GenesisState> {
    Ok(GenesisState {
        params: load_params(store)?,
        cellars: all_cellars(store)?,
    })
}
