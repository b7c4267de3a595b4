//! Domain types shared by every oracle component

pub mod address;
pub mod cellar;
pub mod period;
pub mod vote;

pub use address::{ValidatorAddress, ADDRESS_LEN};
pub use cellar::{Allocation, Cellar, TickRange};
pub use period::{phase, Height, Phase, VotePeriod};
pub use vote::{Commit, Precommit};
