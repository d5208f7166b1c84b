//! Passes over the produced output tree.
//!
//! Everything here works on set directories that already exist on disk:
//! alias expansion, cross-set synchronization and coverage inventories.
//! None of these passes deletes or overwrites a file.

pub mod alias;
pub mod fsops;
pub mod inventory;
pub mod sync;

pub use alias::{AliasExpander, ExpandReport};
pub use inventory::{CoverageReport, SetInventory};
pub use sync::{CrossSetSynchronizer, SyncReport};
