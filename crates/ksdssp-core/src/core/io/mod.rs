//! Provides input/output functionality for structures and assignment reports.
//!
//! Coordinates are read from the fixed-column PDB format. Assignments are
//! written either as PDB `HELIX`/`SHEET` records or as a human-readable
//! summary. Both directions go through the traits in [`traits`].

pub mod pdb;
pub mod records;
pub mod summary;
pub mod traits;
