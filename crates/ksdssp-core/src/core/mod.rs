//! # Core Module
//!
//! This module provides the data structures and stateless helpers the
//! assignment engine is built on.
//!
//! ## Architecture
//!
//! - **Structure Representation** ([`models`]) - Atoms, residues, chains, structures,
//!   and the segments, ladders and sheets an assignment produces
//! - **File I/O** ([`io`]) - PDB coordinate reading and record/summary output
//! - **Utilities** ([`utils`]) - Backbone atom identifiers and vector geometry
//!
//! Nothing in this module knows about hydrogen-bond energies or the
//! assignment rules; those live in [`crate::engine`].

pub mod io;
pub mod models;
pub mod utils;
