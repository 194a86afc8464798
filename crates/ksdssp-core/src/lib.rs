//! # KSDSSP Core Library
//!
//! Kabsch-Sander secondary structure assignment for protein backbones, with
//! PDB `HELIX`/`SHEET` record output.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Structure`, segments,
//!   ladders and sheets), geometry helpers, the PDB loader and the report writers.
//!
//! - **[`engine`]: The Logic Core.** Configuration, errors, progress reporting,
//!   the validated backbone context and the assignment tasks: hydrogen bond
//!   detection, turns and helices, bridges and ladders, sheet assembly.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together.
//!   [`workflows::classify::run`] assigns secondary structure to one model and
//!   labels every residue.

pub mod core;
pub mod engine;
pub mod workflows;
