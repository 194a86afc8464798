//! # Workflows Module
//!
//! High-level entry points that run the complete secondary structure
//! assignment on a structure.
//!
//! ## Overview
//!
//! A workflow validates the configuration, builds the backbone context, runs
//! the engine tasks in order and turns their results into an
//! [`Assignment`](crate::core::models::assignment::Assignment): ordered,
//! non-overlapping helix and strand segments, the sheets they belong to,
//! per-residue flags and the structural diagnostics collected on the way.
//!
//! ## Architecture
//!
//! - **Classification Workflow** ([`classify`]) - hydrogen bonds, turns and
//!   helices, bridges and ladders, sheets and strand registration, then
//!   labelling of every residue.

pub mod classify;
