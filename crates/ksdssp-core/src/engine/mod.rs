//! # Engine Module
//!
//! This module implements the Kabsch-Sander assignment on top of the data
//! structures in [`crate::core`].
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Energy cutoff, minimum lengths and optional detectors
//! - **Context** ([`context`]) - The validated, flattened backbone shared by every task
//! - **Tasks** ([`tasks`]) - Hydrogen bonds, turns and helices, bridges and ladders, sheets
//! - **Progress Monitoring** ([`progress`]) - Phase and task events for front ends
//! - **Error Handling** ([`error`]) - Fatal engine errors and non-fatal structural diagnostics
//!
//! Hydrogen bond detection is row-partitioned and runs on rayon when the
//! `parallel` feature is enabled; rows are merged in order, so the result
//! does not depend on scheduling.

pub mod config;
pub mod context;
pub mod error;
pub mod progress;
pub mod tasks;
