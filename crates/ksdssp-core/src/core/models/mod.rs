//! # Core Models Module
//!
//! Data structures describing a protein structure and the secondary structure
//! assigned to it.
//!
//! ## Key Components
//!
//! - [`atom`] - Atoms with element, coordinates and a back-reference to their residue
//! - [`residue`] - Residues owning their atoms and carrying the assigned label
//! - [`chain`] - Chains of residues in input order
//! - [`structure`] - One model: the ordered chains
//! - [`builder`] - Incremental construction of a [`structure::Structure`] by loaders
//! - [`secondary`] - Labels, helix families, PDB helix classes and per-residue flags
//! - [`segment`] - Output records: helix/strand segments, ladders and sheets
//! - [`assignment`] - The complete result of an assignment run
//!
//! ## Usage
//!
//! ```ignore
//! use ksdssp::core::models::builder::StructureBuilder;
//!
//! let mut builder = StructureBuilder::new();
//! builder.start_chain('A');
//! builder.start_residue(1, ' ', "ALA")?;
//! builder.add_atom(1, "N", Point3::new(0.0, 0.0, 0.0))?;
//! let structure = builder.build();
//! ```

pub mod assignment;
pub mod atom;
pub mod builder;
pub mod chain;
pub mod residue;
pub mod secondary;
pub mod segment;
pub mod structure;
