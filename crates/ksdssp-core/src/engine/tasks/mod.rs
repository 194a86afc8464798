//! Individual stages of the assignment pipeline.
//!
//! Each task reads the shared [`Context`](super::context::Context) and the
//! outputs of earlier tasks and returns its own result; none of them touch
//! the structure. The workflow in [`crate::workflows::classify`] runs them in
//! order: hydrogen bonds, helices, bridges and ladders, sheets.

pub mod bridge_detection;
pub mod hbond_detection;
pub mod helix_detection;
pub mod sheet_assembly;

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::core::models::builder::StructureBuilder;
    use crate::core::models::structure::Structure;
    use nalgebra::Point3;

    /// Chains of complete, evenly spaced residues numbered from 1. Only
    /// contiguity matters to callers; hydrogen bonds are supplied separately.
    pub fn straight_chains(chains: &[(char, usize)]) -> Structure {
        let mut builder = StructureBuilder::new();
        let mut x = 0.0;
        for &(id, len) in chains {
            builder.start_chain(id);
            for seq in 1..=len as isize {
                builder.start_residue(seq, ' ', "ALA").unwrap();
                builder.add_atom(1, "N", Point3::new(x, 0.0, 0.0)).unwrap();
                builder.add_atom(2, "CA", Point3::new(x + 1.2, 0.8, 0.0)).unwrap();
                builder.add_atom(3, "C", Point3::new(x + 2.4, 0.0, 0.0)).unwrap();
                builder.add_atom(4, "O", Point3::new(x + 2.4, -1.2, 0.0)).unwrap();
                x += 3.8;
            }
        }
        builder.build()
    }
}
