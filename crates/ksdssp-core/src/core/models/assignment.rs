use super::secondary::{ResidueFlags, SecondaryStructure};
use super::segment::{Ladder, ResidueKey, SecondaryStructureSegment, Sheet};
use crate::engine::error::StructuralError;

/// Per-residue outcome of an assignment run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidueAssignment {
    pub key: ResidueKey,
    pub flags: ResidueFlags,
    pub label: SecondaryStructure,
}

/// Everything an assignment run produces for one structure.
#[derive(Debug, Clone, Default)]
pub struct Assignment {
    /// Helix and strand segments ordered by chain, then start residue.
    pub segments: Vec<SecondaryStructureSegment>,
    pub sheets: Vec<Sheet>,
    pub ladders: Vec<Ladder>,
    /// One entry per residue, in structure order.
    pub residues: Vec<ResidueAssignment>,
    /// Non-fatal problems found in the input.
    pub diagnostics: Vec<StructuralError>,
}

impl Assignment {
    pub fn helices(&self) -> impl Iterator<Item = &SecondaryStructureSegment> {
        self.segments.iter().filter(|s| s.as_helix().is_some())
    }

    pub fn strands(&self) -> impl Iterator<Item = &SecondaryStructureSegment> {
        self.segments.iter().filter(|s| s.as_strand().is_some())
    }

    pub fn residue(&self, index: usize) -> Option<&ResidueAssignment> {
        self.residues.get(index)
    }
}
