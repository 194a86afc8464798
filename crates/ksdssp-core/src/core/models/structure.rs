use super::chain::Chain;
use super::residue::Residue;
use super::secondary::SecondaryStructure;

/// One model of a protein structure.
///
/// A `Structure` is built once by a loader (see
/// [`StructureBuilder`](super::builder::StructureBuilder)) and is treated as
/// read-only afterwards, except for the per-residue labels written by the
/// assignment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    pub(crate) chains: Vec<Chain>,
    pub(crate) model_number: Option<i32>,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn model_number(&self) -> Option<i32> {
        self.model_number
    }

    /// All residues in structure order (chain by chain).
    pub fn residues(&self) -> impl Iterator<Item = &Residue> {
        self.chains.iter().flat_map(|chain| chain.residues().iter())
    }

    pub fn residue_count(&self) -> usize {
        self.chains.iter().map(Chain::len).sum()
    }

    pub fn atom_count(&self) -> usize {
        self.residues().map(|residue| residue.atoms().len()).sum()
    }

    /// Residue at a position in structure order.
    pub fn residue_at(&self, index: usize) -> Option<&Residue> {
        self.residues().nth(index)
    }

    pub fn labels(&self) -> Vec<SecondaryStructure> {
        self.residues().map(Residue::label).collect()
    }

    /// Overwrites every residue label, in structure order.
    ///
    /// `labels` must hold exactly one entry per residue; residues beyond the
    /// end of `labels` are reset to [`SecondaryStructure::None`].
    pub(crate) fn apply_labels(&mut self, labels: &[SecondaryStructure]) {
        let mut source = labels.iter().copied();
        for chain in &mut self.chains {
            for residue in chain.residues_mut() {
                residue.set_label(source.next().unwrap_or_default());
            }
        }
    }
}
