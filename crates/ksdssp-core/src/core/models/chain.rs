use super::residue::Residue;

/// A polypeptide chain: residues in input order.
///
/// Residue order follows the file, not sequence numbers; gaps in numbering
/// are preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub id: char,
    residues: Vec<Residue>,
}

impl Chain {
    pub fn new(id: char) -> Self {
        Self {
            id,
            residues: Vec::new(),
        }
    }

    pub fn add_residue(&mut self, residue: Residue) -> usize {
        self.residues.push(residue);
        self.residues.len() - 1
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    pub(crate) fn residues_mut(&mut self) -> &mut [Residue] {
        &mut self.residues
    }

    pub(crate) fn last_residue_mut(&mut self) -> Option<&mut Residue> {
        self.residues.last_mut()
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }
}
