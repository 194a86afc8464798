use super::atom::{Atom, Element};
use super::chain::Chain;
use super::residue::Residue;
use super::structure::Structure;
use nalgebra::Point3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("A chain must be started before adding residues")]
    NoActiveChain,
    #[error("A residue must be started before adding atoms")]
    NoActiveResidue,
}

/// Incrementally assembles a [`Structure`] in file order.
///
/// Unlike a keyed lookup, every call to [`start_chain`](Self::start_chain) and
/// [`start_residue`](Self::start_residue) opens a new record, so a chain
/// identifier that reappears after a `TER` becomes a separate chain.
pub struct StructureBuilder {
    structure: Structure,

    current_chain_idx: Option<usize>,
    has_current_residue: bool,
    residue_count: usize,
}

impl Default for StructureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StructureBuilder {
    pub fn new() -> Self {
        Self {
            structure: Structure::new(),
            current_chain_idx: None,
            has_current_residue: false,
            residue_count: 0,
        }
    }

    pub fn model_number(&mut self, model_number: i32) -> &mut Self {
        self.structure.model_number = Some(model_number);
        self
    }

    pub fn start_chain(&mut self, id: char) -> &mut Self {
        self.structure.chains.push(Chain::new(id));
        self.current_chain_idx = Some(self.structure.chains.len() - 1);
        self.has_current_residue = false;
        self
    }

    /// Closes the current chain; the next residue needs a new `start_chain`.
    pub fn end_chain(&mut self) -> &mut Self {
        self.current_chain_idx = None;
        self.has_current_residue = false;
        self
    }

    pub fn current_chain_id(&self) -> Option<char> {
        self.current_chain_idx
            .map(|idx| self.structure.chains[idx].id)
    }

    pub fn start_residue(
        &mut self,
        seq_num: isize,
        insertion_code: char,
        name: &str,
    ) -> Result<&mut Self, BuildError> {
        let chain_idx = self.current_chain_idx.ok_or(BuildError::NoActiveChain)?;
        let chain = &mut self.structure.chains[chain_idx];
        chain.add_residue(Residue::new(seq_num, insertion_code, chain.id, name));
        self.has_current_residue = true;
        self.residue_count += 1;
        Ok(self)
    }

    pub fn add_atom(
        &mut self,
        serial: usize,
        name: &str,
        position: Point3<f64>,
    ) -> Result<&mut Self, BuildError> {
        let atom = Atom::new(serial, name, position);
        self.push_atom(atom)
    }

    pub fn add_atom_with_element(
        &mut self,
        serial: usize,
        name: &str,
        element: Element,
        position: Point3<f64>,
    ) -> Result<&mut Self, BuildError> {
        let atom = Atom::new(serial, name, position).with_element(element);
        self.push_atom(atom)
    }

    fn push_atom(&mut self, mut atom: Atom) -> Result<&mut Self, BuildError> {
        if !self.has_current_residue {
            return Err(BuildError::NoActiveResidue);
        }
        let chain_idx = self.current_chain_idx.ok_or(BuildError::NoActiveChain)?;
        let residue = self.structure.chains[chain_idx]
            .last_residue_mut()
            .ok_or(BuildError::NoActiveResidue)?;
        atom.residue_index = self.residue_count - 1;
        residue.add_atom(atom);
        Ok(self)
    }

    /// Number of atoms added so far.
    pub fn atom_count(&self) -> usize {
        self.structure.atom_count()
    }

    pub fn build(self) -> Structure {
        self.structure
    }
}
