use super::atom::Atom;
use super::secondary::SecondaryStructure;
use crate::core::utils::identifiers::{REQUIRED_BACKBONE_ATOMS, is_amide_hydrogen};
use std::collections::HashMap;

/// An amino acid residue: identity, owned atoms and its assigned label.
#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub seq_num: isize,
    /// Insertion code, blank when absent.
    pub insertion_code: char,
    pub chain_id: char,
    /// Three-letter residue name.
    pub name: String,
    atoms: Vec<Atom>,
    atom_name_map: HashMap<String, usize>,
    label: SecondaryStructure,
}

impl Residue {
    pub fn new(seq_num: isize, insertion_code: char, chain_id: char, name: &str) -> Self {
        Self {
            seq_num,
            insertion_code,
            chain_id,
            name: name.trim().to_string(),
            atoms: Vec::new(),
            atom_name_map: HashMap::new(),
            label: SecondaryStructure::None,
        }
    }

    /// Appends an atom. The first atom carrying a given name is the one that
    /// [`atom`](Self::atom) returns; later duplicates (alternate locations) are
    /// kept but never looked up.
    pub fn add_atom(&mut self, atom: Atom) {
        let index = self.atoms.len();
        self.atom_name_map.entry(atom.name.clone()).or_insert(index);
        self.atoms.push(atom);
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom(&self, name: &str) -> Option<&Atom> {
        self.atom_name_map.get(name).map(|&index| &self.atoms[index])
    }

    /// The amide hydrogen, when the input file provides one.
    pub fn amide_hydrogen(&self) -> Option<&Atom> {
        self.atoms.iter().find(|atom| is_amide_hydrogen(&atom.name))
    }

    /// Names of the required backbone atoms (N, CA, C, O) this residue lacks.
    pub fn missing_backbone_atoms(&self) -> Vec<&'static str> {
        REQUIRED_BACKBONE_ATOMS
            .iter()
            .copied()
            .filter(|name| self.atom(name).is_none())
            .collect()
    }

    pub fn has_complete_backbone(&self) -> bool {
        REQUIRED_BACKBONE_ATOMS
            .iter()
            .all(|name| self.atom(name).is_some())
    }

    pub fn label(&self) -> SecondaryStructure {
        self.label
    }

    pub(crate) fn set_label(&mut self, label: SecondaryStructure) {
        self.label = label;
    }

    /// Sequence number and insertion code as usually printed (`52A`).
    pub fn display_id(&self) -> String {
        if self.insertion_code == ' ' {
            self.seq_num.to_string()
        } else {
            format!("{}{}", self.seq_num, self.insertion_code)
        }
    }
}
