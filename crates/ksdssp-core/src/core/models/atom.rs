use nalgebra::Point3;
use std::str::FromStr;

/// Chemical element of an atom as recorded in (or inferred from) a coordinate file.
///
/// Only the elements that commonly appear in protein coordinate files are
/// distinguished; everything else maps to [`Element::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Element {
    H,
    C,
    N,
    O,
    S,
    Se,
    #[default]
    Other,
}

impl Element {
    /// Guesses the element from a trimmed PDB atom name.
    ///
    /// Used when the element columns of an `ATOM` record are blank. Protein atom
    /// names start with their element symbol, with `SE` being the only
    /// two-letter symbol that needs special handling.
    pub fn from_atom_name(name: &str) -> Self {
        let upper = name.trim().to_ascii_uppercase();
        if upper.starts_with("SE") {
            return Element::Se;
        }
        match upper.chars().find(|c| c.is_ascii_alphabetic()) {
            Some('H') | Some('D') => Element::H,
            Some('C') => Element::C,
            Some('N') => Element::N,
            Some('O') => Element::O,
            Some('S') => Element::S,
            _ => Element::Other,
        }
    }
}

impl FromStr for Element {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "H" | "D" => Ok(Element::H),
            "C" => Ok(Element::C),
            "N" => Ok(Element::N),
            "O" => Ok(Element::O),
            "S" => Ok(Element::S),
            "SE" => Ok(Element::Se),
            "" => Err(()),
            _ => Ok(Element::Other),
        }
    }
}

/// A single atom of a residue.
///
/// Atoms are owned by their [`Residue`](super::residue::Residue); the
/// `residue_index` field is a plain back-reference to the residue's position
/// in structure order and carries no ownership.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Serial number from the input file.
    pub serial: usize,
    /// Trimmed atom name (e.g. "CA", "N", "O").
    pub name: String,
    pub element: Element,
    /// Cartesian coordinates in Angstroms.
    pub position: Point3<f64>,
    /// Position of the owning residue in structure order.
    pub residue_index: usize,
}

impl Atom {
    pub fn new(serial: usize, name: &str, position: Point3<f64>) -> Self {
        Self {
            serial,
            name: name.trim().to_string(),
            element: Element::from_atom_name(name),
            position,
            residue_index: 0,
        }
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }
}
