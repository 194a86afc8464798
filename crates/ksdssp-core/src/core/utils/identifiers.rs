use phf::{Set, phf_set};

/// Backbone atoms a residue needs to take part in hydrogen bonding, in backbone order.
pub const REQUIRED_BACKBONE_ATOMS: [&str; 4] = ["N", "CA", "C", "O"];

static AMIDE_HYDROGEN_NAMES: Set<&'static str> = phf_set! { "H", "HN" };

pub fn is_amide_hydrogen(atom_name: &str) -> bool {
    AMIDE_HYDROGEN_NAMES.contains(atom_name.trim())
}
