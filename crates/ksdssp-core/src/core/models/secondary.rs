use bitflags::bitflags;
use std::fmt;

/// Helix families recognised by the assignment, ordered by precedence.
///
/// The derived ordering is significant: when a residue is marked by more than
/// one helix family, the greatest variant wins (`Alpha > ThreeTen > Pi`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HelixKind {
    /// Built from i → i+5 hydrogen bonds.
    Pi,
    /// Built from i → i+3 hydrogen bonds.
    ThreeTen,
    /// Built from i → i+4 hydrogen bonds.
    Alpha,
}

/// The per-residue secondary structure label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SecondaryStructure {
    #[default]
    None,
    Strand,
    Helix(HelixKind),
}

impl SecondaryStructure {
    /// Fixed precedence used to resolve residues that qualify for several types.
    pub const fn priority(self) -> u8 {
        match self {
            SecondaryStructure::None => 0,
            SecondaryStructure::Strand => 1,
            SecondaryStructure::Helix(HelixKind::Pi) => 2,
            SecondaryStructure::Helix(HelixKind::ThreeTen) => 3,
            SecondaryStructure::Helix(HelixKind::Alpha) => 4,
        }
    }

    /// Returns whichever of the two labels has the higher precedence.
    pub fn resolve(self, other: Self) -> Self {
        if other.priority() > self.priority() {
            other
        } else {
            self
        }
    }

    pub const fn is_helix(self) -> bool {
        matches!(self, SecondaryStructure::Helix(_))
    }

    /// One-letter DSSP code (`H`, `G`, `I`, `E`, or blank).
    pub const fn code(self) -> char {
        match self {
            SecondaryStructure::None => ' ',
            SecondaryStructure::Strand => 'E',
            SecondaryStructure::Helix(HelixKind::Alpha) => 'H',
            SecondaryStructure::Helix(HelixKind::ThreeTen) => 'G',
            SecondaryStructure::Helix(HelixKind::Pi) => 'I',
        }
    }
}

impl fmt::Display for SecondaryStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SecondaryStructure::None => "none",
            SecondaryStructure::Strand => "strand",
            SecondaryStructure::Helix(HelixKind::Alpha) => "alpha helix",
            SecondaryStructure::Helix(HelixKind::ThreeTen) => "3-10 helix",
            SecondaryStructure::Helix(HelixKind::Pi) => "pi helix",
        };
        f.write_str(name)
    }
}

/// PDB `HELIX` record class codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelixClass {
    Unknown = 0,
    RightHandedAlpha = 1,
    RightHandedPi = 3,
    RightHandedThreeTen = 5,
    LeftHandedAlpha = 6,
}

impl HelixClass {
    /// Derives the class from the helix family and the sign of the CA dihedral
    /// over the first four residues.
    pub fn from_handedness(kind: HelixKind, right_handed: bool) -> Self {
        match (kind, right_handed) {
            (HelixKind::Alpha, true) => HelixClass::RightHandedAlpha,
            (HelixKind::Pi, true) => HelixClass::RightHandedPi,
            (HelixKind::ThreeTen, true) => HelixClass::RightHandedThreeTen,
            (HelixKind::Alpha, false) => HelixClass::LeftHandedAlpha,
            _ => HelixClass::Unknown,
        }
    }

    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Sense of a strand relative to the previous strand of its sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sense {
    First,
    Parallel,
    Antiparallel,
}

impl Sense {
    pub const fn code(self) -> i8 {
        match self {
            Sense::First => 0,
            Sense::Parallel => 1,
            Sense::Antiparallel => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeOrientation {
    Parallel,
    Antiparallel,
}

impl BridgeOrientation {
    pub const fn sense(self) -> Sense {
        match self {
            BridgeOrientation::Parallel => Sense::Parallel,
            BridgeOrientation::Antiparallel => Sense::Antiparallel,
        }
    }
}

/// Residue offset of a backbone turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnOffset {
    Three = 3,
    Four = 4,
    Five = 5,
}

impl TurnOffset {
    pub const ALL: [TurnOffset; 3] = [TurnOffset::Three, TurnOffset::Four, TurnOffset::Five];

    pub const fn offset(self) -> usize {
        self as usize
    }

    pub const fn helix_kind(self) -> HelixKind {
        match self {
            TurnOffset::Three => HelixKind::ThreeTen,
            TurnOffset::Four => HelixKind::Alpha,
            TurnOffset::Five => HelixKind::Pi,
        }
    }

    pub const fn acceptor_flag(self) -> ResidueFlags {
        match self {
            TurnOffset::Three => ResidueFlags::TURN3_ACCEPTOR,
            TurnOffset::Four => ResidueFlags::TURN4_ACCEPTOR,
            TurnOffset::Five => ResidueFlags::TURN5_ACCEPTOR,
        }
    }

    pub const fn gap_flag(self) -> ResidueFlags {
        match self {
            TurnOffset::Three => ResidueFlags::TURN3_GAP,
            TurnOffset::Four => ResidueFlags::TURN4_GAP,
            TurnOffset::Five => ResidueFlags::TURN5_GAP,
        }
    }

    pub const fn donor_flag(self) -> ResidueFlags {
        match self {
            TurnOffset::Three => ResidueFlags::TURN3_DONOR,
            TurnOffset::Four => ResidueFlags::TURN4_DONOR,
            TurnOffset::Five => ResidueFlags::TURN5_DONOR,
        }
    }

    pub const fn helix_flag(self) -> ResidueFlags {
        match self {
            TurnOffset::Three => ResidueFlags::HELIX_3,
            TurnOffset::Four => ResidueFlags::HELIX_4,
            TurnOffset::Five => ResidueFlags::HELIX_5,
        }
    }
}

bitflags! {
    /// Per-residue markers collected while scanning turns and bridges.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ResidueFlags: u16 {
        const TURN3_ACCEPTOR      = 0x0001;
        const TURN3_GAP           = 0x0002;
        const TURN3_DONOR         = 0x0004;
        const HELIX_3             = 0x0008;
        const TURN4_ACCEPTOR      = 0x0010;
        const TURN4_GAP           = 0x0020;
        const TURN4_DONOR         = 0x0040;
        const HELIX_4             = 0x0080;
        const TURN5_ACCEPTOR      = 0x0100;
        const TURN5_GAP           = 0x0200;
        const TURN5_DONOR         = 0x0400;
        const HELIX_5             = 0x0800;
        const PARALLEL_BRIDGE     = 0x1000;
        const ANTIPARALLEL_BRIDGE = 0x2000;
    }
}

const HELIX_FLAGS: ResidueFlags = ResidueFlags::HELIX_3
    .union(ResidueFlags::HELIX_4)
    .union(ResidueFlags::HELIX_5);

impl ResidueFlags {
    /// Highest-precedence helix family whose helix marker is set.
    pub fn helix_kind(self) -> Option<HelixKind> {
        if !self.intersects(HELIX_FLAGS) {
            return None;
        }
        TurnOffset::ALL
            .iter()
            .filter(|offset| self.contains(offset.helix_flag()))
            .map(|offset| offset.helix_kind())
            .max()
    }

    /// Summary character for an n-turn: `>` start, `<` end, `X` both, the
    /// offset digit inside the turn, blank otherwise.
    pub fn turn_code(self, offset: TurnOffset) -> char {
        let starts = self.contains(offset.acceptor_flag());
        let ends = self.contains(offset.donor_flag());
        match (starts, ends) {
            (true, true) => 'X',
            (true, false) => '>',
            (false, true) => '<',
            (false, false) if self.contains(offset.gap_flag()) => {
                char::from_digit(offset.offset() as u32, 10).unwrap_or(' ')
            }
            _ => ' ',
        }
    }

    pub fn bridge_code(self) -> char {
        match (
            self.contains(Self::PARALLEL_BRIDGE),
            self.contains(Self::ANTIPARALLEL_BRIDGE),
        ) {
            (true, true) => '+',
            (true, false) => 'p',
            (false, true) => 'A',
            (false, false) => ' ',
        }
    }
}
