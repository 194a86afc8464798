use super::residue::Residue;
use super::secondary::{BridgeOrientation, HelixClass, HelixKind, SecondaryStructure, Sense};

/// Self-contained reference to a residue, used by output records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResidueKey {
    /// Position in structure order.
    pub index: usize,
    pub chain_id: char,
    pub seq_num: isize,
    pub insertion_code: char,
    pub name: String,
}

impl ResidueKey {
    pub fn new(index: usize, residue: &Residue) -> Self {
        Self {
            index,
            chain_id: residue.chain_id,
            seq_num: residue.seq_num,
            insertion_code: residue.insertion_code,
            name: residue.name.clone(),
        }
    }
}

/// A named backbone atom of a particular residue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomRef {
    pub atom_name: &'static str,
    pub residue: ResidueKey,
}

/// Hydrogen-bond registration between a strand and the previous strand of its sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Atom on the current strand (always an amide N).
    pub current: AtomRef,
    /// Atom on the previous strand (always a carbonyl O).
    pub previous: AtomRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelixInfo {
    /// 1-based serial number, sequential per model.
    pub serial: usize,
    pub kind: HelixKind,
    pub class: HelixClass,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrandInfo {
    pub sheet_id: String,
    /// 1-based position of the strand within its sheet.
    pub strand_number: usize,
    /// Number of strands in the sheet.
    pub strand_count: usize,
    pub sense: Sense,
    pub registration: Option<Registration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    Helix(HelixInfo),
    Strand(StrandInfo),
}

/// A contiguous run of residues within one chain sharing a secondary structure type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryStructureSegment {
    pub kind: SegmentKind,
    pub chain_id: char,
    pub start: ResidueKey,
    pub end: ResidueKey,
    pub length: usize,
}

impl SecondaryStructureSegment {
    pub fn new(kind: SegmentKind, start: ResidueKey, end: ResidueKey) -> Self {
        let length = end.index.saturating_sub(start.index) + 1;
        Self {
            kind,
            chain_id: start.chain_id,
            start,
            end,
            length,
        }
    }

    /// Label carried by every residue of the segment.
    pub fn label(&self) -> SecondaryStructure {
        match &self.kind {
            SegmentKind::Helix(info) => SecondaryStructure::Helix(info.kind),
            SegmentKind::Strand(_) => SecondaryStructure::Strand,
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start.index..=self.end.index).contains(&index)
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.start.index <= other.end.index && other.start.index <= self.end.index
    }

    pub fn as_helix(&self) -> Option<&HelixInfo> {
        match &self.kind {
            SegmentKind::Helix(info) => Some(info),
            SegmentKind::Strand(_) => None,
        }
    }

    pub fn as_strand(&self) -> Option<&StrandInfo> {
        match &self.kind {
            SegmentKind::Strand(info) => Some(info),
            SegmentKind::Helix(_) => None,
        }
    }
}

/// Inclusive residue range (positions in structure order) of one ladder side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResidueSpan {
    pub start: usize,
    pub end: usize,
}

impl ResidueSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn intersects(&self, other: &ResidueSpan) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn union(&self, other: &ResidueSpan) -> ResidueSpan {
        ResidueSpan::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// A maximal run of consecutive bridges of one orientation.
///
/// Side 0 is always the side with the lower residue positions. Each side can
/// be shared with at most one neighbouring ladder of the same sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ladder {
    /// `a`..`z` for parallel ladders, `A`..`Z` for antiparallel ones.
    pub name: char,
    pub orientation: BridgeOrientation,
    pub sides: [ResidueSpan; 2],
    /// Whether this ladder was formed by merging across a beta bulge.
    pub is_bulge: bool,
    pub neighbors: [Option<usize>; 2],
    pub sheet: Option<usize>,
}

impl Ladder {
    pub fn new(orientation: BridgeOrientation, first: ResidueSpan, second: ResidueSpan) -> Self {
        Self {
            name: '?',
            orientation,
            sides: [first, second],
            is_bulge: false,
            neighbors: [None, None],
            sheet: None,
        }
    }

    /// First pair of sides `(mine, theirs)` whose residue ranges intersect.
    pub fn overlaps(&self, other: &Ladder) -> Option<(usize, usize)> {
        (0..2)
            .flat_map(|i| (0..2).map(move |j| (i, j)))
            .find(|&(i, j)| self.sides[i].intersects(&other.sides[j]))
    }

    pub fn neighbor_count(&self) -> usize {
        self.neighbors.iter().filter(|n| n.is_some()).count()
    }

    /// The neighbour that is not `previous`, used to walk a sheet end to end.
    pub fn other_neighbor(&self, previous: Option<usize>) -> Option<usize> {
        if self.neighbors[0] == previous {
            self.neighbors[1]
        } else {
            self.neighbors[0]
        }
    }

    pub fn shortest_side(&self) -> usize {
        self.sides[0].len().min(self.sides[1].len())
    }
}

/// Ladders sharing residues, with the strand records derived from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    /// `A`..`Z`, then `AA`, `AB`, ... within a model.
    pub id: String,
    /// Ladder indices in traversal order, from an edge ladder when one exists.
    pub ladders: Vec<usize>,
    /// Whether the ladders close into a barrel.
    pub cyclic: bool,
    /// Strand records in output order. Barrels repeat their first strand at the end.
    pub strands: Vec<SecondaryStructureSegment>,
}

impl Sheet {
    /// Distinct strands, without the closing repeat of a barrel.
    pub fn unique_strands(&self) -> &[SecondaryStructureSegment] {
        if self.cyclic && self.strands.len() > 1 {
            &self.strands[..self.strands.len() - 1]
        } else {
            &self.strands
        }
    }
}
