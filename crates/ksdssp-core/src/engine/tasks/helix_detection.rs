use super::hbond_detection::HBondMatrix;
use crate::core::models::secondary::{HelixClass, HelixKind, ResidueFlags, TurnOffset};
use crate::core::utils::geometry::dihedral_angle;
use crate::engine::context::{Backbone, Context};
use crate::engine::progress::Progress;
use tracing::{debug, info, instrument};

/// A reported helix: an inclusive range of residue positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelixRun {
    pub start: usize,
    pub end: usize,
    pub kind: HelixKind,
    pub class: HelixClass,
}

impl HelixRun {
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..=self.end).contains(&index)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HelixAssignment {
    /// Turn and helix markers, one entry per residue.
    pub flags: Vec<ResidueFlags>,
    pub helices: Vec<HelixRun>,
}

impl HelixAssignment {
    /// Whether the residue belongs to a reported helix.
    pub fn in_helix(&self, index: usize) -> bool {
        self.helices.iter().any(|helix| helix.contains(index))
    }
}

/// Turn offsets examined for a configuration.
pub fn active_offsets(detect_pi_helices: bool) -> Vec<TurnOffset> {
    TurnOffset::ALL
        .into_iter()
        .filter(|offset| detect_pi_helices || *offset != TurnOffset::Five)
        .collect()
}

/// Marks every n-turn: a hydrogen bond from residue i to residue i+n with
/// i..i+n unbroken.
pub fn mark_turns(
    backbone: &Backbone,
    matrix: &HBondMatrix,
    offsets: &[TurnOffset],
    flags: &mut [ResidueFlags],
) {
    for &offset in offsets {
        let n = offset.offset();
        for i in 0..flags.len().saturating_sub(n) {
            if !matrix.contains(i, i + n) || !backbone.contiguous(i, i + n) {
                continue;
            }
            flags[i].insert(offset.acceptor_flag());
            for gap in &mut flags[i + 1..i + n] {
                gap.insert(offset.gap_flag());
            }
            flags[i + n].insert(offset.donor_flag());
        }
    }
}

/// Two consecutive n-turns starting at i-1 and i make residues i..i+n-1 an n-helix.
pub fn mark_helices(offsets: &[TurnOffset], flags: &mut [ResidueFlags]) {
    for &offset in offsets {
        let n = offset.offset();
        let acceptor = offset.acceptor_flag();
        for i in 1..flags.len() {
            if flags[i - 1].contains(acceptor) && flags[i].contains(acceptor) {
                let end = (i + n).min(flags.len());
                for residue in &mut flags[i..end] {
                    residue.insert(offset.helix_flag());
                }
            }
        }
    }
}

/// PDB helix class from the signed CA dihedral over the first four residues.
pub fn helix_class(backbone: &Backbone, start: usize, kind: HelixKind) -> HelixClass {
    if !backbone.contiguous(start, start + 3) {
        return HelixClass::Unknown;
    }
    let ca: Option<Vec<_>> = (start..start + 4)
        .map(|i| backbone.site(i).and_then(|site| site.ca))
        .collect();
    let Some(ca) = ca else {
        return HelixClass::Unknown;
    };
    match dihedral_angle(&ca[0], &ca[1], &ca[2], &ca[3]) {
        Some(angle) => HelixClass::from_handedness(kind, angle > 0.0),
        None => HelixClass::Unknown,
    }
}

/// Maximal unbroken runs of helix-marked residues, at least `min_length` long.
///
/// A run takes the helix family of its first residue.
pub fn collect_helices(
    backbone: &Backbone,
    flags: &[ResidueFlags],
    min_length: usize,
) -> Vec<HelixRun> {
    let mut helices = Vec::new();
    let mut current: Option<(usize, HelixKind)> = None;

    let flush = |start: usize, end: usize, kind: HelixKind, helices: &mut Vec<HelixRun>| {
        if end - start + 1 >= min_length {
            helices.push(HelixRun {
                start,
                end,
                kind,
                class: helix_class(backbone, start, kind),
            });
        }
    };

    for (i, residue) in flags.iter().enumerate() {
        let kind = residue.helix_kind();
        match (current, kind) {
            (Some((start, run_kind)), Some(_)) if backbone.contiguous(i - 1, i) => {
                current = Some((start, run_kind));
            }
            (Some((start, run_kind)), next) => {
                flush(start, i - 1, run_kind, &mut helices);
                current = next.map(|k| (i, k));
            }
            (None, next) => current = next.map(|k| (i, k)),
        }
    }
    if let Some((start, kind)) = current {
        flush(start, flags.len() - 1, kind, &mut helices);
    }
    helices
}

#[instrument(skip_all, name = "helix_detection_task")]
pub fn run(context: &Context, matrix: &HBondMatrix) -> HelixAssignment {
    let offsets = active_offsets(context.config.detect_pi_helices);
    let mut flags = vec![ResidueFlags::empty(); context.backbone.len()];

    context.reporter.report(Progress::TaskStart {
        total_steps: offsets.len() as u64 * 2,
    });
    mark_turns(context.backbone, matrix, &offsets, &mut flags);
    for _ in &offsets {
        context.reporter.report(Progress::TaskIncrement);
    }
    mark_helices(&offsets, &mut flags);
    for _ in &offsets {
        context.reporter.report(Progress::TaskIncrement);
    }
    context.reporter.report(Progress::TaskFinish);

    let helices = collect_helices(context.backbone, &flags, context.config.min_helix_length);
    for helix in &helices {
        debug!(
            start = helix.start,
            end = helix.end,
            kind = ?helix.kind,
            class = helix.class.code(),
            "Helix found."
        );
    }
    info!(helices = helices.len(), "Helix detection complete.");

    HelixAssignment { flags, helices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tasks::fixtures::straight_chains;

    fn backbone(chains: &[(char, usize)]) -> Backbone {
        Backbone::from_structure(&straight_chains(chains))
    }

    fn flags_for(backbone: &Backbone, bonds: &[(usize, usize)], pi: bool) -> Vec<ResidueFlags> {
        let mut matrix = HBondMatrix::new(backbone.len());
        for &(a, d) in bonds {
            matrix.set(a, d);
        }
        let offsets = active_offsets(pi);
        let mut flags = vec![ResidueFlags::empty(); backbone.len()];
        mark_turns(backbone, &matrix, &offsets, &mut flags);
        mark_helices(&offsets, &mut flags);
        flags
    }

    #[test]
    fn single_turn_marks_acceptor_gap_and_donor_only() {
        let backbone = backbone(&[('A', 8)]);
        let flags = flags_for(&backbone, &[(1, 5)], true);
        assert_eq!(flags[1].turn_code(TurnOffset::Four), '>');
        assert_eq!(flags[3].turn_code(TurnOffset::Four), '4');
        assert_eq!(flags[5].turn_code(TurnOffset::Four), '<');
        assert!(flags.iter().all(|f| f.helix_kind().is_none()));
    }

    #[test]
    fn consecutive_turns_make_a_helix() {
        let backbone = backbone(&[('A', 12)]);
        let flags = flags_for(&backbone, &[(1, 5), (2, 6), (3, 7)], true);
        let marked: Vec<_> = (0..12).filter(|&i| flags[i].helix_kind().is_some()).collect();
        assert_eq!(marked, vec![2, 3, 4, 5, 6]);

        let helices = collect_helices(&backbone, &flags, 4);
        assert_eq!(helices.len(), 1);
        assert_eq!((helices[0].start, helices[0].end), (2, 6));
        assert_eq!(helices[0].kind, HelixKind::Alpha);
        assert_eq!(helices[0].len(), 5);
    }

    #[test]
    fn short_helices_are_dropped() {
        let backbone = backbone(&[('A', 10)]);
        let flags = flags_for(&backbone, &[(1, 4), (2, 5)], true);
        assert!(collect_helices(&backbone, &flags, 4).is_empty());
        let kept = collect_helices(&backbone, &flags, 3);
        assert_eq!(kept.len(), 1);
        assert_eq!((kept[0].start, kept[0].end), (2, 4));
        assert_eq!(kept[0].kind, HelixKind::ThreeTen);
    }

    #[test]
    fn turns_do_not_cross_chain_boundaries() {
        let backbone = backbone(&[('A', 4), ('B', 4)]);
        let flags = flags_for(&backbone, &[(1, 5), (2, 6)], true);
        assert!(flags.iter().all(|f| f.is_empty()));
    }

    #[test]
    fn pi_turns_require_pi_detection() {
        let backbone = backbone(&[('A', 12)]);
        let bonds = [(1, 6), (2, 7)];
        let with_pi = flags_for(&backbone, &bonds, true);
        assert_eq!(with_pi[2].helix_kind(), Some(HelixKind::Pi));
        let without_pi = flags_for(&backbone, &bonds, false);
        assert!(without_pi.iter().all(|f| f.is_empty()));
    }

    #[test]
    fn run_takes_the_family_of_its_first_residue() {
        let backbone = backbone(&[('A', 14)]);
        // 3-10 helix at 2..4 directly followed by an alpha helix at 5..9.
        let flags = flags_for(&backbone, &[(1, 4), (2, 5), (4, 8), (5, 9), (6, 10)], true);
        let helices = collect_helices(&backbone, &flags, 3);
        assert_eq!(helices.len(), 1);
        assert_eq!(helices[0].kind, HelixKind::ThreeTen);
        assert_eq!((helices[0].start, helices[0].end), (2, 9));
    }

    #[test]
    fn helix_stops_before_the_final_donor() {
        let backbone = backbone(&[('A', 8)]);
        let flags = flags_for(&backbone, &[(2, 6), (3, 7)], true);
        let helices = collect_helices(&backbone, &flags, 4);
        assert_eq!(helices.len(), 1);
        assert_eq!((helices[0].start, helices[0].end), (3, 6));
        assert_eq!(flags[7].turn_code(TurnOffset::Four), '<');
    }

    #[test]
    fn helix_class_is_unknown_for_degenerate_or_short_runs() {
        let backbone = backbone(&[('A', 5)]);
        // The fixture's CA atoms are collinear.
        assert_eq!(helix_class(&backbone, 0, HelixKind::Alpha), HelixClass::Unknown);
        assert_eq!(helix_class(&backbone, 3, HelixKind::Alpha), HelixClass::Unknown);
    }
}
