use super::hbond_detection::HBondMatrix;
use super::helix_detection::HelixAssignment;
use crate::core::models::secondary::{BridgeOrientation, ResidueFlags};
use crate::core::models::segment::{Ladder, ResidueSpan};
use crate::engine::context::{Backbone, Context};
use crate::engine::progress::Progress;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument};

/// Largest gap, in residues, bridged when merging ladders across a beta bulge.
const MAX_BULGE_GAP: usize = 4;

/// Bridges keyed by `(i, j)` with `i < j`, in scan order.
pub type BridgeMap = BTreeMap<(usize, usize), BridgeOrientation>;

#[derive(Debug, Clone, Default)]
pub struct BridgeAssignment {
    pub bridges: BridgeMap,
    pub ladders: Vec<Ladder>,
}

/// Classifies residue pairs `i < j` as parallel or antiparallel bridges.
///
/// A term that names a neighbour residue (`i-1`, `j+1`, ...) is false unless
/// that neighbour exists and continues the residue it flanks. Bridge flags
/// are set on both partners.
pub fn find_bridges(
    backbone: &Backbone,
    matrix: &HBondMatrix,
    eligible: impl Fn(usize) -> bool,
    flags: &mut [ResidueFlags],
) -> BridgeMap {
    let hb = |a: Option<usize>, d: Option<usize>| matrix.contains_signed(a, d);
    let mut bridges = BridgeMap::new();

    for i in (0..backbone.len()).filter(|&i| eligible(i)) {
        let (i_prev, i_next) = (backbone.neighbor(i, -1), backbone.neighbor(i, 1));
        for j in (i + 1..backbone.len()).filter(|&j| eligible(j)) {
            let (j_prev, j_next) = (backbone.neighbor(j, -1), backbone.neighbor(j, 1));
            let (i_, j_) = (Some(i), Some(j));

            let orientation = if (hb(i_prev, j_) && hb(j_, i_next))
                || (hb(j_prev, i_) && hb(i_, j_next))
            {
                BridgeOrientation::Parallel
            } else if (hb(i_, j_) && hb(j_, i_))
                || (hb(i_prev, j_next) && hb(j_prev, i_next))
            {
                BridgeOrientation::Antiparallel
            } else {
                continue;
            };

            let flag = match orientation {
                BridgeOrientation::Parallel => ResidueFlags::PARALLEL_BRIDGE,
                BridgeOrientation::Antiparallel => ResidueFlags::ANTIPARALLEL_BRIDGE,
            };
            flags[i].insert(flag);
            flags[j].insert(flag);
            bridges.insert((i, j), orientation);
        }
    }
    bridges
}

/// Groups consecutive bridges of one orientation into ladders.
///
/// Parallel ladders grow along `(i+k, j+k)`, antiparallel ones along
/// `(i+k, j-k)`; both sides must stay unbroken.
pub fn build_ladders(backbone: &Backbone, bridges: &BridgeMap) -> Vec<Ladder> {
    let mut consumed = BTreeSet::new();
    let mut ladders = Vec::new();

    for (&(i, j), &orientation) in bridges {
        if !consumed.insert((i, j)) {
            continue;
        }
        let mut k = 0;
        loop {
            let next = match orientation {
                BridgeOrientation::Parallel => Some((i + k + 1, j + k + 1)),
                BridgeOrientation::Antiparallel => {
                    j.checked_sub(k + 1).map(|partner| (i + k + 1, partner))
                }
            };
            let Some(next) = next else { break };
            if bridges.get(&next) != Some(&orientation)
                || !backbone.contiguous(i, next.0)
                || !backbone.contiguous(j, next.1)
            {
                break;
            }
            consumed.insert(next);
            k += 1;
        }

        let first = ResidueSpan::new(i, i + k);
        let second = match orientation {
            BridgeOrientation::Parallel => ResidueSpan::new(j, j + k),
            BridgeOrientation::Antiparallel => ResidueSpan::new(j - k, j),
        };
        ladders.push(Ladder::new(orientation, first, second));
    }
    ladders
}

/// Merges two ladders of one orientation separated by a beta bulge.
///
/// The gap on one side may be up to four residues, on the other at most one.
/// The merged sides must be unbroken and free of residues for which
/// `blocked` holds.
pub fn merge_bulge(
    backbone: &Backbone,
    a: &Ladder,
    b: &Ladder,
    blocked: impl Fn(usize) -> bool,
) -> Option<Ladder> {
    if a.orientation != b.orientation {
        return None;
    }
    let (l1, l2) = if a.sides[0].start > b.sides[0].start {
        (b, a)
    } else {
        (a, b)
    };

    let gap = |from: usize, to: usize| to.checked_sub(from).filter(|&d| d <= MAX_BULGE_GAP);
    let d0 = gap(l1.sides[0].end, l2.sides[0].start)?;
    let d1 = match l1.orientation {
        BridgeOrientation::Parallel => gap(l1.sides[1].end, l2.sides[1].start)?,
        BridgeOrientation::Antiparallel => gap(l2.sides[1].end, l1.sides[1].start)?,
    };
    if d0 > 1 && d1 > 1 {
        return None;
    }

    let first = ResidueSpan::new(l1.sides[0].start, l2.sides[0].end);
    let second = match l1.orientation {
        BridgeOrientation::Parallel => ResidueSpan::new(l1.sides[1].start, l2.sides[1].end),
        BridgeOrientation::Antiparallel => ResidueSpan::new(l2.sides[1].start, l1.sides[1].end),
    };
    for span in [first, second] {
        if !backbone.contiguous(span.start, span.end) || (span.start..=span.end).any(&blocked) {
            return None;
        }
    }

    let mut merged = Ladder::new(l1.orientation, first, second);
    merged.is_bulge = true;
    Some(merged)
}

/// Repeatedly merges the first mergeable pair of non-bulge ladders.
/// Returns the number of merges performed.
pub fn merge_bulges(
    backbone: &Backbone,
    ladders: &mut Vec<Ladder>,
    blocked: impl Fn(usize) -> bool,
) -> usize {
    let mut merges = 0;
    loop {
        let candidate = (0..ladders.len())
            .filter(|&a| !ladders[a].is_bulge)
            .find_map(|a| {
                (a + 1..ladders.len())
                    .filter(|&b| !ladders[b].is_bulge)
                    .find_map(|b| {
                        merge_bulge(backbone, &ladders[a], &ladders[b], &blocked)
                            .map(|merged| (a, b, merged))
                    })
            });
        let Some((a, b, merged)) = candidate else {
            return merges;
        };
        debug!(
            first = ?ladders[a].sides,
            second = ?ladders[b].sides,
            merged = ?merged.sides,
            "Merging ladders across a beta bulge."
        );
        ladders.remove(b);
        ladders.remove(a);
        ladders.push(merged);
        merges += 1;
    }
}

/// Drops ladders with a side shorter than `min_length`.
pub fn prune_ladders(ladders: &mut Vec<Ladder>, min_length: usize) {
    ladders.retain(|ladder| ladder.shortest_side() >= min_length);
}

/// Names ladders by position: upper case for antiparallel, lower case for parallel.
pub fn name_ladders(ladders: &mut [Ladder]) {
    for (index, ladder) in ladders.iter_mut().enumerate() {
        let letter = (b'A' + (index % 26) as u8) as char;
        ladder.name = match ladder.orientation {
            BridgeOrientation::Parallel => letter.to_ascii_lowercase(),
            BridgeOrientation::Antiparallel => letter,
        };
    }
}

#[instrument(skip_all, name = "bridge_detection_task")]
pub fn run(
    context: &Context,
    matrix: &HBondMatrix,
    helices: &mut HelixAssignment,
) -> BridgeAssignment {
    let backbone = context.backbone;
    let in_helix: Vec<bool> = (0..backbone.len()).map(|i| helices.in_helix(i)).collect();
    let blocked = |i: usize| in_helix.get(i).copied().unwrap_or(true);
    let eligible = |i: usize| backbone.is_bondable(i) && !blocked(i);

    context.reporter.report(Progress::TaskStart { total_steps: 4 });

    let bridges = find_bridges(backbone, matrix, eligible, &mut helices.flags);
    context.reporter.report(Progress::TaskIncrement);

    let mut ladders = build_ladders(backbone, &bridges);
    context.reporter.report(Progress::TaskIncrement);

    if context.config.detect_beta_bulges {
        let merges = merge_bulges(backbone, &mut ladders, blocked);
        debug!(merges, "Beta bulge merging complete.");
    }
    context.reporter.report(Progress::TaskIncrement);

    let before = ladders.len();
    prune_ladders(&mut ladders, context.config.min_strand_length);
    context.reporter.report(Progress::TaskIncrement);
    context.reporter.report(Progress::TaskFinish);

    info!(
        bridges = bridges.len(),
        ladders = ladders.len(),
        pruned = before - ladders.len(),
        "Bridge and ladder detection complete."
    );
    BridgeAssignment { bridges, ladders }
}
