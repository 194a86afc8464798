use super::bridge_detection::name_ladders;
use super::hbond_detection::HBondMatrix;
use crate::core::models::secondary::{BridgeOrientation, Sense};
use crate::core::models::segment::{
    AtomRef, Ladder, Registration, ResidueKey, ResidueSpan, SecondaryStructureSegment,
    SegmentKind, Sheet, StrandInfo,
};
use crate::engine::context::{Backbone, Context};
use crate::engine::error::EngineError;
use crate::engine::progress::Progress;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Default)]
pub struct SheetAssembly {
    /// Ladders that belong to a sheet, named, with neighbour links.
    pub ladders: Vec<Ladder>,
    pub sheets: Vec<Sheet>,
}

/// Sheet identifier for the `n`-th sheet of a model: `A`..`Z`, then `AA`, `AB`, ...
pub fn sheet_identifier(n: usize) -> String {
    let mut letters = vec![(b'A' + (n % 26) as u8) as char];
    let mut rest = n / 26;
    while letters.len() < 3 && rest > 0 {
        letters.push((b'A' + (rest % 26) as u8 - 1) as char);
        rest /= 26;
    }
    letters.iter().rev().collect()
}

struct SheetMarker<'a> {
    ladders: &'a mut [Ladder],
}

impl SheetMarker<'_> {
    fn describe(&self, index: usize, side: usize) -> String {
        let ladder = &self.ladders[index];
        format!(
            "{}-{} ({}-{})",
            ladder.sides[side].start,
            ladder.sides[side].end,
            ladder.sides[1 - side].start,
            ladder.sides[1 - side].end
        )
    }

    /// Links two ladders already in the sheet when free sides of both overlap,
    /// which closes a barrel.
    fn close_barrel(&mut self, current: usize, other: usize) {
        if other == current
            || self.ladders[current].neighbors.contains(&Some(other))
            || self.ladders[other].sheet != self.ladders[current].sheet
        {
            return;
        }
        let Some((theirs, mine)) = self.ladders[other].overlaps(&self.ladders[current]) else {
            return;
        };
        if self.ladders[other].neighbors[theirs].is_none()
            && self.ladders[current].neighbors[mine].is_none()
        {
            debug!(
                first = %self.describe(current, mine),
                second = %self.describe(other, theirs),
                "Closing barrel."
            );
            self.ladders[other].neighbors[theirs] = Some(current);
            self.ladders[current].neighbors[mine] = Some(other);
        }
    }

    /// Adds `current` to `sheet`, then every unassigned ladder sharing residues
    /// with it, depth first in ladder order.
    ///
    /// A ladder overlapping a strand that already has a partner on that side is
    /// left unassigned and later starts a sheet of its own.
    fn mark(&mut self, current: usize, sheet: usize, members: &mut Vec<usize>) {
        members.push(current);
        self.ladders[current].sheet = Some(sheet);

        for other in 0..self.ladders.len() {
            if self.ladders[other].sheet.is_some() {
                self.close_barrel(current, other);
                continue;
            }
            let Some((theirs, mine)) = self.ladders[other].overlaps(&self.ladders[current]) else {
                continue;
            };
            let linked = if self.ladders[other].neighbors[theirs].is_some() {
                Some((other, theirs))
            } else if self.ladders[current].neighbors[mine].is_some() {
                Some((current, mine))
            } else {
                None
            };
            if let Some((ladder, side)) = linked {
                warn!(
                    strand = %self.describe(ladder, side),
                    skipped = %self.describe(other, theirs),
                    "Strand is paired with multiple ladders; not linking."
                );
                continue;
            }
            self.ladders[other].neighbors[theirs] = Some(current);
            self.ladders[current].neighbors[mine] = Some(other);
            self.mark(other, sheet, members);
        }
    }
}

/// Groups ladders into sheets by depth-first marking in ladder order.
///
/// Returns the ladders (named, with neighbour links) and, for each sheet, its
/// member ladders in marking order.
pub fn group_ladders(mut ladders: Vec<Ladder>) -> (Vec<Ladder>, Vec<Vec<usize>>) {
    let mut groups = Vec::new();
    let mut marker = SheetMarker {
        ladders: &mut ladders,
    };
    for start in 0..marker.ladders.len() {
        if marker.ladders[start].sheet.is_some() {
            continue;
        }
        let mut members = Vec::new();
        marker.mark(start, groups.len(), &mut members);
        groups.push(members);
    }
    name_ladders(&mut ladders);
    (ladders, groups)
}

/// Ladder order along a sheet, starting from an edge ladder when there is one.
pub fn traverse_sheet(ladders: &[Ladder], members: &[usize]) -> Vec<usize> {
    let Some(&first) = members
        .iter()
        .find(|&&l| ladders[l].neighbor_count() == 1)
        .or_else(|| members.first())
    else {
        return Vec::new();
    };

    let mut order = Vec::with_capacity(members.len());
    let mut previous = None;
    let mut current = Some(first);
    while let Some(ladder) = current {
        if ladder == first && previous.is_some() {
            break;
        }
        order.push(ladder);
        current = ladders[ladder].other_neighbor(previous);
        previous = Some(ladder);
    }
    order
}

/// Builds the strand records of one sheet.
struct StrandWriter<'a> {
    backbone: &'a Backbone,
    matrix: &'a HBondMatrix,
    ladders: &'a [Ladder],
    sheet_id: &'a str,
    strand_count: usize,
}

impl StrandWriter<'_> {
    fn key(&self, index: usize) -> Option<ResidueKey> {
        self.backbone.site(index).map(|site| site.key.clone())
    }

    fn atom(&self, atom_name: &'static str, index: Option<usize>) -> Option<AtomRef> {
        Some(AtomRef {
            atom_name,
            residue: self.key(index?)?,
        })
    }

    /// Sense and registration of the strand on side `1 - previous` of
    /// `ladder` relative to the strand on side `previous`.
    fn register(&self, ladder: &Ladder, previous: usize) -> (Sense, Option<Registration>) {
        let current = 1 - previous;
        let prev_start = ladder.sides[previous].start;
        let (o, n) = match ladder.orientation {
            BridgeOrientation::Parallel => {
                let cur_start = ladder.sides[current].start;
                if self.matrix.contains(prev_start, cur_start + 1) {
                    (Some(prev_start), Some(cur_start + 1))
                } else {
                    (Some(prev_start + 1), Some(cur_start))
                }
            }
            BridgeOrientation::Antiparallel => {
                let cur_end = ladder.sides[current].end;
                if self.matrix.contains(prev_start, cur_end) {
                    (Some(prev_start), Some(cur_end))
                } else {
                    (Some(prev_start + 1), cur_end.checked_sub(1))
                }
            }
        };
        let registration = match (self.atom("N", n), self.atom("O", o)) {
            (Some(current), Some(previous)) => Some(Registration { current, previous }),
            _ => None,
        };
        (ladder.orientation.sense(), registration)
    }

    fn strand(
        &self,
        number: usize,
        span: ResidueSpan,
        sense: Sense,
        registration: Option<Registration>,
    ) -> Result<SecondaryStructureSegment, EngineError> {
        let (Some(start), Some(end)) = (self.key(span.start), self.key(span.end)) else {
            return Err(EngineError::Internal(format!(
                "strand {}-{} of sheet {} lies outside the structure",
                span.start, span.end, self.sheet_id
            )));
        };
        Ok(SecondaryStructureSegment::new(
            SegmentKind::Strand(StrandInfo {
                sheet_id: self.sheet_id.to_string(),
                strand_number: number,
                strand_count: self.strand_count,
                sense,
                registration,
            }),
            start,
            end,
        ))
    }

    fn shared_sides(&self, a: usize, b: usize) -> Result<(usize, usize), EngineError> {
        self.ladders[a].overlaps(&self.ladders[b]).ok_or_else(|| {
            EngineError::Internal(format!(
                "neighbouring ladders {} and {} of sheet {} share no residues",
                self.ladders[a].name, self.ladders[b].name, self.sheet_id
            ))
        })
    }

    /// Strands of a sheet in output order. Barrels repeat the first strand,
    /// now with its registration against the last one, at the end.
    fn write(
        &self,
        order: &[usize],
        cyclic: bool,
    ) -> Result<Vec<SecondaryStructureSegment>, EngineError> {
        let Some((&first, &last)) = order.first().zip(order.last()) else {
            return Ok(Vec::new());
        };
        let mut strands = Vec::with_capacity(order.len() + 1);

        let mut closing = None;
        let mut shared = 0;
        if cyclic {
            let (mine, theirs) = self.shared_sides(first, last)?;
            let span = self.ladders[first].sides[mine].union(&self.ladders[last].sides[theirs]);
            strands.push(self.strand(1, span, Sense::First, None)?);
            let (sense, registration) = self.register(&self.ladders[last], theirs);
            closing = Some(self.strand(1, span, sense, registration)?);
        } else {
            if order.len() > 1 {
                shared = 1 - self.shared_sides(first, order[1])?.0;
            }
            let span = self.ladders[first].sides[shared];
            strands.push(self.strand(1, span, Sense::First, None)?);
        }

        for (position, pair) in order.windows(2).enumerate() {
            let (previous, ladder) = (pair[0], pair[1]);
            let (mine, theirs) = self.shared_sides(ladder, previous)?;
            let span =
                self.ladders[ladder].sides[mine].union(&self.ladders[previous].sides[theirs]);
            let (sense, registration) = self.register(&self.ladders[previous], 1 - theirs);
            strands.push(self.strand(position + 2, span, sense, registration)?);
            shared = mine;
        }

        match closing {
            Some(strand) => strands.push(strand),
            None => {
                let span = self.ladders[last].sides[1 - shared];
                let (sense, registration) = self.register(&self.ladders[last], shared);
                strands.push(self.strand(order.len() + 1, span, sense, registration)?);
            }
        }
        Ok(strands)
    }
}

#[instrument(skip_all, name = "sheet_assembly_task")]
pub fn run(
    context: &Context,
    matrix: &HBondMatrix,
    ladders: Vec<Ladder>,
) -> Result<SheetAssembly, EngineError> {
    let (ladders, groups) = group_ladders(ladders);
    context.reporter.report(Progress::TaskStart {
        total_steps: groups.len() as u64,
    });

    let mut sheets = Vec::with_capacity(groups.len());
    for (index, members) in groups.iter().enumerate() {
        let id = sheet_identifier(index);
        let order = traverse_sheet(&ladders, members);
        if order.len() != members.len() {
            warn!(
                sheet = %id,
                visited = order.len(),
                expected = members.len(),
                "Inconsistent ladder count for sheet."
            );
        }
        let cyclic = order
            .first()
            .is_some_and(|&first| ladders[first].neighbor_count() > 1);
        let strand_count = if cyclic { order.len() } else { order.len() + 1 };

        let writer = StrandWriter {
            backbone: context.backbone,
            matrix,
            ladders: &ladders,
            sheet_id: &id,
            strand_count,
        };
        let strands = writer.write(&order, cyclic)?;
        debug!(
            sheet = %id,
            ladders = order.len(),
            strands = strands.len(),
            cyclic,
            "Sheet assembled."
        );

        sheets.push(Sheet {
            id,
            ladders: order,
            cyclic,
            strands,
        });
        context.reporter.report(Progress::TaskIncrement);
    }
    context.reporter.report(Progress::TaskFinish);

    info!(
        sheets = sheets.len(),
        ladders = ladders.len(),
        "Sheet assembly complete."
    );
    Ok(SheetAssembly { ladders, sheets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tasks::fixtures::straight_chains;

    fn ladder(orientation: BridgeOrientation, s0: (usize, usize), s1: (usize, usize)) -> Ladder {
        Ladder::new(
            orientation,
            ResidueSpan::new(s0.0, s0.1),
            ResidueSpan::new(s1.0, s1.1),
        )
    }

    #[test]
    fn sheet_identifiers_extend_past_z() {
        assert_eq!(sheet_identifier(0), "A");
        assert_eq!(sheet_identifier(25), "Z");
        assert_eq!(sheet_identifier(26), "AA");
        assert_eq!(sheet_identifier(27), "AB");
        assert_eq!(sheet_identifier(52), "BA");
    }

    #[test]
    fn overlapping_ladders_share_a_sheet() {
        let (ladders, groups) = group_ladders(vec![
            ladder(BridgeOrientation::Antiparallel, (2, 5), (12, 15)),
            ladder(BridgeOrientation::Parallel, (30, 33), (40, 43)),
            ladder(BridgeOrientation::Antiparallel, (13, 16), (22, 25)),
        ]);
        assert_eq!(groups, vec![vec![0, 2], vec![1]]);
        assert_eq!(ladders[0].neighbors, [None, Some(2)]);
        assert_eq!(ladders[2].neighbors, [Some(0), None]);
        let names: Vec<_> = ladders.iter().map(|l| l.name).collect();
        assert_eq!(names, vec!['A', 'b', 'C']);
    }

    #[test]
    fn third_ladder_on_a_shared_strand_starts_its_own_sheet() {
        let (ladders, groups) = group_ladders(vec![
            ladder(BridgeOrientation::Antiparallel, (2, 5), (12, 15)),
            ladder(BridgeOrientation::Antiparallel, (12, 15), (22, 25)),
            ladder(BridgeOrientation::Parallel, (13, 14), (32, 33)),
        ]);
        assert_eq!(ladders.len(), 3);
        assert_eq!(groups, vec![vec![0, 1], vec![2]]);
        assert_eq!(ladders[2].neighbors, [None, None]);
        assert_eq!(ladders[2].sheet, Some(1));
    }

    #[test]
    fn conflicting_ladder_keeps_its_strands() {
        let assembly = assemble(
            40,
            vec![
                ladder(BridgeOrientation::Antiparallel, (2, 5), (12, 15)),
                ladder(BridgeOrientation::Antiparallel, (12, 15), (22, 25)),
                ladder(BridgeOrientation::Parallel, (13, 14), (32, 33)),
            ],
            &[],
        );
        assert_eq!(assembly.sheets.len(), 2);
        let spans = |sheet: &Sheet| -> Vec<_> {
            sheet
                .strands
                .iter()
                .map(|s| (s.start.index, s.end.index))
                .collect()
        };
        assert_eq!(spans(&assembly.sheets[0]), vec![(2, 5), (12, 15), (22, 25)]);
        assert_eq!(assembly.sheets[1].id, "B");
        assert_eq!(spans(&assembly.sheets[1]), vec![(13, 14), (32, 33)]);
        assert!(
            assembly.sheets[1]
                .strands
                .iter()
                .all(|s| s.as_strand().unwrap().strand_count == 2)
        );
    }

    #[test]
    fn traversal_starts_at_an_edge_ladder() {
        let (ladders, groups) = group_ladders(vec![
            ladder(BridgeOrientation::Antiparallel, (12, 15), (22, 25)),
            ladder(BridgeOrientation::Antiparallel, (2, 5), (12, 15)),
            ladder(BridgeOrientation::Antiparallel, (22, 25), (32, 35)),
        ]);
        assert_eq!(groups, vec![vec![0, 1, 2]]);
        assert_eq!(traverse_sheet(&ladders, &groups[0]), vec![1, 0, 2]);
    }

    fn assemble(
        chain_len: usize,
        ladders: Vec<Ladder>,
        bonds: &[(usize, usize)],
    ) -> SheetAssembly {
        let backbone = Backbone::from_structure(&straight_chains(&[('A', chain_len)]));
        let mut matrix = HBondMatrix::new(backbone.len());
        for &(a, d) in bonds {
            matrix.set(a, d);
        }
        let config = crate::engine::config::AssignmentConfig::default();
        let reporter = crate::engine::progress::ProgressReporter::new();
        run(&Context::new(&backbone, &config, &reporter), &matrix, ladders).unwrap()
    }

    #[test]
    fn three_stranded_sheet_records() {
        let assembly = assemble(
            40,
            vec![
                ladder(BridgeOrientation::Antiparallel, (2, 5), (12, 15)),
                ladder(BridgeOrientation::Parallel, (12, 15), (22, 25)),
            ],
            &[(2, 15), (12, 23)],
        );
        let sheet = &assembly.sheets[0];
        assert!(!sheet.cyclic);
        let strands: Vec<_> = sheet
            .strands
            .iter()
            .map(|s| {
                let info = s.as_strand().unwrap();
                (info.strand_number, info.strand_count, s.start.index, s.end.index, info.sense)
            })
            .collect();
        assert_eq!(
            strands,
            vec![
                (1, 3, 2, 5, Sense::First),
                (2, 3, 12, 15, Sense::Antiparallel),
                (3, 3, 22, 25, Sense::Parallel),
            ]
        );

        let second = sheet.strands[1].as_strand().unwrap();
        let registration = second.registration.as_ref().unwrap();
        assert_eq!(
            (
                registration.current.atom_name,
                registration.current.residue.index
            ),
            ("N", 15)
        );
        assert_eq!(
            (
                registration.previous.atom_name,
                registration.previous.residue.index
            ),
            ("O", 2)
        );

        let third = sheet.strands[2].as_strand().unwrap();
        let registration = third.registration.as_ref().unwrap();
        assert_eq!(registration.current.residue.index, 23);
        assert_eq!(registration.previous.residue.index, 12);
    }

    #[test]
    fn registration_falls_back_to_the_next_residue_pair() {
        let assembly = assemble(
            20,
            vec![ladder(BridgeOrientation::Antiparallel, (2, 5), (12, 15))],
            &[],
        );
        let last = assembly.sheets[0].strands[1].as_strand().unwrap();
        let registration = last.registration.as_ref().unwrap();
        assert_eq!(registration.previous.residue.index, 3);
        assert_eq!(registration.current.residue.index, 14);
    }

    #[test]
    fn barrel_repeats_its_first_strand() {
        let assembly = assemble(
            50,
            vec![
                ladder(BridgeOrientation::Antiparallel, (2, 5), (12, 15)),
                ladder(BridgeOrientation::Antiparallel, (12, 15), (22, 25)),
                ladder(BridgeOrientation::Antiparallel, (22, 25), (32, 35)),
                ladder(BridgeOrientation::Antiparallel, (3, 6), (32, 35)),
            ],
            &[],
        );
        let sheet = &assembly.sheets[0];
        assert!(sheet.cyclic);
        assert_eq!(sheet.strands.len(), 5);
        assert_eq!(sheet.unique_strands().len(), 4);

        assert_eq!(sheet.ladders, vec![0, 3, 2, 1]);
        let spans: Vec<_> = sheet
            .strands
            .iter()
            .map(|s| (s.start.index, s.end.index))
            .collect();
        assert_eq!(spans, vec![(12, 15), (2, 6), (32, 35), (22, 25), (12, 15)]);

        let first = &sheet.strands[0];
        let closing = &sheet.strands[4];
        assert_eq!(closing.as_strand().unwrap().strand_number, 1);
        assert!(first.as_strand().unwrap().registration.is_none());
        assert!(closing.as_strand().unwrap().registration.is_some());
        assert!(
            sheet
                .strands
                .iter()
                .all(|s| s.as_strand().unwrap().strand_count == 4)
        );
    }
}
