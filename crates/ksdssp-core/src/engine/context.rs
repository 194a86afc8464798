use super::config::AssignmentConfig;
use super::error::StructuralError;
use super::progress::ProgressReporter;
use crate::core::models::residue::Residue;
use crate::core::models::segment::ResidueKey;
use crate::core::models::structure::Structure;
use crate::core::utils::geometry::{AMIDE_BOND_LENGTH, calculate_hn_position};
use itertools::Itertools;
use nalgebra::Point3;
use tracing::{debug, warn};

/// Backbone coordinates of one residue, addressed by its position in structure order.
#[derive(Debug, Clone)]
pub struct BackboneSite {
    pub key: ResidueKey,
    /// Ordinal of the owning chain within the structure.
    pub chain: usize,
    pub n: Option<Point3<f64>>,
    pub ca: Option<Point3<f64>>,
    pub c: Option<Point3<f64>>,
    pub o: Option<Point3<f64>>,
    /// Amide hydrogen, read from the input or placed from the backbone.
    pub h: Option<Point3<f64>>,
    /// Complete backbone in a chain that takes part in the assignment.
    pub bondable: bool,
    /// Identifier of the contiguous run this residue belongs to; `None` for
    /// residues of excluded chains.
    run: Option<usize>,
}

/// Flattened, validated view of a structure's backbone.
#[derive(Debug, Clone, Default)]
pub struct Backbone {
    sites: Vec<BackboneSite>,
    diagnostics: Vec<StructuralError>,
}

impl Backbone {
    pub fn from_structure(structure: &Structure) -> Self {
        let mut sites = Vec::with_capacity(structure.residue_count());
        let mut diagnostics = Vec::new();

        for (chain_ordinal, chain) in structure.chains().iter().enumerate() {
            let chain_error = validate_chain(chain.id, chain.residues());
            if let Some(error) = &chain_error {
                warn!(chain = %chain.id, "{}", error);
            }
            let chain_ok = chain_error.is_none();
            diagnostics.extend(chain_error);

            for residue in chain.residues() {
                let index = sites.len();
                let key = ResidueKey::new(index, residue);
                let missing = residue.missing_backbone_atoms();
                if chain_ok && !missing.is_empty() {
                    let error = StructuralError::InputIncomplete {
                        residue: key.clone(),
                        missing: missing.clone(),
                    };
                    debug!("{}", error);
                    diagnostics.push(error);
                }
                sites.push(BackboneSite {
                    key,
                    chain: chain_ordinal,
                    n: position(residue, "N"),
                    ca: position(residue, "CA"),
                    c: position(residue, "C"),
                    o: position(residue, "O"),
                    h: residue.amide_hydrogen().map(|atom| atom.position),
                    bondable: chain_ok && missing.is_empty(),
                    run: chain_ok.then_some(0),
                });
            }
        }

        assign_runs(&mut sites);
        place_amide_hydrogens(&mut sites);

        Self { sites, diagnostics }
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn sites(&self) -> &[BackboneSite] {
        &self.sites
    }

    pub fn site(&self, index: usize) -> Option<&BackboneSite> {
        self.sites.get(index)
    }

    pub fn diagnostics(&self) -> &[StructuralError] {
        &self.diagnostics
    }

    pub fn is_bondable(&self, index: usize) -> bool {
        self.sites.get(index).is_some_and(|site| site.bondable)
    }

    /// Whether both residues lie in the same unbroken run of one chain.
    ///
    /// Runs are intervals of structure order, so this also holds for every
    /// residue between `a` and `b`.
    pub fn contiguous(&self, a: usize, b: usize) -> bool {
        match (self.run_of(a), self.run_of(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// Position `delta` residues away from `index`, when it exists and is
    /// contiguous with `index`.
    pub fn neighbor(&self, index: usize, delta: isize) -> Option<usize> {
        let other = index.checked_add_signed(delta)?;
        self.contiguous(index, other).then_some(other)
    }

    fn run_of(&self, index: usize) -> Option<usize> {
        self.sites.get(index).and_then(|site| site.run)
    }
}

fn position(residue: &Residue, name: &str) -> Option<Point3<f64>> {
    residue.atom(name).map(|atom| atom.position)
}

fn validate_chain(chain_id: char, residues: &[Residue]) -> Option<StructuralError> {
    if residues.is_empty() {
        return Some(StructuralError::EmptyChain { chain_id });
    }
    if residues.len() < 2 {
        return Some(StructuralError::TooShortChain {
            chain_id,
            residues: residues.len(),
        });
    }
    residues
        .iter()
        .find(|residue| residue.atoms().is_empty())
        .map(|residue| StructuralError::MalformedStructure {
            chain_id,
            reason: format!("residue {} {} has no atoms", residue.name, residue.display_id()),
        })
}

/// Residue `cur` continues `prev` when both are in the same participating
/// chain and the sequence number steps by 0 (insertion codes) or 1.
fn continues(prev: &BackboneSite, cur: &BackboneSite) -> bool {
    prev.chain == cur.chain
        && prev.run.is_some()
        && cur.run.is_some()
        && matches!(cur.key.seq_num - prev.key.seq_num, 0 | 1)
}

fn assign_runs(sites: &mut [BackboneSite]) {
    let breaks: Vec<bool> = sites
        .iter()
        .tuple_windows()
        .map(|(prev, cur)| !continues(prev, cur))
        .collect();

    let mut run = 0;
    for (index, site) in sites.iter_mut().enumerate() {
        if index > 0 && breaks[index - 1] {
            run += 1;
        }
        if site.run.is_some() {
            site.run = Some(run);
        }
    }
}

fn place_amide_hydrogens(sites: &mut [BackboneSite]) {
    for index in 1..sites.len() {
        if sites[index].h.is_some() || sites[index].chain != sites[index - 1].chain {
            continue;
        }
        let (prev, cur) = (&sites[index - 1], &sites[index]);
        let placed = match (cur.n, cur.ca, prev.c, prev.o) {
            (Some(n), Some(ca), Some(c), Some(o)) => {
                Some(calculate_hn_position(&n, &ca, &c, &o, AMIDE_BOND_LENGTH))
            }
            _ => None,
        };
        sites[index].h = placed;
    }
}

/// Everything a task needs: the backbone, the parameters and the progress sink.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub backbone: &'a Backbone,
    pub config: &'a AssignmentConfig,
    pub reporter: &'a ProgressReporter<'a>,
}

impl<'a> Context<'a> {
    pub fn new(
        backbone: &'a Backbone,
        config: &'a AssignmentConfig,
        reporter: &'a ProgressReporter<'a>,
    ) -> Self {
        Self {
            backbone,
            config,
            reporter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::builder::StructureBuilder;

    fn add_backbone(builder: &mut StructureBuilder, seq: isize, x: f64) {
        builder.start_residue(seq, ' ', "ALA").unwrap();
        builder.add_atom(1, "N", Point3::new(x, 0.0, 0.0)).unwrap();
        builder.add_atom(2, "CA", Point3::new(x + 1.0, 1.0, 0.0)).unwrap();
        builder.add_atom(3, "C", Point3::new(x + 2.0, 0.0, 0.0)).unwrap();
        builder.add_atom(4, "O", Point3::new(x + 2.0, -1.2, 0.0)).unwrap();
    }

    #[test]
    fn sequence_gaps_and_chain_ends_break_contiguity() {
        let mut builder = StructureBuilder::new();
        builder.start_chain('A');
        add_backbone(&mut builder, 1, 0.0);
        add_backbone(&mut builder, 2, 3.8);
        add_backbone(&mut builder, 2, 7.6);
        add_backbone(&mut builder, 5, 11.4);
        add_backbone(&mut builder, 6, 15.2);
        builder.start_chain('B');
        add_backbone(&mut builder, 7, 19.0);
        add_backbone(&mut builder, 8, 22.8);
        let backbone = Backbone::from_structure(&builder.build());

        assert!(backbone.contiguous(0, 2));
        assert!(!backbone.contiguous(2, 3));
        assert!(backbone.contiguous(3, 4));
        assert!(!backbone.contiguous(4, 5));
        assert!(backbone.contiguous(5, 6));
        assert_eq!(backbone.neighbor(1, -1), Some(0));
        assert_eq!(backbone.neighbor(0, -1), None);
        assert_eq!(backbone.neighbor(6, 1), None);
        assert!(backbone.diagnostics().is_empty());
    }

    #[test]
    fn amide_hydrogen_is_placed_only_after_a_preceding_residue() {
        let mut builder = StructureBuilder::new();
        builder.start_chain('A');
        add_backbone(&mut builder, 1, 0.0);
        add_backbone(&mut builder, 2, 3.8);
        let backbone = Backbone::from_structure(&builder.build());

        assert!(backbone.site(0).unwrap().h.is_none());
        let second = backbone.site(1).unwrap();
        let h = second.h.unwrap();
        let n = second.n.unwrap();
        assert!(((h - n).norm() - AMIDE_BOND_LENGTH).abs() < 1e-9);
    }

    #[test]
    fn explicit_amide_hydrogen_is_kept() {
        let mut builder = StructureBuilder::new();
        builder.start_chain('A');
        add_backbone(&mut builder, 1, 0.0);
        builder.add_atom(5, "H", Point3::new(-0.5, -0.9, 0.0)).unwrap();
        add_backbone(&mut builder, 2, 3.8);
        let backbone = Backbone::from_structure(&builder.build());

        assert_eq!(backbone.site(0).unwrap().h, Some(Point3::new(-0.5, -0.9, 0.0)));
    }

    #[test]
    fn incomplete_residue_keeps_position_but_is_not_bondable() {
        let mut builder = StructureBuilder::new();
        builder.start_chain('A');
        add_backbone(&mut builder, 1, 0.0);
        builder.start_residue(2, ' ', "GLY").unwrap();
        builder.add_atom(5, "CA", Point3::new(4.0, 1.0, 0.0)).unwrap();
        add_backbone(&mut builder, 3, 7.6);
        let backbone = Backbone::from_structure(&builder.build());

        assert_eq!(backbone.len(), 3);
        assert!(backbone.is_bondable(0));
        assert!(!backbone.is_bondable(1));
        assert!(backbone.contiguous(0, 2));
        match backbone.diagnostics() {
            [StructuralError::InputIncomplete { residue, missing }] => {
                assert_eq!(residue.index, 1);
                assert_eq!(missing, &vec!["N", "C", "O"]);
            }
            other => panic!("unexpected diagnostics: {:?}", other),
        }
    }

    #[test]
    fn invalid_chains_are_excluded_with_a_diagnostic() {
        let mut builder = StructureBuilder::new();
        builder.start_chain('A');
        add_backbone(&mut builder, 1, 0.0);
        builder.start_chain('B');
        add_backbone(&mut builder, 1, 10.0);
        builder.start_residue(2, ' ', "ALA").unwrap();
        builder.start_chain('C');
        builder.end_chain();
        let backbone = Backbone::from_structure(&builder.build());

        assert_eq!(
            backbone.diagnostics(),
            &[
                StructuralError::TooShortChain {
                    chain_id: 'A',
                    residues: 1
                },
                StructuralError::MalformedStructure {
                    chain_id: 'B',
                    reason: "residue ALA 2 has no atoms".to_string()
                },
                StructuralError::EmptyChain { chain_id: 'C' },
            ]
        );
        assert!(!backbone.is_bondable(0));
        assert!(!backbone.is_bondable(1));
        assert!(!backbone.contiguous(1, 1));
    }
}
