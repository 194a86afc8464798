use crate::engine::context::{BackboneSite, Context};
use crate::engine::progress::Progress;
use nalgebra::Point3;
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Electrostatic prefactor of the Kabsch-Sander model: q1·q2·f in kcal·Å/mol.
const ENERGY_PREFACTOR: f64 = 0.42 * 0.20 * 332.0;

/// Pairs whose C and N are further apart than this (squared, Å²) are not evaluated.
const MAX_CN_DISTANCE_SQUARED: f64 = 49.0;

/// A backbone hydrogen bond C=O(acceptor) ··· H-N(donor).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HydrogenBond {
    pub acceptor: usize,
    pub donor: usize,
    /// Kabsch-Sander energy in kcal/mol.
    pub energy: f64,
}

/// Dense boolean relation `hb(acceptor, donor)` over residue positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HBondMatrix {
    size: usize,
    bonds: Vec<bool>,
}

impl HBondMatrix {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            bonds: vec![false; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn set(&mut self, acceptor: usize, donor: usize) {
        if acceptor < self.size && donor < self.size {
            self.bonds[acceptor * self.size + donor] = true;
        }
    }

    /// Whether residue `acceptor`'s C=O bonds residue `donor`'s N-H.
    /// Positions outside the structure are never bonded.
    pub fn contains(&self, acceptor: usize, donor: usize) -> bool {
        acceptor < self.size && donor < self.size && self.bonds[acceptor * self.size + donor]
    }

    /// Like [`contains`](Self::contains), for positions computed by signed
    /// offsets that may fall before the first residue.
    pub fn contains_signed(&self, acceptor: Option<usize>, donor: Option<usize>) -> bool {
        match (acceptor, donor) {
            (Some(a), Some(d)) => self.contains(a, d),
            _ => false,
        }
    }
}

/// Result of the hydrogen bond scan.
#[derive(Debug, Clone, Default)]
pub struct HBondNetwork {
    pub matrix: HBondMatrix,
    /// Every bond found, ordered by acceptor then donor.
    pub bonds: Vec<HydrogenBond>,
}

/// Kabsch-Sander electrostatic energy between a carbonyl (C, O) and an amide (N, H).
pub fn hbond_energy(c: &Point3<f64>, o: &Point3<f64>, n: &Point3<f64>, h: &Point3<f64>) -> f64 {
    let r_on = (o - n).norm();
    let r_ch = (c - h).norm();
    let r_oh = (o - h).norm();
    let r_cn = (c - n).norm();
    ENERGY_PREFACTOR * (1.0 / r_on + 1.0 / r_ch - 1.0 / r_oh - 1.0 / r_cn)
}

fn pair_energy(acceptor: &BackboneSite, donor: &BackboneSite) -> Option<f64> {
    let (c, o) = (acceptor.c?, acceptor.o?);
    let (n, h) = (donor.n?, donor.h?);
    if (c - n).norm_squared() > MAX_CN_DISTANCE_SQUARED {
        return None;
    }
    Some(hbond_energy(&c, &o, &n, &h))
}

fn scan_row(context: &Context, acceptor: usize) -> Vec<HydrogenBond> {
    let backbone = context.backbone;
    let cutoff = context.config.hbond_cutoff;
    let Some(acceptor_site) = backbone.site(acceptor).filter(|s| s.bondable) else {
        return Vec::new();
    };

    backbone
        .sites()
        .iter()
        .enumerate()
        .filter(|(donor, site)| {
            site.bondable
                && (site.chain != acceptor_site.chain || acceptor.abs_diff(*donor) >= 2)
        })
        .filter_map(|(donor, site)| {
            pair_energy(acceptor_site, site)
                .filter(|&energy| energy < cutoff)
                .map(|energy| HydrogenBond {
                    acceptor,
                    donor,
                    energy,
                })
        })
        .collect()
}

#[instrument(skip_all, name = "hbond_detection_task")]
pub fn run(context: &Context) -> HBondNetwork {
    let size = context.backbone.len();
    info!(
        residues = size,
        cutoff = context.config.hbond_cutoff,
        "Detecting backbone hydrogen bonds."
    );
    context.reporter.report(Progress::TaskStart {
        total_steps: size as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = 0..size;

    #[cfg(feature = "parallel")]
    let iterator = (0..size).into_par_iter();

    let rows: Vec<Vec<HydrogenBond>> = iterator
        .map(|acceptor| {
            let row = scan_row(context, acceptor);
            context.reporter.report(Progress::TaskIncrement);
            row
        })
        .collect();

    context.reporter.report(Progress::TaskFinish);

    let mut matrix = HBondMatrix::new(size);
    let bonds: Vec<HydrogenBond> = rows.into_iter().flatten().collect();
    for bond in &bonds {
        matrix.set(bond.acceptor, bond.donor);
    }

    info!(bonds = bonds.len(), "Hydrogen bond detection complete.");
    HBondNetwork { matrix, bonds }
}
