use crate::core::models::assignment::{Assignment, ResidueAssignment};
use crate::core::models::secondary::SecondaryStructure;
use crate::core::models::segment::{HelixInfo, SecondaryStructureSegment, SegmentKind, Sheet};
use crate::core::models::structure::Structure;
use crate::engine::config::AssignmentConfig;
use crate::engine::context::{Backbone, Context};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks;
use crate::engine::tasks::helix_detection::HelixRun;
use tracing::{info, instrument, warn};

/// Assigns secondary structure to `structure` with the default configuration.
pub fn classify(structure: &mut Structure) -> Result<Assignment, EngineError> {
    run(structure, &AssignmentConfig::default(), &ProgressReporter::new())
}

#[instrument(skip_all, name = "classify_workflow")]
pub fn run(
    structure: &mut Structure,
    config: &AssignmentConfig,
    reporter: &ProgressReporter,
) -> Result<Assignment, EngineError> {
    // === Phase 0: Preparation ===
    reporter.report(Progress::PhaseStart {
        name: "Preparation",
    });
    config.validate()?;
    if structure.chains().is_empty() {
        return Err(EngineError::EmptyStructure);
    }
    let backbone = Backbone::from_structure(structure);
    info!(
        chains = structure.chains().len(),
        residues = backbone.len(),
        diagnostics = backbone.diagnostics().len(),
        "Backbone prepared."
    );
    let context = Context::new(&backbone, config, reporter);
    reporter.report(Progress::PhaseFinish);

    // === Phase 1: Hydrogen bonds ===
    reporter.report(Progress::PhaseStart {
        name: "Hydrogen Bonds",
    });
    let network = tasks::hbond_detection::run(&context);
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Turns and helices ===
    reporter.report(Progress::PhaseStart { name: "Helices" });
    let mut helices = tasks::helix_detection::run(&context, &network.matrix);
    reporter.report(Progress::PhaseFinish);

    // === Phase 3: Bridges and ladders ===
    reporter.report(Progress::PhaseStart { name: "Bridges" });
    let bridges = tasks::bridge_detection::run(&context, &network.matrix, &mut helices);
    reporter.report(Progress::PhaseFinish);

    // === Phase 4: Sheets ===
    reporter.report(Progress::PhaseStart { name: "Sheets" });
    let sheets = tasks::sheet_assembly::run(&context, &network.matrix, bridges.ladders)?;
    reporter.report(Progress::PhaseFinish);

    // === Phase 5: Segments and labels ===
    reporter.report(Progress::PhaseStart { name: "Labelling" });
    let segments = collect_segments(&backbone, &helices.helices, &sheets.sheets)?;
    let labels = label_residues(backbone.len(), &segments);
    structure.apply_labels(&labels);

    let residues = backbone
        .sites()
        .iter()
        .zip(helices.flags)
        .zip(&labels)
        .map(|((site, flags), &label)| ResidueAssignment {
            key: site.key.clone(),
            flags,
            label,
        })
        .collect();
    reporter.report(Progress::PhaseFinish);

    info!(
        helices = helices.helices.len(),
        sheets = sheets.sheets.len(),
        segments = segments.len(),
        "Secondary structure assignment complete."
    );
    Ok(Assignment {
        segments,
        sheets: sheets.sheets,
        ladders: sheets.ladders,
        residues,
        diagnostics: backbone.diagnostics().to_vec(),
    })
}

/// Helix segments numbered from 1, then strands, ordered by start residue.
/// A strand that would overlap an accepted segment is left out.
fn collect_segments(
    backbone: &Backbone,
    helices: &[HelixRun],
    sheets: &[Sheet],
) -> Result<Vec<SecondaryStructureSegment>, EngineError> {
    let mut segments = Vec::with_capacity(helices.len());
    for (serial, helix) in helices.iter().enumerate() {
        let key = |index: usize| {
            backbone.site(index).map(|site| site.key.clone()).ok_or_else(|| {
                EngineError::Internal(format!("helix residue {} lies outside the structure", index))
            })
        };
        segments.push(SecondaryStructureSegment::new(
            SegmentKind::Helix(HelixInfo {
                serial: serial + 1,
                kind: helix.kind,
                class: helix.class,
            }),
            key(helix.start)?,
            key(helix.end)?,
        ));
    }

    for strand in sheets.iter().flat_map(Sheet::unique_strands) {
        if let Some(existing) = segments.iter().find(|s| s.overlaps(strand)) {
            warn!(
                strand = %strand.start.index,
                existing = %existing.start.index,
                "Strand overlaps an assigned segment; leaving it out of the labels."
            );
            continue;
        }
        segments.push(strand.clone());
    }

    segments.sort_by_key(|segment| (segment.start.index, segment.end.index));
    Ok(segments)
}

/// One label per residue: the type of the segment covering it, or `None`.
fn label_residues(count: usize, segments: &[SecondaryStructureSegment]) -> Vec<SecondaryStructure> {
    let mut labels = vec![SecondaryStructure::None; count];
    for segment in segments {
        let label = segment.label();
        for slot in labels
            .iter_mut()
            .take(segment.end.index + 1)
            .skip(segment.start.index)
        {
            *slot = slot.resolve(label);
        }
    }
    labels
}
