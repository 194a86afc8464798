use crate::core::io::traits::ReportFormat;
use crate::core::models::assignment::Assignment;
use crate::core::models::secondary::{BridgeOrientation, TurnOffset};
use crate::core::models::segment::{ResidueKey, ResidueSpan};
use std::io::{self, Write};

/// Human-readable diagnostic report of an assignment.
///
/// The report has four sections: helices with their turn offset, ladders with
/// both sides and orientation, sheets with the neighbours of each ladder in
/// traversal order, and one line per residue with its label, turn markers and
/// bridge marker.
pub struct SummaryReport;

fn residue_tag(residue: Option<&ResidueKey>) -> String {
    match residue {
        Some(key) => format!(
            "{:>4}{}[{}]",
            key.seq_num, key.chain_id, key.insertion_code
        ),
        None => format!("{:>4}?[ ]", "?"),
    }
}

fn span_tag(assignment: &Assignment, span: &ResidueSpan) -> String {
    format!(
        "{} -> {}",
        residue_tag(assignment.residue(span.start).map(|r| &r.key)),
        residue_tag(assignment.residue(span.end).map(|r| &r.key))
    )
}

impl ReportFormat for SummaryReport {
    type Error = io::Error;

    fn write_to(assignment: &Assignment, writer: &mut impl Write) -> Result<(), Self::Error> {
        writeln!(writer, "Helix Summary")?;
        for helix in assignment.helices() {
            let class = helix
                .as_helix()
                .map(|info| info.class.code())
                .unwrap_or_default();
            writeln!(
                writer,
                "{:>2}: {} -> {}",
                class,
                residue_tag(Some(&helix.start)),
                residue_tag(Some(&helix.end))
            )?;
        }
        writeln!(writer)?;

        writeln!(writer, "Ladder Summary")?;
        for ladder in &assignment.ladders {
            let orientation = match ladder.orientation {
                BridgeOrientation::Parallel => "parallel",
                BridgeOrientation::Antiparallel => "antiparallel",
            };
            writeln!(
                writer,
                "{} {} {:<12} {}",
                ladder.name,
                span_tag(assignment, &ladder.sides[0]),
                orientation,
                span_tag(assignment, &ladder.sides[1])
            )?;
        }
        writeln!(writer)?;

        writeln!(writer, "Sheet Summary")?;
        let neighbor_name = |neighbor: Option<usize>| {
            neighbor
                .and_then(|idx| assignment.ladders.get(idx))
                .map_or('-', |l| l.name)
        };
        for sheet in &assignment.sheets {
            writeln!(writer, "Sheet {}:", sheet.id)?;
            for ladder in sheet.ladders.iter().filter_map(|&i| assignment.ladders.get(i)) {
                writeln!(
                    writer,
                    "\tLadder {}: {} {}",
                    ladder.name,
                    neighbor_name(ladder.neighbors[0]),
                    neighbor_name(ladder.neighbors[1])
                )?;
            }
        }
        writeln!(writer)?;

        writeln!(writer, "Residue Summary")?;
        for residue in &assignment.residues {
            let name: String = residue.key.name.chars().take(4).collect();
            writeln!(
                writer,
                "{:>4} {} -> {} {} {} {} {}",
                name,
                residue_tag(Some(&residue.key)),
                residue.label.code(),
                residue.flags.turn_code(TurnOffset::Three),
                residue.flags.turn_code(TurnOffset::Four),
                residue.flags.turn_code(TurnOffset::Five),
                residue.flags.bridge_code()
            )?;
        }
        Ok(())
    }
}
