use crate::core::io::traits::ReportFormat;
use crate::core::models::assignment::Assignment;
use crate::core::models::segment::{AtomRef, ResidueKey, SecondaryStructureSegment, SegmentKind};
use std::io::{self, Write};

/// Width of the standard part of a `HELIX` record; the helix length follows it.
const HELIX_RECORD_WIDTH: usize = 71;

/// Writes assignments as PDB `HELIX` and `SHEET` records.
///
/// Helix records of a model come first, followed by the strand records of
/// each sheet in sheet order. Each helix line is padded to 71 columns and
/// carries the helix length in columns 72-76; sheet lines are right-trimmed.
pub struct PdbRecords;

impl ReportFormat for PdbRecords {
    type Error = io::Error;

    fn write_to(assignment: &Assignment, writer: &mut impl Write) -> Result<(), Self::Error> {
        for helix in assignment.helices() {
            if let Some(line) = helix_record(helix) {
                writeln!(writer, "{}", line)?;
            }
        }
        for sheet in &assignment.sheets {
            for strand in &sheet.strands {
                if let Some(line) = sheet_record(strand) {
                    writeln!(writer, "{}", line)?;
                }
            }
        }
        Ok(())
    }
}

impl PdbRecords {
    /// Writes several models, separating them the way multi-model PDB files are.
    ///
    /// A single model is written as bare records. With more than one, each
    /// model after the first is preceded by `END`, a `MODEL` record is written
    /// for models that carry a number, and the output is terminated by `END`.
    pub fn write_models<'a>(
        models: impl IntoIterator<Item = (Option<i32>, &'a Assignment)>,
        writer: &mut impl Write,
    ) -> io::Result<()> {
        let mut written = 0;
        for (model_number, assignment) in models {
            if written > 0 {
                writeln!(writer, "END")?;
            }
            if let Some(number) = model_number {
                writeln!(writer, "MODEL     {:>4}", number)?;
            }
            Self::write_to(assignment, writer)?;
            written += 1;
        }
        if written > 1 {
            writeln!(writer, "END")?;
        }
        Ok(())
    }
}

/// Formats a residue as `name chain seqicode` with the given sequence-number width.
fn residue_fields(residue: &ResidueKey, seq_width: usize) -> String {
    format!(
        "{:>3} {}{:>width$}{}",
        residue.name,
        residue.chain_id,
        residue.seq_num,
        residue.insertion_code,
        width = seq_width
    )
}

/// Left-justifies one-to-three character atom names in column 2 of a 4-column field.
fn atom_name_field(name: &str) -> String {
    if name.len() >= 4 {
        name.to_string()
    } else {
        format!(" {:<3}", name)
    }
}

fn registration_fields(atom: &AtomRef) -> String {
    format!(
        "{}{:>3} {}{:>4}{}",
        atom_name_field(atom.atom_name),
        atom.residue.name,
        atom.residue.chain_id,
        atom.residue.seq_num,
        atom.residue.insertion_code
    )
}

/// Renders a helix segment as a PDB `HELIX` record followed by its length.
///
/// Returns `None` for strand segments.
pub fn helix_record(segment: &SecondaryStructureSegment) -> Option<String> {
    let SegmentKind::Helix(info) = &segment.kind else {
        return None;
    };
    let record = format!(
        "HELIX  {:>3} {:>3} {} {}{:>2}",
        info.serial,
        info.serial,
        residue_fields(&segment.start, 5),
        residue_fields(&segment.end, 5),
        info.class.code()
    );
    Some(format!(
        "{:<width$.width$}{:>5}",
        record,
        segment.length,
        width = HELIX_RECORD_WIDTH
    ))
}

/// Renders a strand segment as a PDB `SHEET` record.
///
/// Returns `None` for helix segments.
pub fn sheet_record(segment: &SecondaryStructureSegment) -> Option<String> {
    let SegmentKind::Strand(info) = &segment.kind else {
        return None;
    };
    let mut record = format!(
        "SHEET  {:>3} {:>3}{:>2} {} {}{:>2}",
        info.strand_number,
        info.sheet_id,
        info.strand_count,
        residue_fields(&segment.start, 4),
        residue_fields(&segment.end, 4),
        info.sense.code()
    );
    if let Some(registration) = &info.registration {
        record.push(' ');
        record.push_str(&registration_fields(&registration.current));
        record.push(' ');
        record.push_str(&registration_fields(&registration.previous));
    }
    Some(record.trim_end().to_string())
}
