use crate::core::io::traits::StructureFile;
use crate::core::models::atom::Element;
use crate::core::models::builder::{BuildError, StructureBuilder};
use crate::core::models::structure::Structure;
use nalgebra::Point3;
use std::io::{self, BufRead};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
    #[error("Inconsistent data on line {line}: {source}")]
    Inconsistency {
        line: usize,
        #[source]
        source: BuildError,
    },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM record (must be at least 54 chars)")]
    LineTooShort,
}

const MIN_ATOM_LINE_LENGTH: usize = 54;

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    line.get(start..end).unwrap_or("").trim()
}

fn column_char(line: &str, index: usize) -> char {
    line.get(index..index + 1)
        .and_then(|s| s.chars().next())
        .unwrap_or(' ')
}

fn parse_float(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

/// Reader for the fixed-column PDB coordinate format.
///
/// Only the records the assignment needs are interpreted: `ATOM` (HETATM
/// groups are not part of the polypeptide backbone), `TER` to close a chain,
/// and `MODEL`/`ENDMDL`/`END` to separate models. Everything else is skipped.
pub struct PdbFile;

#[derive(PartialEq)]
struct ResidueIdentity {
    seq_num: isize,
    insertion_code: char,
    name: String,
}

struct ModelReader {
    builder: StructureBuilder,
    current_residue: Option<ResidueIdentity>,
    models: Vec<Structure>,
}

impl ModelReader {
    fn new() -> Self {
        Self {
            builder: StructureBuilder::new(),
            current_residue: None,
            models: Vec::new(),
        }
    }

    fn finish_model(&mut self) {
        let builder = std::mem::take(&mut self.builder);
        self.current_residue = None;
        if builder.atom_count() > 0 {
            let structure = builder.build();
            debug!(
                model = ?structure.model_number(),
                chains = structure.chains().len(),
                residues = structure.residue_count(),
                "Finished reading model."
            );
            self.models.push(structure);
        }
    }

    fn end_chain(&mut self) {
        self.builder.end_chain();
        self.current_residue = None;
    }

    fn read_atom(&mut self, line: &str, line_num: usize) -> Result<(), PdbError> {
        if line.len() < MIN_ATOM_LINE_LENGTH {
            return Err(PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::LineTooShort,
            });
        }

        let serial_str = slice_and_trim(line, 6, 11);
        let name_str = slice_and_trim(line, 12, 16);
        let res_name_str = slice_and_trim(line, 17, 20);
        let chain_id = column_char(line, 21);
        let res_seq_str = slice_and_trim(line, 22, 26);
        let insertion_code = column_char(line, 26);
        let element_str = slice_and_trim(line, 76, 78);

        if name_str.is_empty() {
            return Err(PdbError::Parse {
                line: line_num,
                kind: PdbParseErrorKind::MissingRequiredField {
                    columns: "13-16".into(),
                },
            });
        }
        // Serial numbers overflow the 5-column field in very large files.
        let serial: usize = serial_str.parse().unwrap_or(0);
        let seq_num: isize = res_seq_str.parse().map_err(|_| PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::InvalidInt {
                columns: "23-26".into(),
                value: res_seq_str.into(),
            },
        })?;
        let x = parse_float(line, line_num, 30, 38)?;
        let y = parse_float(line, line_num, 38, 46)?;
        let z = parse_float(line, line_num, 46, 54)?;
        let element = element_str
            .parse::<Element>()
            .unwrap_or_else(|_| Element::from_atom_name(name_str));

        if self.builder.current_chain_id() != Some(chain_id) {
            self.builder.start_chain(chain_id);
            self.current_residue = None;
        }

        let identity = ResidueIdentity {
            seq_num,
            insertion_code,
            name: res_name_str.to_string(),
        };
        if self.current_residue.as_ref() != Some(&identity) {
            self.builder
                .start_residue(seq_num, insertion_code, res_name_str)
                .map_err(|source| PdbError::Inconsistency {
                    line: line_num,
                    source,
                })?;
            self.current_residue = Some(identity);
        }

        self.builder
            .add_atom_with_element(serial, name_str, element, Point3::new(x, y, z))
            .map_err(|source| PdbError::Inconsistency {
                line: line_num,
                source,
            })?;
        Ok(())
    }
}

impl StructureFile for PdbFile {
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<Structure>, Self::Error> {
        let mut state = ModelReader::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            match slice_and_trim(&line, 0, 6) {
                "ATOM" => state.read_atom(&line, line_num)?,
                "TER" => state.end_chain(),
                "MODEL" => {
                    state.finish_model();
                    let number_str = slice_and_trim(&line, 10, 14);
                    let number: i32 = number_str.parse().map_err(|_| PdbError::Parse {
                        line: line_num,
                        kind: PdbParseErrorKind::InvalidInt {
                            columns: "11-14".into(),
                            value: number_str.into(),
                        },
                    })?;
                    state.builder.model_number(number);
                }
                "ENDMDL" | "END" => state.finish_model(),
                _ => {}
            }
        }
        state.finish_model();

        if state.models.is_empty() {
            return Err(PdbError::MissingRecord("ATOM records".into()));
        }
        Ok(state.models)
    }
}
