use crate::cli::Cli;
use crate::config::PartialAssignmentConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use ksdssp::{
    core::io::{
        pdb::PdbFile,
        records::PdbRecords,
        summary::SummaryReport,
        traits::{ReportFormat, StructureFile},
    },
    core::models::{assignment::Assignment, structure::Structure},
    engine::progress::ProgressReporter,
    workflows,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// `None` and `-` both select a standard stream.
fn file_path(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| *p != Path::new("-"))
}

fn read_models(input: Option<&Path>) -> Result<Vec<Structure>> {
    match file_path(input) {
        Some(path) => {
            info!("Loading input structure from {:?}", path);
            PdbFile::read_from_path(path).map_err(|source| CliError::Structure {
                input: path.display().to_string(),
                source,
            })
        }
        None => {
            info!("Reading input structure from standard input.");
            PdbFile::read_from(&mut io::stdin().lock()).map_err(|source| CliError::Structure {
                input: "<stdin>".to_string(),
                source,
            })
        }
    }
}

fn open_output(output: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match file_path(output) {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn write_summary(path: &Path, models: &[Structure], assignments: &[Assignment]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for (model, assignment) in models.iter().zip(assignments) {
        if models.len() > 1 {
            match model.model_number() {
                Some(number) => writeln!(writer, "Model {}", number)?,
                None => writeln!(writer, "Model")?,
            }
        }
        SummaryReport::write_to(assignment, &mut writer)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn run(args: &Cli) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialAssignmentConfig::from_file(path)?,
        None => PartialAssignmentConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(args)?;
    debug!(?config, "Final assignment configuration.");

    let mut models = read_models(args.input.as_deref())?;

    let progress_handler = if args.quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let mut assignments = Vec::with_capacity(models.len());
    for model in &mut models {
        progress_handler.set_model(model.model_number());
        info!(
            model = ?model.model_number(),
            chains = model.chains().len(),
            residues = model.residue_count(),
            "Assigning secondary structure."
        );
        let assignment = workflows::classify::run(model, &config, &reporter)?;
        info!(
            helices = assignment.helices().count(),
            sheets = assignment.sheets.len(),
            diagnostics = assignment.diagnostics.len(),
            "Model assigned."
        );
        assignments.push(assignment);
    }
    progress_handler.finish();

    let mut writer = open_output(args.output.as_deref())?;
    PdbRecords::write_models(
        models
            .iter()
            .map(Structure::model_number)
            .zip(assignments.iter()),
        &mut writer,
    )?;
    writer.flush()?;

    if let Some(path) = &args.summary {
        info!("Writing summary to {:?}", path);
        write_summary(path, &models, &assignments)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use ksdssp::core::io::pdb::PdbError;
    use std::fs;
    use tempfile::tempdir;

    fn atom_line(serial: usize, name: &str, chain: char, seq: usize, x: f64, y: f64) -> String {
        format!(
            "ATOM  {:>5} {:<4} ALA {}{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00  0.00",
            serial,
            format!(" {}", name),
            chain,
            seq,
            x,
            y,
            0.0
        )
    }

    /// Two facing six-residue strands running in opposite directions.
    fn sheet_pdb() -> String {
        let mut lines = Vec::new();
        let mut serial = 1;
        for (chain, y, facing) in [('A', 0.0, 1.0), ('B', 4.2, -1.0)] {
            for k in 0..6 {
                let x = if chain == 'A' { 3.8 * k as f64 } else { 3.8 * (5 - k) as f64 };
                for (name, dy) in [
                    ("N", 0.0),
                    ("CA", -facing),
                    ("C", 0.0),
                    ("O", 1.2 * facing),
                    ("H", facing),
                ] {
                    lines.push(atom_line(serial, name, chain, k + 1, x, y + dy));
                    serial += 1;
                }
            }
            lines.push("TER".to_string());
        }
        lines.push("END".to_string());
        lines.join("\n")
    }

    #[test]
    fn writes_sheet_records_and_summary() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("sheet.pdb");
        let output = dir.path().join("sheet.ss");
        let summary = dir.path().join("sheet.summary");
        fs::write(&input, sheet_pdb()).unwrap();

        let args = Cli::parse_from([
            "ksdssp",
            "-q",
            "--summary",
            summary.to_str().unwrap(),
            input.to_str().unwrap(),
            output.to_str().unwrap(),
        ]);
        run(&args).unwrap();

        let records = fs::read_to_string(&output).unwrap();
        let lines: Vec<_> = records.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "SHEET    1   A 2 ALA A   1  ALA A   6  0");
        assert!(lines[1].starts_with("SHEET    2   A 2 ALA B   1  ALA B   6 -1"));

        let report = fs::read_to_string(&summary).unwrap();
        assert!(report.contains("Ladder Summary"));
        assert!(report.contains("Residue Summary"));
    }

    #[test]
    fn unreadable_input_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("empty.pdb");
        fs::write(&input, "REMARK nothing here\n").unwrap();
        let args = Cli::parse_from(["ksdssp", "-q", input.to_str().unwrap()]);

        assert!(matches!(
            run(&args),
            Err(CliError::Structure {
                source: PdbError::MissingRecord(_),
                ..
            })
        ));
    }

    #[test]
    fn dash_selects_standard_streams() {
        assert_eq!(file_path(Some(Path::new("-"))), None);
        assert_eq!(file_path(None), None);
        assert_eq!(
            file_path(Some(Path::new("out.pdb"))),
            Some(Path::new("out.pdb"))
        );
    }
}
