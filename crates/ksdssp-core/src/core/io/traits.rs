use crate::core::models::assignment::Assignment;
use crate::core::models::structure::Structure;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading coordinate file formats.
///
/// A file may hold several models; each one becomes its own [`Structure`].
pub trait StructureFile {
    /// The error type for I/O and parsing failures.
    type Error: Error + From<io::Error>;

    /// Reads every model from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails, reading fails, or no atoms are found.
    fn read_from(reader: &mut impl BufRead) -> Result<Vec<Structure>, Self::Error>;

    /// Reads every model from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Structure>, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}

/// Defines the interface for serialising an [`Assignment`] as text.
pub trait ReportFormat {
    /// The error type for write failures.
    type Error: Error + From<io::Error>;

    /// Writes the report for one assignment.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(assignment: &Assignment, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Writes the report for one assignment to a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(assignment: &Assignment, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(assignment, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
