use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use super::{Groups, Observations, ShapeError};

/// Failure to load observations from a file.
#[derive(Debug)]
pub enum SampleError {
    /// The file could not be opened or read.
    Io(std::io::Error),
    /// The file is not valid CSV.
    Csv(csv::Error),
    /// The file has a header but no records.
    EmptyFile,
    /// A field could not be parsed as a number.
    Parse {
        /// 1-based, header included.
        line: u64,
        /// 0-based field index.
        column: usize,
        /// The offending field.
        value: String,
    },
    /// The parsed rows do not form a matrix.
    Shape(ShapeError),
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleError::Io(e) => write!(f, "I/O error: {e}"),
            SampleError::Csv(e) => write!(f, "CSV parsing error: {e}"),
            SampleError::EmptyFile => write!(f, "CSV file contains no data records"),
            SampleError::Parse { line, column, value } => {
                write!(f, "line {line}, column {column}: '{value}' is not a number")
            }
            SampleError::Shape(e) => write!(f, "malformed observations: {e}"),
        }
    }
}

impl StdError for SampleError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SampleError::Io(e) => Some(e),
            SampleError::Csv(e) => Some(e),
            SampleError::Shape(e) => Some(e),
            SampleError::EmptyFile | SampleError::Parse { .. } => None,
        }
    }
}

impl From<std::io::Error> for SampleError {
    fn from(e: std::io::Error) -> Self {
        SampleError::Io(e)
    }
}

impl From<csv::Error> for SampleError {
    fn from(e: csv::Error) -> Self {
        SampleError::Csv(e)
    }
}

impl From<ShapeError> for SampleError {
    fn from(e: ShapeError) -> Self {
        SampleError::Shape(e)
    }
}

fn parse_fields(record: &StringRecord, skip: usize, out: &mut Vec<f64>) -> Result<(), SampleError> {
    let line = record.position().map_or(0, csv::Position::line);
    for (column, field) in record.iter().enumerate().skip(skip) {
        let value = field.trim().parse::<f64>().map_err(|_| SampleError::Parse {
            line,
            column,
            value: field.to_string(),
        })?;
        out.push(value);
    }
    Ok(())
}

impl Observations<f64> {
    /// Read a numeric matrix from a CSV file with a header row.
    ///
    /// Every column is a variable, every record an observation.
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self, SampleError> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
        let dim = rdr.headers()?.len();

        let mut data = Vec::new();
        for result in rdr.records() {
            parse_fields(&result?, 0, &mut data)?;
        }
        if data.is_empty() {
            return Err(SampleError::EmptyFile);
        }
        Ok(Observations::from_flat(data, dim)?)
    }
}

impl Groups<String, f64> {
    /// Read labelled observations from a CSV file with a header row.
    ///
    /// The first column holds the group label, the remaining columns the
    /// features of that observation.
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self, SampleError> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
        let dim = rdr.headers()?.len().saturating_sub(1);

        let mut buffers: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for result in rdr.records() {
            let record = result?;
            let label = record.get(0).unwrap_or_default().trim().to_string();
            parse_fields(&record, 1, buffers.entry(label).or_default())?;
        }
        if buffers.is_empty() {
            return Err(SampleError::EmptyFile);
        }

        buffers
            .into_iter()
            .map(|(label, data)| -> Result<_, SampleError> {
                Ok((label, Observations::from_flat(data, dim)?))
            })
            .collect()
    }
}
