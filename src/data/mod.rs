//! CSV dataset loading for the CLI
//!
//! Each row holds the feature values followed by the label in the last
//! column. A header row is detected automatically: if the first line
//! does not parse as numbers it is skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::core::{Result, SvmError};

/// Dense feature matrix with parallel labels, loaded from CSV
#[derive(Debug, Clone)]
pub struct CsvDataset {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<f64>,
}

impl CsvDataset {
    /// Load a dataset from a CSV file, last column as label
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a dataset from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut features = Vec::new();
        let mut labels = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match parse_row(trimmed) {
                Ok((row, label)) => {
                    features.push(row);
                    labels.push(label);
                }
                // First line may be a header.
                Err(_) if line_no == 0 => continue,
                Err(e) => {
                    return Err(SvmError::Parse(format!("line {}: {e}", line_no + 1)));
                }
            }
        }

        Ok(Self { features, labels })
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the dataset holds no rows
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Feature dimensionality (0 when empty)
    pub fn dim(&self) -> usize {
        self.features.first().map_or(0, Vec::len)
    }
}

fn parse_row(line: &str) -> std::result::Result<(Vec<f64>, f64), String> {
    let mut values = Vec::new();
    for field in line.split(',') {
        let v: f64 = field
            .trim()
            .parse()
            .map_err(|_| format!("not a number: '{}'", field.trim()))?;
        values.push(v);
    }
    let label = values.pop().ok_or("empty row")?;
    if values.is_empty() {
        return Err("row needs at least one feature and a label".to_string());
    }
    Ok((values, label))
}
