use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::ScanError;
use crate::records::{delimiter_for, Role};

/// One row of the acquisition sequence sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceEntry {
    /// Raw file name, as it appears in the scan table
    pub file: String,
    /// Acquisition order key
    pub injection: u32,
    /// Reference standard or unknown sample
    pub role: Role,
    /// Sample name
    #[serde(default)]
    pub sample: Option<String>,
    /// Experimental condition label
    #[serde(default)]
    pub condition: Option<String>,
    /// Basepeak identity
    #[serde(default)]
    pub basepeak: Option<String>,
}

/// Acquisition sequence: maps raw files to injections and roles.
#[derive(Debug, Clone, Default)]
pub struct Sequence {
    entries: Vec<SequenceEntry>,
    by_file: HashMap<String, usize>,
}

impl Sequence {
    /// Build a sequence; every file may appear once
    pub fn new(entries: Vec<SequenceEntry>) -> Result<Self, ScanError> {
        let mut by_file = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if by_file.insert(entry.file.clone(), i).is_some() {
                return Err(ScanError::DuplicateFile(entry.file.clone()));
            }
        }
        Ok(Self { entries, by_file })
    }

    /// Parse a sequence sheet from a CSV (or `.tsv`) file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ScanError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), delimiter_for(path))
    }

    /// Parse a sequence sheet from a reader
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self, ScanError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = Vec::new();
        for row in csv_reader.deserialize() {
            entries.push(row?);
        }
        Self::new(entries)
    }

    /// Look up the entry for a raw file
    pub fn get(&self, file: &str) -> Option<&SequenceEntry> {
        self.by_file.get(file).map(|&i| &self.entries[i])
    }

    /// Entries in sheet order
    pub fn entries(&self) -> &[SequenceEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the sheet is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
