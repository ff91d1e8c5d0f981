//! CSV loader for the university catalogue.
//!
//! The import job that maintains the catalogue exports one row per university; list
//! columns (`fields`, `programs`) are `;`-separated.

mod parser;

use crate::workflows::journey::domain::{University, UniversityId};
use crate::workflows::journey::memory::InMemoryCatalog;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Catalogue bundled with the crate and used when no CSV path is configured.
pub const SEED_CATALOG_CSV: &str = include_str!("../../../data/universities.csv");

#[derive(Debug)]
pub enum CatalogImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: usize, reason: String },
    DuplicateId(UniversityId),
}

impl std::fmt::Display for CatalogImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogImportError::Io(err) => write!(f, "failed to read catalogue: {}", err),
            CatalogImportError::Csv(err) => write!(f, "invalid catalogue CSV data: {}", err),
            CatalogImportError::InvalidRow { line, reason } => {
                write!(f, "catalogue row {} rejected: {}", line, reason)
            }
            CatalogImportError::DuplicateId(id) => {
                write!(f, "catalogue lists university {} more than once", id)
            }
        }
    }
}

impl std::error::Error for CatalogImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogImportError::Io(err) => Some(err),
            CatalogImportError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CatalogImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct CatalogImporter;

impl CatalogImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<University>, CatalogImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<University>, CatalogImportError> {
        let mut seen: HashSet<UniversityId> = HashSet::new();
        let mut universities = Vec::new();

        for (line, row) in parser::parse_rows(reader)? {
            let university = row
                .into_university()
                .map_err(|reason| CatalogImportError::InvalidRow { line, reason })?;
            if !seen.insert(university.id) {
                return Err(CatalogImportError::DuplicateId(university.id));
            }
            universities.push(university);
        }

        Ok(universities)
    }

    pub fn seed() -> Result<Vec<University>, CatalogImportError> {
        Self::from_reader(SEED_CATALOG_CSV.as_bytes())
    }

    /// Load `path` when given, otherwise the bundled seed, into an in-memory catalogue.
    pub fn load_catalog(path: Option<&Path>) -> Result<InMemoryCatalog, CatalogImportError> {
        let universities = match path {
            Some(path) => Self::from_path(path)?,
            None => Self::seed()?,
        };
        Ok(InMemoryCatalog::new(universities))
    }
}
