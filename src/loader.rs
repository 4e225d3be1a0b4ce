// Dataset Loader - one read of the static escolas.json array
//
// Any failure (missing file, bad JSON, network) is logged and collapses
// to an empty collection via `load_or_empty`, so a dashboard always renders.

use crate::school::School;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fixed path the dataset is published under
pub const DATASET_PATH: &str = "/data/escolas.json";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dataset JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[cfg(feature = "remote")]
    #[error("failed to fetch dataset from {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

// ============================================================================
// SOURCE + DATASET
// ============================================================================

/// Where the dataset is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    File(PathBuf),
    #[cfg(feature = "remote")]
    Url(String),
}

impl std::fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetSource::File(path) => write!(f, "{}", path.display()),
            #[cfg(feature = "remote")]
            DatasetSource::Url(url) => f.write_str(url),
        }
    }
}

/// The loaded record collection plus a content digest of the raw bytes.
/// Never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub schools: Vec<School>,
    /// Hex SHA-256 of the bytes the records were parsed from (empty when
    /// nothing was loaded)
    pub digest: String,
    /// Array elements that could not be read as a record
    pub skipped: usize,
}

impl Dataset {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.schools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schools.is_empty()
    }
}

// ============================================================================
// LOADING
// ============================================================================

/// Parse a JSON array of records from raw bytes.
///
/// Only the outer array must be valid JSON. Each element is read on its
/// own: absent fields take their defaults, and an element that still
/// cannot be read (no category, wrong types) is skipped with a warning.
pub fn parse_dataset(bytes: &[u8]) -> Result<Dataset, LoadError> {
    let values: Vec<serde_json::Value> = serde_json::from_slice(bytes)?;
    let digest = format!("{:x}", Sha256::digest(bytes));

    let mut schools = Vec::with_capacity(values.len());
    let mut skipped = 0;
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<School>(value) {
            Ok(school) => schools.push(school),
            Err(err) => {
                skipped += 1;
                tracing::warn!(index, error = %err, "skipping malformed record");
            }
        }
    }

    Ok(Dataset {
        schools,
        digest,
        skipped,
    })
}

pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_dataset(&bytes)
}

/// Single GET, no retry and no caching
#[cfg(feature = "remote")]
pub fn fetch_url(url: &str) -> Result<Dataset, LoadError> {
    let http = |source: reqwest::Error| LoadError::Http {
        url: url.to_string(),
        source,
    };
    let bytes = reqwest::blocking::get(url)
        .and_then(|res| res.error_for_status())
        .and_then(|res| res.bytes())
        .map_err(http)?;
    parse_dataset(&bytes)
}

pub fn load(source: &DatasetSource) -> Result<Dataset, LoadError> {
    tracing::info!(source = %source, "loading dataset");
    let dataset = match source {
        DatasetSource::File(path) => load_file(path)?,
        #[cfg(feature = "remote")]
        DatasetSource::Url(url) => fetch_url(url)?,
    };
    tracing::info!(
        records = dataset.len(),
        skipped = dataset.skipped,
        digest = %dataset.digest,
        "dataset loaded"
    );
    Ok(dataset)
}

/// Load the dataset, logging any failure and falling back to an empty
/// collection. Missing file, malformed JSON and network errors are not
/// distinguished past the log line.
pub fn load_or_empty(source: &DatasetSource) -> Dataset {
    match load(source) {
        Ok(dataset) => dataset,
        Err(err) => {
            tracing::error!(
                source = %source,
                error = %err,
                "failed to load dataset, continuing with no records"
            );
            Dataset::empty()
        }
    }
}
