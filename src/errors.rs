use thiserror::Error;

/// Taxonomy of failures the engine can surface, per the error handling design:
/// configuration/IO errors abort before any submission, per-job `Bio` errors
/// fail the whole run (no silent skipping of a (sample, feature) pair), and
/// `Internal` marks an aggregator invariant violation.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("reference error: {0}")]
    Reference(String),

    #[error("biological precondition violated: {0}")]
    Bio(String),

    #[error("internal aggregator invariant violated: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
