//! Error types for dataset construction and sampler runs.
//!
//! Validation failures are reported before any chain is stepped, so a caller
//! never sees partial output. Non-finite log-posterior values are not errors:
//! they flow through the acceptance test and lead to rejection.

use thiserror::Error;

/// Malformed input detected before sampling starts.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error(
        "all input vectors must be of the same size \
         (positive wells: {positive}, total wells: {total}, dilution fractions: {dilution})"
    )]
    LengthMismatch {
        positive: usize,
        total: usize,
        dilution: usize,
    },

    #[error("the dataset must contain at least one dilution")]
    EmptyDataset,

    #[error("number of {what} must be positive, got {value}")]
    NonPositive { what: &'static str, value: i64 },

    #[error("invalid observation at dilution {index}: {reason}")]
    InvalidObservation { index: usize, reason: String },

    #[error("starting theta must be finite and positive, got {theta}")]
    InvalidStart { theta: f64 },

    #[error("{n_chains} chain(s) of {n_samples} draws do not fit in memory")]
    TooManyDraws { n_chains: usize, n_samples: usize },
}

/// Any failure of a sampler run.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum QldError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to build the sampler thread pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid progress bar template")]
    ProgressTemplate(#[from] indicatif::style::TemplateError),
}

impl QldError {
    /// Returns `true` if the run was rejected because of its inputs.
    pub fn is_validation(&self) -> bool {
        matches!(self, QldError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, QldError>;
