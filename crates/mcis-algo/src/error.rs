//! Errors from MCIS search.

use thiserror::Error;

/// Errors that can occur while configuring or running a search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("invalid search options: {0}")]
    InvalidOptions(String),

    #[error("modular product would have {vertices} vertices (limit {limit})")]
    ProductTooLarge { vertices: usize, limit: usize },

    #[error("unknown algorithm '{0}'. Available: bron-kerbosch-serial, bron-kerbosch-parallel")]
    UnknownAlgorithm(String),

    #[error("search worker panicked")]
    WorkerPanicked,
}
