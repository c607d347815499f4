//! Maximum Common Induced Subgraph (MCIS) search.
//!
//! Two graphs share an induced subgraph when a one-to-one node mapping
//! preserves both the presence and the absence of every directed edge among
//! the mapped nodes. Such mappings are exactly the cliques of the
//! [modular product](product::ModularProduct) of the two graphs, so the
//! finders here enumerate maximum cliques of that product with the
//! Bron-Kerbosch algorithm.

pub mod algorithm;
pub mod bron_kerbosch;
pub mod error;
pub mod finder;
pub mod product;

pub use algorithm::{AlgorithmType, McisAlgorithm};
pub use bron_kerbosch::{BronKerboschParallel, BronKerboschSerial};
pub use error::SearchError;
pub use finder::{CommonSubgraph, McisFinder, SearchOptions};
pub use product::ModularProduct;
