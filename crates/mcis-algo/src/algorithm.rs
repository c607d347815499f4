//! Algorithm selection and dispatch.

use std::fmt;
use std::str::FromStr;

use mcis_core::Graph;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bron_kerbosch::{BronKerboschParallel, BronKerboschSerial};
use crate::error::SearchError;
use crate::finder::{CommonSubgraph, McisFinder, SearchOptions};

/// The available MCIS strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmType {
    BronKerboschSerial,
    BronKerboschParallel,
}

impl AlgorithmType {
    /// Every strategy, in registration order.
    pub const ALL: [AlgorithmType; 2] = [
        AlgorithmType::BronKerboschSerial,
        AlgorithmType::BronKerboschParallel,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::BronKerboschSerial => "bron-kerbosch-serial",
            Self::BronKerboschParallel => "bron-kerbosch-parallel",
        }
    }
}

impl fmt::Display for AlgorithmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmType {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SearchError::UnknownAlgorithm(s.to_string()))
    }
}

/// Registry of finders keyed by [`AlgorithmType`].
pub struct McisAlgorithm {
    finders: Vec<(AlgorithmType, Box<dyn McisFinder>)>,
}

impl Default for McisAlgorithm {
    fn default() -> Self {
        Self::new()
    }
}

impl McisAlgorithm {
    pub fn new() -> Self {
        let finders = AlgorithmType::ALL
            .into_iter()
            .map(|kind| {
                let finder: Box<dyn McisFinder> = match kind {
                    AlgorithmType::BronKerboschSerial => Box::new(BronKerboschSerial),
                    AlgorithmType::BronKerboschParallel => Box::new(BronKerboschParallel),
                };
                (kind, finder)
            })
            .collect();
        Self { finders }
    }

    /// The registered strategies, in registration order.
    pub fn available(&self) -> impl Iterator<Item = AlgorithmType> + '_ {
        self.finders.iter().map(|(kind, _)| *kind)
    }

    fn finder(&self, kind: AlgorithmType) -> Result<&dyn McisFinder, SearchError> {
        self.finders
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, f)| f.as_ref())
            .ok_or_else(|| SearchError::UnknownAlgorithm(kind.to_string()))
    }

    /// Run one strategy.
    pub fn run(
        &self,
        g1: &Graph,
        g2: &Graph,
        kind: AlgorithmType,
        opts: &SearchOptions,
    ) -> Result<Vec<CommonSubgraph>, SearchError> {
        let finder = self.finder(kind)?;
        debug!(
            algorithm = finder.name(),
            g1_nodes = g1.node_count(),
            g2_nodes = g2.node_count(),
            "dispatching search"
        );
        finder.find(g1, g2, opts)
    }

    /// Run each requested strategy; one result set per request, in order.
    pub fn run_many(
        &self,
        g1: &Graph,
        g2: &Graph,
        kinds: &[AlgorithmType],
        opts: &SearchOptions,
    ) -> Result<Vec<Vec<CommonSubgraph>>, SearchError> {
        kinds
            .iter()
            .map(|&kind| self.run(g1, g2, kind, opts))
            .collect()
    }

    /// Run every registered strategy.
    pub fn run_all(
        &self,
        g1: &Graph,
        g2: &Graph,
        opts: &SearchOptions,
    ) -> Result<Vec<Vec<CommonSubgraph>>, SearchError> {
        let kinds: Vec<AlgorithmType> = self.available().collect();
        self.run_many(g1, g2, &kinds, opts)
    }
}
