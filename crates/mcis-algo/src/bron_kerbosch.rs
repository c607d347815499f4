//! Bron-Kerbosch maximum clique enumeration over the modular product.
//!
//! Both finders use Tomita pivoting plus a size bound: a branch is dropped
//! once `|R| + |P|` falls below the best clique seen so far. Ties with the
//! best size are kept, so every maximum clique is reported.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;

use mcis_core::parallel::worker_count;
use mcis_core::Graph;
use tracing::{debug, info};

use crate::error::SearchError;
use crate::finder::{CommonSubgraph, McisFinder, SearchOptions};
use crate::product::{BitSet, ModularProduct};

/// Maximum cliques collected by one search thread.
struct CliqueSink {
    best: usize,
    cliques: Vec<Vec<usize>>,
    cap: usize,
}

impl CliqueSink {
    fn new(cap: usize) -> Self {
        Self {
            best: 0,
            cliques: Vec::new(),
            cap,
        }
    }

    fn record(&mut self, clique: &[usize]) {
        if clique.len() > self.best {
            self.best = clique.len();
            self.cliques.clear();
        }
        if clique.len() == self.best && self.cliques.len() < self.cap {
            self.cliques.push(clique.to_vec());
        }
    }

    /// No further clique can be both larger and worth recording.
    fn saturated(&self, upper_bound: usize) -> bool {
        self.best >= upper_bound && self.cliques.len() >= self.cap
    }
}

/// Recursive search state shared by both finders.
struct Search<'p, 'g> {
    product: &'p ModularProduct<'g>,
    sink: CliqueSink,
    upper_bound: usize,
    /// Best size published by any thread; only read for pruning.
    shared_best: Option<&'p AtomicUsize>,
    stop: Option<&'p AtomicBool>,
}

impl<'p, 'g> Search<'p, 'g> {
    fn new(product: &'p ModularProduct<'g>, cap: usize) -> Self {
        Self {
            product,
            sink: CliqueSink::new(cap),
            upper_bound: product.clique_upper_bound(),
            shared_best: None,
            stop: None,
        }
    }

    fn bound(&self) -> usize {
        let shared = self
            .shared_best
            .map_or(0, |best| best.load(Ordering::Relaxed));
        self.sink.best.max(shared)
    }

    fn stopped(&self) -> bool {
        self.sink.saturated(self.upper_bound)
            || self.stop.is_some_and(|s| s.load(Ordering::Relaxed))
    }

    fn publish(&self) {
        if let Some(shared) = self.shared_best {
            shared.fetch_max(self.sink.best, Ordering::Relaxed);
        }
    }

    fn expand(&mut self, r: &mut Vec<usize>, mut p: BitSet, mut x: BitSet) {
        if self.stopped() {
            return;
        }
        if p.is_empty() {
            if x.is_empty() {
                self.sink.record(r);
                self.publish();
            }
            return;
        }
        if r.len() + p.count() < self.bound() {
            return;
        }

        let product = self.product;

        // Pivot on the vertex of P ∪ X covering most of P.
        let pivot = p
            .union(&x)
            .iter()
            .max_by_key(|&u| p.intersection_count(product.neighbors(u)))
            .unwrap_or(0);
        let candidates = p.difference(product.neighbors(pivot));

        for v in candidates.iter() {
            let neighbors = product.neighbors(v);
            r.push(v);
            self.expand(r, p.intersection(neighbors), x.intersection(neighbors));
            r.pop();
            p.remove(v);
            x.insert(v);
        }
    }
}

fn finish(
    product: &ModularProduct<'_>,
    cliques: Vec<Vec<usize>>,
    cap: usize,
) -> Vec<CommonSubgraph> {
    let mut results: Vec<CommonSubgraph> = cliques
        .iter()
        .map(|c| product.to_common_subgraph(c))
        .collect();
    results.sort_by(|a, b| a.mapping.cmp(&b.mapping));
    results.truncate(cap);
    results
}

/// Single-threaded Bron-Kerbosch.
#[derive(Debug, Default, Clone, Copy)]
pub struct BronKerboschSerial;

impl McisFinder for BronKerboschSerial {
    fn name(&self) -> &'static str {
        "bron-kerbosch-serial"
    }

    fn find(
        &self,
        g1: &Graph,
        g2: &Graph,
        opts: &SearchOptions,
    ) -> Result<Vec<CommonSubgraph>, SearchError> {
        opts.validate()?;
        if g1.is_empty() || g2.is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let product = ModularProduct::build(g1, g2, opts)?;
        debug!(
            vertices = product.vertex_count(),
            edges = product.edge_count(),
            "built modular product"
        );

        let n = product.vertex_count();
        let mut search = Search::new(&product, opts.result_cap());
        search.expand(&mut Vec::new(), BitSet::full(n), BitSet::new(n));

        let best = search.sink.best;
        let results = finish(&product, search.sink.cliques, opts.result_cap());
        info!(
            finder = self.name(),
            size = best,
            results = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search complete"
        );
        Ok(results)
    }
}

/// Bron-Kerbosch with top-level branches spread over scoped threads.
///
/// Branch `k` explores cliques whose smallest vertex is `k`. Threads pull
/// branch indices from a shared counter and share the best size found so
/// far for pruning.
#[derive(Debug, Default, Clone, Copy)]
pub struct BronKerboschParallel;

impl McisFinder for BronKerboschParallel {
    fn name(&self) -> &'static str {
        "bron-kerbosch-parallel"
    }

    fn find(
        &self,
        g1: &Graph,
        g2: &Graph,
        opts: &SearchOptions,
    ) -> Result<Vec<CommonSubgraph>, SearchError> {
        opts.validate()?;
        if g1.is_empty() || g2.is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let product = ModularProduct::build(g1, g2, opts)?;
        let n = product.vertex_count();
        let threads = worker_count(opts.threads).min(n).max(1);
        debug!(
            vertices = n,
            edges = product.edge_count(),
            threads,
            "built modular product"
        );

        let cap = opts.result_cap();
        let next = AtomicUsize::new(0);
        let shared_best = AtomicUsize::new(0);
        let stop = AtomicBool::new(false);
        let collected: Mutex<Vec<(usize, Vec<Vec<usize>>)>> = Mutex::new(Vec::new());

        let worker = || {
            let mut search = Search::new(&product, cap);
            search.shared_best = Some(&shared_best);
            search.stop = Some(&stop);
            loop {
                let k = next.fetch_add(1, Ordering::Relaxed);
                if k >= n || search.stopped() {
                    break;
                }
                let neighbors = product.neighbors(k);
                let mut p = BitSet::new(n);
                let mut x = BitSet::new(n);
                for j in neighbors.iter() {
                    if j > k {
                        p.insert(j);
                    } else {
                        x.insert(j);
                    }
                }
                search.expand(&mut vec![k], p, x);
            }
            if search.sink.saturated(search.upper_bound) {
                stop.store(true, Ordering::Relaxed);
            }
            if let Ok(mut all) = collected.lock() {
                all.push((search.sink.best, search.sink.cliques));
            }
        };

        let panicked = std::thread::scope(|s| {
            let handles: Vec<_> = (0..threads).map(|_| s.spawn(&worker)).collect();
            handles.into_iter().map(|h| h.join()).filter(Result::is_err).count()
        });
        if panicked > 0 {
            return Err(SearchError::WorkerPanicked);
        }

        let per_thread = collected
            .into_inner()
            .map_err(|_| SearchError::WorkerPanicked)?;
        let best = per_thread.iter().map(|(b, _)| *b).max().unwrap_or(0);
        let cliques: Vec<Vec<usize>> = per_thread
            .into_iter()
            .filter(|(b, _)| *b == best)
            .flat_map(|(_, c)| c)
            .collect();

        let results = finish(&product, cliques, cap);
        info!(
            finder = self.name(),
            size = best,
            results = results.len(),
            threads,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search complete"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcis_core::mvm_from_dimensions;

    fn graph(nodes: &[&str], edges: &[(&str, &str, i32)]) -> Graph {
        let mut g = Graph::new();
        g.add_nodes(nodes.iter().copied()).unwrap();
        for (a, b, w) in edges {
            g.add_edge(a, b, *w).unwrap();
        }
        g
    }

    fn both(g1: &Graph, g2: &Graph, opts: &SearchOptions) -> Vec<CommonSubgraph> {
        let serial = BronKerboschSerial.find(g1, g2, opts).unwrap();
        let parallel_opts = SearchOptions {
            threads: 4,
            ..opts.clone()
        };
        let parallel = BronKerboschParallel.find(g1, g2, &parallel_opts).unwrap();
        assert_eq!(serial, parallel, "serial and parallel disagree");
        serial
    }

    #[test]
    fn empty_input_gives_no_results() {
        let g = graph(&["a"], &[]);
        let empty = Graph::new();
        assert!(both(&g, &empty, &SearchOptions::default()).is_empty());
        assert!(both(&empty, &g, &SearchOptions::default()).is_empty());
    }

    #[test]
    fn identical_paths_match_completely() {
        let g1 = graph(&["a", "b", "c"], &[("a", "b", 1), ("b", "c", 1)]);
        let g2 = graph(&["x", "y", "z"], &[("x", "y", 1), ("y", "z", 1)]);
        let results = both(&g1, &g2, &SearchOptions::default());
        assert_eq!(results.len(), 1);
        let found = &results[0];
        assert_eq!(found.size(), 3);
        assert_eq!(
            found.mapping,
            vec![
                ("a".to_string(), "x".to_string()),
                ("b".to_string(), "y".to_string()),
                ("c".to_string(), "z".to_string()),
            ]
        );
        assert_eq!(found.graph, g1);
    }

    #[test]
    fn induced_means_non_edges_must_match() {
        // Triangle-free path vs. transitive triangle: any 3-node mapping would
        // need a -> c to be absent on one side and present on the other.
        let g1 = graph(&["a", "b", "c"], &[("a", "b", 0), ("b", "c", 0)]);
        let g2 = graph(
            &["x", "y", "z"],
            &[("x", "y", 0), ("y", "z", 0), ("x", "z", 0)],
        );
        let results = both(&g1, &g2, &SearchOptions::default());
        assert!(!results.is_empty());
        assert!(results.iter().all(|r| r.size() == 2));
        for r in &results {
            assert_eq!(r.graph.edge_count(), r.image_in(&g2).edge_count());
        }
    }

    #[test]
    fn direction_matters() {
        let g1 = graph(&["a", "b"], &[("a", "b", 0)]);
        let g2 = graph(&["x", "y"], &[("y", "x", 0)]);
        let results = both(&g1, &g2, &SearchOptions::default());
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].mapping,
            vec![("a".to_string(), "y".to_string()), ("b".to_string(), "x".to_string())]
        );
    }

    #[test]
    fn ties_are_all_reported() {
        // Single node vs. two isolated nodes: two equally good mappings.
        let g1 = graph(&["a"], &[]);
        let g2 = graph(&["x", "y"], &[]);
        let results = both(&g1, &g2, &SearchOptions::default());
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].mapping[0].1, "x");
        assert_eq!(results[1].mapping[0].1, "y");
    }

    #[test]
    fn max_results_caps_ties() {
        let g1 = graph(&["a"], &[]);
        let g2 = graph(&["x", "y", "z"], &[]);
        let opts = SearchOptions {
            max_results: Some(1),
            ..SearchOptions::default()
        };
        let results = BronKerboschSerial.find(&g1, &g2, &opts).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].size(), 1);
    }

    #[test]
    fn weights_only_matter_when_requested() {
        let g1 = graph(&["a", "b"], &[("a", "b", 3)]);
        let g2 = graph(&["x", "y"], &[("x", "y", 4)]);

        let loose = both(&g1, &g2, &SearchOptions::default());
        assert_eq!(loose[0].size(), 2);

        let strict = SearchOptions {
            match_weights: true,
            ..SearchOptions::default()
        };
        let results = both(&g1, &g2, &strict);
        assert!(results.iter().all(|r| r.size() == 1));
    }

    #[test]
    fn mvm_graphs_nest() {
        let small = mvm_from_dimensions(1, 2, usize::MAX);
        let large = mvm_from_dimensions(2, 2, usize::MAX);
        let opts = SearchOptions {
            max_results: Some(4),
            ..SearchOptions::default()
        };
        let serial = BronKerboschSerial.find(&small, &large, &opts).unwrap();
        assert!(!serial.is_empty() && serial.len() <= 4);
        assert_eq!(serial[0].size(), small.node_count());

        // Capped tie subsets may differ between finders; sizes may not.
        let parallel = BronKerboschParallel.find(&small, &large, &opts).unwrap();
        assert!(!parallel.is_empty() && parallel.len() <= 4);
        assert_eq!(parallel[0].size(), small.node_count());
    }

    #[test]
    fn invalid_options_rejected() {
        let g = graph(&["a"], &[]);
        let opts = SearchOptions {
            max_results: Some(0),
            ..SearchOptions::default()
        };
        assert!(BronKerboschSerial.find(&g, &g, &opts).is_err());
        assert!(BronKerboschParallel.find(&g, &g, &opts).is_err());
    }
}
