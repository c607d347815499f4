//! Scoped-thread helpers for splitting index ranges across cores.

/// Number of worker threads to use: `requested`, or the machine's available
/// parallelism when `requested` is zero.
pub fn worker_count(requested: usize) -> usize {
    if requested > 0 {
        return requested;
    }
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Map `f` over `[0, len)` in contiguous chunks, one scoped thread per
/// chunk, and concatenate the results in index order.
///
/// Small workloads run inline.
pub fn parallel_map<F, R>(len: usize, threads: usize, f: F) -> Vec<R>
where
    F: Fn(usize) -> R + Sync,
    R: Send,
{
    let threads = worker_count(threads);
    let chunk_size = len.div_ceil(threads.max(1)).max(1);

    if len <= chunk_size || threads <= 1 {
        return (0..len).map(&f).collect();
    }

    let f = &f;
    let chunks: Vec<Vec<R>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..len)
            .step_by(chunk_size)
            .map(|start| {
                let end = (start + chunk_size).min(len);
                s.spawn(move || (start..end).map(f).collect::<Vec<R>>())
            })
            .collect();
        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(chunk) => chunk,
                Err(payload) => std::panic::resume_unwind(payload),
            })
            .collect()
    });

    chunks.into_iter().flatten().collect()
}
