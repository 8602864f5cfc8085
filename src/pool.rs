// src/pool.rs

//! Ordered, fixed-size worker pool for per-record extraction.
//!
//! Every record is handed to exactly one worker. Each result lands in the output slot of its input index, so
//! the returned items keep input order no matter which worker finished first. Records whose extraction fails
//! leave their slot empty and are dropped from the output.

use crate::error::Result;
use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::fmt::Display;
use tracing::{debug, warn};

/// Worker count used when none (or a non-positive one) is requested
pub const DEFAULT_WORKERS: usize = 4;

/// Normalize a requested worker count: anything ≤ 0 becomes [`DEFAULT_WORKERS`].
pub fn worker_count(requested: i64) -> usize {
    usize::try_from(requested).ok().filter(|&n| n > 0).unwrap_or(DEFAULT_WORKERS)
}

/// Output of a pool run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed<T> {
    /// Successfully extracted items, in input order
    pub items: Vec<T>,
    /// Number of records whose extraction failed
    pub skipped: usize,
}

/// Run `extract` over `records` on `workers` threads (0 means [`DEFAULT_WORKERS`]).
pub fn process<R, T, E, F>(records: Vec<R>, workers: usize, extract: F) -> Result<Processed<T>>
where
    R: Send,
    T: Send,
    E: Display,
    F: Fn(R) -> std::result::Result<T, E> + Sync + Send,
{
    process_with(records, workers, None, || (), |_: &mut (), record| extract(record))
}

/// Like [`process`], but extractions get mutable state built by `init`.
///
/// rayon calls `init` once per work split, not once per thread, so it may run more often than there are
/// workers. The state is never shared between threads, which makes it the place for non-`Sync` handles.
pub fn process_with<R, S, T, E, I, F>(
    records: Vec<R>,
    workers: usize,
    progress: Option<&ProgressBar>,
    init: I,
    extract: F,
) -> Result<Processed<T>>
where
    R: Send,
    T: Send,
    E: Display,
    I: Fn() -> S + Sync + Send,
    F: Fn(&mut S, R) -> std::result::Result<T, E> + Sync + Send,
{
    let workers = if workers == 0 { DEFAULT_WORKERS } else { workers };
    let total = records.len();

    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("extract-{i}"))
        .build()?;

    let bar = progress.cloned().unwrap_or_else(ProgressBar::hidden);
    let mut slots: Vec<Option<T>> = Vec::with_capacity(total);
    pool.install(|| {
        records
            .into_par_iter()
            .progress_with(bar)
            .enumerate()
            .map_init(init, |state, (index, record)| {
                match extract(state, record) {
                    Ok(item) => Some(item),
                    Err(e) => {
                        debug!(index, error = %e, "skipping record");
                        None
                    }
                }
            })
            .collect_into_vec(&mut slots);
    });

    let skipped = slots.iter().filter(|slot| slot.is_none()).count();
    if skipped > 0 {
        warn!(skipped, total, "some records could not be extracted and were skipped");
    }

    Ok(Processed {
        items: slots.into_iter().flatten().collect(),
        skipped,
    })
}
