//! Order-preserving parallel mapping over a bounded worker pool.

use std::fmt;
use std::str::FromStr;
use std::thread;

use crossbeam_channel::unbounded;
use rayon::prelude::*;

use crate::error::{Error, Result};

/// How [`parallel_map`] schedules work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapMode {
    /// Work-stealing rayon pool sized to `max_workers`
    #[default]
    Thread,
    /// Dedicated OS worker threads fed through a channel, isolated from any
    /// shared pool
    Process,
}

impl MapMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MapMode::Thread => "thread",
            MapMode::Process => "process",
        }
    }
}

impl FromStr for MapMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "thread" => Ok(MapMode::Thread),
            "process" => Ok(MapMode::Process),
            _ => Err(Error::InvalidArgument(
                "mode must be either 'thread' or 'process'".into(),
            )),
        }
    }
}

impl fmt::Display for MapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map `f` across `items` with at most `max_workers` concurrent calls.
///
/// The output order always matches the input order.
///
/// # Example
///
/// ```
/// use kreuzberg_flow::parallel::{parallel_map, MapMode};
///
/// let doubled = parallel_map(|x: i32| x * 2, vec![5, 1, 3], 2, MapMode::Thread).unwrap();
/// assert_eq!(doubled, vec![10, 2, 6]);
/// ```
pub fn parallel_map<T, R, F>(f: F, items: Vec<T>, max_workers: usize, mode: MapMode) -> Result<Vec<R>>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Send + Sync,
{
    if max_workers < 1 {
        return Err(Error::InvalidArgument("max_workers must be >= 1".into()));
    }
    if items.is_empty() {
        return Ok(Vec::new());
    }

    log::debug!(
        "parallel_map: {} items, {} workers, mode={}",
        items.len(),
        max_workers,
        mode
    );

    match mode {
        MapMode::Thread => map_on_pool(f, items, max_workers),
        MapMode::Process => Ok(map_on_workers(f, items, max_workers)),
    }
}

fn map_on_pool<T, R, F>(f: F, items: Vec<T>, max_workers: usize) -> Result<Vec<R>>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Send + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(max_workers)
        .build()
        .map_err(|e| Error::component(format!("Failed to build worker pool: {}", e), "Lower max_workers."))?;

    Ok(pool.install(|| items.into_par_iter().map(&f).collect()))
}

fn map_on_workers<T, R, F>(f: F, items: Vec<T>, max_workers: usize) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Send + Sync,
{
    let total = items.len();
    let workers = max_workers.min(total);

    let (job_tx, job_rx) = unbounded::<(usize, T)>();
    let (result_tx, result_rx) = unbounded::<(usize, R)>();

    for job in items.into_iter().enumerate() {
        // Receiver is alive until the scope below ends
        let _ = job_tx.send(job);
    }
    drop(job_tx);

    thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let f = &f;
            scope.spawn(move || {
                for (index, item) in job_rx.iter() {
                    if result_tx.send((index, f(item))).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(result_tx);

    let mut slots: Vec<Option<R>> = (0..total).map(|_| None).collect();
    for (index, value) in result_rx.iter() {
        slots[index] = Some(value);
    }
    slots.into_iter().flatten().collect()
}
