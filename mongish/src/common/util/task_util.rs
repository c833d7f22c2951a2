use crate::errors::{ErrorKind, MongishError, MongishResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Spawn a detached task on a new thread.
///
/// Used for side effects whose outcome is never reported to the caller; the task
/// must handle and log its own errors.
pub fn async_task<OP>(op: OP)
where
    OP: FnOnce() + Send + 'static,
{
    std::thread::spawn(op);
}

/// Worker threads shared by every fan-out of one connection.
///
/// Fan-outs nest (fill lists run inflation, inflation looks up several
/// references per document), so each level reserves its workers here instead
/// of spawning its own set. A level that finds the budget spent runs inline on
/// the thread that called it.
#[derive(Clone, Default)]
pub struct WorkerBudget {
    inner: Arc<WorkerBudgetInner>,
}

#[derive(Default)]
struct WorkerBudgetInner {
    in_use: AtomicUsize,
    peak: AtomicUsize,
}

impl WorkerBudget {
    pub fn new() -> Self {
        WorkerBudget::default()
    }

    /// Reserves up to `wanted` workers while keeping at most `limit` in use.
    pub fn acquire(&self, wanted: usize, limit: usize) -> WorkerPermit {
        let mut current = self.inner.in_use.load(Ordering::Acquire);
        loop {
            let granted = wanted.min(limit.saturating_sub(current));
            if granted == 0 {
                return WorkerPermit {
                    budget: self.clone(),
                    granted: 0,
                };
            }

            match self.inner.in_use.compare_exchange_weak(
                current,
                current + granted,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.inner.peak.fetch_max(current + granted, Ordering::AcqRel);
                    return WorkerPermit {
                        budget: self.clone(),
                        granted,
                    };
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Workers currently reserved.
    pub fn in_use(&self) -> usize {
        self.inner.in_use.load(Ordering::Acquire)
    }

    /// The highest number of workers ever reserved at once.
    pub fn peak(&self) -> usize {
        self.inner.peak.load(Ordering::Acquire)
    }
}

/// Workers reserved from a [WorkerBudget], handed back on drop.
pub struct WorkerPermit {
    budget: WorkerBudget,
    granted: usize,
}

impl WorkerPermit {
    pub fn granted(&self) -> usize {
        self.granted
    }
}

impl Drop for WorkerPermit {
    fn drop(&mut self) {
        if self.granted > 0 {
            self.budget.inner.in_use.fetch_sub(self.granted, Ordering::AcqRel);
        }
    }
}

/// Runs `op` over every item on scoped worker threads reserved from `workers`,
/// at most `parallelism` of them across all fan-outs sharing the budget, and
/// joins them all before returning.
///
/// With fewer than two workers available the items are processed inline.
/// Results come back in input order. The first error recorded wins: workers stop
/// picking up queued items once an error is seen, operations already running are
/// left to finish and any later error they produce is logged and dropped.
pub fn fan_out<T, R, F>(
    items: Vec<T>,
    workers: &WorkerBudget,
    parallelism: usize,
    op: F,
) -> MongishResult<Vec<R>>
where
    T: Send,
    R: Send,
    F: Fn(T) -> MongishResult<R> + Sync,
{
    if items.len() <= 1 || parallelism <= 1 {
        return items.into_iter().map(&op).collect();
    }

    let total = items.len();
    let permit = workers.acquire(total.min(parallelism), parallelism);
    if permit.granted() <= 1 {
        drop(permit);
        return items.into_iter().map(&op).collect();
    }

    let chunk_size = total.div_ceil(permit.granted());
    let mut chunks: Vec<Vec<(usize, T)>> = Vec::with_capacity(permit.granted());
    let mut iter = items.into_iter().enumerate().peekable();
    while iter.peek().is_some() {
        chunks.push(iter.by_ref().take(chunk_size).collect());
    }

    let first_error: Mutex<Option<MongishError>> = Mutex::new(None);
    let joined: Vec<std::thread::Result<Vec<(usize, R)>>> = std::thread::scope(|s| {
        let handles: Vec<_> = chunks
            .into_iter()
            .map(|chunk| {
                let op = &op;
                let first_error = &first_error;
                s.spawn(move || {
                    let mut out = Vec::with_capacity(chunk.len());
                    for (index, item) in chunk {
                        if first_error.lock().is_some() {
                            break;
                        }
                        match op(item) {
                            Ok(result) => out.push((index, result)),
                            Err(e) => {
                                let mut slot = first_error.lock();
                                if slot.is_none() {
                                    *slot = Some(e);
                                } else {
                                    log::debug!("Dropping secondary fan-out error: {}", e);
                                }
                                break;
                            }
                        }
                    }
                    out
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join()).collect()
    });
    drop(permit);

    if let Some(e) = first_error.into_inner() {
        return Err(e);
    }

    let mut results: Vec<(usize, R)> = Vec::with_capacity(total);
    for chunk in joined {
        match chunk {
            Ok(part) => results.extend(part),
            Err(_) => {
                log::error!("A fan-out worker panicked");
                return Err(MongishError::new(
                    "A fan-out worker panicked",
                    ErrorKind::InternalError,
                ));
            }
        }
    }
    results.sort_by_key(|(index, _)| *index);
    Ok(results.into_iter().map(|(_, result)| result).collect())
}

/// Runs two operations concurrently and waits for both.
///
/// `right` gets a worker from `workers` when one is left; otherwise both run
/// inline, `left` first. If both fail, the error of `left` is reported.
pub fn join<A, B, RA, RB>(
    workers: &WorkerBudget,
    parallelism: usize,
    left: A,
    right: B,
) -> MongishResult<(RA, RB)>
where
    A: FnOnce() -> MongishResult<RA>,
    B: FnOnce() -> MongishResult<RB> + Send,
    RB: Send,
{
    let permit = workers.acquire(1, parallelism);
    if permit.granted() == 0 {
        let a = left()?;
        let b = right()?;
        return Ok((a, b));
    }

    let joined = std::thread::scope(|s| {
        let handle = s.spawn(right);
        let left_result = left();
        let right_result = match handle.join() {
            Ok(result) => result,
            Err(_) => {
                log::error!("A joined worker panicked");
                Err(MongishError::new(
                    "A joined worker panicked",
                    ErrorKind::InternalError,
                ))
            }
        };

        match (left_result, right_result) {
            (Ok(a), Ok(b)) => Ok((a, b)),
            (Err(e), Err(other)) => {
                log::debug!("Dropping secondary join error: {}", other);
                Err(e)
            }
            (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
        }
    });
    drop(permit);
    joined
}
