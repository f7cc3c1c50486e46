use anyhow::Result;
use crossbeam::channel::{Receiver, Sender, bounded};

/// Bounded worker pool over a borrowed slice of work items.
///
/// Workers hand their results back over a channel and a single collector on
/// the calling thread gathers them, so no result storage is shared between
/// threads. Results come back in completion order.
pub struct ParallelExecutor {
    max_workers: usize,
    buffer_size: usize,
}

/// Context for worker threads to avoid too many function parameters
struct WorkerContext<'w, T, R, F> {
    worker_id: usize,
    work_rx: Receiver<&'w T>,
    result_tx: Sender<R>,
    processor: &'w F,
}

impl ParallelExecutor {
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            max_workers,
            buffer_size: max_workers * 2,
        }
    }

    /// Threads actually spawned for `work_count` items
    pub fn worker_count(&self, work_count: usize) -> usize {
        std::cmp::min(self.max_workers, work_count).max(1)
    }

    /// Run `processor` over every item; `on_result(result, completed, total)` is
    /// called on the collecting thread as each result arrives.
    pub fn execute<T, R, F, C>(&self, work_items: &[T], processor: F, mut on_result: C) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T, usize) -> R + Sync, // (item, worker_id)
        C: FnMut(&R, usize, usize),
    {
        if work_items.is_empty() {
            return Ok(Vec::new());
        }

        let total_items = work_items.len();
        let actual_workers = self.worker_count(total_items);
        let (work_tx, work_rx): (Sender<&T>, Receiver<&T>) = bounded(self.buffer_size);
        let (result_tx, result_rx): (Sender<R>, Receiver<R>) = bounded(self.buffer_size);
        let processor = &processor;

        tracing::debug!(
            "Dispatching {} items to {} workers",
            total_items,
            actual_workers
        );

        crossbeam::thread::scope(|s| {
            for worker_id in 0..actual_workers {
                let ctx = WorkerContext {
                    worker_id,
                    work_rx: work_rx.clone(),
                    result_tx: result_tx.clone(),
                    processor,
                };
                s.spawn(move |_| Self::worker_thread(ctx));
            }

            // Producer thread: send work to workers
            let work_tx_clone = work_tx.clone();
            s.spawn(move |_| {
                for work_item in work_items {
                    if work_tx_clone.send(work_item).is_err() {
                        break; // Workers dropped
                    }
                }
            });

            // Drop senders so receivers know when work is done
            drop(work_tx);
            drop(result_tx);

            Self::collect_results(result_rx, total_items, &mut on_result)
        })
        .map_err(|_| anyhow::anyhow!("Thread panic occurred during parallel execution"))
    }

    fn worker_thread<T, R, F>(ctx: WorkerContext<'_, T, R, F>)
    where
        F: Fn(&T, usize) -> R,
    {
        while let Ok(work_item) = ctx.work_rx.recv() {
            let result = (ctx.processor)(work_item, ctx.worker_id);

            if ctx.result_tx.send(result).is_err() {
                break; // Receiver dropped
            }
        }
        tracing::trace!("worker-{} finished", ctx.worker_id);
    }

    fn collect_results<R, C>(result_rx: Receiver<R>, total_items: usize, on_result: &mut C) -> Vec<R>
    where
        C: FnMut(&R, usize, usize),
    {
        let mut results = Vec::with_capacity(total_items);

        while let Ok(result) = result_rx.recv() {
            on_result(&result, results.len() + 1, total_items);
            results.push(result);

            if results.len() >= total_items {
                break;
            }
        }

        results
    }
}

/// In-order execution on the calling thread with an optional early stop
pub struct SequentialExecutor;

impl SequentialExecutor {
    /// Process items in order; stops right after the first result for which `stop` is true.
    pub fn execute<T, R, F, S>(work_items: &[T], processor: F, stop: S) -> Vec<R>
    where
        F: Fn(&T, usize) -> R,
        S: Fn(&R) -> bool,
    {
        let mut results = Vec::with_capacity(work_items.len());

        for work_item in work_items {
            let result = processor(work_item, 0); // Sequential uses worker_id 0
            let halt = stop(&result);
            results.push(result);

            if halt {
                break;
            }
        }

        results
    }
}

/// Execution strategy enum for choosing between parallel and sequential
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStrategy {
    Sequential,
    Parallel { workers: usize },
}

impl ExecutionStrategy {
    /// Parallel pools never exceed `max_workers` or the number of items
    pub fn parallel(work_items_count: usize, max_workers: usize) -> Self {
        ExecutionStrategy::Parallel {
            workers: std::cmp::min(work_items_count, max_workers).max(1),
        }
    }
}
