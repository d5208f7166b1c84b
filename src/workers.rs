//! Bounded parallel execution of independent per-asset work.
//!
//! Work items are handed out from a shared queue to at most `max_workers`
//! scoped threads, so closures may borrow the caller's tables and paths.
//! Results come back in no particular order.

use std::sync::Mutex;
use std::thread;

/// Runs `work` on every item using at most `max_workers` threads.
///
/// With one worker (or a single item) everything runs on the calling
/// thread. A panic inside `work` is propagated to the caller once all
/// threads have stopped.
pub fn map_bounded<T, R, F>(items: Vec<T>, max_workers: usize, work: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync,
{
    let workers = max_workers.max(1).min(items.len());
    if workers <= 1 {
        return items.into_iter().map(work).collect();
    }

    let total = items.len();
    let queue = Mutex::new(items.into_iter());
    let work = &work;
    let queue = &queue;

    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(move || {
                    let mut results = Vec::new();
                    loop {
                        let next = match queue.lock() {
                            Ok(mut guard) => guard.next(),
                            Err(poisoned) => poisoned.into_inner().next(),
                        };
                        let Some(item) = next else { break };
                        results.push(work(item));
                    }
                    results
                })
            })
            .collect();

        let mut all = Vec::with_capacity(total);
        for handle in handles {
            match handle.join() {
                Ok(results) => all.extend(results),
                Err(payload) => std::panic::resume_unwind(payload),
            }
        }
        all
    })
}
