use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Bounded concurrent executor for independent probe tasks.
pub struct ConcurrentProbe {
    semaphore: Arc<Semaphore>,
    completed: Arc<AtomicUsize>,
    errors: Arc<AtomicUsize>,
}

impl ConcurrentProbe {
    pub fn new(concurrency: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
            completed: Arc::new(AtomicUsize::new(0)),
            errors: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Runs every task with at most `concurrency` in flight.
    ///
    /// The output has one slot per input, in input order. A slot is `None`
    /// when its task panicked or could not be scheduled.
    pub async fn execute<T, F, Fut>(&self, tasks: Vec<T>, task_fn: F) -> Vec<Option<Fut::Output>>
    where
        F: Fn(T) -> Fut + Clone + Send + 'static,
        Fut: std::future::Future + Send + 'static,
        Fut::Output: Send + 'static,
        T: Send + 'static,
    {
        let mut results: Vec<Option<Fut::Output>> = Vec::with_capacity(tasks.len());
        results.resize_with(tasks.len(), || None);

        let mut futures = FuturesUnordered::new();

        for (idx, task) in tasks.into_iter().enumerate() {
            let permit = match self.semaphore.clone().acquire_owned().await {
                Ok(p) => p,
                Err(_) => {
                    self.errors.fetch_add(1, Ordering::Relaxed);
                    continue;
                }
            };
            let task_fn = task_fn.clone();
            let completed = self.completed.clone();

            let handle = tokio::spawn(async move {
                let result = task_fn(task).await;
                completed.fetch_add(1, Ordering::Relaxed);
                drop(permit);
                result
            });
            futures.push(async move { (idx, handle.await) });
        }

        while let Some((idx, joined)) = futures.next().await {
            match joined {
                Ok(output) => results[idx] = Some(output),
                Err(e) => {
                    tracing::error!(error=%e, task = idx, "probe task aborted");
                    self.errors.fetch_add(1, Ordering::Relaxed);
                }
            }
        }

        results
    }

    /// (completed, errors)
    pub fn get_stats(&self) -> (usize, usize) {
        (
            self.completed.load(Ordering::Relaxed),
            self.errors.load(Ordering::Relaxed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn keeps_input_order() {
        let exec = ConcurrentProbe::new(4);
        let out = exec
            .execute(vec![30u64, 0, 10, 20], |ms| async move {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                ms
            })
            .await;
        assert_eq!(out, vec![Some(30), Some(0), Some(10), Some(20)]);
        assert_eq!(exec.get_stats(), (4, 0));
    }

    #[tokio::test]
    async fn panicking_task_leaves_empty_slot() {
        let exec = ConcurrentProbe::new(2);
        let out = exec
            .execute(vec![1u32, 2, 3], |n| async move {
                if n == 2 {
                    panic!("boom");
                }
                n
            })
            .await;
        assert_eq!(out, vec![Some(1), None, Some(3)]);
        assert_eq!(exec.get_stats(), (2, 1));
    }

    #[tokio::test]
    async fn respects_limit() {
        let exec = ConcurrentProbe::new(2);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (f, p) = (in_flight.clone(), peak.clone());
        exec.execute((0..8).collect::<Vec<u32>>(), move |_| {
            let (f, p) = (f.clone(), p.clone());
            async move {
                let now = f.fetch_add(1, Ordering::SeqCst) + 1;
                p.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                f.fetch_sub(1, Ordering::SeqCst);
            }
        })
        .await;
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }
}
