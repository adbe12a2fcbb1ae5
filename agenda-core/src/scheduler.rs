//! Debounced scheduling: coalesce bursts of edits into one delayed run.

use std::future::Future;
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::{AbortHandle, JoinHandle};

/// Schedules a job to run once the quiet period has passed without another
/// schedule. Runs never overlap and a running job is never cancelled; a job
/// that comes due while another runs waits for it.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet_period: Duration,
    pending: Arc<std::sync::Mutex<Pending>>,
    run_lock: Arc<Mutex<()>>,
}

/// The latest schedule, until its job claims it and starts running.
#[derive(Debug, Default)]
struct Pending {
    generation: u64,
    task: Option<AbortHandle>,
}

impl Pending {
    /// Invalidate the current schedule, aborting its task if it hasn't
    /// started running yet.
    fn supersede(&mut self) -> u64 {
        self.generation += 1;
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation
    }
}

impl Debouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Debouncer {
            quiet_period,
            pending: Arc::new(std::sync::Mutex::new(Pending::default())),
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Cancel any pending run and schedule `job` after the quiet period.
    ///
    /// The handle resolves to `true` once the job has run. A job superseded
    /// before it started is aborted, so its handle resolves to a cancelled
    /// `JoinError`.
    pub fn schedule<F, Fut>(&self, job: F) -> JoinHandle<bool>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let ticket = pending.supersede();

        let claim = Arc::clone(&self.pending);
        let run_lock = Arc::clone(&self.run_lock);
        let quiet_period = self.quiet_period;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            let _running = run_lock.lock().await;

            {
                let mut pending = claim.lock().unwrap_or_else(PoisonError::into_inner);
                if pending.generation != ticket {
                    return false;
                }
                // From here on nothing may abort this task
                pending.task = None;
            }

            tracing::debug!("Debounced run #{} starting", ticket);
            job().await;
            true
        });

        pending.task = Some(handle.abort_handle());
        handle
    }

    /// Cancel any pending run and wait for a running one to finish.
    pub async fn shutdown(&self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .supersede();

        let _idle = self.run_lock.lock().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::time::{Instant, sleep};

    fn counting(runs: &Arc<AtomicUsize>) -> impl FnOnce() -> std::future::Ready<()> + Send + 'static {
        let runs = Arc::clone(runs);
        move || {
            runs.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn burst_within_quiet_period_runs_once() {
        let debouncer = Debouncer::new(Duration::from_secs(30));
        let runs = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..3 {
            handles.push(debouncer.schedule(counting(&runs)));
            sleep(Duration::from_secs(10)).await;
        }

        let mut ran = Vec::new();
        for handle in handles {
            ran.push(match handle.await {
                Ok(ran) => ran,
                Err(e) => {
                    assert!(e.is_cancelled());
                    false
                }
            });
        }

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(ran, vec![false, false, true]);
    }

    #[tokio::test(start_paused = true)]
    async fn spaced_edits_each_run() {
        let debouncer = Debouncer::new(Duration::from_secs(30));
        let runs = Arc::new(AtomicUsize::new(0));

        let first = debouncer.schedule(counting(&runs));
        sleep(Duration::from_secs(45)).await;
        let second = debouncer.schedule(counting(&runs));

        assert!(first.await.unwrap());
        assert!(second.await.unwrap());
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn running_job_is_not_cancelled_and_runs_do_not_overlap() {
        let debouncer = Debouncer::new(Duration::from_secs(30));
        let spans = Arc::new(std::sync::Mutex::new(Vec::new()));

        let long_job = |spans: Arc<std::sync::Mutex<Vec<(Instant, Instant)>>>| {
            move || async move {
                let started = Instant::now();
                sleep(Duration::from_secs(60)).await;
                spans.lock().unwrap().push((started, Instant::now()));
            }
        };

        let first = debouncer.schedule(long_job(Arc::clone(&spans)));
        // first is now mid-run
        sleep(Duration::from_secs(40)).await;
        let second = debouncer.schedule(long_job(Arc::clone(&spans)));

        assert!(first.await.unwrap());
        assert!(second.await.unwrap());

        let spans = spans.lock().unwrap();
        assert_eq!(spans.len(), 2);
        assert!(spans[1].0 >= spans[0].1);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_timer_is_aborted_right_away() {
        let debouncer = Debouncer::new(Duration::from_secs(30));
        let runs = Arc::new(AtomicUsize::new(0));

        let first = debouncer.schedule(counting(&runs));
        let _second = debouncer.schedule(counting(&runs));

        // No time passes: the first timer is gone without sleeping it out
        let err = first.await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_drops_pending_run() {
        let debouncer = Debouncer::new(Duration::from_secs(30));
        let runs = Arc::new(AtomicUsize::new(0));

        let pending = debouncer.schedule(counting(&runs));
        debouncer.shutdown().await;

        assert!(pending.await.unwrap_err().is_cancelled());
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_waits_for_running_job() {
        let debouncer = Debouncer::new(Duration::from_secs(30));
        let done = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&done);
        let running = debouncer.schedule(move || async move {
            sleep(Duration::from_secs(60)).await;
            flag.store(true, Ordering::SeqCst);
        });

        // past the quiet period, so the job is mid-run
        sleep(Duration::from_secs(40)).await;
        debouncer.shutdown().await;

        assert!(done.load(Ordering::SeqCst));
        assert!(running.await.unwrap());
    }
}
