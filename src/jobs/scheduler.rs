//! Periodic note resolution
//!
//! Sweeps never overlap: a trigger that arrives while one is running is
//! skipped, whether it comes from the interval timer or the HTTP trigger.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::driver::{NoteResolver, SweepReport};

/// When the background sweep runs
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    pub interval: Duration,
    /// Run the first sweep immediately instead of after one interval
    pub run_on_startup: bool,
}

/// Single-flight wrapper around [`NoteResolver`]
#[derive(Clone)]
pub struct ResolutionJob {
    resolver: Arc<NoteResolver>,
    /// One permit; held for the duration of a sweep
    gate: Arc<Semaphore>,
}

impl ResolutionJob {
    pub fn new(resolver: NoteResolver) -> Self {
        Self {
            resolver: Arc::new(resolver),
            gate: Arc::new(Semaphore::new(1)),
        }
    }

    /// Run one sweep unless another is in flight.
    ///
    /// Returns `None` when the trigger was skipped.
    pub async fn run_once(&self) -> Option<SweepReport> {
        let _permit = match self.gate.try_acquire() {
            Ok(permit) => permit,
            Err(_) => {
                tracing::info!("Note resolution already running, skipping trigger");
                return None;
            }
        };

        Some(self.resolver.sweep().await)
    }

    /// Whether a sweep is currently in flight.
    ///
    /// Only reads the permit count, so it never competes with a trigger.
    pub fn is_running(&self) -> bool {
        self.gate.available_permits() == 0
    }

    /// Start the recurring sweep.
    ///
    /// Ticks missed while a sweep runs are dropped, not queued. Abort the
    /// returned handle to stop the schedule.
    pub fn spawn(self, schedule: Schedule) -> JoinHandle<()> {
        tracing::info!(
            "Scheduled note resolution every {}s",
            schedule.interval.as_secs()
        );

        tokio::spawn(async move {
            let start = if schedule.run_on_startup {
                Instant::now()
            } else {
                Instant::now() + schedule.interval
            };
            let mut ticker = tokio::time::interval_at(start, schedule.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                tracing::debug!("Starting note processing...");
                self.run_once().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::jobs::testing::{note, FakeExtractor, MemoryStore};

    fn job(store: &Arc<MemoryStore>, extractor: FakeExtractor) -> ResolutionJob {
        ResolutionJob::new(NoteResolver::new(
            store.clone(),
            Arc::new(extractor),
            PathBuf::from("/storage"),
            1,
        ))
    }

    #[tokio::test]
    async fn test_run_once_sweeps() {
        let store = Arc::new(MemoryStore::new());
        store.add_primary_file("book-1");
        store.add_note(note("n1", "book-1", "brown fox"));
        let extractor =
            FakeExtractor::new().with_book(&store.path_for("book-1"), vec![(1, "a brown fox")]);

        let job = job(&store, extractor);
        let report = job.run_once().await.unwrap();

        assert_eq!(report.resolved, 1);
        assert_eq!(store.note("n1").page, Some(1));
        assert!(!job.is_running());
    }

    #[tokio::test]
    async fn test_overlapping_trigger_is_skipped() {
        let store = Arc::new(MemoryStore::new());
        let job = job(&store, FakeExtractor::new());

        let held = job.gate.clone().try_acquire_owned().unwrap();
        assert!(job.is_running());
        assert!(job.run_once().await.is_none());
        assert_eq!(store.unprocessed_queries.load(Ordering::SeqCst), 0);

        drop(held);
        assert!(job.run_once().await.is_some());
        assert_eq!(store.unprocessed_queries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_status_checks_never_skip_triggers() {
        let store = Arc::new(MemoryStore::new());
        let job = job(&store, FakeExtractor::new());

        let stop = Arc::new(AtomicBool::new(false));
        let watchers: Vec<_> = (0..3)
            .map(|_| {
                let job = job.clone();
                let stop = stop.clone();
                tokio::spawn(async move {
                    let mut checks = 0usize;
                    loop {
                        job.is_running();
                        checks += 1;
                        if stop.load(Ordering::SeqCst) {
                            break;
                        }
                        tokio::task::yield_now().await;
                    }
                    checks
                })
            })
            .collect();

        for _ in 0..200 {
            assert!(job.run_once().await.is_some());
        }

        stop.store(true, Ordering::SeqCst);
        for watcher in watchers {
            assert!(watcher.await.unwrap() > 0);
        }
        assert_eq!(store.unprocessed_queries.load(Ordering::SeqCst), 200);
    }

    #[tokio::test]
    async fn test_spawn_runs_on_startup() {
        let store = Arc::new(MemoryStore::new());
        let handle = job(&store, FakeExtractor::new()).spawn(Schedule {
            interval: Duration::from_secs(3600),
            run_on_startup: true,
        });

        let deadline = Instant::now() + Duration::from_secs(2);
        while store.unprocessed_queries.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert_eq!(store.unprocessed_queries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_spawn_waits_one_interval_by_default() {
        let store = Arc::new(MemoryStore::new());
        let handle = job(&store, FakeExtractor::new()).spawn(Schedule {
            interval: Duration::from_secs(3600),
            run_on_startup: false,
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        assert_eq!(store.unprocessed_queries.load(Ordering::SeqCst), 0);
    }
}
