//! Detached transcode dispatch.
//!
//! Jobs are queued on an unbounded channel and run by a background worker pool, so
//! submitting never blocks and dropping the submitting request never cancels a job.
//! Trigger failures are logged and never retried.
//!
//! Shutdown: [`TranscodeDispatcher::shutdown`] stops intake, runs jobs that were
//! already queued, and waits for every in-flight job before returning.

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, Semaphore};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::trigger::TranscodingTrigger;

/// A request to start transcoding one stored video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeJob {
    pub video_id: Uuid,
    pub location: String,
}

#[derive(Debug, Clone)]
pub struct TranscodeDispatcherConfig {
    /// Upper bound on triggers running at once.
    pub max_concurrent: usize,
}

impl Default for TranscodeDispatcherConfig {
    fn default() -> Self {
        Self { max_concurrent: 4 }
    }
}

/// Handle to the transcode worker pool. Cheap to clone; all clones feed the same pool.
#[derive(Clone)]
pub struct TranscodeDispatcher {
    job_tx: mpsc::UnboundedSender<TranscodeJob>,
    shutdown_tx: mpsc::Sender<()>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl TranscodeDispatcher {
    /// Start the worker pool on the current tokio runtime.
    pub fn spawn(trigger: Arc<dyn TranscodingTrigger>, config: TranscodeDispatcherConfig) -> Self {
        let (job_tx, job_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let worker = tokio::spawn(async move {
            Self::worker_pool(trigger, config, job_rx, shutdown_rx).await;
        });

        Self {
            job_tx,
            shutdown_tx,
            worker: Arc::new(Mutex::new(Some(worker))),
        }
    }

    /// Queue a job without waiting for it. After shutdown the job is logged and dropped.
    pub fn dispatch(&self, job: TranscodeJob) {
        let video_id = job.video_id;
        if self.job_tx.send(job).is_err() {
            tracing::error!(
                video.id = %video_id,
                "Transcode worker unavailable, dropping job"
            );
        } else {
            tracing::debug!(video.id = %video_id, "Transcode job queued");
        }
    }

    /// Stop accepting jobs and wait until queued and in-flight jobs have finished.
    /// Calling it again is a no-op.
    pub async fn shutdown(&self) {
        let worker = self.worker.lock().await.take();
        let Some(worker) = worker else {
            return;
        };

        tracing::info!("Initiating transcode dispatcher shutdown");
        let _ = self.shutdown_tx.send(()).await;

        if let Err(e) = worker.await {
            tracing::error!(error = %e, "Transcode worker pool terminated abnormally");
        }
    }

    async fn worker_pool(
        trigger: Arc<dyn TranscodingTrigger>,
        config: TranscodeDispatcherConfig,
        mut job_rx: mpsc::UnboundedReceiver<TranscodeJob>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        let max_concurrent = config.max_concurrent.max(1);
        tracing::info!(max_concurrent, "Transcode worker pool started");

        let semaphore = Arc::new(Semaphore::new(max_concurrent));

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Transcode worker pool shutting down");
                    break;
                }
                job = job_rx.recv() => match job {
                    Some(job) => Self::run_job(&trigger, &semaphore, job).await,
                    None => break,
                }
            }
        }

        // Refuse new jobs, then finish the ones already queued.
        job_rx.close();
        while let Some(job) = job_rx.recv().await {
            Self::run_job(&trigger, &semaphore, job).await;
        }

        // All permits back means nothing is in flight.
        if semaphore.acquire_many(max_concurrent as u32).await.is_err() {
            tracing::warn!("Transcode semaphore closed before draining");
        }

        tracing::info!("Transcode worker pool stopped");
    }

    async fn run_job(
        trigger: &Arc<dyn TranscodingTrigger>,
        semaphore: &Arc<Semaphore>,
        job: TranscodeJob,
    ) {
        let permit = match semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                tracing::error!(video.id = %job.video_id, "Transcode semaphore closed, dropping job");
                return;
            }
        };

        let trigger = trigger.clone();
        tokio::spawn(async move {
            let _permit = permit;
            match trigger.start(job.video_id, &job.location).await {
                Ok(()) => {
                    tracing::info!(video.id = %job.video_id, "Transcoding started");
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        video.id = %job.video_id,
                        "Failed to start transcoding"
                    );
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingTrigger {
        calls: std::sync::Mutex<Vec<TranscodeJob>>,
        running: AtomicUsize,
        max_running: AtomicUsize,
        delay_ms: u64,
        fail: bool,
    }

    #[async_trait]
    impl TranscodingTrigger for CountingTrigger {
        async fn start(&self, video_id: Uuid, location: &str) -> anyhow::Result<()> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_running.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            self.calls.lock().unwrap().push(TranscodeJob {
                video_id,
                location: location.to_string(),
            });
            self.running.fetch_sub(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("transcoder down");
            }
            Ok(())
        }
    }

    fn job() -> TranscodeJob {
        TranscodeJob {
            video_id: Uuid::new_v4(),
            location: "http://cdn/original.mp4".to_string(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_runs_job_and_shutdown_drains() {
        let trigger = Arc::new(CountingTrigger {
            delay_ms: 20,
            ..Default::default()
        });
        let dispatcher = TranscodeDispatcher::spawn(trigger.clone(), Default::default());

        let submitted = job();
        dispatcher.dispatch(submitted.clone());
        dispatcher.shutdown().await;

        assert_eq!(*trigger.calls.lock().unwrap(), vec![submitted]);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let trigger = Arc::new(CountingTrigger {
            delay_ms: 30,
            ..Default::default()
        });
        let dispatcher = TranscodeDispatcher::spawn(
            trigger.clone(),
            TranscodeDispatcherConfig { max_concurrent: 2 },
        );

        for _ in 0..6 {
            dispatcher.dispatch(job());
        }
        dispatcher.shutdown().await;

        assert_eq!(trigger.calls.lock().unwrap().len(), 6);
        assert!(trigger.max_running.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_trigger_failure_is_not_retried() {
        let trigger = Arc::new(CountingTrigger {
            fail: true,
            ..Default::default()
        });
        let dispatcher = TranscodeDispatcher::spawn(trigger.clone(), Default::default());

        dispatcher.dispatch(job());
        dispatcher.shutdown().await;

        assert_eq!(trigger.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_after_shutdown_is_dropped() {
        let trigger = Arc::new(CountingTrigger::default());
        let dispatcher = TranscodeDispatcher::spawn(trigger.clone(), Default::default());

        dispatcher.shutdown().await;
        dispatcher.dispatch(job());
        dispatcher.shutdown().await;

        assert!(trigger.calls.lock().unwrap().is_empty());
    }
}
