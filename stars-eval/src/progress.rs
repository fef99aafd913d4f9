//! Live counters of a running evaluation, and a background thread logging them periodically.
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info};

/// Counters updated by a running evaluation.
#[derive(Debug, Default)]
pub struct EvaluationProgress {
    segments: AtomicUsize,
    skipped_segments: AtomicUsize,
    instances: AtomicUsize,
}

impl EvaluationProgress {
    pub fn segments(&self) -> usize {
        self.segments.load(Ordering::Relaxed)
    }

    pub fn skipped_segments(&self) -> usize {
        self.skipped_segments.load(Ordering::Relaxed)
    }

    pub fn instances(&self) -> usize {
        self.instances.load(Ordering::Relaxed)
    }

    pub(crate) fn record_segment(&self) {
        self.segments.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_skipped_segment(&self) {
        self.skipped_segments.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_instance(&self) {
        self.instances.fetch_add(1, Ordering::Relaxed);
    }
}

/// Background thread logging the evaluation progress at a fixed period.
///
/// The thread exits and is joined when the reporter is stopped or dropped.
#[derive(Debug)]
pub struct ProgressReporter {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    pub fn start(progress: Arc<EvaluationProgress>, interval: Duration) -> io::Result<Self> {
        let (stop, signal) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name("stars-progress".to_string())
            .spawn(move || loop {
                match signal.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => info!(
                        segments = progress.segments(),
                        skipped = progress.skipped_segments(),
                        instances = progress.instances(),
                        "Evaluation progress"
                    ),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        debug!(?interval, "Progress reporter started");

        Ok(Self {
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }

        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
            debug!("Progress reporter stopped");
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::{EvaluationProgress, ProgressReporter};

    #[test]
    fn counters() {
        let progress = EvaluationProgress::default();

        progress.record_segment();
        progress.record_segment();
        progress.record_skipped_segment();
        progress.record_instance();

        assert_eq!(progress.segments(), 2);
        assert_eq!(progress.skipped_segments(), 1);
        assert_eq!(progress.instances(), 1);
    }

    #[test]
    fn reporter_stops_promptly() -> std::io::Result<()> {
        let progress = Arc::new(EvaluationProgress::default());
        let reporter = ProgressReporter::start(Arc::clone(&progress), Duration::from_secs(3600))?;

        progress.record_segment();
        reporter.stop();

        assert_eq!(Arc::strong_count(&progress), 1);
        Ok(())
    }

    #[test]
    fn reporter_accepts_the_longest_interval() -> std::io::Result<()> {
        let progress = Arc::new(EvaluationProgress::default());
        let reporter = ProgressReporter::start(Arc::clone(&progress), Duration::MAX)?;

        reporter.stop();

        assert_eq!(Arc::strong_count(&progress), 1);
        Ok(())
    }

    #[test]
    fn dropping_joins_the_thread() -> std::io::Result<()> {
        let progress = Arc::new(EvaluationProgress::default());

        {
            let _reporter = ProgressReporter::start(Arc::clone(&progress), Duration::from_millis(1))?;
            std::thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(Arc::strong_count(&progress), 1);
        Ok(())
    }
}
