//! Warm-up wait before fetching pull-request issues.
//!
//! The server may not have indexed the analysis of the triggering change
//! yet when the fetch step runs. The fetcher waits a fixed interval once;
//! it does not poll and does not retry.

use crate::error::{InspectionError, Result};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::debug;

/// Fixed delay before the pull-request fetch.
pub const WARM_UP_DELAY: Duration = Duration::from_secs(15);

/// Suspends the acquisition for a given interval.
#[async_trait]
pub trait Waiter: Send + Sync {
    /// Fails with [`InspectionError::Interrupted`] if the wait is cancelled.
    async fn wait(&self, duration: Duration) -> Result<()>;
}

/// Cancels in-flight and future waits of the waiters sharing it.
#[derive(Debug, Clone, Default)]
pub struct InterruptHandle {
    interrupted: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl InterruptHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}

/// Waits on the tokio timer.
#[derive(Debug, Clone, Default)]
pub struct TokioWaiter {
    interrupt: InterruptHandle,
    show_progress: bool,
}

impl TokioWaiter {
    pub fn new(interrupt: InterruptHandle) -> Self {
        Self {
            interrupt,
            show_progress: false,
        }
    }

    /// Show a spinner on the terminal while waiting.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn spinner(&self, duration: Duration) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!(
            "Waiting {}s for SonarQube to index the analysis",
            duration.as_secs()
        ));
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    }
}

#[async_trait]
impl Waiter for TokioWaiter {
    async fn wait(&self, duration: Duration) -> Result<()> {
        let notified = self.interrupt.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        if self.interrupt.is_interrupted() {
            return Err(InspectionError::Interrupted);
        }

        debug!("Sleeping {:?} before fetching issues", duration);
        let progress = self.spinner(duration);

        let result = tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(()),
            _ = &mut notified => Err(InspectionError::Interrupted),
        };

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        result
    }
}
