use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, warn};

/// Deferred removal of verification scratch files.
#[derive(Debug, Clone, Copy)]
pub struct ScratchCleanup {
    delay: Duration,
}

impl ScratchCleanup {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// Remove `path` once the delay has elapsed.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule(&self, path: PathBuf) -> CleanupHandle {
        let deadline = Instant::now() + self.delay;
        let (trigger, fired) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            tokio::select! {
                _ = sleep_until(deadline) => {}
                Ok(()) = fired => {}
            }
            remove_scratch(&path);
        });

        CleanupHandle {
            trigger: Some(trigger),
            task,
        }
    }
}

/// Handle to one scheduled removal.
///
/// Dropping the handle leaves the removal scheduled.
#[derive(Debug)]
pub struct CleanupHandle {
    trigger: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl CleanupHandle {
    /// Remove the file now instead of waiting out the delay
    pub async fn fire_now(mut self) {
        if let Some(trigger) = self.trigger.take() {
            let _ = trigger.send(());
        }
        self.wait().await;
    }

    /// Wait until the removal has run
    pub async fn wait(self) {
        if let Err(e) = self.task.await {
            if !e.is_cancelled() {
                warn!(error = %e, "Scratch cleanup task failed");
            }
        }
    }

    pub fn cancel(self) {
        self.task.abort();
    }
}

/// Unlink `path`; a file that is already gone is not an error.
fn remove_scratch(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed scratch file"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove scratch file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scratch_file(temp_dir: &TempDir) -> PathBuf {
        let path = temp_dir.path().join("photo_verify_2024-01-01T00-00-00.jpg");
        std::fs::write(&path, b"scratch").unwrap();
        path
    }

    #[tokio::test(start_paused = true)]
    async fn test_removed_after_delay() {
        let temp_dir = TempDir::new().unwrap();
        let path = scratch_file(&temp_dir);

        let handle = ScratchCleanup::from_secs(60).schedule(path.clone());

        tokio::time::advance(Duration::from_secs(59)).await;
        tokio::task::yield_now().await;
        assert!(path.exists());

        tokio::time::advance(Duration::from_secs(2)).await;
        handle.wait().await;
        assert!(!path.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fire_now() {
        let temp_dir = TempDir::new().unwrap();
        let path = scratch_file(&temp_dir);

        let handle = ScratchCleanup::from_secs(3600).schedule(path.clone());
        handle.fire_now().await;

        assert!(!path.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_keeps_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = scratch_file(&temp_dir);

        let handle = ScratchCleanup::from_secs(60).schedule(path.clone());
        handle.cancel();

        tokio::time::advance(Duration::from_secs(120)).await;
        tokio::task::yield_now().await;
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_missing_file_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("already-gone.jpg");

        let handle = ScratchCleanup::new(Duration::ZERO).schedule(path.clone());
        handle.wait().await;

        assert!(!path.exists());
    }
}
