use crate::error::{HiveProbeError, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Removes staging directories when the user interrupts a probe.
///
/// A running search cannot be cancelled; Ctrl+C ends the process, and this
/// guard only makes sure staged hive copies do not outlive it.
pub struct CleanupGuard {
    registered: Arc<Mutex<Vec<PathBuf>>>,
    interrupted: Arc<AtomicBool>,
}

impl CleanupGuard {
    pub fn new() -> Result<Self> {
        let guard = Self::new_for_test();

        let registered = guard.registered.clone();
        let interrupted = guard.interrupted.clone();

        ctrlc::set_handler(move || {
            if !interrupted.swap(true, Ordering::SeqCst) {
                eprintln!("\n🛑 Interrupted, removing staged files...");
            }
            remove_registered(&registered);
            std::process::exit(INTERRUPTED_EXIT_CODE);
        })
        .map_err(|e| HiveProbeError::Config {
            message: format!("Failed to set signal handler: {}", e),
        })?;

        Ok(guard)
    }

    /// Create a CleanupGuard for testing (no signal handler registration)
    pub fn new_for_test() -> Self {
        Self {
            registered: Arc::new(Mutex::new(Vec::new())),
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn register(&self, dir: &Path) {
        if let Ok(mut registered) = self.registered.lock() {
            registered.push(dir.to_path_buf());
        }
    }

    pub fn unregister(&self, dir: &Path) {
        if let Ok(mut registered) = self.registered.lock() {
            registered.retain(|path| path != dir);
        }
    }

    #[cfg(test)]
    pub(crate) fn registered_count(&self) -> usize {
        self.registered.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// What the signal handler does, minus exiting the process.
    #[cfg(test)]
    fn cleanup_now(&self) {
        remove_registered(&self.registered);
    }
}

fn remove_registered(registered: &Mutex<Vec<PathBuf>>) {
    if let Ok(mut dirs) = registered.lock() {
        for dir in dirs.drain(..) {
            let _ = std::fs::remove_dir_all(&dir);
        }
    }
}
