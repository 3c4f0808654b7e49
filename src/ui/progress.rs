use crate::search::SearchProgress;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct ProgressManager {
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn create_trial_progress(&self, total_trials: u64) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total_trials);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>4}/{len:4} trials {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        pb.set_message("Waiting for first trial...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

pub fn update_trial_progress(pb: &ProgressBar, progress: &SearchProgress<'_>) {
    pb.set_position(progress.trials_run as u64);
    pb.set_message(progress.record.assignment.clone());
}

pub fn finish_progress_with_summary(pb: &ProgressBar, message: &str, duration: Duration) {
    let final_message = format!("{} (completed in {})", message, format_duration(duration));
    pb.finish_with_message(final_message);
}

pub(crate) fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{Outcome, TrialRecord};

    #[test]
    fn test_disabled_progress_bar_is_hidden() {
        let pb = ProgressManager::new(false).create_trial_progress(6);
        assert!(pb.is_hidden());
    }

    #[test]
    fn test_update_trial_progress() {
        let pb = ProgressBar::hidden();
        pb.set_length(6);
        let record = TrialRecord {
            assignment: "a -> b -> c".to_string(),
            outcome: Outcome::Fail("No hashes found".to_string()),
        };

        update_trial_progress(
            &pb,
            &SearchProgress {
                trials_run: 2,
                total_trials: 6,
                record: &record,
            },
        );

        assert_eq!(pb.position(), 2);
        assert_eq!(pb.message(), "a -> b -> c");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    }
}
