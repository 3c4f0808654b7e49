use crate::search::{extract_hash_lines, HashLine, SearchResult};
use crate::staging::FileSet;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// A search result together with what the CLI shows around it.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    #[serde(flatten)]
    pub result: SearchResult,
    pub files: Vec<String>,
    pub accounts: Vec<HashLine>,
    pub duration_ms: u128,
    pub probed_at: DateTime<Utc>,
}

impl ProbeReport {
    pub fn new(result: SearchResult, file_set: &FileSet, duration: Duration) -> Self {
        let accounts = result
            .output
            .as_deref()
            .map(extract_hash_lines)
            .unwrap_or_default();

        Self {
            result,
            files: file_set.names().into_iter().map(str::to_string).collect(),
            accounts,
            duration_ms: duration.as_millis(),
            probed_at: Utc::now(),
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms as u64)
    }

    pub fn is_success(&self) -> bool {
        self.result.success
    }

    /// Accounts whose LM hash is not the empty-password placeholder.
    pub fn lm_hash_accounts(&self) -> usize {
        self.accounts.iter().filter(|line| line.has_lm_hash()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{Outcome, TrialRecord};
    use std::path::PathBuf;

    fn file_set() -> FileSet {
        let mut set = FileSet::new();
        set.insert("SAM", PathBuf::from("/t/0")).unwrap();
        set.insert("SYSTEM", PathBuf::from("/t/1")).unwrap();
        set
    }

    #[test]
    fn test_accounts_extracted_on_success() {
        let result = SearchResult::succeeded(
            "Guest:501:aad3b435b51404eeaad3b435b51404ee:31d6cfe0d16ae931b73c59d7e0c089c0:::\n"
                .to_string(),
            vec![TrialRecord {
                assignment: "SAM -> SYSTEM -> SYSTEM".to_string(),
                outcome: Outcome::Success,
            }],
        );
        let report = ProbeReport::new(result, &file_set(), Duration::from_millis(1500));

        assert!(report.is_success());
        assert_eq!(report.accounts.len(), 1);
        assert_eq!(report.accounts[0].account, "Guest");
        assert_eq!(report.lm_hash_accounts(), 0);
        assert_eq!(report.duration(), Duration::from_millis(1500));
    }

    #[test]
    fn test_lm_hash_accounts_are_counted() {
        let output = "\
Administrator:500:aad3b435b51404eeaad3b435b51404ee:31d6cfe0d16ae931b73c59d7e0c089c0:::
legacy:1001:e52cac67419a9a224a3b108f3fa6cb6d:8846f7eaee8fb117ad06bdd830b7586c:::
";
        let result = SearchResult::succeeded(
            output.to_string(),
            vec![TrialRecord {
                assignment: "SAM -> SYSTEM -> SYSTEM".to_string(),
                outcome: Outcome::Success,
            }],
        );
        let report = ProbeReport::new(result, &file_set(), Duration::ZERO);

        assert_eq!(report.accounts.len(), 2);
        assert_eq!(report.lm_hash_accounts(), 1);
    }

    #[test]
    fn test_json_keeps_search_result_fields_at_top_level() {
        let report = ProbeReport::new(SearchResult::exhausted(Vec::new()), &file_set(), Duration::ZERO);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "No valid combination found.");
        assert_eq!(json["files"][1], "SYSTEM");
        assert!(json["attempts"].as_array().unwrap().is_empty());
        assert!(json["accounts"].as_array().unwrap().is_empty());
    }
}
