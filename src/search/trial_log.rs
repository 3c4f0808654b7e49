use crate::search::Outcome;
use crate::staging::{FileSet, HiveCandidate};
use serde::{Serialize, Serializer};
use std::fmt;

pub const EXHAUSTED_MESSAGE: &str = "No valid combination found.";

/// Which candidate plays which hive role for one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleAssignment<'a> {
    pub sam: &'a HiveCandidate,
    pub system: &'a HiveCandidate,
    pub security: &'a HiveCandidate,
}

impl<'a> RoleAssignment<'a> {
    /// Maps an ordering of the file set onto the three roles.
    ///
    /// Returns `None` for orderings shorter than two. With exactly two files
    /// the SYSTEM candidate is reused as SECURITY.
    pub fn from_ordering(file_set: &'a FileSet, ordering: &[usize]) -> Option<Self> {
        if ordering.len() < 2 {
            return None;
        }

        let sam = file_set.get(ordering[0])?;
        let system = file_set.get(ordering[1])?;
        let security = match ordering.get(2) {
            Some(&index) => file_set.get(index)?,
            None => system,
        };

        Some(Self {
            sam,
            system,
            security,
        })
    }

    pub fn describe(&self) -> String {
        format!(
            "{} -> {} -> {}",
            self.sam.name, self.system.name, self.security.name
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialRecord {
    pub assignment: String,
    pub outcome: Outcome,
}

impl TrialRecord {
    pub fn new(assignment: &RoleAssignment<'_>, outcome: Outcome) -> Self {
        Self {
            assignment: assignment.describe(),
            outcome,
        }
    }
}

impl fmt::Display for TrialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Success => write!(f, "Attempt: {} - SUCCESS", self.assignment),
            Outcome::Fail(reason) => write!(f, "Attempt: {} - FAIL: {}", self.assignment, reason),
        }
    }
}

// Attempts travel to callers as the human-readable line only.
impl Serialize for TrialRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub attempts: Vec<TrialRecord>,
}

impl SearchResult {
    pub fn succeeded(output: String, attempts: Vec<TrialRecord>) -> Self {
        Self {
            success: true,
            output: Some(output),
            error: None,
            attempts,
        }
    }

    pub fn exhausted(attempts: Vec<TrialRecord>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(EXHAUSTED_MESSAGE.to_string()),
            attempts,
        }
    }

    /// The record that succeeded, always the last one when present.
    pub fn winning_attempt(&self) -> Option<&TrialRecord> {
        self.attempts
            .last()
            .filter(|record| record.outcome.is_success())
    }
}
