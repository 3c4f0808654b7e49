pub mod classifier;
pub mod hashes;
pub mod permutations;
pub mod role_search;
pub mod trial_log;

pub use classifier::{classify, Outcome, EMPTY_LM_HASH};
pub use hashes::{extract_hash_lines, HashLine};
pub use role_search::{RoleSearch, SearchProgress};
pub use trial_log::{RoleAssignment, SearchResult, TrialRecord, EXHAUSTED_MESSAGE};
