use serde::Serialize;

/// LM hash of the empty password, printed for every account without an LM hash.
pub const EMPTY_LM_HASH: &str = "aad3b435b51404eeaad3b435b51404ee";

const HASH_MARKERS: &[&str] = &[":::", "NT", EMPTY_LM_HASH];
const ERROR_MARKERS: &[&str] = &["not subscriptable", "Error", "Traceback"];

const REASON_MAX_CHARS: usize = 60;
const NO_HASHES_REASON: &str = "No hashes found";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Fail(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// Decides whether one tool run recovered credentials.
///
/// Hash markers are looked for in stdout only, error markers in stdout and
/// stderr together. Any error marker wins over any hash marker.
pub fn classify(stdout: &str, stderr: &str) -> Outcome {
    let has_hashes = HASH_MARKERS.iter().any(|marker| stdout.contains(marker));
    let has_error = ERROR_MARKERS
        .iter()
        .any(|marker| stdout.contains(marker) || stderr.contains(marker));

    if has_hashes && !has_error {
        Outcome::Success
    } else {
        Outcome::Fail(failure_reason(stderr))
    }
}

fn failure_reason(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        return NO_HASHES_REASON.to_string();
    }

    trimmed
        .lines()
        .next()
        .unwrap_or_default()
        .chars()
        .take(REASON_MAX_CHARS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_lm_hash_is_success() {
        let stdout = format!("Administrator:500:{}:31d6cfe0d16ae931b73c59d7e0c089c0:::", EMPTY_LM_HASH);
        assert_eq!(classify(&stdout, ""), Outcome::Success);
        assert_eq!(classify(EMPTY_LM_HASH, ""), Outcome::Success);
    }

    #[test]
    fn test_each_hash_marker_alone_is_enough() {
        assert!(classify("[*] Dumping local SAM hashes (uid:rid:lmhash:nthash)\nx:::", "").is_success());
        assert!(classify("NTLM", "").is_success());
        assert!(classify(EMPTY_LM_HASH, "").is_success());
    }

    #[test]
    fn test_traceback_fails_regardless_of_hashes() {
        let stdout = format!("Traceback (most recent call last):\n{}:::", EMPTY_LM_HASH);
        assert!(!classify(&stdout, "").is_success());
    }

    #[test]
    fn test_error_token_takes_precedence() {
        assert!(!classify("NT hashes\nError while reading", "").is_success());
        assert!(!classify("NT", "Error: bad format").is_success());
        assert!(!classify("NT", "'NoneType' object is not subscriptable").is_success());
    }

    #[test]
    fn test_hash_markers_in_stderr_do_not_count() {
        assert_eq!(
            classify("", "NT:::"),
            Outcome::Fail("NT:::".to_string())
        );
    }

    #[test]
    fn test_reason_is_first_stderr_line() {
        assert_eq!(
            classify("", "Error: bad format\nmore detail"),
            Outcome::Fail("Error: bad format".to_string())
        );
        assert_eq!(
            classify("", "\n   Error: leading blank lines\n"),
            Outcome::Fail("Error: leading blank lines".to_string())
        );
    }

    #[test]
    fn test_reason_truncated_to_sixty_chars() {
        let long = "E".repeat(200);
        match classify("", &long) {
            Outcome::Fail(reason) => assert_eq!(reason.chars().count(), 60),
            Outcome::Success => panic!("expected failure"),
        }

        let wide = "é".repeat(80);
        match classify("", &wide) {
            Outcome::Fail(reason) => assert_eq!(reason, "é".repeat(60)),
            Outcome::Success => panic!("expected failure"),
        }
    }

    #[test]
    fn test_empty_stderr_reason() {
        assert_eq!(classify("", ""), Outcome::Fail("No hashes found".to_string()));
        assert_eq!(classify("nothing here", "  \n"), Outcome::Fail("No hashes found".to_string()));
    }
}
