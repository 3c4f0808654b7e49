use crate::search::classifier::EMPTY_LM_HASH;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// One `account:rid:lmhash:nthash:::` line from the tool's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashLine {
    pub account: String,
    pub rid: u32,
    pub lm_hash: String,
    pub nt_hash: String,
}

impl HashLine {
    pub fn has_lm_hash(&self) -> bool {
        !self.lm_hash.eq_ignore_ascii_case(EMPTY_LM_HASH)
    }
}

fn hash_line_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"(?m)^(?P<account>[^:\r\n]+):(?P<rid>\d+):(?P<lm>[0-9a-fA-F]{32}):(?P<nt>[0-9a-fA-F]{32}):::").ok()
        })
        .as_ref()
}

/// Pulls the SAM account lines out of a successful run's stdout.
pub fn extract_hash_lines(stdout: &str) -> Vec<HashLine> {
    let Some(pattern) = hash_line_pattern() else {
        return Vec::new();
    };

    pattern
        .captures_iter(stdout)
        .filter_map(|caps| {
            Some(HashLine {
                account: caps["account"].to_string(),
                rid: caps["rid"].parse().ok()?,
                lm_hash: caps["lm"].to_lowercase(),
                nt_hash: caps["nt"].to_lowercase(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[*] Target system bootKey: 0x5f1e2d3c4b5a69788796a5b4c3d2e1f0
[*] Dumping local SAM hashes (uid:rid:lmhash:nthash)
Administrator:500:aad3b435b51404eeaad3b435b51404ee:31d6cfe0d16ae931b73c59d7e0c089c0:::
Guest:501:aad3b435b51404eeaad3b435b51404ee:31d6cfe0d16ae931b73c59d7e0c089c0:::
legacy:1001:E52CAC67419A9A224A3B108F3FA6CB6D:8846F7EAEE8FB117AD06BDD830B7586C:::
[*] Dumping cached domain logon information (domain/username:hash)
";

    #[test]
    fn test_extracts_account_lines() {
        let lines = extract_hash_lines(SAMPLE);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].account, "Administrator");
        assert_eq!(lines[0].rid, 500);
        assert!(!lines[0].has_lm_hash());
        assert_eq!(lines[2].nt_hash, "8846f7eaee8fb117ad06bdd830b7586c");
        assert!(lines[2].has_lm_hash());
    }

    #[test]
    fn test_ignores_non_hash_text() {
        assert!(extract_hash_lines("NT only\nno hashes:::").is_empty());
        assert!(extract_hash_lines("").is_empty());
    }
}
