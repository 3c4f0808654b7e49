use crate::error::{HiveProbeError, Result};
use std::path::PathBuf;

/// One uploaded file: the name it arrived under and where its bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiveCandidate {
    pub name: String,
    pub path: PathBuf,
}

/// Original filename to local path, in the order the files arrived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    entries: Vec<HiveCandidate>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S: Into<String>>(&mut self, name: S, path: PathBuf) -> Result<()> {
        let name = name.into();

        if name.is_empty() {
            return Err(HiveProbeError::malformed("A file is empty"));
        }
        if self.entries.iter().any(|entry| entry.name == name) {
            return Err(HiveProbeError::malformed(format!(
                "Duplicate file name: {}",
                name
            )));
        }

        self.entries.push(HiveCandidate { name, path });
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&HiveCandidate> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HiveCandidate> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_insertion_order() {
        let mut set = FileSet::new();
        set.insert("system.save", PathBuf::from("/t/1")).unwrap();
        set.insert("sam.save", PathBuf::from("/t/0")).unwrap();

        assert_eq!(set.names(), vec!["system.save", "sam.save"]);
        assert_eq!(set.get(1).unwrap().path, PathBuf::from("/t/0"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_rejects_empty_and_duplicate_names() {
        let mut set = FileSet::new();
        assert!(matches!(
            set.insert("", PathBuf::from("/t/0")),
            Err(HiveProbeError::MalformedRequest { .. })
        ));

        set.insert("SAM", PathBuf::from("/t/0")).unwrap();
        assert!(set.insert("SAM", PathBuf::from("/t/1")).is_err());
        assert_eq!(set.len(), 1);
    }
}
