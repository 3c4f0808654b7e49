pub mod file_set;
pub mod staged;

pub use file_set::{FileSet, HiveCandidate};
pub use staged::{local_file_set, StagedFileSet, MIN_FILES};
