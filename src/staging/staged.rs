use crate::error::{HiveProbeError, Result};
use crate::staging::FileSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

pub const MIN_FILES: usize = 2;

/// A file set whose bytes live in a private temporary directory.
///
/// The directory and everything in it are removed when this value is dropped,
/// whether the search succeeded, failed or never ran.
#[derive(Debug)]
pub struct StagedFileSet {
    dir: TempDir,
    files: FileSet,
}

impl StagedFileSet {
    /// Stages uploaded `(filename, bytes)` pairs.
    pub fn from_uploads<I>(uploads: I, base: Option<&Path>) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Vec<u8>)>,
    {
        let uploads: Vec<_> = uploads.into_iter().collect();
        ensure_minimum(uploads.len())?;

        let dir = create_staging_dir(base)?;
        let mut files = FileSet::new();

        for (index, (name, bytes)) in uploads.into_iter().enumerate() {
            let path = staged_path(dir.path(), index);
            fs::write(&path, &bytes)?;
            files.insert(name, path)?;
        }

        debug!(dir = %dir.path().display(), files = files.len(), "staged uploads");
        Ok(Self { dir, files })
    }

    /// Stages copies of local files, keyed by their file names.
    ///
    /// The originals are never handed to the tool.
    pub fn from_paths(paths: &[PathBuf], base: Option<&Path>) -> Result<Self> {
        let originals = local_file_set(paths)?;

        let dir = create_staging_dir(base)?;
        let mut files = FileSet::new();

        for (index, original) in originals.iter().enumerate() {
            let path = staged_path(dir.path(), index);
            fs::copy(&original.path, &path).map_err(|e| HiveProbeError::InvalidInput {
                path: format!("{} ({})", original.path.display(), e),
            })?;
            files.insert(original.name.clone(), path)?;
        }

        debug!(dir = %dir.path().display(), files = files.len(), "staged local files");
        Ok(Self { dir, files })
    }

    pub fn file_set(&self) -> &FileSet {
        &self.files
    }

    pub fn directory(&self) -> &Path {
        self.dir.path()
    }

    /// Removes the staging directory now, reporting any failure.
    pub fn close(self) -> Result<()> {
        self.dir.close().map_err(HiveProbeError::Io)
    }
}

/// Validates local candidate files and keys them by file name.
///
/// The entries point at the originals; `StagedFileSet::from_paths` copies them.
pub fn local_file_set(paths: &[PathBuf]) -> Result<FileSet> {
    ensure_minimum(paths.len())?;

    let mut files = FileSet::new();
    for path in paths {
        if !path.is_file() {
            return Err(HiveProbeError::InvalidInput {
                path: path.display().to_string(),
            });
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        files.insert(name, path.clone())?;
    }
    Ok(files)
}

fn ensure_minimum(count: usize) -> Result<()> {
    if count == 0 {
        return Err(HiveProbeError::malformed("No files uploaded"));
    }
    if count < MIN_FILES {
        return Err(HiveProbeError::malformed(format!(
            "You must upload at least {} files",
            MIN_FILES
        )));
    }
    Ok(())
}

fn create_staging_dir(base: Option<&Path>) -> Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("hiveprobe-");
    let dir = match base {
        Some(base) => builder.tempdir_in(base)?,
        None => builder.tempdir()?,
    };
    Ok(dir)
}

// Uploaded names are labels only; on disk every candidate gets a fixed name.
fn staged_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("candidate-{:02}", index))
}
