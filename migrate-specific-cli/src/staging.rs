//! Staging selected migration files into a scratch directory

use crate::error::{Result, SpecificError};
use migrate_specific_migrations::file::is_migration_file;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Prefix of every scratch directory name
pub const SCRATCH_PREFIX: &str = "migrate-specific_";

/// A uniquely named, run-scoped directory holding the staged migrations
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl ScratchDir {
    /// Create a fresh scratch directory under `parent`
    pub fn create(parent: &Path) -> Result<Self> {
        fs::create_dir_all(parent).map_err(|e| SpecificError::io(parent, e))?;

        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(parent)
            .map_err(|e| SpecificError::io(parent, e))?;

        tracing::debug!(path = %dir.path().display(), "created scratch directory");
        Ok(Self {
            path: dir.path().to_path_buf(),
            dir: Some(dir),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the staged files and the directory itself.
    ///
    /// A directory that is already gone counts as removed.
    pub fn close(mut self) -> io::Result<()> {
        let Some(dir) = self.dir.take() else {
            return Ok(());
        };

        match dir.close() {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            result => result,
        }
    }
}

/// Resolve the positional arguments into a sorted list of migration files.
///
/// With no arguments `default_dir` is used. Directories are walked
/// recursively and contribute their `.sql` files; files are taken as given.
pub fn resolve_sources(inputs: &[PathBuf], default_dir: &Path) -> Result<Vec<PathBuf>> {
    let defaults = [default_dir.to_path_buf()];
    let inputs = if inputs.is_empty() { &defaults[..] } else { inputs };

    let mut seen = HashSet::new();
    let mut by_name: BTreeMap<String, PathBuf> = BTreeMap::new();

    for input in inputs {
        if !input.exists() {
            return Err(SpecificError::PathNotFound(input.clone()));
        }

        for source in expand(input)? {
            let canonical = source
                .canonicalize()
                .map_err(|e| SpecificError::io(&source, e))?;
            if !seen.insert(canonical) {
                continue;
            }

            let name = base_name(&source)?;
            if let Some(first) = by_name.get(&name) {
                return Err(SpecificError::DuplicateMigration {
                    name,
                    first: first.clone(),
                    second: source,
                });
            }
            by_name.insert(name, source);
        }
    }

    Ok(by_name.into_values().collect())
}

fn expand(input: &Path) -> Result<Vec<PathBuf>> {
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(input).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(input).to_path_buf();
            SpecificError::io(path, e.into())
        })?;

        if entry.file_type().is_file() && is_migration_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn base_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            SpecificError::io(
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "file name is not valid UTF-8"),
            )
        })
}

/// Copy each source into `scratch`, keeping only its base name
pub fn stage(sources: &[PathBuf], scratch: &Path) -> Result<Vec<PathBuf>> {
    let mut staged = Vec::with_capacity(sources.len());

    for source in sources {
        let target = scratch.join(base_name(source)?);
        fs::copy(source, &target).map_err(|e| SpecificError::io(source, e))?;
        tracing::debug!(from = %source.display(), to = %target.display(), "staged migration");
        staged.push(target);
    }

    Ok(staged)
}

/// Explicit file arguments that will be staged but never run
pub fn ignored_files(inputs: &[PathBuf]) -> Vec<&Path> {
    inputs
        .iter()
        .map(PathBuf::as_path)
        .filter(|input| input.is_file() && !is_migration_file(input))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_dir_lifecycle() {
        let parent = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::create(parent.path()).unwrap();
        let path = scratch.path().to_path_buf();

        assert!(path.is_dir());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(SCRATCH_PREFIX));

        fs::write(path.join("a.sql"), "SELECT 1;").unwrap();
        scratch.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_close_after_external_removal() {
        let parent = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::create(parent.path()).unwrap();
        fs::remove_dir_all(scratch.path()).unwrap();

        assert!(scratch.close().is_ok());
    }

    #[test]
    fn test_scratch_dirs_are_unique() {
        let parent = tempfile::tempdir().unwrap();
        let a = ScratchDir::create(parent.path()).unwrap();
        let b = ScratchDir::create(parent.path()).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_ignored_files() {
        let root = tempfile::tempdir().unwrap();
        let sql = root.path().join("2020_01_01_create_users.sql");
        let txt = root.path().join("2020_01_01_seed.txt");
        fs::write(&sql, "SELECT 1;").unwrap();
        fs::write(&txt, "SELECT 1;").unwrap();

        let inputs = vec![sql, txt.clone(), root.path().to_path_buf()];
        assert_eq!(ignored_files(&inputs), vec![txt.as_path()]);
    }
}
