//! File utility functions for listing files and preparing output locations.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Returns paths to all regular files directly inside `dir`, sorted by path.
pub fn files_in_dir(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}

/// Creates the parent directory of `path` if it has one and it is missing.
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_only_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b-1.tif"), "").unwrap();
        fs::write(dir.path().join("a-0.tif"), "").unwrap();
        fs::create_dir(dir.path().join("c-2.tif")).unwrap();

        let files = files_in_dir(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a-0.tif", "b-1.tif"]);
    }

    #[test]
    fn test_missing_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(files_in_dir(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn test_ensure_parent_dir_creates_nested_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out").join("nested").join("a_avg_0_4.tif");

        ensure_parent_dir(&target).unwrap();
        assert!(dir.path().join("out").join("nested").is_dir());

        ensure_parent_dir(Path::new("bare.tif")).unwrap();
    }
}
