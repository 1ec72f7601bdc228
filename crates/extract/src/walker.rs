use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ExtractError;

/// A directory that directly contains this file is a run folder.
pub const RUN_FOLDER_MARKER: &str = "DeviceInfo.csv";

pub fn is_run_folder(dir: &Path) -> bool {
    dir.join(RUN_FOLDER_MARKER).is_file()
}

/// Locates every run folder under `root`, in lexicographic depth-first
/// order. A qualifying folder is a leaf: its children are not descended
/// into. When the tree holds no qualifying subfolder but `root` itself
/// qualifies, the root is the single result.
///
/// An iterative worklist keeps deep trees from exhausting the stack.
pub fn find_run_folders(root: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    if !root.is_dir() {
        return Err(ExtractError::RootNotFound(root.to_path_buf()));
    }

    let mut found = Vec::new();
    let mut stack = subdirs_reversed(root)?;
    while let Some(dir) = stack.pop() {
        if is_run_folder(&dir) {
            found.push(dir);
            continue;
        }
        match subdirs_reversed(&dir) {
            Ok(children) => stack.extend(children),
            Err(e) => debug!(dir = %dir.display(), error = %e, "skipping unreadable directory"),
        }
    }

    if found.is_empty() && is_run_folder(root) {
        found.push(root.to_path_buf());
    }
    Ok(found)
}

/// Subdirectories sorted descending, so popping off a stack visits them in
/// ascending name order.
fn subdirs_reversed(dir: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(dir)?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs.reverse();
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn mark(root: &Path, rel: &str) {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(RUN_FOLDER_MARKER), "DeviceInfo\n").unwrap();
    }

    #[test]
    fn finds_marked_folders_in_name_order() {
        let tmp = TempDir::new().unwrap();
        mark(tmp.path(), "lab-b/Dev2_2024-01-02_10-00");
        mark(tmp.path(), "lab-a/Dev1_2024-01-01_09-00");
        let found = find_run_folders(tmp.path()).unwrap();
        assert_eq!(
            found,
            vec![
                tmp.path().join("lab-a/Dev1_2024-01-01_09-00"),
                tmp.path().join("lab-b/Dev2_2024-01-02_10-00"),
            ]
        );
    }

    #[test]
    fn marked_folder_is_a_leaf() {
        let tmp = TempDir::new().unwrap();
        mark(tmp.path(), "run");
        mark(tmp.path(), "run/nested");
        let found = find_run_folders(tmp.path()).unwrap();
        assert_eq!(found, vec![tmp.path().join("run")]);
    }

    #[test]
    fn root_itself_can_be_the_single_run_folder() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(RUN_FOLDER_MARKER), "DeviceInfo\n").unwrap();
        let found = find_run_folders(tmp.path()).unwrap();
        assert_eq!(found, vec![tmp.path().to_path_buf()]);
    }

    #[test]
    fn missing_root_is_fatal() {
        let err = find_run_folders(Path::new("/no/such/report/root")).unwrap_err();
        assert!(matches!(err, ExtractError::RootNotFound(_)));
    }

    #[test]
    fn empty_tree_yields_nothing() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("empty")).unwrap();
        assert!(find_run_folders(tmp.path()).unwrap().is_empty());
    }
}
