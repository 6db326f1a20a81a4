use std::path::{Path, PathBuf};

use stego_config::PROJECT_FILE;

/// Walk upwards from `start` until a directory holding `stego-project.toml`
/// is found.
#[must_use]
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(PROJECT_FILE).is_file() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn finds_project_root_in_current_directory() {
        let temp = TempDir::new().expect("tempdir should create");
        std::fs::write(temp.path().join(PROJECT_FILE), "").expect("project file should write");

        let found = find_project_root(temp.path());
        assert_eq!(found.as_deref(), Some(temp.path()));
    }

    #[test]
    fn finds_project_root_from_manuscript_directory() {
        let temp = TempDir::new().expect("tempdir should create");
        std::fs::write(temp.path().join(PROJECT_FILE), "").expect("project file should write");
        std::fs::create_dir_all(temp.path().join("manuscript/drafts"))
            .expect("nested dirs should create");

        let found = find_project_root(&temp.path().join("manuscript/drafts"));
        assert_eq!(found.as_deref(), Some(temp.path()));
    }

    #[test]
    fn directory_named_like_project_file_does_not_count() {
        let temp = TempDir::new().expect("tempdir should create");
        std::fs::create_dir_all(temp.path().join(PROJECT_FILE).join("a"))
            .expect("nested dirs should create");

        let found = find_project_root(&temp.path().join(PROJECT_FILE).join("a"));
        assert!(found.is_none_or(|root| !root.starts_with(temp.path())));
    }
}
