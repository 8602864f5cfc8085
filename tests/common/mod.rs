//! Throw-away git repositories for integration tests.

#![allow(dead_code)]

use git2::{Commit, Oid, Repository, Signature, Time};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct Fixture {
    pub repo: Repository,
    pub path: PathBuf,
    // dropped last, removing the directory
    _dir: TempDir,
}

impl Fixture {
    /// Fresh repository in a subdirectory named `name`
    pub fn new(name: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(name);
        fs::create_dir(&path).unwrap();
        let repo = Repository::init(&path).unwrap();
        Self { repo, path, _dir: dir }
    }

    /// Write `contents` to `file` and commit it on HEAD as `name <email>` at `seconds` (UTC).
    pub fn commit(&self, file: &str, contents: &str, name: &str, email: &str, seconds: i64) -> Oid {
        fs::write(self.path.join(file), contents).unwrap();

        let mut index = self.repo.index().unwrap();
        index.add_path(Path::new(file)).unwrap();
        index.write().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();

        let signature = Signature::new(name, email, &Time::new(seconds, 0)).unwrap();
        let parent = self.repo.head().ok().and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<&Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &signature, &signature, &format!("update {file}"), &tree, &parents)
            .unwrap()
    }
}
