#![allow(dead_code)]

pub mod failing_fs;

use chrono::DateTime;
use docvcs::fs::mkdir_p;
use docvcs::{Author, FileSystem, MemoryFs, Repository, RepositoryConfig};
use fake::Fake;
use fake::faker::lorem::en::Words;
use std::path::Path;
use std::sync::Arc;

const TMPDIR: &str = "../playground";

pub fn redirect_temp_dir() {
    unsafe {
        std::env::set_var("TMPDIR", TMPDIR);
    }

    // Ensure the TMPDIR exists
    if !Path::new(TMPDIR).exists() {
        std::fs::create_dir_all(TMPDIR).expect("Failed to create TMPDIR");
    }
}

/// Author with a fixed timestamp so commit ids are reproducible
pub fn fixed_author(timestamp: i64) -> Author {
    let timestamp = DateTime::from_timestamp(timestamp, 0)
        .expect("valid timestamp")
        .fixed_offset();

    Author::new_with_timestamp("Mr. Test", "mrtest@example.com", timestamp)
}

/// Fresh repository on an empty in-memory filesystem, with the default
/// `/.documents` namespace and a pinned author
pub async fn memory_repository() -> (Arc<MemoryFs>, Repository<MemoryFs>) {
    let fs = Arc::new(MemoryFs::new());
    let repository = Repository::init(RepositoryConfig::default(), fs.clone())
        .await
        .expect("Failed to init repository");
    repository.pin_author(fixed_author(1_000_000_000));

    (fs, repository)
}

/// Fresh repository on a filesystem that can be told to fail
pub async fn failing_repository() -> (Arc<failing_fs::FailingFs>, Repository<failing_fs::FailingFs>) {
    let fs = failing_fs::FailingFs::new();
    let repository = Repository::init(RepositoryConfig::default(), fs.clone())
        .await
        .expect("Failed to init repository");
    repository.pin_author(fixed_author(1_000_000_000));

    (fs, repository)
}

pub async fn write_file<F: FileSystem>(fs: &F, path: &str, content: &str) {
    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        mkdir_p(fs, parent)
            .await
            .unwrap_or_else(|e| panic!("Failed to create directory {:?}: {}", parent, e));
    }

    fs.write_file(path, content.as_bytes())
        .await
        .unwrap_or_else(|e| panic!("Failed to write file {:?}: {}", path, e));
}

pub async fn read_file<F: FileSystem>(fs: &F, path: &str) -> Option<String> {
    match fs.read_file(Path::new(path)).await {
        Ok(content) => Some(String::from_utf8_lossy(&content).into_owned()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => panic!("Failed to read file {:?}: {}", path, e),
    }
}

pub fn random_content() -> String {
    Words(5..10).fake::<Vec<String>>().join(" ")
}
