use docvcs::{FileStatus, FileSystem, VcsError};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

mod common;
use common::{failing_repository, memory_repository, random_content, write_file};

#[tokio::test]
async fn status_follows_a_file_through_its_lifecycle() {
    let (fs, repository) = memory_repository().await;
    write_file(fs.as_ref(), "/.documents/foo.txt", "foo").await;
    write_file(fs.as_ref(), "/.documents/bar.txt", "bar").await;

    assert_eq!(
        repository.status("/.documents/foo.txt").await.unwrap(),
        FileStatus::StarAdded
    );
    repository.add("/.documents/foo.txt").await.unwrap();
    assert_eq!(
        repository.status("/.documents/foo.txt").await.unwrap(),
        FileStatus::Added
    );

    repository.commit("first").await.unwrap();
    assert_eq!(
        repository.status("/.documents/bar.txt").await.unwrap(),
        FileStatus::StarAdded
    );
    assert_eq!(
        repository.status("/.documents/foo.txt").await.unwrap(),
        FileStatus::Unmodified
    );

    fs.unlink(Path::new("/.documents/foo.txt")).await.unwrap();
    assert_eq!(
        repository.status("/.documents/foo.txt").await.unwrap(),
        FileStatus::StarDeleted
    );

    repository.remove("/.documents/foo.txt", false).await.unwrap();
    assert_eq!(
        repository.status("/.documents/foo.txt").await.unwrap(),
        FileStatus::Deleted
    );
}

#[tokio::test]
async fn modifications_are_reported_before_and_after_staging() {
    let (fs, repository) = memory_repository().await;
    write_file(fs.as_ref(), "/.documents/foo.txt", "foo").await;
    repository.add("/.documents/foo.txt").await.unwrap();
    repository.commit("first").await.unwrap();

    write_file(fs.as_ref(), "/.documents/foo.txt", "foo, edited").await;
    assert_eq!(
        repository.status("/.documents/foo.txt").await.unwrap(),
        FileStatus::StarModified
    );

    repository.add("/.documents/foo.txt").await.unwrap();
    assert_eq!(
        repository.status("/.documents/foo.txt").await.unwrap(),
        FileStatus::Modified
    );

    write_file(fs.as_ref(), "/.documents/foo.txt", "foo, edited twice").await;
    assert_eq!(
        repository.status("/.documents/foo.txt").await.unwrap(),
        FileStatus::StarModified
    );
}

#[rstest]
#[case::staged_new_then_deleted("/.documents/new.txt", FileStatus::StarAdded)]
#[case::staged_edit_then_deleted("/.documents/old.txt", FileStatus::StarDeleted)]
#[tokio::test]
async fn staged_files_deleted_from_disk(#[case] path: &str, #[case] expected: FileStatus) {
    let (fs, repository) = memory_repository().await;
    write_file(fs.as_ref(), "/.documents/old.txt", "old").await;
    repository.add("/.documents/old.txt").await.unwrap();
    repository.commit("first").await.unwrap();
    write_file(fs.as_ref(), "/.documents/old.txt", "old, edited").await;
    write_file(fs.as_ref(), "/.documents/new.txt", "new").await;
    repository.add("/.documents/old.txt").await.unwrap();
    repository.add("/.documents/new.txt").await.unwrap();

    fs.unlink(Path::new(path)).await.unwrap();

    assert_eq!(repository.status(path).await.unwrap(), expected);
}

#[tokio::test]
async fn recreating_a_file_after_staging_its_deletion_reads_as_untracked() {
    let (fs, repository) = memory_repository().await;
    write_file(fs.as_ref(), "/.documents/foo.txt", "foo").await;
    repository.add("/.documents/foo.txt").await.unwrap();
    repository.commit("first").await.unwrap();
    repository.remove("/.documents/foo.txt", true).await.unwrap();

    write_file(fs.as_ref(), "/.documents/foo.txt", "foo").await;

    assert_eq!(
        repository.status("/.documents/foo.txt").await.unwrap(),
        FileStatus::StarAdded
    );
}

#[tokio::test]
async fn unknown_paths_and_directories_are_absent() {
    let (fs, repository) = memory_repository().await;
    write_file(fs.as_ref(), "/.documents/dir/a.txt", "a").await;

    assert_eq!(
        repository.status("/.documents/nothing.txt").await.unwrap(),
        FileStatus::Absent
    );
    assert_eq!(
        repository.status("/.documents/dir").await.unwrap(),
        FileStatus::Absent
    );
}

#[tokio::test]
async fn status_all_covers_commit_index_and_working_tree() {
    let (fs, repository) = memory_repository().await;
    write_file(fs.as_ref(), "/.documents/kept.txt", "kept").await;
    write_file(fs.as_ref(), "/.documents/edited.txt", "edited").await;
    write_file(fs.as_ref(), "/.documents/gone.txt", "gone").await;
    repository.add("/.documents/kept.txt").await.unwrap();
    repository.add("/.documents/edited.txt").await.unwrap();
    repository.add("/.documents/gone.txt").await.unwrap();
    repository.commit("first").await.unwrap();

    write_file(fs.as_ref(), "/.documents/edited.txt", &random_content()).await;
    fs.unlink(Path::new("/.documents/gone.txt")).await.unwrap();
    write_file(fs.as_ref(), "/.documents/dir/new.txt", "new").await;
    write_file(fs.as_ref(), "/outside.txt", "ignored").await;

    let report = repository.status_all().await.unwrap();

    assert_eq!(
        report.entries,
        BTreeMap::from([
            (PathBuf::from("/.documents/dir/new.txt"), FileStatus::StarAdded),
            (PathBuf::from("/.documents/edited.txt"), FileStatus::StarModified),
            (PathBuf::from("/.documents/gone.txt"), FileStatus::StarDeleted),
            (PathBuf::from("/.documents/kept.txt"), FileStatus::Unmodified),
        ])
    );
    assert!(report.unreadable.is_empty());
    assert_eq!(report.changes().count(), 3);
    assert!(!report.is_clean());
}

#[tokio::test]
async fn clean_tree_reports_clean() {
    let (fs, repository) = memory_repository().await;
    write_file(fs.as_ref(), "/.documents/foo.txt", "foo").await;
    repository.add("/.documents/foo.txt").await.unwrap();
    repository.commit("first").await.unwrap();

    assert!(repository.status_all().await.unwrap().is_clean());
}

#[tokio::test]
async fn unreadable_files_are_reported_apart() {
    let (fs, repository) = failing_repository().await;
    write_file(fs.as_ref(), "/.documents/a.txt", "a").await;
    write_file(fs.as_ref(), "/.documents/b.txt", "b").await;
    repository.add("/.documents/a.txt").await.unwrap();
    repository.add("/.documents/b.txt").await.unwrap();
    repository.commit("first").await.unwrap();

    fs.hide_path("/.documents/a.txt");
    let report = repository.status_all().await.unwrap();

    assert_eq!(
        report.entries,
        BTreeMap::from([(PathBuf::from("/.documents/b.txt"), FileStatus::Unmodified)])
    );
    assert_eq!(
        report.unreadable.iter().collect::<Vec<_>>(),
        vec![&PathBuf::from("/.documents/a.txt")]
    );
    assert!(!report.is_clean());
    assert!(matches!(
        repository.status("/.documents/a.txt").await,
        Err(VcsError::Workspace { .. })
    ));
}

#[tokio::test]
async fn unreadable_directories_do_not_read_as_deletions() {
    let (fs, repository) = failing_repository().await;
    write_file(fs.as_ref(), "/.documents/dir/sub/x.txt", "x").await;
    write_file(fs.as_ref(), "/.documents/dir/y.txt", "y").await;
    repository.add("/.documents/dir").await.unwrap();
    repository.commit("first").await.unwrap();

    fs.hide_path("/.documents/dir/sub");
    repository.add("/.documents/dir").await.unwrap();

    assert_eq!(
        repository.list_files().await.unwrap(),
        vec![
            PathBuf::from("/.documents/dir/sub/x.txt"),
            PathBuf::from("/.documents/dir/y.txt")
        ]
    );
    let report = repository.status_all().await.unwrap();
    assert_eq!(
        report.entries,
        BTreeMap::from([(PathBuf::from("/.documents/dir/y.txt"), FileStatus::Unmodified)])
    );
    assert_eq!(
        report.unreadable.iter().collect::<Vec<_>>(),
        vec![&PathBuf::from("/.documents/dir/sub")]
    );
}

#[test]
fn status_strings_are_stable() {
    assert_eq!(
        FileStatus::ALL.iter().map(FileStatus::as_str).collect::<Vec<_>>(),
        vec![
            "absent",
            "unmodified",
            "added",
            "*added",
            "modified",
            "*modified",
            "deleted",
            "*deleted"
        ]
    );
}
