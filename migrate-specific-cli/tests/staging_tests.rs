//! Tests for resolving and staging the selected migration files

use migrate_specific_cli::error::SpecificError;
use migrate_specific_cli::staging::{resolve_sources, stage, ScratchDir};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn touch(dir: &Path, name: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, format!("-- migrate:up\n-- {}\n", name)).unwrap();
    path
}

fn base_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_default_directory_is_used_without_arguments() {
    let root = TempDir::new().unwrap();
    let migrations = root.path().join("database/migrations");
    touch(&migrations, "2020_01_02_create_posts.sql");
    touch(&migrations, "2020_01_01_create_users.sql");

    let sources = resolve_sources(&[], &migrations).unwrap();

    assert_eq!(
        base_names(&sources),
        vec!["2020_01_01_create_users.sql", "2020_01_02_create_posts.sql"]
    );
}

#[test]
fn test_directories_are_walked_recursively() {
    let root = TempDir::new().unwrap();
    touch(root.path(), "2020_01_03_create_tags.sql");
    touch(&root.path().join("a/b"), "2020_01_01_create_users.sql");
    touch(&root.path().join("a"), "notes.md");

    let sources = resolve_sources(&[root.path().to_path_buf()], Path::new("unused")).unwrap();

    assert_eq!(
        base_names(&sources),
        vec!["2020_01_01_create_users.sql", "2020_01_03_create_tags.sql"]
    );
}

#[test]
fn test_file_arguments_are_taken_as_given() {
    let root = TempDir::new().unwrap();
    let odd = touch(root.path(), "2020_01_01_seed.txt");

    let sources = resolve_sources(&[odd.clone()], Path::new("unused")).unwrap();
    assert_eq!(sources, vec![odd]);
}

#[test]
fn test_same_source_twice_is_kept_once() {
    let root = TempDir::new().unwrap();
    let users = touch(root.path(), "2020_01_01_create_users.sql");

    let sources = resolve_sources(
        &[users.clone(), root.path().to_path_buf(), users],
        Path::new("unused"),
    )
    .unwrap();

    assert_eq!(sources.len(), 1);
}

#[test]
fn test_missing_path() {
    let root = TempDir::new().unwrap();
    let missing = root.path().join("missing.sql");

    match resolve_sources(&[missing.clone()], Path::new("unused")) {
        Err(SpecificError::PathNotFound(path)) => assert_eq!(path, missing),
        other => panic!("expected PathNotFound, got {:?}", other),
    }
}

#[test]
fn test_colliding_base_names() {
    let root = TempDir::new().unwrap();
    let first = touch(&root.path().join("one"), "2020_01_01_create_users.sql");
    let second = touch(&root.path().join("two"), "2020_01_01_create_users.sql");

    match resolve_sources(&[first, second], Path::new("unused")) {
        Err(SpecificError::DuplicateMigration { name, .. }) => {
            assert_eq!(name, "2020_01_01_create_users.sql");
        }
        other => panic!("expected DuplicateMigration, got {:?}", other),
    }
}

#[test]
fn test_stage_copies_under_base_names() {
    let root = TempDir::new().unwrap();
    let users = touch(&root.path().join("deep/dir"), "2020_01_01_create_users.sql");
    let posts = touch(root.path(), "2020_01_02_create_posts.sql");

    let scratch = ScratchDir::create(&root.path().join("scratch")).unwrap();
    let staged = stage(&[users.clone(), posts], scratch.path()).unwrap();

    let mut listing: Vec<String> = fs::read_dir(scratch.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    listing.sort();

    assert_eq!(listing, base_names(&staged));
    assert_eq!(
        fs::read_to_string(&staged[0]).unwrap(),
        fs::read_to_string(&users).unwrap()
    );

    let path = scratch.path().to_path_buf();
    scratch.close().unwrap();
    assert!(!path.exists());
}

#[test]
fn test_stage_failure_reports_path() {
    let root = TempDir::new().unwrap();
    let scratch = ScratchDir::create(root.path()).unwrap();
    let gone = root.path().join("gone.sql");

    match stage(&[gone.clone()], scratch.path()) {
        Err(SpecificError::Io { path, .. }) => assert_eq!(path, gone),
        other => panic!("expected Io, got {:?}", other),
    }
}
