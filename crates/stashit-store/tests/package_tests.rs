// Integration tests for the BagIt package adapter

use stashit_core::model::info::{BAGGING_DATE, PAYLOAD_OXUM};
use stashit_core::model::InfoMap;
use stashit_store::package::{
    open_or_create, Package, ValidationProblem, BAG_INFO_TXT, MANIFEST_TXT, TAGMANIFEST_TXT,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn source_dir(root: &Path, name: &str) -> std::path::PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(dir.join("sub")).unwrap();
    fs::write(dir.join("a.txt"), b"alpha").unwrap();
    fs::write(dir.join("sub").join("b.txt"), b"bravo!").unwrap();
    dir
}

fn info(pairs: &[(&str, &str)]) -> InfoMap {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

#[test]
fn test_create_moves_payload_and_writes_tag_files() {
    let tmp = TempDir::new().unwrap();
    let dir = source_dir(tmp.path(), "demoA");

    let (package, validity) =
        open_or_create(&dir, &info(&[("Source-Organization", "X")])).unwrap();

    assert!(validity.is_valid(), "{}", validity.summary());
    assert!(dir.join("data/a.txt").is_file());
    assert!(dir.join("data/sub/b.txt").is_file());
    assert!(!dir.join("a.txt").exists());
    assert_eq!(package.entries().len(), 2);
    assert_eq!(package.info().get("Source-Organization"), Some("X"));
    assert_eq!(package.info().get(PAYLOAD_OXUM), Some("11.2"));
    assert!(package.info().contains_key(BAGGING_DATE));

    let manifest = fs::read_to_string(dir.join(MANIFEST_TXT)).unwrap();
    let lines: Vec<&str> = manifest.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("  data/a.txt"));
    assert!(lines[1].ends_with("  data/sub/b.txt"));
}

#[test]
fn test_open_existing_returns_none_for_plain_directory() {
    let tmp = TempDir::new().unwrap();
    let dir = source_dir(tmp.path(), "plain");
    assert!(Package::open_existing(&dir).unwrap().is_none());
}

#[test]
fn test_reopen_merges_info_without_touching_payload() {
    let tmp = TempDir::new().unwrap();
    let dir = source_dir(tmp.path(), "coll1");
    open_or_create(&dir, &info(&[("Source-Organization", "X"), ("Contact-Name", "A")])).unwrap();
    let manifest_before = fs::read(dir.join(MANIFEST_TXT)).unwrap();

    let (package, validity) =
        open_or_create(&dir, &info(&[("Source-Organization", "Y"), ("External-Identifier", "t-1")]))
            .unwrap();

    assert!(validity.is_valid(), "{}", validity.summary());
    assert_eq!(package.info().get("Source-Organization"), Some("Y"));
    assert_eq!(package.info().get("Contact-Name"), Some("A"));
    assert_eq!(package.info().get("External-Identifier"), Some("t-1"));
    assert_eq!(fs::read(dir.join(MANIFEST_TXT)).unwrap(), manifest_before);

    let reopened = Package::open_existing(&dir).unwrap().unwrap();
    assert_eq!(reopened.info(), package.info());
}

#[test]
fn test_corrupted_payload_is_invalid() {
    let tmp = TempDir::new().unwrap();
    let dir = source_dir(tmp.path(), "corrupt");
    let (package, _) = open_or_create(&dir, &InfoMap::new()).unwrap();

    fs::write(dir.join("data/a.txt"), b"ALPHA").unwrap();

    let validity = package.validate();
    assert!(!validity.is_valid());
    assert!(validity
        .problems()
        .iter()
        .any(|p| matches!(p, ValidationProblem::ChecksumMismatch { path, .. } if path == "data/a.txt")));
}

#[test]
fn test_truncated_and_extra_files_are_reported() {
    let tmp = TempDir::new().unwrap();
    let dir = source_dir(tmp.path(), "incomplete");
    let (package, _) = open_or_create(&dir, &InfoMap::new()).unwrap();

    fs::remove_file(dir.join("data/sub/b.txt")).unwrap();
    fs::write(dir.join("data/extra.txt"), b"x").unwrap();

    let problems = package.validate().problems().to_vec();
    assert!(problems.contains(&ValidationProblem::MissingPayloadFile(
        "data/sub/b.txt".to_string()
    )));
    assert!(problems.contains(&ValidationProblem::UnlistedPayloadFile(
        "data/extra.txt".to_string()
    )));
    assert!(problems
        .iter()
        .any(|p| matches!(p, ValidationProblem::OxumMismatch { .. })));
}

#[test]
fn test_bag_info_without_tagmanifest_update_is_invalid() {
    let tmp = TempDir::new().unwrap();
    let dir = source_dir(tmp.path(), "interrupted");
    open_or_create(&dir, &InfoMap::new()).unwrap();

    // Simulates a save that wrote bag-info.txt but not the tag manifest
    let mut text = fs::read_to_string(dir.join(BAG_INFO_TXT)).unwrap();
    text.push_str("Contact-Name: B\n");
    fs::write(dir.join(BAG_INFO_TXT), text).unwrap();

    let package = Package::open_existing(&dir).unwrap().unwrap();
    let validity = package.validate();
    assert!(validity.problems().iter().any(|p| matches!(
        p,
        ValidationProblem::TagChecksumMismatch { path, .. } if path == BAG_INFO_TXT
    )));
}

#[test]
fn test_missing_tagmanifest_is_invalid() {
    let tmp = TempDir::new().unwrap();
    let dir = source_dir(tmp.path(), "notags");
    open_or_create(&dir, &InfoMap::new()).unwrap();
    fs::remove_file(dir.join(TAGMANIFEST_TXT)).unwrap();

    let package = Package::open_existing(&dir).unwrap().unwrap();
    assert!(!package.validate().is_valid());
}

#[test]
fn test_create_on_missing_directory_is_packaging_error() {
    let tmp = TempDir::new().unwrap();
    let err = open_or_create(&tmp.path().join("absent"), &InfoMap::new()).unwrap_err();
    assert_eq!(err.kind(), stashit_core::errors::ExErrorKind::Packaging);
}

#[test]
fn test_payload_oxum_from_info() {
    let tmp = TempDir::new().unwrap();
    let dir = source_dir(tmp.path(), "oxum");
    let (package, _) = open_or_create(&dir, &InfoMap::new()).unwrap();
    assert_eq!(package.payload_oxum().unwrap().to_string(), "11.2");
}

fn top_level_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[cfg(target_os = "linux")]
#[test]
fn test_failed_create_restores_source_directory() {
    // GIVEN a source whose payload holds a file that cannot be read
    let tmp = TempDir::new().unwrap();
    let dir = source_dir(tmp.path(), "unreadable");
    std::os::unix::fs::symlink("/proc/self/mem", dir.join("mem")).unwrap();

    // WHEN the package is created
    let err = open_or_create(&dir, &InfoMap::new()).unwrap_err();

    // THEN it fails as a packaging error carrying the read failure
    assert_eq!(err.kind(), stashit_core::errors::ExErrorKind::Packaging);
    let cause = std::error::Error::source(&err).unwrap().to_string();
    assert!(cause.contains("hash_payload"), "{}", cause);

    // AND the directory is back in its staged shape with no tag files
    assert_eq!(top_level_names(&dir), vec!["a.txt", "mem", "sub"]);

    // AND once the bad file is gone, a retry packages the original layout
    fs::remove_file(dir.join("mem")).unwrap();
    let (package, validity) = open_or_create(&dir, &InfoMap::new()).unwrap();
    assert!(validity.is_valid(), "{}", validity.summary());
    let paths: Vec<&str> = package.entries().iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["data/a.txt", "data/sub/b.txt"]);
}

#[test]
fn test_source_entry_named_data_survives_create() {
    let tmp = TempDir::new().unwrap();
    let dir = source_dir(tmp.path(), "nested");
    fs::create_dir(dir.join("data")).unwrap();
    fs::write(dir.join("data").join("c.txt"), b"charlie").unwrap();

    let (package, validity) = open_or_create(&dir, &InfoMap::new()).unwrap();

    assert!(validity.is_valid(), "{}", validity.summary());
    assert!(package
        .entries()
        .iter()
        .any(|e| e.path == "data/data/c.txt"));
}
