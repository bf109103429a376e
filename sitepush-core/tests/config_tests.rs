//! Config discovery, load error messages and create-only save.

use assert_fs::prelude::*;
use predicates::prelude::predicate;
use rstest::rstest;
use sitepush_core::{
    config::{self, DeployConfig, IdentityConfig, LOCAL_CONFIG_FILE},
    BranchName, ConfigError, RepoCoordinates,
};

// ---------------------------------------------------------------------------
// 1. Load
// ---------------------------------------------------------------------------

#[test]
fn load_missing_config_returns_not_found() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let err = config::load_at(&dir.path().join("nope.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("nope.yaml"));
}

#[test]
fn load_full_document() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("sitepush.yaml");
    file.write_str(
        "branch: docs-site\n\
         remote_base: https://git.example.com\n\
         nojekyll: true\n\
         cname: docs.example.com\n\
         commit_message: \"Publish {revision}\"\n\
         identity:\n  name: Docs Bot\n  email: docs@example.com\n",
    )
    .expect("write");

    let cfg = config::load_at(file.path()).expect("load");
    assert_eq!(cfg.branch_name(), BranchName::from("docs-site"));
    assert_eq!(cfg.remote_base(), "https://git.example.com");
    assert_eq!(cfg.nojekyll, Some(true));
    assert_eq!(cfg.cname.as_deref(), Some("docs.example.com"));
    assert_eq!(cfg.commit_identity().email, "docs@example.com");
}

#[test]
fn load_empty_file_is_default() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("sitepush.yaml");
    file.write_str("\n").expect("write");
    assert_eq!(config::load_at(file.path()).expect("load"), DeployConfig::default());
}

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("sitepush.yaml");
    file.write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = config::load_at(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("sitepush.yaml"));
}

#[test]
fn unknown_fields_are_rejected() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("sitepush.yaml");
    file.write_str("branch: gh-pages\ntoken: nope\n").expect("write");

    let err = config::load_at(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

#[rstest]
#[case("branch: \"-rf\"\n", "branch")]
#[case("branch: \"two words\"\n", "branch")]
#[case("branch: \"gh:pages\"\n", "branch")]
#[case("branch: docs/.site\n", "branch")]
#[case("commit_message: \"Update site\"\n", "commit_message")]
#[case("api_base: api.github.com\n", "api_base")]
fn invalid_values_are_rejected(#[case] yaml: &str, #[case] expected_field: &str) {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("sitepush.yaml");
    file.write_str(yaml).expect("write");

    match config::load_at(file.path()).unwrap_err() {
        ConfigError::Invalid { field, .. } => assert_eq!(field, expected_field),
        other => panic!("expected invalid {expected_field}, got {other}"),
    }
}

// ---------------------------------------------------------------------------
// 2. Discovery
// ---------------------------------------------------------------------------

#[test]
fn discovery_prefers_local_file() {
    let cwd = assert_fs::TempDir::new().expect("cwd");
    let user = assert_fs::TempDir::new().expect("config dir");
    cwd.child(LOCAL_CONFIG_FILE).write_str("branch: a\n").expect("write");
    user.child("sitepush/config.yaml")
        .write_str("branch: b\n")
        .expect("write");

    let found = config::discover_at(cwd.path(), Some(user.path())).expect("found");
    assert_eq!(found, cwd.path().join(LOCAL_CONFIG_FILE));
}

#[test]
fn discovery_falls_back_to_user_config() {
    let cwd = assert_fs::TempDir::new().expect("cwd");
    let user = assert_fs::TempDir::new().expect("config dir");
    user.child("sitepush/config.yaml")
        .write_str("branch: b\n")
        .expect("write");

    let found = config::discover_at(cwd.path(), Some(user.path())).expect("found");
    assert_eq!(found, config::user_config_path_at(user.path()));
}

#[test]
fn discovery_without_files_is_none() {
    let cwd = assert_fs::TempDir::new().expect("cwd");
    assert!(config::discover_at(cwd.path(), None).is_none());
}

// ---------------------------------------------------------------------------
// 3. Create
// ---------------------------------------------------------------------------

#[test]
fn create_writes_loadable_file_and_no_tmp() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let path = dir.path().join("nested").join("sitepush.yaml");

    config::create_at(&path, &DeployConfig::defaults()).expect("create");
    dir.child("nested/sitepush.yaml")
        .assert(predicate::str::contains("branch: gh-pages"));
    dir.child("nested/sitepush.yaml.tmp")
        .assert(predicate::path::missing());

    let loaded = config::load_at(&path).expect("load");
    assert_eq!(loaded, DeployConfig::defaults());
}

#[test]
fn create_refuses_to_overwrite() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("sitepush.yaml");
    file.write_str("branch: keep-me\n").expect("write");

    let custom = DeployConfig {
        identity: Some(IdentityConfig::default()),
        ..DeployConfig::default()
    };
    let err = config::create_at(file.path(), &custom).unwrap_err();
    assert!(matches!(err, ConfigError::AlreadyExists { .. }), "got: {err}");
    file.assert("branch: keep-me\n");
}

// ---------------------------------------------------------------------------
// 4. Repository coordinates
// ---------------------------------------------------------------------------

#[rstest]
#[case("acme/docs", "acme", "docs")]
#[case("acme/docs.git", "acme", "docs")]
#[case(" my-org/my_site.io ", "my-org", "my_site.io")]
fn parses_owner_and_name(#[case] input: &str, #[case] owner: &str, #[case] name: &str) {
    let repo: RepoCoordinates = input.parse().expect("parse");
    assert_eq!(repo, RepoCoordinates::new(owner, name));
}

#[rstest]
#[case("")]
#[case("acme")]
#[case("acme/docs/extra")]
#[case("/docs")]
#[case("acme/..")]
#[case("ac me/docs")]
fn rejects_malformed_repository(#[case] input: &str) {
    let err = input.parse::<RepoCoordinates>().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidRepository(_)), "got: {err}");
}
