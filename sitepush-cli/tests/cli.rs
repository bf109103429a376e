use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

/// Binary isolated from the caller's config, CI variables and cwd.
fn sitepush_cmd(cwd: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sitepush"));
    cmd.current_dir(cwd)
        .env("HOME", cwd)
        .env("XDG_CONFIG_HOME", cwd.join(".config"))
        .env_remove("GITHUB_TOKEN")
        .env_remove("GITHUB_REPOSITORY")
        .env_remove("GITHUB_SHA")
        .env_remove("RUST_LOG");
    cmd
}

fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(dir)
        .args(["-c", "user.name=t", "-c", "user.email=t@example.com"])
        .args(args)
        .output()
        .expect("run git");
    assert!(output.status.success(), "git {args:?}: {output:?}");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// `<root>/acme/site.git`, empty; returns the `--remote-base` value.
fn bare_remote(root: &Path) -> String {
    let bare = root.join("acme").join("site.git");
    fs::create_dir_all(&bare).expect("create remote dir");
    git(&bare, &["init", "--quiet", "--bare"]);
    format!("file://{}", root.display())
}

fn write_site(dir: &Path) {
    fs::create_dir_all(dir.join("assets")).expect("create site");
    fs::write(dir.join("index.html"), "<h1>hi</h1>").expect("write index");
    fs::write(dir.join("assets/style.css"), "body{}").expect("write css");
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn config_init_writes_defaults_once() {
    let cwd = TempDir::new().expect("cwd");

    sitepush_cmd(cwd.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(contains("sitepush.yaml"));
    let written = fs::read_to_string(cwd.path().join("sitepush.yaml")).expect("read config");
    assert!(written.contains("branch: gh-pages"), "got: {written}");

    sitepush_cmd(cwd.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(contains("already exists"));
}

#[test]
fn config_show_layers_local_file_over_defaults() {
    let cwd = TempDir::new().expect("cwd");
    fs::write(cwd.path().join("sitepush.yaml"), "branch: docs\nnojekyll: true\n")
        .expect("write config");

    sitepush_cmd(cwd.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(contains("branch: docs"))
        .stdout(contains("nojekyll: true"))
        .stdout(contains("remote_base:").and(contains("github.com")));
}

#[test]
fn config_show_rejects_unknown_fields_with_path() {
    let cwd = TempDir::new().expect("cwd");
    let path = cwd.path().join("custom.yaml");
    fs::write(&path, "brnach: docs\n").expect("write config");

    sitepush_cmd(cwd.path())
        .args(["config", "show", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(contains("custom.yaml"));
}

// ---------------------------------------------------------------------------
// deploy
// ---------------------------------------------------------------------------

#[test]
fn deploy_publishes_then_reports_no_changes() {
    let cwd = TempDir::new().expect("cwd");
    let remote_root = TempDir::new().expect("remote");
    let remote_base = bare_remote(remote_root.path());
    let site = cwd.path().join("dist");
    write_site(&site);

    let deploy = |cmd: &mut Command| {
        cmd.args(["deploy", "dist", "--repo", "acme/site", "--revision", "abc1234"])
            .args(["--remote-base", &remote_base])
            .args(["--skip-token-check", "--json"]);
    };

    let mut first = sitepush_cmd(cwd.path());
    deploy(&mut first);
    first
        .assert()
        .success()
        .stdout(contains(r#""outcome":"published""#))
        .stdout(contains(r#""branch":"gh-pages""#))
        .stdout(contains(r#""forced":false"#));

    let bare = remote_root.path().join("acme/site.git");
    let tip = git(&bare, &["rev-parse", "gh-pages"]);
    assert_eq!(
        git(&bare, &["ls-tree", "-r", "--name-only", "gh-pages"]),
        "assets/style.css\nindex.html"
    );
    assert_eq!(
        git(&bare, &["log", "-1", "--format=%s", "gh-pages"]),
        "Deploy abc1234 to gh-pages"
    );

    let mut second = sitepush_cmd(cwd.path());
    deploy(&mut second);
    second
        .assert()
        .success()
        .stdout(contains(r#""outcome":"no-changes""#));
    assert_eq!(git(&bare, &["rev-parse", "gh-pages"]), tip);
}

#[test]
fn deploy_reads_repo_and_revision_from_ci_environment() {
    let cwd = TempDir::new().expect("cwd");
    let remote_root = TempDir::new().expect("remote");
    let remote_base = bare_remote(remote_root.path());
    write_site(&cwd.path().join("public"));

    sitepush_cmd(cwd.path())
        .env("GITHUB_REPOSITORY", "acme/site")
        .env("GITHUB_SHA", "feedbeef")
        .args(["deploy", "public", "--branch", "pages", "--nojekyll"])
        .args(["--remote-base", &remote_base, "--skip-token-check"])
        .assert()
        .success()
        .stdout(contains("published"));

    let bare = remote_root.path().join("acme/site.git");
    assert_eq!(
        git(&bare, &["log", "-1", "--format=%s", "pages"]),
        "Deploy feedbeef to pages"
    );
    assert!(git(&bare, &["ls-tree", "--name-only", "pages"]).contains(".nojekyll"));
}

#[test]
fn deploy_missing_directory_fails_with_json_reason() {
    let cwd = TempDir::new().expect("cwd");

    sitepush_cmd(cwd.path())
        .args(["deploy", "nope", "--repo", "acme/site", "--revision", "r1"])
        .args(["--skip-token-check", "--json"])
        .assert()
        .code(1)
        .stdout(contains(r#""outcome":"failed""#))
        .stdout(contains("not a directory"));
}

#[test]
fn deploy_without_token_fails_before_cloning() {
    let cwd = TempDir::new().expect("cwd");
    write_site(&cwd.path().join("dist"));

    sitepush_cmd(cwd.path())
        .args(["deploy", "dist", "--repo", "acme/site", "--revision", "r1"])
        .assert()
        .code(1)
        .stderr(contains("GITHUB_TOKEN"));
}

#[test]
fn deploy_rejects_malformed_repository() {
    let cwd = TempDir::new().expect("cwd");

    sitepush_cmd(cwd.path())
        .args(["deploy", "dist", "--repo", "not-a-slug", "--revision", "r1"])
        .assert()
        .failure()
        .stderr(contains("--repo"));
}

#[test]
fn deploy_failure_output_never_contains_token() {
    let cwd = TempDir::new().expect("cwd");
    write_site(&cwd.path().join("dist"));
    let token = "ghs_cli_secret_value";

    sitepush_cmd(cwd.path())
        .env("GITHUB_TOKEN", token)
        .args(["deploy", "dist", "--repo", "acme/site", "--revision", "r1"])
        .args(["--remote-base", "https://127.0.0.1:9", "--skip-token-check", "-v"])
        .assert()
        .code(1)
        .stdout(contains(token).not())
        .stderr(contains(token).not());
}
