//! End-to-end tests for the `labels` subcommands.

mod common;
use common::prelude::*;

#[test]
fn test_filter_repos_writes_active_repositories() {
    let fixture = TestFixture::new().with_file("repos.json", fixtures::ORG_REPOS_JSON);

    fixture
        .command()
        .args(["labels", "filter-repos", "repos.json", "repos.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 3 of 4 repositories"));

    fixture.child("repos.txt").assert(predicate::eq(
        "scritical/.github\nscritical/adflow\nscritical/idwarp\n",
    ));
}

#[test]
fn test_filter_repos_uses_org_flag_for_github_repo() {
    let fixture = TestFixture::new().with_file("repos.json", fixtures::ORG_REPOS_JSON);

    fixture
        .command()
        .args(["labels", "filter-repos", "repos.json", "--org", "mdolab"])
        .assert()
        .success();

    fixture
        .child("repos.txt")
        .assert(predicate::str::starts_with("mdolab/.github\n"));
}

#[test]
fn test_filter_repos_rejects_malformed_json() {
    let fixture = TestFixture::new().with_file("repos.json", "{ not json");

    fixture
        .command()
        .args(["labels", "filter-repos", "repos.json"])
        .assert()
        .code(1);

    fixture.child("repos.txt").assert(predicate::path::missing());
}

#[test]
fn test_validate_accepts_good_labels() {
    let fixture = TestFixture::new().with_file("labels.yml", fixtures::LABELS);

    fixture
        .command()
        .args(["labels", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("defines 2 valid labels"));
}

#[test]
fn test_validate_rejects_bad_color() {
    let fixture = TestFixture::new().with_file("custom.yml", fixtures::BAD_LABELS);

    fixture
        .command()
        .args(["labels", "validate", "--labels", "custom.yml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("red"));
}

#[cfg(unix)]
#[test]
fn test_sync_continues_after_a_failing_repository() {
    let fixture = TestFixture::new()
        .with_file("labels.yml", fixtures::LABELS)
        .with_file("repos.txt", "scritical/adflow\nscritical/broken\nscritical/idwarp\n")
        .with_tool(
            "github-label-sync",
            r#"for last; do :; done
echo "token=$GITHUB_ACCESS_TOKEN $@" >> calls.txt
[ "$last" != scritical/broken ]"#,
        );

    fixture
        .command()
        .env("GITHUB_TOKEN", "ghp_test")
        .args(["labels", "sync", "-l", "repos.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 3 repositories"));

    let calls = std::fs::read_to_string(fixture.file("calls.txt")).unwrap();
    let lines: Vec<&str> = calls.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("token=ghp_test --labels"));
    assert_eq!(lines[0].matches("ghp_test").count(), 1);
    assert!(lines[0].contains("--dry-run"));
    assert!(lines[2].ends_with("scritical/idwarp"));
}

#[cfg(unix)]
#[test]
fn test_sync_filter_and_apply() {
    let fixture = TestFixture::new()
        .with_file("labels.yml", fixtures::LABELS)
        .with_file("repos.txt", "scritical/adflow\nscritical/idwarp\n")
        .with_tool("github-label-sync", r#"echo "$@" >> calls.txt"#);

    fixture
        .command()
        .env("GITHUB_TOKEN", "ghp_test")
        .args(["labels", "sync", "-l", "repos.txt", "--filter", "*/ad*", "--apply"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 1 repositories"));

    fixture
        .child("calls.txt")
        .assert(predicate::str::contains("scritical/adflow"))
        .assert(predicate::str::contains("idwarp").not())
        .assert(predicate::str::contains("--dry-run").not());
}

#[cfg(unix)]
#[test]
fn test_sync_qualifies_bare_names_with_org() {
    let fixture = TestFixture::new()
        .with_file("labels.yml", fixtures::LABELS)
        .with_file("repos.txt", "adflow\nmdolab/pygeo\n")
        .with_tool("github-label-sync", r#"for last; do :; done
echo "$last" >> calls.txt"#);

    fixture
        .command()
        .env("GITHUB_TOKEN", "ghp_test")
        .args(["labels", "sync", "-l", "repos.txt", "--org", "scritical"])
        .assert()
        .success();

    fixture
        .child("calls.txt")
        .assert(predicate::eq("scritical/adflow\nmdolab/pygeo\n"));
}
