//! Command-line tests for the offline subcommands.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};

const REPORT: &str = "project: ':'
dependencyUpdates:
- group: junit
  name: junit
  currentVersion: '4.12'
  latestVersion: 4.13.2
  upgradeType: minor
pluginUpdates:
- group: com.diffplug.spotless
  name: com.diffplug.spotless.gradle.plugin
  currentVersion: 6.0.0
  latestVersion: 6.25.0
";

const GRADLE_REPORT: &str = "project: ':'
gradle:
  currentVersion: '7.2'
  latestVersion: '8.5'
  distributionUrl: https://services.gradle.org/distributions/gradle-8.5-bin.zip
";

const WRAPPER: &str = "distributionBase=GRADLE_USER_HOME\ndistributionUrl=https\\://services.gradle.org/distributions/gradle-7.2-bin.zip\n";

fn cmd(project: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gradle-versions").unwrap();
    cmd.arg("--path").arg(project);
    cmd
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A single-module build with prewritten reports.
fn checked_project() -> TempDir {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(
        root,
        "build.gradle",
        "plugins {\n    id 'com.diffplug.spotless' version '6.0.0'\n}\n\ndependencies {\n    implementation 'junit:junit'\n}\n",
    );
    write(root, "versions.props", "# pins\njunit:junit = 4.12\n");
    write(root, "gradle/wrapper/gradle-wrapper.properties", WRAPPER);
    write(root, "build/gradle-versions/report.yml", REPORT);
    write(root, "build/gradle-versions/gradle-report.yml", GRADLE_REPORT);
    dir
}

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("gradle-versions")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check-gradle"))
        .stdout(predicate::str::contains("update-props"))
        .stdout(predicate::str::contains("clear-report"));
}

#[test]
fn missing_project_exits_with_error() {
    let dir = tempdir().unwrap();
    cmd(&dir.path().join("nope"))
        .arg("report")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn update_props_rewrites_pinned_version() {
    let dir = checked_project();
    cmd(dir.path())
        .arg("update-props")
        .assert()
        .success()
        .stdout(predicate::str::contains("junit:junit"));

    assert_eq!(
        fs::read_to_string(dir.path().join("versions.props")).unwrap(),
        "# pins\njunit:junit = 4.13.2\n"
    );
}

#[test]
fn update_props_dry_run_writes_nothing() {
    let dir = checked_project();
    cmd(dir.path())
        .args(["update-props", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Would update"));

    assert_eq!(
        fs::read_to_string(dir.path().join("versions.props")).unwrap(),
        "# pins\njunit:junit = 4.12\n"
    );
}

#[test]
fn update_props_without_props_file_fails() {
    let dir = checked_project();
    fs::remove_file(dir.path().join("versions.props")).unwrap();
    cmd(dir.path())
        .arg("update-props")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("versions.props not found"));
}

#[test]
fn interactive_quit_cancels_without_writing() {
    let dir = checked_project();
    cmd(dir.path())
        .args(["update-props", "--interactive"])
        .write_stdin("q\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Update cancelled by user."));

    assert_eq!(
        fs::read_to_string(dir.path().join("versions.props")).unwrap(),
        "# pins\njunit:junit = 4.12\n"
    );
}

#[test]
fn update_plugins_rewrites_build_script() {
    let dir = checked_project();
    cmd(dir.path()).arg("update-plugins").assert().success();

    let build = fs::read_to_string(dir.path().join("build.gradle")).unwrap();
    assert!(build.contains("id 'com.diffplug.spotless' version '6.25.0'"));
    assert!(build.contains("implementation 'junit:junit'"));
}

#[test]
fn quitting_after_accepting_leaves_every_build_file_untouched() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let build = "plugins {\n    id 'com.diffplug.spotless' version '6.0.0'\n}\n";
    write(root, "settings.gradle", "include 'app'\n");
    write(root, "build.gradle", build);
    write(root, "app/build.gradle", build);
    write(root, "build/gradle-versions/report.yml", REPORT);

    cmd(root)
        .args(["update-plugins", "--interactive"])
        .write_stdin("y\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Update cancelled by user."));

    assert_eq!(fs::read_to_string(root.join("build.gradle")).unwrap(), build);
    assert_eq!(fs::read_to_string(root.join("app/build.gradle")).unwrap(), build);
}

#[test]
fn update_wrapper_applies_gradle_report() {
    let dir = checked_project();
    cmd(dir.path()).arg("update-wrapper").assert().success();

    assert_eq!(
        fs::read_to_string(dir.path().join("gradle/wrapper/gradle-wrapper.properties")).unwrap(),
        "distributionBase=GRADLE_USER_HOME\ndistributionUrl=https\\://services.gradle.org/distributions/gradle-8.5-bin.zip\n"
    );
}

#[test]
fn report_then_clear_report() {
    let dir = checked_project();
    let summary = dir.path().join("build/gradle-versions/report.md");

    cmd(dir.path()).arg("report").assert().success();
    let markdown = fs::read_to_string(&summary).unwrap();
    assert!(markdown.starts_with("# Dependency updates"));
    assert!(markdown.contains("`junit:junit`"));
    assert!(markdown.contains("Gradle: `7.2` -> `8.5`"));

    cmd(dir.path())
        .arg("clear-report")
        .assert()
        .success()
        .stdout(predicate::str::contains("removed"));
    assert!(!summary.exists());

    cmd(dir.path())
        .arg("clear-report")
        .assert()
        .success()
        .stdout(predicate::str::contains("No Markdown summary"));
}

#[test]
fn report_without_reports_suggests_check() {
    let dir = tempdir().unwrap();
    write(dir.path(), "build.gradle", "");
    cmd(dir.path())
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("gradle-versions check"));
}
