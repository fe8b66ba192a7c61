use assert_cmd::cargo_bin_cmd;
use predicates::prelude::*;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../fixtures")
        .join(name)
}

#[test]
fn cli_batch_caches_accepted_cases_and_lists_them() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("cases.json");

    let mut cmd = cargo_bin_cmd!("scanlens");
    cmd.env("NO_COLOR", "1").args([
        "batch",
        "--input",
        fixture("batch").to_str().unwrap(),
        "--cache",
        cache.to_str().unwrap(),
    ]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("accepted=2 rejected=1"))
        .stderr(predicate::str::contains("c_broken.json"));

    let mut cmd = cargo_bin_cmd!("scanlens");
    cmd.args(["cases", "list", "--cache", cache.to_str().unwrap()]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("case-usb-0192"))
        .stdout(predicate::str::contains("case-lab-7"));
}

#[test]
fn cli_normalize_twice_keeps_one_cached_case() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("cases.json");

    for _ in 0..2 {
        let mut cmd = cargo_bin_cmd!("scanlens");
        cmd.args([
            "normalize",
            "--input",
            fixture("canonical_case.json").to_str().unwrap(),
            "--out",
            dir.path().join("out").to_str().unwrap(),
            "--cache",
            cache.to_str().unwrap(),
        ]);
        cmd.assert().success();
    }

    let cached: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&cache).unwrap()).unwrap();
    assert_eq!(cached.as_array().map(|a| a.len()), Some(1));
}

#[test]
fn cli_cases_remove_drops_case_and_errors_on_unknown_id() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("cases.json");

    let mut cmd = cargo_bin_cmd!("scanlens");
    cmd.args([
        "batch",
        "--input",
        fixture("batch").to_str().unwrap(),
        "--cache",
        cache.to_str().unwrap(),
    ]);
    cmd.assert().success();

    let mut cmd = cargo_bin_cmd!("scanlens");
    cmd.args(["cases", "remove", "case-lab-7", "--cache", cache.to_str().unwrap()]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("removed=case-lab-7"));

    let mut cmd = cargo_bin_cmd!("scanlens");
    cmd.args(["cases", "list", "--cache", cache.to_str().unwrap()]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("case-usb-0192"))
        .stdout(predicate::str::contains("case-lab-7").not());

    let mut cmd = cargo_bin_cmd!("scanlens");
    cmd.args(["cases", "remove", "case-lab-7", "--cache", cache.to_str().unwrap()]);
    cmd.assert().failure().code(1);
}

#[test]
fn cli_batch_exits_1_when_nothing_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bad.json"), "{ nope").unwrap();

    let mut cmd = cargo_bin_cmd!("scanlens");
    cmd.args(["batch", "--input", dir.path().to_str().unwrap()]);
    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("accepted=0 rejected=1"));
}

#[test]
fn cli_cases_requires_a_cache_path() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = cargo_bin_cmd!("scanlens");
    cmd.current_dir(dir.path()).args(["cases", "list"]);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no case cache configured"));
}

#[test]
fn cli_warns_about_a_broken_discovered_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("scanlens.toml"), "strict_shape = [").unwrap();
    let cache = dir.path().join("cases.json");

    let mut cmd = cargo_bin_cmd!("scanlens");
    cmd.current_dir(dir.path())
        .env("NO_COLOR", "1")
        .args(["cases", "list", "--cache", cache.to_str().unwrap()]);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("warning: failed to load config scanlens.toml"));
}
