#![cfg(unix)]

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{TempDir, tempdir};

const FAKE_HASHCAT: &str = r#"#!/bin/sh
dir=$(dirname "$0")
echo "$*" >> "$dir/calls.log"
case " $* " in
  *" --version "*) echo "v6.2.6"; exit 0 ;;
  *" --show "*)
    if [ -n "$FAIL_SHOW" ]; then exit 255; fi
    printf 'CORP\\alice:Password\nCORP\\bob:\nCORP\\carol:test\n'
    exit 0 ;;
esac
case " $* " in
  *" -m $FAIL_MODE "*) exit 1 ;;
esac
exit 0
"#;

const HASHES: &str = "\
CORP\\alice:1001:e52cac67419a9a224a3b108f3fa6cb6d:8846f7eaee8fb117ad06bdd830b7586c:::
CORP\\bob:1002:aad3b435b51404eeaad3b435b51404ee:31d6cfe0d16ae931b73c59d7e0c089c0:::
CORP\\carol:1003:aad3b435b51404eeaad3b435b51404ee:0cb6948805f797bf2a82807973b89537:::
";

struct Setup {
    tmp: TempDir,
    bin: PathBuf,
    hashes: PathBuf,
    wordlist: PathBuf,
    work: PathBuf,
}

fn setup() -> Setup {
    let tmp = tempdir().unwrap();
    let bin_dir = tmp.path().join("bin");
    fs::create_dir_all(&bin_dir).unwrap();
    let bin = bin_dir.join("hashcat");
    fs::write(&bin, FAKE_HASHCAT).unwrap();
    fs::set_permissions(&bin, fs::Permissions::from_mode(0o755)).unwrap();

    let hashes = tmp.path().join("ntds.txt");
    fs::write(&hashes, HASHES).unwrap();
    let wordlist = tmp.path().join("words.txt");
    fs::write(&wordlist, "Password\ntest\n").unwrap();
    let work = tmp.path().join("work");
    Setup {
        tmp,
        bin,
        hashes,
        wordlist,
        work,
    }
}

impl Setup {
    fn ntlm(&self) -> Command {
        self.ntlm_with_bin(&self.bin)
    }

    fn ntlm_with_bin(&self, bin: &Path) -> Command {
        let mut cmd = Command::cargo_bin("hashcathelper").unwrap();
        cmd.arg("ntlm")
            .arg(&self.hashes)
            .arg("-w")
            .arg(&self.wordlist)
            .arg("-d")
            .arg(&self.work)
            .arg("--hashcat-bin")
            .arg(bin)
            .env_remove("FAIL_MODE")
            .env_remove("FAIL_SHOW");
        cmd
    }

    fn calls(&self) -> Vec<String> {
        let log = self.bin.parent().unwrap().join("calls.log");
        fs::read_to_string(log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn artifacts(&self, prefix: &str) -> Vec<PathBuf> {
        match fs::read_dir(&self.work) {
            Ok(rd) => rd
                .flatten()
                .map(|e| e.path())
                .filter(|p| file_name(p).starts_with(prefix))
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

fn file_name(p: &Path) -> String {
    p.file_name().unwrap().to_string_lossy().into_owned()
}

#[test]
fn full_pipeline_runs_three_stages() {
    let s = setup();
    s.ntlm()
        .assert()
        .success()
        .stdout(predicate::str::contains("Result written to:"))
        .stdout(predicate::str::contains("Password Statistics"));

    let calls = s.calls();
    assert_eq!(calls.len(), 6);
    assert!(calls[0].contains("-m 3000") && calls[0].contains("-a 3"));
    assert!(calls[1].contains("-m 3000 --show --outfile-format 2"));
    assert!(calls[2].contains("-m 1000") && calls[2].contains("-r "));
    assert!(calls[4].contains("-m 1000") && calls[4].contains("-a 0"));

    // LM, NT upgrade and final results; the final one keeps account names
    let results = s.artifacts("result_");
    assert_eq!(results.len(), 3);
    assert_eq!(s.artifacts("rules_").len(), 1);
    let finals: Vec<_> = results
        .iter()
        .filter(|p| fs::read_to_string(p).unwrap().contains("CORP\\alice:Password"))
        .collect();
    assert_eq!(finals.len(), 1);
    assert_eq!(fs::read_to_string(finals[0]).unwrap().lines().count(), 3);
}

#[test]
fn skip_lm_runs_only_final_stage() {
    let s = setup();
    s.ntlm().arg("--skip-lm").assert().success();
    let calls = s.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c.contains("-m 1000")));
    assert!(!calls[0].contains("result_"));
    assert!(s.artifacts("rules_").is_empty());
    assert_eq!(s.artifacts("result_").len(), 1);
}

#[test]
fn crack_failure_exits_without_results() {
    let s = setup();
    s.ntlm().env("FAIL_MODE", "3000").assert().code(3);
    assert_eq!(s.calls().len(), 1);
    assert!(s.artifacts("result_").is_empty());
}

#[test]
fn show_failure_has_its_own_exit_code() {
    let s = setup();
    s.ntlm().env("FAIL_SHOW", "1").assert().code(4);
    assert_eq!(s.calls().len(), 2);
    assert!(s.artifacts("result_").is_empty());
}

#[test]
fn missing_hashcat_binary_fails() {
    let s = setup();
    s.ntlm_with_bin(&s.tmp.path().join("no-such-hashcat"))
        .assert()
        .code(3);
    assert!(s.artifacts("result_").is_empty());
}

#[test]
fn missing_hashfile_causes_input_error() {
    let s = setup();
    let mut cmd = Command::cargo_bin("hashcathelper").unwrap();
    cmd.arg("ntlm")
        .arg(s.tmp.path().join("missing-ntds.txt"))
        .arg("-w")
        .arg(&s.wordlist);
    cmd.assert().code(2);
    assert!(s.calls().is_empty());
}

#[test]
fn analytics_prints_statistics() {
    let s = setup();
    let results = s.tmp.path().join("cracked.txt");
    fs::write(&results, "CORP\\alice:Password\nCORP\\carol:test\n").unwrap();
    let mut cmd = Command::cargo_bin("hashcathelper").unwrap();
    cmd.arg("analytics")
        .arg("-H")
        .arg(&s.hashes)
        .arg("-A")
        .arg(&results)
        .arg("--color")
        .arg("never");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Accounts: 3"))
        .stdout(predicate::str::contains("Cracked: 2 (66.67%)"));
}

#[test]
fn analytics_censor_hides_basewords() {
    let s = setup();
    let results = s.tmp.path().join("cracked.txt");
    fs::write(&results, "CORP\\alice:Password\nCORP\\carol:test\n").unwrap();
    let mut cmd = Command::cargo_bin("hashcathelper").unwrap();
    cmd.arg("analytics")
        .arg("-H")
        .arg(&s.hashes)
        .arg("-A")
        .arg(&results)
        .arg("-c")
        .arg("--color")
        .arg("never");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Cracked: 2 (66.67%)"))
        .stdout(predicate::str::contains("Largest baseword cluster: 1"))
        .stdout(predicate::str::contains("  password:").not())
        .stdout(predicate::str::contains("Top Basewords").not());
}

#[test]
fn analytics_accepts_password_list() {
    let s = setup();
    let pws = s.tmp.path().join("passwords.txt");
    fs::write(&pws, "Password\nSummer2024\nsummer\n").unwrap();
    let mut cmd = Command::cargo_bin("hashcathelper").unwrap();
    cmd.arg("analytics")
        .arg("-H")
        .arg(&s.hashes)
        .arg("-P")
        .arg(&pws)
        .arg("-f")
        .arg("json");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"cracked\": 3"))
        .stdout(predicate::str::contains("\"largest_baseword_cluster\": 2"));
}

#[test]
fn analytics_requires_exactly_one_result_source() {
    let s = setup();
    let mut cmd = Command::cargo_bin("hashcathelper").unwrap();
    cmd.arg("analytics").arg("-H").arg(&s.hashes);
    cmd.assert().failure();

    let mut cmd = Command::cargo_bin("hashcathelper").unwrap();
    cmd.arg("analytics")
        .arg("-H")
        .arg(&s.hashes)
        .arg("-A")
        .arg(&s.wordlist)
        .arg("-P")
        .arg(&s.wordlist);
    cmd.assert().failure();
}

#[test]
fn submit_stores_saved_report_with_its_timestamp() {
    let s = setup();
    let results = s.tmp.path().join("cracked.txt");
    fs::write(&results, "CORP\\alice:Password\n").unwrap();
    let report = s.tmp.path().join("report.json");
    let mut cmd = Command::cargo_bin("hashcathelper").unwrap();
    cmd.arg("analytics")
        .arg("-H")
        .arg(&s.hashes)
        .arg("-A")
        .arg(&results)
        .arg("-f")
        .arg("json")
        .arg("-o")
        .arg(&report);
    cmd.assert().success().stdout(predicate::str::is_empty());

    // pin the analysis time so the stored cracking date is recognizable
    let mut json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["accounts"], 3);
    assert_eq!(json["cracked"], 1);
    json["timestamp"] = "2023-11-02T08:30:00".into();
    fs::write(&report, json.to_string()).unwrap();

    let db = s.tmp.path().join("reports.csv");
    for expected in ["ID 1", "ID 2"] {
        let mut cmd = Command::cargo_bin("hashcathelper").unwrap();
        cmd.arg("submit")
            .arg(&report)
            .arg("--db")
            .arg(&db)
            .arg("--email")
            .arg("pentester@example.com")
            .arg("--wordlist-name")
            .arg("crackstation")
            .arg("--hashcat-bin")
            .arg(&s.bin);
        cmd.assert()
            .success()
            .stdout(predicate::str::contains(expected));
    }
    let csv = fs::read_to_string(&db).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains("v6.2.6"));
    assert_eq!(csv.matches("2023-11-02 08:30:00.000000").count(), 2);
}

#[test]
fn submit_rejects_malformed_report() {
    let s = setup();
    let report = s.tmp.path().join("report.json");
    fs::write(&report, "not json").unwrap();
    let db = s.tmp.path().join("reports.csv");
    let mut cmd = Command::cargo_bin("hashcathelper").unwrap();
    cmd.arg("submit")
        .arg(&report)
        .arg("--db")
        .arg(&db)
        .arg("--email")
        .arg("pentester@example.com")
        .arg("--wordlist-name")
        .arg("crackstation")
        .arg("--hashcat-version")
        .arg("v6.2.6");
    cmd.assert().code(2);
    assert!(!db.exists());
}
