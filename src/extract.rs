//! Result extraction: `hashcat --show` output to a normalized result file.
//!
//! With `--username --outfile-format 2` hashcat prints `account:password`.
//! Stage results keep that shape, or only the password for intermediate
//! stages whose output becomes the next stage's wordlist.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, info};

use crate::attack::{BaseArgs, build_show_command};
use crate::error::PipelineError;
use crate::io::{DEFAULT_MMAP_THRESHOLD_BYTES, iter_lines_auto, write_artifact};
use crate::runner::Runner;

/// Drop everything up to and including the first `:` when `pw_only`; a line
/// without `:` then becomes empty.
pub fn reformat_line(line: &[u8], pw_only: bool) -> &[u8] {
    if !pw_only {
        return line;
    }
    match memchr::memchr(b':', line) {
        Some(i) => &line[i + 1..],
        None => &[],
    }
}

/// Retrieve cracked pairs for `base` and persist them to a new `result_*`
/// file in `dir`.
pub fn extract<R: Runner>(
    runner: &R,
    base: &BaseArgs,
    pw_only: bool,
    dir: &Path,
) -> Result<PathBuf, PipelineError> {
    let out = runner.capture(&build_show_command(base))?;
    if !out.status.success() {
        return Err(PipelineError::ShowFailed {
            mode: base.mode,
            code: out.status.code,
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        });
    }
    let lines: Vec<&[u8]> = out
        .stdout
        .split(|b| *b == b'\n')
        .map(|l| l.strip_suffix(b"\r").unwrap_or(l))
        .collect();
    // split yields a trailing empty slice for newline-terminated output
    let lines = match lines.split_last() {
        Some((last, rest)) if last.is_empty() => rest,
        _ => &lines[..],
    };
    let path = write_artifact(dir, "result_", lines.iter().map(|l| reformat_line(l, pw_only)))
        .map_err(PipelineError::io(dir))?;
    info!(
        "mode {}: {} recovered entries written to {}",
        base.mode,
        lines.len(),
        path.display()
    );
    Ok(path)
}

/// Split a result line `account:password` at the first `:`; the password may
/// be empty or contain further colons.
pub fn parse_result_line(line: &str) -> Option<(String, String)> {
    line.split_once(':')
        .map(|(account, pw)| (account.to_string(), pw.to_string()))
}

/// Load a final result file into a map keyed by lower-cased account name.
pub fn load_results<P: AsRef<Path>>(path: P) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    let mut skipped = 0usize;
    for line in iter_lines_auto(&path, DEFAULT_MMAP_THRESHOLD_BYTES)?.flatten() {
        if line.is_empty() {
            continue;
        }
        match parse_result_line(&line) {
            Some((account, pw)) => {
                map.insert(account.to_lowercase(), pw);
            }
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!("{}: skipped {} lines without ':'", path.as_ref().display(), skipped);
    }
    Ok(map)
}

/// One password per line, as written by an intermediate (`pw_only`) stage.
/// Blank lines are empty passwords and are kept.
pub fn load_passwords<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let lines = iter_lines_auto(&path, DEFAULT_MMAP_THRESHOLD_BYTES)?;
    Ok(lines
        .flatten()
        .map(|l| l.strip_suffix('\r').map(str::to_string).unwrap_or(l))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack::HashMode;
    use crate::error::RunError;
    use crate::runner::{Captured, Status};
    use std::ffi::OsString;

    struct ShowOnly {
        code: i32,
        stdout: &'static str,
    }

    impl Runner for ShowOnly {
        fn run(&self, _: &[OsString]) -> Result<Status, RunError> {
            unreachable!("extract never runs a crack")
        }

        fn capture(&self, args: &[OsString]) -> Result<Captured, RunError> {
            assert!(args.iter().any(|a| a == "--show"));
            Ok(Captured {
                status: Status::from_code(self.code),
                stdout: self.stdout.as_bytes().to_vec(),
                stderr: b"Token length exception\n".to_vec(),
            })
        }
    }

    fn base() -> BaseArgs {
        BaseArgs::new("hashcat", "dump.txt", HashMode::NT)
    }

    #[test]
    fn pw_only_strips_account_prefix() {
        assert_eq!(reformat_line(b"CORP\\alice:Summer2024", true), b"Summer2024");
        assert_eq!(reformat_line(b"bob:pa:ss", true), b"pa:ss");
        assert_eq!(reformat_line(b"carol:", true), b"");
        assert_eq!(reformat_line(b"nocolon", true), b"");
        assert_eq!(reformat_line(b"CORP\\alice:Summer2024", false), b"CORP\\alice:Summer2024");
    }

    #[test]
    fn writes_one_line_per_show_line() {
        let dir = tempfile::tempdir().unwrap();
        let r = ShowOnly {
            code: 0,
            stdout: "alice:Summer1\r\nbob:\ncarol:Winter2\n",
        };
        let p = extract(&r, &base(), true, dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&p).unwrap(), "Summer1\n\nWinter2\n");
        let full = extract(&r, &base(), false, dir.path()).unwrap();
        assert_ne!(p, full);
        assert_eq!(
            std::fs::read_to_string(&full).unwrap(),
            "alice:Summer1\nbob:\ncarol:Winter2\n"
        );
    }

    #[test]
    fn empty_show_output_is_an_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let r = ShowOnly { code: 0, stdout: "" };
        let p = extract(&r, &base(), false, dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&p).unwrap(), "");
    }

    #[test]
    fn non_zero_show_is_a_retrieval_failure() {
        let dir = tempfile::tempdir().unwrap();
        let r = ShowOnly { code: 255, stdout: "" };
        let err = extract(&r, &base(), false, dir.path()).unwrap_err();
        match err {
            PipelineError::ShowFailed { mode, code, stderr } => {
                assert_eq!(mode, HashMode::NT);
                assert_eq!(code, Some(255));
                assert_eq!(stderr, "Token length exception");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn loads_results_keyed_by_account() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("final.txt");
        std::fs::write(&p, "CORP\\Alice:pa:ss\nbob:\n\njunk\n").unwrap();
        let map = load_results(&p).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["corp\\alice"], "pa:ss");
        assert_eq!(map["bob"], "");
    }

    #[test]
    fn password_list_keeps_empty_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pw.txt");
        std::fs::write(&path, "Password\r\n\nSummer2024!\n").unwrap();
        let pws = load_passwords(&path).unwrap();
        assert_eq!(pws, ["Password", "", "Summer2024!"]);
    }
}
