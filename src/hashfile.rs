//! Parsing of pwdump hash files as produced by secretsdump or Meterpreter.
//!
//! The pipeline itself only passes the hash-file path to hashcat; parsing is
//! needed for the derived username wordlist and for analytics.
use std::path::Path;

use anyhow::Result;
use log::debug;

use crate::account::Account;
use crate::io::{DEFAULT_MMAP_THRESHOLD_BYTES, iter_lines_auto};

#[derive(Debug, thiserror::Error)]
pub enum HashFileError {
    #[error("malformed line: {0}")]
    MalformedLine(String),
}

pub fn parse_hashfile_line(line: &str) -> Result<Account, HashFileError> {
    // account:uid:lm:nt[:::]
    let mut parts = line.split(':');
    let mut next = || {
        parts
            .next()
            .ok_or_else(|| HashFileError::MalformedLine(line.to_string()))
    };
    let name = next()?;
    let uid = next()?;
    let lm = next()?.trim();
    let nt = next()?.trim();
    if name.trim().is_empty() {
        return Err(HashFileError::MalformedLine(line.to_string()));
    }
    Ok(Account::from_pwdump(name, uid, lm, nt))
}

/// Parse all well-formed lines, skipping blank and malformed ones.
pub fn parse_hashfile_contents(contents: &str) -> Vec<Account> {
    contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter_map(|l| parse_hashfile_line(l).ok())
        .collect()
}

/// Streaming variant of [`parse_hashfile_contents`] over a file.
pub fn load_accounts<P: AsRef<Path>>(path: P) -> Result<Vec<Account>> {
    load_accounts_with_threshold(path, DEFAULT_MMAP_THRESHOLD_BYTES)
}

pub fn load_accounts_with_threshold<P: AsRef<Path>>(
    path: P,
    mmap_threshold_bytes: u64,
) -> Result<Vec<Account>> {
    let mut accounts = Vec::new();
    let mut malformed = 0usize;
    for line in iter_lines_auto(&path, mmap_threshold_bytes)?.flatten() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match parse_hashfile_line(trimmed) {
            Ok(a) => accounts.push(a),
            Err(_) => malformed += 1,
        }
    }
    if malformed > 0 {
        debug!(
            "{}: skipped {} malformed lines",
            path.as_ref().display(),
            malformed
        );
    }
    Ok(accounts)
}
