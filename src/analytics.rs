//! Summary statistics over a cracked pwdump file.
//!
//! Only user accounts are considered; machine accounts have random
//! passwords. An account counts as cracked when the final result file has a
//! line for it.
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use log::info;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::account::Account;

/// Longest alphabetic run of at least three letters.
static BASEWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z]{3,}").expect("static regex"));

const TOP_BASEWORDS: usize = 10;

/// Summary of one cracking run. Serialized as JSON by `analytics -f json`
/// and read back by `submit`, so `timestamp` is the time of analysis, not of
/// submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub timestamp: NaiveDateTime,
    pub accounts: usize,
    pub cracked: usize,
    /// Accounts whose NT hash is shared with at least one other account.
    pub nonunique: usize,
    pub user_equals_password: usize,
    pub lm_hash_count: usize,
    pub empty_password: usize,
    pub average_password_length: f64,
    pub largest_baseword_cluster: usize,
    /// (baseword, count), most frequent first. Empty when censored.
    #[serde(default)]
    pub top_basewords: Vec<(String, usize)>,
    #[serde(default)]
    pub censored: bool,
}

impl ReportData {
    /// Drop everything derived from plaintext passwords beyond counts.
    pub fn censored(mut self) -> Self {
        self.top_basewords.clear();
        self.censored = true;
        self
    }
}

pub fn pct(n: usize, d: usize) -> String {
    if d == 0 {
        return "0.00%".to_string();
    }
    format!("{:.2}%", (n as f64) / (d as f64) * 100.0)
}

/// Lower-cased baseword of a password, e.g. `Summer2024!` -> `summer`.
pub fn baseword(password: &str) -> Option<String> {
    let lower = password.to_lowercase();
    BASEWORD
        .find_iter(&lower)
        .max_by_key(|m| m.len())
        .map(|m| m.as_str().to_string())
}

fn user_accounts<'a>(
    accounts: &'a [Account],
    filter: Option<&HashSet<String>>,
) -> Vec<&'a Account> {
    accounts
        .iter()
        .filter(|a| a.is_user_account())
        .filter(|a| filter.is_none_or(|f| f.contains(&a.sam_account_name.to_lowercase())))
        .collect()
}

/// Counts that depend only on the hash file.
fn base_report(considered: &[&Account]) -> ReportData {
    let mut hash_freq: HashMap<&str, usize> = HashMap::new();
    for a in considered {
        *hash_freq.entry(a.nt_hash.as_str()).or_insert(0) += 1;
    }
    ReportData {
        timestamp: Local::now().naive_local(),
        accounts: considered.len(),
        cracked: 0,
        nonunique: considered.iter().filter(|a| hash_freq[a.nt_hash.as_str()] > 1).count(),
        user_equals_password: 0,
        lm_hash_count: considered.iter().filter(|a| a.has_lm_hash()).count(),
        empty_password: considered.iter().filter(|a| a.has_empty_password()).count(),
        average_password_length: 0.0,
        largest_baseword_cluster: 0,
        top_basewords: Vec::new(),
        censored: false,
    }
}

fn add_password_stats<'p>(data: &mut ReportData, passwords: impl Iterator<Item = &'p str>) {
    let mut total_len = 0;
    let mut basewords: HashMap<String, usize> = HashMap::new();
    for pw in passwords {
        data.cracked += 1;
        total_len += pw.chars().count();
        if let Some(b) = baseword(pw) {
            *basewords.entry(b).or_insert(0) += 1;
        }
    }
    if data.cracked > 0 {
        data.average_password_length = total_len as f64 / data.cracked as f64;
    }

    let mut top: Vec<(String, usize)> = basewords.into_iter().collect();
    top.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top.truncate(TOP_BASEWORDS);
    data.largest_baseword_cluster = top.first().map(|(_, n)| *n).unwrap_or(0);
    data.top_basewords = top;
}

/// `results` maps lower-cased account names (as in the hash file) to
/// passwords; `filter`, if given, restricts the analysis to the named
/// accounts.
pub fn create_report(
    accounts: &[Account],
    results: &HashMap<String, String>,
    filter: Option<&HashSet<String>>,
) -> ReportData {
    let considered = user_accounts(accounts, filter);
    let mut data = base_report(&considered);

    let cracked: Vec<(&Account, &str)> = considered
        .iter()
        .filter_map(|a| results.get(&a.name.to_lowercase()).map(|pw| (*a, pw.as_str())))
        .collect();
    data.user_equals_password = cracked
        .iter()
        .filter(|(a, pw)| pw.to_lowercase() == a.sam_account_name.to_lowercase())
        .count();
    add_password_stats(&mut data, cracked.iter().map(|(_, pw)| *pw));
    data
}

/// Report from a bare password list (no account association). The filter
/// only affects the hash-file counts and `user_equals_password` stays 0.
pub fn create_report_from_passwords(
    accounts: &[Account],
    passwords: &[String],
    filter: Option<&HashSet<String>>,
) -> ReportData {
    let considered = user_accounts(accounts, filter);
    let mut data = base_report(&considered);
    add_password_stats(&mut data, passwords.iter().map(String::as_str));
    data
}

/// Pretty-printed JSON form of a report, newline-terminated.
pub fn report_json(data: &ReportData) -> Result<String> {
    Ok(serde_json::to_string_pretty(data)? + "\n")
}

pub fn save_report<P: AsRef<Path>>(data: &ReportData, path: P) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, report_json(data)?).with_context(|| format!("writing {}", path.display()))?;
    info!("report written to {}", path.display());
    Ok(())
}

pub fn load_report<P: AsRef<Path>>(path: P) -> Result<ReportData> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing report {}", path.display()))
}
