//! Account filter files: one account name per line, no domain, any case.
use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

pub fn parse_account_filter(contents: &str) -> HashSet<String> {
    contents
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| l.rsplit('\\').next().unwrap_or(l).to_lowercase())
        .collect()
}

pub fn load_account_filter<P: AsRef<Path>>(path: P) -> Result<HashSet<String>> {
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("read {}", path.as_ref().display()))?;
    Ok(parse_account_filter(&contents))
}
