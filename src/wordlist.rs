//! Derived wordlists.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

use crate::hashfile::load_accounts;
use crate::io::write_artifact;

/// Write the lower-cased account names of `hashfile` to a new `userlist_*`
/// file in `dir`. Users picking their own name as password is common enough
/// that every dictionary stage tries these first.
pub fn write_username_wordlist(hashfile: &Path, dir: &Path) -> Result<PathBuf> {
    let accounts = load_accounts(hashfile)?;
    let path = write_artifact(dir, "userlist_", accounts.iter().map(|a| a.wordlist_name()))
        .with_context(|| format!("write username wordlist in {}", dir.display()))?;
    debug!(
        "wrote {} account names to {}",
        accounts.len(),
        path.display()
    );
    Ok(path)
}
