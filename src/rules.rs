//! Built-in rule set used to upgrade cracked LM passwords to NT passwords.
//!
//! LM is case-insensitive, so a recovered LM password is the upper-cased
//! NT password. Toggling the case of every subset of the first fourteen
//! positions (the LM length limit) yields the NT candidate.
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::io::write_artifact;

/// LM passwords are at most 14 characters.
const LM_MAX_LEN: u32 = 14;

/// Hashcat rule positions: `0`-`9`, then `A`-`Z` for 10 and up.
fn position_char(pos: u32) -> char {
    std::char::from_digit(pos, 36)
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('Z')
}

/// Lines of the toggle rule set, `:` (no-op) first, then by subset bitmask.
pub fn nt_upgrade_rules() -> impl Iterator<Item = String> {
    (0u32..1 << LM_MAX_LEN).map(|mask| {
        if mask == 0 {
            return ":".to_string();
        }
        (0..LM_MAX_LEN)
            .filter(|bit| mask & (1 << bit) != 0)
            .map(|bit| format!("T{}", position_char(bit)))
            .collect()
    })
}

/// Write the rule set to a new `rules_*` file in `dir` so hashcat can read it.
pub fn materialize_rules(dir: &Path) -> io::Result<PathBuf> {
    let path = write_artifact(dir, "rules_", nt_upgrade_rules())?;
    debug!("wrote NT upgrade rules to {}", path.display());
    Ok(path)
}
