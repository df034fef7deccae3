//! Command builder for hashcat invocations.
//!
//! Every invocation shares the same prefix (`bin hashfile --username -m
//! <mode>`); cracking runs append an attack configuration, result retrieval
//! appends `--show --outfile-format 2`. All functions here are pure.
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

/// Numeric hashcat hash-type identifier (`-m`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashMode(pub u32);

impl HashMode {
    /// LM, cracked per 7-character half.
    pub const LM: HashMode = HashMode(3000);
    /// NTLM.
    pub const NT: HashMode = HashMode(1000);
}

impl fmt::Display for HashMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Arguments shared by the crack and show invocations of one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseArgs {
    pub bin: PathBuf,
    pub hashfile: PathBuf,
    pub mode: HashMode,
}

impl BaseArgs {
    pub fn new(bin: impl Into<PathBuf>, hashfile: impl Into<PathBuf>, mode: HashMode) -> Self {
        Self {
            bin: bin.into(),
            hashfile: hashfile.into(),
            mode,
        }
    }

    fn to_args(&self) -> Vec<OsString> {
        vec![
            self.bin.clone().into_os_string(),
            self.hashfile.clone().into_os_string(),
            "--username".into(),
            "-m".into(),
            self.mode.to_string().into(),
        ]
    }
}

/// Brute-force parameters. Only meant for LM material, which never exceeds
/// seven characters per half.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    pub mask: String,
    pub min_len: u32,
    pub max_len: u32,
}

impl Default for Mask {
    fn default() -> Self {
        Self {
            mask: "?a".repeat(7),
            min_len: 1,
            max_len: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttackConfig {
    /// `-a 0`; wordlists are tried in order.
    Wordlist {
        wordlists: Vec<PathBuf>,
        ruleset: Option<PathBuf>,
    },
    /// `-a 3` with increment bounds.
    Mask(Mask),
}

impl AttackConfig {
    /// Dictionary attack over `wordlists`, or the default mask attack when
    /// there are none.
    pub fn from_wordlists(wordlists: Vec<PathBuf>, ruleset: Option<PathBuf>) -> Self {
        if wordlists.is_empty() {
            AttackConfig::Mask(Mask::default())
        } else {
            AttackConfig::Wordlist { wordlists, ruleset }
        }
    }
}

/// Full argument list for a cracking run, binary first.
pub fn build_command(base: &BaseArgs, attack: &AttackConfig) -> Vec<OsString> {
    let mut args = base.to_args();
    args.push("--outfile-autohex-disable".into());
    match attack {
        AttackConfig::Wordlist { wordlists, ruleset } => {
            args.push("-a".into());
            args.push("0".into());
            args.extend(wordlists.iter().map(|w| w.clone().into_os_string()));
            if let Some(rules) = ruleset {
                args.push("-r".into());
                args.push(rules.clone().into_os_string());
            }
        }
        AttackConfig::Mask(m) => {
            args.push("-a".into());
            args.push("3".into());
            args.push("-i".into());
            args.push(m.mask.clone().into());
            args.push("--increment-min".into());
            args.push(m.min_len.to_string().into());
            args.push("--increment-max".into());
            args.push(m.max_len.to_string().into());
        }
    }
    args
}

/// Argument list retrieving `account:password` pairs for the base hash file.
pub fn build_show_command(base: &BaseArgs) -> Vec<OsString> {
    let mut args = base.to_args();
    args.push("--show".into());
    args.push("--outfile-format".into());
    args.push("2".into());
    args
}
