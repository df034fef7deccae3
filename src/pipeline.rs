//! The `crack_pwdump` pipeline.
//!
//! Three sequential stages against one pwdump file, each a crack run followed
//! by result retrieval:
//!
//! 1. LM hashes, brute force over all 7-character candidates;
//! 2. NT hashes, the LM passwords mangled by the case-toggle rules;
//! 3. NT hashes, stage 2's passwords plus the caller's wordlists and rules.
//!
//! With `skip_lm` only stage 3 runs, against the caller's wordlists alone.
//! Any failure aborts the run; artifacts already written stay in the working
//! directory and are left for the caller to clean up.
//!
//! ```no_run
//! use hashcathelper::pipeline::{CrackOptions, Pipeline};
//! use hashcathelper::runner::SystemRunner;
//! # fn main() -> Result<(), hashcathelper::error::PipelineError> {
//! let pipeline = Pipeline::new(SystemRunner::new(), "hashcat", "ntds.txt", "/tmp/work");
//! let result = pipeline.crack_pwdump(&CrackOptions::new("crackstation.txt"))?;
//! println!("{}", result.display());
//! # Ok(())
//! # }
//! ```
use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::attack::{AttackConfig, BaseArgs, HashMode, build_command};
use crate::error::PipelineError;
use crate::extract::extract;
use crate::rules::materialize_rules;
use crate::runner::Runner;
use crate::wordlist::write_username_wordlist;

/// Caller-controlled inputs of [`Pipeline::crack_pwdump`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrackOptions {
    pub wordlist: PathBuf,
    pub ruleset: Option<PathBuf>,
    /// Tried in the final stage after `wordlist`, in order.
    pub extra_words: Vec<PathBuf>,
    pub skip_lm: bool,
    /// Put a wordlist of the hash file's account names first in every
    /// dictionary stage.
    pub prepend_usernames: bool,
}

impl CrackOptions {
    pub fn new(wordlist: impl Into<PathBuf>) -> Self {
        Self {
            wordlist: wordlist.into(),
            ruleset: None,
            extra_words: Vec::new(),
            skip_lm: false,
            prepend_usernames: true,
        }
    }
}

#[derive(Debug)]
pub struct Pipeline<R: Runner> {
    runner: R,
    bin: PathBuf,
    hashfile: PathBuf,
    directory: PathBuf,
}

impl<R: Runner> Pipeline<R> {
    pub fn new(
        runner: R,
        bin: impl Into<PathBuf>,
        hashfile: impl Into<PathBuf>,
        directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            bin: bin.into(),
            hashfile: hashfile.into(),
            directory: directory.into(),
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// One crack run plus result retrieval. An empty `wordlists` selects the
    /// mask attack. Returns the stage's result file.
    pub fn stage(
        &self,
        mode: HashMode,
        mut wordlists: Vec<PathBuf>,
        ruleset: Option<PathBuf>,
        pw_only: bool,
        prepend_usernames: bool,
    ) -> Result<PathBuf, PipelineError> {
        let base = BaseArgs::new(&self.bin, &self.hashfile, mode);
        if prepend_usernames && !wordlists.is_empty() {
            let users = write_username_wordlist(&self.hashfile, &self.directory)
                .map_err(PipelineError::Wordlist)?;
            wordlists.insert(0, users);
        }
        let attack = AttackConfig::from_wordlists(wordlists, ruleset);
        let status = self.runner.run(&build_command(&base, &attack))?;
        if !status.success() {
            return Err(PipelineError::CrackFailed {
                mode,
                code: status.code,
            });
        }
        extract(&self.runner, &base, pw_only, &self.directory)
    }

    pub fn crack_pwdump(&self, opts: &CrackOptions) -> Result<PathBuf, PipelineError> {
        fs::create_dir_all(&self.directory).map_err(PipelineError::io(&self.directory))?;

        let mut wordlists = Vec::new();
        if opts.skip_lm {
            info!("Skipping LM hashes");
        } else {
            info!("Stage 1/3: cracking LM hashes");
            let lm_result = self.stage(HashMode::LM, vec![], None, true, opts.prepend_usernames)?;

            info!("Stage 2/3: upgrading LM passwords to NT");
            let nt_rules =
                materialize_rules(&self.directory).map_err(PipelineError::io(&self.directory))?;
            let nt_result = self.stage(
                HashMode::NT,
                vec![lm_result],
                Some(nt_rules),
                true,
                opts.prepend_usernames,
            )?;
            wordlists.push(nt_result);
        }

        info!("Stage 3/3: cracking NT hashes");
        wordlists.push(opts.wordlist.clone());
        wordlists.extend(opts.extra_words.iter().cloned());
        let final_result = self.stage(
            HashMode::NT,
            wordlists,
            opts.ruleset.clone(),
            false,
            opts.prepend_usernames,
        )?;
        info!("Result: {}", final_result.display());
        Ok(final_result)
    }
}
