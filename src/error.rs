//! Error types shared by the runner, the pipeline stages and the report store.
//!
//! Crack failures and result-retrieval failures are kept as separate variants:
//! a crack run can succeed while `--show` still fails.
use std::io;
use std::path::PathBuf;

use crate::attack::HashMode;

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with non-zero return code ({})", fmt_code(.code))]
    Failed { program: String, code: Option<i32> },
    #[error("interrupted, child process terminated")]
    Interrupted,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Run(#[from] RunError),
    #[error("hashcat exited with non-zero return code ({}) while cracking mode {mode}", fmt_code(.code))]
    CrackFailed { mode: HashMode, code: Option<i32> },
    #[error("hashcat exited with non-zero return code ({}) when retrieving result for mode {mode}: {stderr}", fmt_code(.code))]
    ShowFailed {
        mode: HashMode,
        code: Option<i32>,
        stderr: String,
    },
    #[error("username wordlist: {0:#}")]
    Wordlist(anyhow::Error),
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| PipelineError::Io { path, source }
    }
}

fn fmt_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "signal".to_string(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("report store unavailable at {}: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("report store: {0}")]
    Csv(#[from] csv::Error),
    #[error("report store: {0}")]
    Io(#[from] io::Error),
}
