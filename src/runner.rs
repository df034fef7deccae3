//! Child-process execution for hashcat.
//!
//! [`Runner`] is the seam between the pipeline and the operating system: the
//! pipeline only ever asks for a streamed run (cracking) or a captured run
//! (result retrieval). [`SystemRunner`] is the real implementation; tests
//! substitute a scripted one.
use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::{debug, warn};

use crate::error::RunError;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Exit status of a child process. `code` is `None` when the child was
/// terminated by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub code: Option<i32>,
}

impl Status {
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for Status {
    fn from(s: ExitStatus) -> Self {
        Self { code: s.code() }
    }
}

/// Output of a captured run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub status: Status,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

pub trait Runner {
    /// Run `args[0]` with the remaining arguments, child stdout and stderr
    /// both going to our stdout. Blocks until the child exits.
    fn run(&self, args: &[OsString]) -> Result<Status, RunError>;

    /// Run and collect stdout/stderr instead of displaying them.
    fn capture(&self, args: &[OsString]) -> Result<Captured, RunError>;
}

fn program_name(args: &[OsString]) -> String {
    args.first()
        .map(|a| a.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn command_for(args: &[OsString]) -> Result<Command, RunError> {
    let (program, rest) = args.split_first().ok_or_else(|| RunError::Spawn {
        program: String::new(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "empty command"),
    })?;
    let mut cmd = Command::new(program);
    cmd.args(rest);
    Ok(cmd)
}

/// Runs commands as real child processes.
///
/// Holds an interrupt flag; once it is set (see [`install_interrupt_handler`])
/// a running child is killed and [`RunError::Interrupted`] is returned, so no
/// hashcat process survives our own termination.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    interrupted: Arc<AtomicBool>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share the interrupt flag, e.g. with a signal handler.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupted)
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    fn wait(&self, mut child: Child, program: &str) -> Result<Status, RunError> {
        let wait_err = |source| RunError::Wait {
            program: program.to_string(),
            source,
        };
        loop {
            if let Some(status) = child.try_wait().map_err(wait_err)? {
                // hashcat shares our process group and exits on the same SIGINT
                if self.is_interrupted() {
                    return Err(RunError::Interrupted);
                }
                return Ok(status.into());
            }
            if self.is_interrupted() {
                warn!("terminating {} (pid {})", program, child.id());
                // The child may have exited between try_wait and kill.
                let _ = child.kill();
                let _ = child.wait();
                return Err(RunError::Interrupted);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Runner for SystemRunner {
    fn run(&self, args: &[OsString]) -> Result<Status, RunError> {
        if self.is_interrupted() {
            return Err(RunError::Interrupted);
        }
        let program = program_name(args);
        debug!("Running this command: {:?}", args);
        let child = command_for(args)?
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::from(io::stdout()))
            .spawn()
            .map_err(|source| RunError::Spawn {
                program: program.clone(),
                source,
            })?;
        self.wait(child, &program)
    }

    fn capture(&self, args: &[OsString]) -> Result<Captured, RunError> {
        if self.is_interrupted() {
            return Err(RunError::Interrupted);
        }
        let program = program_name(args);
        debug!("Running this command: {:?}", args);
        let out = command_for(args)?
            .stdin(Stdio::null())
            .output()
            .map_err(|source| RunError::Spawn {
                program: program.clone(),
                source,
            })?;
        if self.is_interrupted() {
            return Err(RunError::Interrupted);
        }
        Ok(Captured {
            status: out.status.into(),
            stdout: out.stdout,
            stderr: out.stderr,
        })
    }
}

/// Install a SIGINT/SIGTERM handler that flags `runner` as interrupted.
pub fn install_interrupt_handler(runner: &SystemRunner) -> Result<(), ctrlc::Error> {
    let flag = runner.interrupt_flag();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
}

/// First line of `hashcat --version`, e.g. `v6.2.6`.
pub fn engine_version<R: Runner>(runner: &R, bin: &Path) -> Result<String, RunError> {
    let out = runner.capture(&[bin.as_os_str().to_owned(), "--version".into()])?;
    if !out.status.success() {
        return Err(RunError::Failed {
            program: bin.display().to_string(),
            code: out.status.code,
        });
    }
    let text = String::from_utf8_lossy(&out.stdout);
    Ok(text.lines().next().unwrap_or("").trim().to_string())
}
