//! tmux process orchestration.
//!
//! Every call goes through a [`CommandExecutor`] handed to [`Tmux::new`], so tests can swap
//! the real process runner for a recording fake.

use std::env;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::domain::model::Candidate;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Failure of an external command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("`{program}` exited with {}{}", exit_label(.code), stderr_suffix(.stderr))]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("`{program}` did not finish within {timeout:?}")]
    TimedOut { program: String, timeout: Duration },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_owned(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Narrow command surface used to talk to tmux.
pub trait CommandExecutor {
    /// Run a command attached to the controlling terminal.
    fn run(&self, program: &str, args: &[&str]) -> Result<(), CommandError>;

    /// Run a command detached from the terminal and return its stdout on success.
    fn capture(&self, program: &str, args: &[&str]) -> Result<Vec<u8>, CommandError>;
}

impl<E: CommandExecutor + ?Sized> CommandExecutor for &E {
    fn run(&self, program: &str, args: &[&str]) -> Result<(), CommandError> {
        (**self).run(program, args)
    }

    fn capture(&self, program: &str, args: &[&str]) -> Result<Vec<u8>, CommandError> {
        (**self).capture(program, args)
    }
}

/// Executor spawning real processes.
#[derive(Debug, Clone, Default)]
pub struct SystemExecutor {
    timeout: Option<Duration>,
}

impl SystemExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound every captured command by `timeout`; interactive runs are never bounded.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl CommandExecutor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<(), CommandError> {
        tracing::debug!(program, ?args, "run");
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| spawn_error(program, source))?;
        if status.success() {
            Ok(())
        } else {
            Err(CommandError::Failed {
                program: program.to_owned(),
                code: status.code(),
                stderr: String::new(),
            })
        }
    }

    fn capture(&self, program: &str, args: &[&str]) -> Result<Vec<u8>, CommandError> {
        tracing::debug!(program, ?args, "capture");
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| spawn_error(program, source))?;

        let output = match self.timeout {
            Some(timeout) => wait_with_timeout(child, program, timeout)?,
            None => child
                .wait_with_output()
                .map_err(|source| spawn_error(program, source))?,
        };

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(CommandError::Failed {
                program: program.to_owned(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }
}

fn spawn_error(program: &str, source: io::Error) -> CommandError {
    CommandError::Spawn {
        program: program.to_owned(),
        source,
    }
}

fn wait_with_timeout(
    mut child: Child,
    program: &str,
    timeout: Duration,
) -> Result<Output, CommandError> {
    // Pipes are drained on their own threads so a chatty child cannot block on a full buffer.
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let deadline = Instant::now() + timeout;

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CommandError::TimedOut {
                    program: program.to_owned(),
                    timeout,
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(source) => return Err(spawn_error(program, source)),
        }
    };

    Ok(Output {
        status,
        stdout: stdout.join().unwrap_or_default(),
        stderr: stderr.join().unwrap_or_default(),
    })
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

/// Whether this process runs inside a tmux client.
pub fn inside_tmux() -> bool {
    env::var_os("TMUX").is_some_and(|value| !value.is_empty())
}

/// Orchestrates tmux sessions through an injected executor.
#[derive(Debug, Clone)]
pub struct Tmux<E> {
    executor: E,
    binary: String,
}

impl<E: CommandExecutor> Tmux<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            binary: "tmux".to_owned(),
        }
    }

    /// Use a different tmux binary (for example an absolute path).
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Sorted names of the running sessions. Failures yield an empty list.
    pub fn list_sessions(&self) -> Vec<String> {
        let output = match self
            .executor
            .capture(&self.binary, &["list-sessions", "-F", "#S"])
        {
            Ok(output) => output,
            Err(err) => {
                tracing::debug!(error = %err, "no tmux sessions available");
                return Vec::new();
            }
        };

        let mut sessions: Vec<String> = String::from_utf8_lossy(&output)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect();
        sessions.sort();
        sessions.dedup();
        sessions
    }

    pub fn has_session(&self, name: &str) -> bool {
        self.executor
            .capture(&self.binary, &["has-session", "-t", name])
            .is_ok()
    }

    /// Switch the current client when inside tmux, otherwise attach from outside.
    pub fn activate(&self, name: &str, attached: bool) -> Result<(), CommandError> {
        tracing::info!(session = name, attached, "activating session");
        if attached {
            self.executor
                .run(&self.binary, &["switch-client", "-t", name])
        } else {
            self.executor.run(&self.binary, &["attach", "-t", name])
        }
    }

    /// Activate `name`, creating it as a detached session rooted at `dir` first if needed.
    pub fn create_or_activate(
        &self,
        name: &str,
        dir: &Path,
        attached: bool,
    ) -> Result<(), CommandError> {
        if !self.has_session(name) {
            let dir = dir.to_string_lossy();
            tracing::info!(session = name, dir = %dir, "creating session");
            self.executor
                .capture(&self.binary, &["new-session", "-ds", name, "-c", &dir])?;
        }
        self.activate(name, attached)
    }

    /// Open the session behind a confirmed candidate.
    pub fn open(&self, candidate: &Candidate, attached: bool) -> Result<(), CommandError> {
        match candidate.path() {
            None => self.activate(candidate.name(), attached),
            Some(dir) => self.create_or_activate(candidate.name(), dir, attached),
        }
    }
}
