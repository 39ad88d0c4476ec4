use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use thiserror::Error;
use tracing::debug;

/// Exit code reported when a program cannot be started at all, as a shell would.
const SPAWN_FAILED_CODE: i32 = 127;

/// A program plus its arguments. Never goes through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Builds an invocation from a configured command line such as `["npm", "run", "build"]`.
    pub fn from_argv(argv: &[String]) -> Result<Self> {
        let (program, args) = argv.split_first().context("command line is empty")?;
        Ok(Self::new(program.clone()).args(args))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.chars().any(char::is_whitespace) {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// What the caller does with a non-zero exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    /// Abort the whole program.
    Strict,
    /// Hand the failure back to the caller.
    Lenient,
}

/// Captured result of one invocation. Both streams are trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub code: i32,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    fn from_output(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            code: output.status.code().unwrap_or(-1),
        }
    }

    fn spawn_failed(invocation: &Invocation, err: std::io::Error) -> Self {
        Self {
            stdout: String::new(),
            stderr: format!("failed to run `{}`: {err}", invocation.program),
            code: SPAWN_FAILED_CODE,
        }
    }
}

/// A strict invocation exited non-zero. The message has already been shown to the user.
#[derive(Debug, Error)]
#[error("command failed: {command} (exit code {code})")]
pub struct CommandFailed {
    pub command: String,
    pub code: i32,
}

pub trait ProcessRunner {
    fn execute(&self, invocation: &Invocation) -> ProcessOutput;

    /// Runs `producer | consumer`. The exit code is the first non-zero of the two.
    fn execute_pipeline(&self, producer: &Invocation, consumer: &Invocation) -> ProcessOutput;
}

/// Spawns real processes and blocks until they finish.
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn execute(&self, invocation: &Invocation) -> ProcessOutput {
        debug!(command = %invocation, cwd = ?invocation.cwd, "run");
        match invocation.command().stdin(Stdio::null()).output() {
            Ok(output) => ProcessOutput::from_output(output),
            Err(err) => ProcessOutput::spawn_failed(invocation, err),
        }
    }

    fn execute_pipeline(&self, producer: &Invocation, consumer: &Invocation) -> ProcessOutput {
        debug!(producer = %producer, consumer = %consumer, "run pipeline");
        let mut upstream = match producer
            .command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(err) => return ProcessOutput::spawn_failed(producer, err),
        };

        let downstream = match upstream.stdout.take() {
            Some(pipe) => match consumer.command().stdin(Stdio::from(pipe)).output() {
                Ok(output) => ProcessOutput::from_output(output),
                Err(err) => ProcessOutput::spawn_failed(consumer, err),
            },
            None => ProcessOutput::spawn_failed(
                producer,
                std::io::Error::other("stdout was not captured"),
            ),
        };

        let upstream = match upstream.wait_with_output() {
            Ok(output) => ProcessOutput::from_output(output),
            Err(err) => ProcessOutput::spawn_failed(producer, err),
        };

        let code = if upstream.success() {
            downstream.code
        } else {
            upstream.code
        };
        let stderr = [upstream.stderr.as_str(), downstream.stderr.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n");

        ProcessOutput {
            stdout: downstream.stdout,
            stderr,
            code,
        }
    }
}

/// Fills in `root` as working directory when the invocation has none.
pub fn rooted(invocation: &Invocation, root: &Path) -> Invocation {
    let mut invocation = invocation.clone();
    if invocation.cwd.is_none() {
        invocation.cwd = Some(root.to_path_buf());
    }
    invocation
}

#[cfg(test)]
pub mod fake {
    use super::*;
    use std::cell::RefCell;

    /// Records every invocation and answers from a script keyed by argv prefix.
    /// Anything unscripted succeeds with empty output.
    #[derive(Default)]
    pub struct FakeRunner {
        script: Vec<(Vec<String>, ProcessOutput)>,
        calls: RefCell<Vec<Invocation>>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(mut self, argv: &[&str], output: ProcessOutput) -> Self {
            self.script
                .push((argv.iter().map(|s| s.to_string()).collect(), output));
            self
        }

        pub fn calls(&self) -> Vec<Invocation> {
            self.calls.borrow().clone()
        }

        pub fn command_lines(&self) -> Vec<String> {
            self.calls().iter().map(ToString::to_string).collect()
        }

        fn answer(&self, invocation: &Invocation) -> ProcessOutput {
            self.calls.borrow_mut().push(invocation.clone());
            let argv: Vec<&str> = std::iter::once(invocation.program.as_str())
                .chain(invocation.args.iter().map(String::as_str))
                .collect();
            self.script
                .iter()
                .find(|(prefix, _)| {
                    prefix.len() <= argv.len() && prefix.iter().zip(&argv).all(|(a, b)| a == b)
                })
                .map(|(_, output)| output.clone())
                .unwrap_or_default()
        }
    }

    impl ProcessRunner for FakeRunner {
        fn execute(&self, invocation: &Invocation) -> ProcessOutput {
            self.answer(invocation)
        }

        fn execute_pipeline(&self, producer: &Invocation, consumer: &Invocation) -> ProcessOutput {
            let upstream = self.answer(producer);
            if !upstream.success() {
                return upstream;
            }
            self.answer(consumer)
        }
    }

    pub fn ok(stdout: &str) -> ProcessOutput {
        ProcessOutput {
            stdout: stdout.to_string(),
            ..Default::default()
        }
    }

    pub fn failed(code: i32, stderr: &str) -> ProcessOutput {
        ProcessOutput {
            stdout: String::new(),
            stderr: stderr.to_string(),
            code,
        }
    }
}
