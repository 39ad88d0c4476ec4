use anyhow::Result;

use crate::config::AdminConfig;
use crate::console::Console;
use crate::process::{self, CommandFailed, Invocation, ProcessOutput, ProcessRunner, Strictness};
use crate::project::ProjectLayout;
use crate::prompt::Prompt;

/// Collaborators shared by every action for the length of one run.
pub struct Session<'a> {
    pub config: &'a AdminConfig,
    pub layout: &'a ProjectLayout,
    pub runner: &'a dyn ProcessRunner,
    pub prompt: &'a dyn Prompt,
    pub console: &'a Console,
}

impl Session<'_> {
    /// Runs `invocation` in the project root unless it names its own directory.
    ///
    /// A strict failure is reported on the console and returned as [`CommandFailed`],
    /// which ends the program. A lenient failure is returned as a normal output.
    pub fn run(&self, invocation: &Invocation, strictness: Strictness) -> Result<ProcessOutput> {
        let invocation = process::rooted(invocation, &self.layout.root);
        let output = self.runner.execute(&invocation);
        self.check(invocation.to_string(), output, strictness)
    }

    pub fn run_pipeline(
        &self,
        producer: &Invocation,
        consumer: &Invocation,
        strictness: Strictness,
    ) -> Result<ProcessOutput> {
        let producer = process::rooted(producer, &self.layout.root);
        let consumer = process::rooted(consumer, &self.layout.root);
        let output = self.runner.execute_pipeline(&producer, &consumer);
        self.check(format!("{producer} | {consumer}"), output, strictness)
    }

    fn check(
        &self,
        command: String,
        output: ProcessOutput,
        strictness: Strictness,
    ) -> Result<ProcessOutput> {
        if output.success() || strictness == Strictness::Lenient {
            return Ok(output);
        }
        self.console.error(&format!("Command failed: {command}"));
        self.console.plain(&output.stderr);
        Err(CommandFailed {
            command,
            code: output.code,
        }
        .into())
    }
}
