use anyhow::{Context, Result};
use dialoguer::{Confirm, Input};
use is_terminal::IsTerminal;
use std::io::{self, BufRead, Write};

/// Source of answers for the interactive questions asked during a deploy.
pub trait Prompt {
    /// Yes/no question; anything but an explicit yes is a no.
    fn confirm(&self, question: &str) -> Result<bool>;

    fn input(&self, question: &str) -> Result<String>;
}

/// Asks on the terminal when there is one, otherwise reads answers line by line from stdin.
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn read_line(question: &str) -> Result<Option<String>> {
        print!("{question} ");
        io::stdout().flush().context("flush stdout")?;

        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .context("read answer from stdin")?;
        println!();
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl Prompt for TerminalPrompt {
    fn confirm(&self, question: &str) -> Result<bool> {
        if io::stdin().is_terminal() {
            return Confirm::new()
                .with_prompt(question)
                .default(false)
                .interact()
                .context("read confirmation");
        }
        let answer = Self::read_line(&format!("{question} (y/n):"))?;
        Ok(matches!(answer.as_deref().map(str::to_lowercase).as_deref(), Some("y")))
    }

    fn input(&self, question: &str) -> Result<String> {
        if io::stdin().is_terminal() {
            let answer: String = Input::new()
                .with_prompt(question)
                .interact_text()
                .context("read input")?;
            return Ok(answer);
        }
        Self::read_line(&format!("{question}:"))?
            .with_context(|| format!("stdin closed before an answer to '{question}'"))
    }
}
