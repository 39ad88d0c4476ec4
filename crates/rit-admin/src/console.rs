use colored::Colorize;
#[cfg(test)]
use std::cell::RefCell;

/// Status-line printer. Every user-facing message of an action goes through here.
pub struct Console {
    sink: Sink,
}

enum Sink {
    Stdout,
    #[cfg(test)]
    Capture(RefCell<String>),
}

impl Console {
    pub fn stdout() -> Self {
        Self { sink: Sink::Stdout }
    }

    #[cfg(test)]
    pub fn capture() -> Self {
        Self {
            sink: Sink::Capture(RefCell::new(String::new())),
        }
    }

    #[cfg(test)]
    pub fn captured(&self) -> String {
        match &self.sink {
            Sink::Capture(buf) => buf.borrow().clone(),
            Sink::Stdout => String::new(),
        }
    }

    pub fn header(&self, text: &str) {
        let line = format!("=== {text} ===").bright_magenta().bold();
        self.line(&format!("\n{line}\n"));
    }

    pub fn success(&self, text: &str) {
        self.line(&format!("✓ {text}").bright_green().to_string());
    }

    pub fn error(&self, text: &str) {
        self.line(&format!("✗ {text}").bright_red().to_string());
    }

    pub fn info(&self, text: &str) {
        self.line(&format!("ℹ {text}").bright_blue().to_string());
    }

    pub fn warning(&self, text: &str) {
        self.line(&format!("⚠ {text}").bright_yellow().to_string());
    }

    /// Uncoloured text, e.g. captured stderr of a failed command.
    pub fn plain(&self, text: &str) {
        self.line(text);
    }

    fn line(&self, text: &str) {
        match &self.sink {
            Sink::Stdout => println!("{text}"),
            #[cfg(test)]
            Sink::Capture(buf) => {
                let mut buf = buf.borrow_mut();
                buf.push_str(text);
                buf.push('\n');
            }
        }
    }
}
