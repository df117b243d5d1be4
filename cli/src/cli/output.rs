use colored::*;
use cook_core::submit::{Kind, Reporter};
use std::io::{self, Write};

/// Prints submission progress to stdout, warnings to stderr.
/// In silent mode only warnings are shown.
pub struct ConsoleReporter {
    silent: bool,
}

impl ConsoleReporter {
    pub fn new(silent: bool) -> Self {
        ConsoleReporter { silent }
    }

    pub fn is_silent(&self) -> bool {
        self.silent
    }

    /// Where input prompts go: `terminal`, or nowhere in silent mode.
    pub fn prompt_sink<'a, W: Write + 'a>(&self, terminal: W) -> Box<dyn Write + 'a> {
        if self.silent {
            Box::new(io::sink())
        } else {
            Box::new(terminal)
        }
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, kind: Kind, message: &str) {
        match kind {
            Kind::Warning => eprintln!("{} {}", "[WARN]".yellow(), message.red()),
            _ if self.silent => {}
            Kind::Info => println!("{} {}", "[INFO]".blue(), message),
            Kind::Success => println!("{} {}", "[OK]".green(), message),
            Kind::Failure => println!("{} {}", "[FAILED]".red(), message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_mode_mutes_prompts() {
        let mut terminal = Vec::new();
        {
            let mut sink = ConsoleReporter::new(true).prompt_sink(&mut terminal);
            writeln!(sink, "Enter the commands, one per line").unwrap();
        }
        assert!(terminal.is_empty());
    }

    #[test]
    fn test_prompts_reach_the_terminal() {
        let mut terminal = Vec::new();
        {
            let mut sink = ConsoleReporter::new(false).prompt_sink(&mut terminal);
            writeln!(sink, "Enter the commands, one per line").unwrap();
        }
        assert_eq!(terminal, b"Enter the commands, one per line\n");
    }
}
