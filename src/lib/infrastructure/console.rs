//! Terminal console

use std::io::{self, BufRead, Write};

use crate::domain::console::Console;

/// A [`Console`] backed by the process's stdin and stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConsole;

impl TerminalConsole {
    /// Creates a new terminal console
    pub fn new() -> Self {
        Self
    }
}

impl Console for TerminalConsole {
    #[mutants::skip]
    fn read_line(&self, prompt: &str) -> io::Result<String> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;

        read_trimmed_line(&mut io::stdin().lock())
    }

    #[mutants::skip]
    fn read_password(&self, prompt: &str) -> io::Result<String> {
        rpassword::prompt_password(prompt)
    }

    #[mutants::skip]
    fn say(&self, message: &str) {
        println!("{message}");
    }
}

fn read_trimmed_line(reader: &mut impl BufRead) -> io::Result<String> {
    let mut line = String::new();

    if reader.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "no more input",
        ));
    }

    let trimmed = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed);

    Ok(line)
}
