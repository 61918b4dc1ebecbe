//! Console port

use std::io;

#[cfg(test)]
use mockall::mock;

/// Interactive console used to talk to the person sending the email
pub trait Console {
    /// Prints `prompt` and reads one line of input.
    ///
    /// The returned string has its trailing line break removed. Reaching the end of the
    /// input returns an [`io::ErrorKind::UnexpectedEof`] error.
    fn read_line(&self, prompt: &str) -> io::Result<String>;

    /// Prints `prompt` and reads a line of input without echoing it.
    fn read_password(&self, prompt: &str) -> io::Result<String>;

    /// Prints a line of output
    fn say(&self, message: &str);
}

#[cfg(test)]
mock! {
    pub Console {}

    impl Console for Console {
        fn read_line(&self, prompt: &str) -> io::Result<String>;
        fn read_password(&self, prompt: &str) -> io::Result<String>;
        fn say(&self, message: &str);
    }
}
