//! Adapters for the terminal and the SMTP relay

pub mod console;
pub mod email;
