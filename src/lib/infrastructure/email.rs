//! Email delivery over SMTP

pub mod mime;
pub mod smtp;
