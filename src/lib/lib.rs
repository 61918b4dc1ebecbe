#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Compose a MIME email and deliver it over SMTP

pub mod domain;
pub mod infrastructure;
