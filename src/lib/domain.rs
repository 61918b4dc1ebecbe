//! Domain types, ports and the interactive mail session

pub mod communication;
pub mod console;
