//! Email bodies

mod greeting;

pub use greeting::GreetingTemplate;
