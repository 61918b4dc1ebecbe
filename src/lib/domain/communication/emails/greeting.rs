//! Greeting template

use anyhow::Result;
use askama::Template;

/// Default link shown in the HTML body
pub const DEFAULT_LINK: &str = "https://www.google.com";

/// The greeting sent when no other body is configured
#[derive(Debug, Template)]
#[template(path = "emails/greeting.html")]
pub struct GreetingTemplate {
    /// Link to an interesting site
    pub link: String,

    /// Text of the link
    pub link_text: String,
}

impl Default for GreetingTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_LINK, "Google")
    }
}

impl GreetingTemplate {
    /// Creates a new `GreetingTemplate`
    pub fn new(link: &str, link_text: &str) -> Self {
        Self {
            link: link.to_string(),
            link_text: link_text.to_string(),
        }
    }

    /// Renders the HTML version of the email
    pub fn render_html(&self) -> Result<String> {
        Ok(self.render()?)
    }

    /// Renders the plain text version of the email
    pub fn render_plain(&self) -> Result<String> {
        Ok(format!(
            "Hi,\nHow are you?\nThis is the plain text version of the mail.\n\
             At {link} you can find many interesting links!\n",
            link = self.link
        ))
    }
}
