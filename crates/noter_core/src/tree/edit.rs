//! Rendering of text inserted into note documents.

use super::parse::is_drawer_delimiter;

/// Heading to insert into a note document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewEntry {
    pub title: String,
    /// `(key, canonical value)` pairs written into a property drawer.
    pub properties: Vec<(String, String)>,
    pub body: Option<String>,
}

impl NewEntry {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub(crate) fn render(&self, level: usize) -> String {
        let mut out = "*".repeat(level.max(1));
        out.push(' ');
        out.push_str(&single_line(&self.title));
        out.push('\n');
        if !self.properties.is_empty() {
            out.push_str(":PROPERTIES:\n");
            for (key, value) in &self.properties {
                out.push(':');
                out.push_str(key);
                out.push_str(": ");
                out.push_str(&single_line(value));
                out.push('\n');
            }
            out.push_str(":END:\n");
        }
        if let Some(body) = self.body.as_deref().filter(|body| !body.is_empty()) {
            out.push_str(&escape_body(body));
        }
        out
    }
}

/// Escapes lines that would read as headings or drawer delimiters and
/// terminates the text with a newline.
pub(crate) fn escape_body(body: &str) -> String {
    let mut out = String::with_capacity(body.len() + 1);
    for line in body.split_inclusive('\n') {
        if line.starts_with('*') || is_drawer_delimiter(line) {
            out.push(',');
        }
        out.push_str(line);
    }
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn single_line(value: &str) -> String {
    value.replace(['\n', '\r'], " ").trim().to_string()
}
