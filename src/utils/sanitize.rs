//! Secret redaction for anything that leaves the process as text.

use std::io::{self, Write};

/// Replaces configured secret strings with fixed placeholders.
#[derive(Debug, Clone, Default)]
pub struct Sanitizer {
    replacements: Vec<(String, String)>,
}

impl Sanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a secret. Empty secrets are ignored, since replacing the
    /// empty string would splice the placeholder between every character.
    pub fn with_secret(mut self, secret: impl Into<String>, placeholder: impl Into<String>) -> Self {
        let secret = secret.into();
        if !secret.is_empty() {
            self.replacements.push((secret, placeholder.into()));
            // Longest first so a secret containing another is replaced whole.
            self.replacements.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        }
        self
    }

    pub fn sanitize(&self, input: &str) -> String {
        self.replacements
            .iter()
            .fold(input.to_string(), |acc, (secret, placeholder)| {
                acc.replace(secret.as_str(), placeholder)
            })
    }

    pub fn writer<W: Write>(&self, inner: W) -> SanitizedWriter<W> {
        SanitizedWriter {
            inner,
            sanitizer: self.clone(),
        }
    }
}

/// Writer that redacts secrets before forwarding.
///
/// Each `write` call is sanitized on its own; a secret split across two
/// calls is not caught. `writeln!`/`write!` with a single format string
/// produce whole lines in practice.
pub struct SanitizedWriter<W: Write> {
    inner: W,
    sanitizer: Sanitizer,
}

impl<W: Write> Write for SanitizedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        self.inner
            .write_all(self.sanitizer.sanitize(&text).as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
