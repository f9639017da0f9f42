//! Log sanitization: keeps patient attributes out of log files.
//!
//! Every formatted log line passes through [`SanitizingMakeWriter`], which
//! redacts:
//! - patient attribute assignments (`age=42`, `bmi: 31.2`, `smoker="Yes"`, ...)
//! - email addresses and phone numbers
//! - UUIDs
//!
//! Input is capped at `MEDCHARGE_SANITIZE_MAX_BYTES` (16 KiB by default) per call.

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static PATTERNS: OnceLock<RedactionPatterns> = OnceLock::new();

const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

struct Redaction {
    regex: Regex,
    replacement: &'static str,
}

struct RedactionPatterns {
    set: RegexSet,
    rules: Vec<Redaction>,
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }

    let mut end = max_bytes.min(input.len());
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

fn max_sanitize_bytes() -> usize {
    std::env::var("MEDCHARGE_SANITIZE_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

fn get_patterns() -> &'static RedactionPatterns {
    PATTERNS.get_or_init(|| {
        let rules: Vec<(&'static str, &'static str)> = vec![
            // Patient attributes as key=value / key: value, including Debug output.
            (
                r#"(?i)\b(age|sex|bmi|weight(?:_kg)?|height(?:_m)?|children|smoker|region)(\s*[:=]\s*)(?:"[^"]*"|Some\([^)]*\)|[A-Za-z0-9_.+-]+)"#,
                "$1$2[REDACTED]",
            ),
            (
                r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
                "[REDACTED-UUID]",
            ),
            (
                r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
                "[REDACTED-EMAIL]",
            ),
            // International or local phone numbers, e.g. +234 803 123 4567.
            (
                r"\+?\b\d{3}[-.\s]?\d{3}[-.\s]?\d{4}\b",
                "[REDACTED-PHONE]",
            ),
        ];

        let set = RegexSet::new(rules.iter().map(|(p, _)| *p)).expect("Valid regex set");
        let rules = rules
            .into_iter()
            .map(|(pattern, replacement)| Redaction {
                regex: Regex::new(pattern).expect("Valid regex"),
                replacement,
            })
            .collect();

        RedactionPatterns { set, rules }
    })
}

/// Redact patient attributes and contact details from a string.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let patterns = get_patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    for idx in patterns.set.matches(prefix).into_iter() {
        let rule = &patterns.rules[idx];
        result = rule.regex.replace_all(&result, rule.replacement).to_string();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// A `tracing_subscriber` writer wrapper that sanitizes each formatted log
/// line before it reaches the underlying sink.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

pub struct SanitizingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W> SanitizingWriter<W>
where
    W: std::io::Write,
{
    fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }

    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let sanitized = sanitize(&String::from_utf8_lossy(bytes));
        self.inner.write_all(sanitized.as_bytes())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W> std::io::Write for SanitizingWriter<W>
where
    W: std::io::Write,
{
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A single line larger than twice the cap is written out truncated.
        let hard_cap = max_sanitize_bytes().saturating_mul(2);
        if self.buffer.len() > hard_cap {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
        }
        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter::new(self.inner.make_writer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_redacts_patient_attributes() {
        let input = "estimate requested age=42 bmi=31.2 smoker=Yes region=southeast";
        let sanitized = sanitize(input);
        assert_eq!(
            sanitized,
            "estimate requested age=[REDACTED] bmi=[REDACTED] smoker=[REDACTED] region=[REDACTED]"
        );
    }

    #[test]
    fn test_redacts_debug_formatted_profile() {
        let input = r#"PatientProfile { age: 42, sex: Female, bmi: 31.2, children: 2 }"#;
        let sanitized = sanitize(input);
        assert!(!sanitized.contains("42"));
        assert!(!sanitized.contains("31.2"));
        assert!(!sanitized.contains("Female"));
        assert!(sanitized.contains("children: [REDACTED]"));

        let measured = sanitize("Measured { weight_kg: 65.0, height_m: Some(1.75) }");
        assert!(!measured.contains("65.0"));
        assert!(!measured.contains("1.75"));
    }

    #[test]
    fn test_leaves_ordinary_text_alone() {
        let input = "Loaded model \"forest\" (trees=3, n_features=8)";
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn test_redacts_contact_details() {
        let sanitized = sanitize("contact patient@clinic.ng or 803-123-4567");
        assert!(sanitized.contains("[REDACTED-EMAIL]"));
        assert!(sanitized.contains("[REDACTED-PHONE]"));
        assert_eq!(
            sanitize("id 550e8400-e29b-41d4-a716-446655440000"),
            "id [REDACTED-UUID]"
        );
    }

    #[test]
    fn test_truncates_large_inputs() {
        let sanitized = sanitize_with_limit("prefix with a long tail of text", 6);
        assert_eq!(sanitized, "prefix [TRUNCATED]");
    }

    #[test]
    fn test_writer_sanitizes_complete_lines() {
        let mut out = Vec::new();
        {
            let mut writer = SanitizingWriter::new(&mut out);
            writer.write_all(b"bmi=").expect("write");
            writer.write_all(b"27.4 done\nnext").expect("write");
            writer.flush().expect("flush");
        }
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text, "bmi=[REDACTED] done\nnext");
    }
}
