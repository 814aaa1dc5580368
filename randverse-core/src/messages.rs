use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// User-facing strings shipped in the index frontmatter.
///
/// Templates use printf-style placeholders (`%s`, `%d`), filled in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Messages {
    pub language: String,
    pub invalid_param_title: String,
    pub invalid_param_message: String,
    pub accepted_values_message: String,
    pub no_verses_error: String,
    pub book_not_found_error: String,
    pub decompression_error: String,
    pub verse_page_title_format: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            invalid_param_title: "Invalid parameter".to_string(),
            invalid_param_message: "Invalid category: %s".to_string(),
            accepted_values_message: "Accepted values:".to_string(),
            no_verses_error: "No verses available for this selection.".to_string(),
            book_not_found_error: "Book content not found.".to_string(),
            decompression_error: "Could not read book content.".to_string(),
            verse_page_title_format: "%s (line %d/%d)".to_string(),
        }
    }
}

impl Messages {
    pub fn invalid_param(&self, key: &str) -> String {
        fill_placeholders(&self.invalid_param_message, &[&key])
    }

    pub fn verse_title(&self, book: &str, line: usize, total: usize) -> String {
        fill_placeholders(&self.verse_page_title_format, &[&book, &line, &total])
    }

    /// Message for a per-request failure. Startup-only kinds fall back to the
    /// generic extraction message.
    pub fn for_kind(&self, kind: ErrorKind) -> &str {
        match kind {
            ErrorKind::InvalidCategory => &self.invalid_param_title,
            ErrorKind::EmptyPool => &self.no_verses_error,
            ErrorKind::ContentOpen => &self.book_not_found_error,
            ErrorKind::Decompression
            | ErrorKind::MissingIndex
            | ErrorKind::InvalidFrontmatter
            | ErrorKind::MalformedRecord => &self.decompression_error,
        }
    }
}

/// Replaces `%s`, `%d` and `%v` in order with `args`; `%%` emits a literal
/// percent sign. Placeholders without a matching argument are left as-is.
pub fn fill_placeholders(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut args = args.iter();
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(verb @ ('s' | 'd' | 'v')) => {
                chars.next();
                match args.next() {
                    Some(arg) => out.push_str(&arg.to_string()),
                    None => {
                        out.push('%');
                        out.push(verb);
                    }
                }
            }
            _ => out.push('%'),
        }
    }
    out
}
