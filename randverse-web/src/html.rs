//! HTML pages for the verse and accepted-values responses

use maud::{html, Markup, PreEscaped, DOCTYPE};
use randverse_core::{CategoryEntry, Messages, VerseLine};

const VERSE_STYLE: &str = "body { background: #fafafa; color: #333; font-family: sans-serif; padding: 1rem; line-height: 1.6; }
    .verse-num { color: #4caf50; font-weight: bold; }
    .verses p { margin: 0.5em 0; }";

const INVALID_STYLE: &str = "body { font-family: sans-serif; background: #fff8f0; color: #333; padding: 2rem; }
    h1 { color: #c0392b; }
    ul { margin-top: 1em; }
    li { margin: 0.5em 0; }
    code { background: #eee; padding: 0.2em 0.4em; }";

fn page(language: &str, title: &str, style: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(language) {
            head {
                meta charset="UTF-8";
                title { (title) }
                style { (PreEscaped(style)) }
            }
            body { (body) }
        }
    }
}

/// Builder for the verse page; lines are appended as they are read from the
/// book.
pub struct VersePage {
    language: String,
    title: String,
    verses: Vec<Markup>,
}

impl VersePage {
    pub fn new(messages: &Messages, book: &str, offset: usize, total: usize) -> Self {
        Self {
            language: messages.language.clone(),
            title: messages.verse_title(book, offset, total),
            verses: Vec::new(),
        }
    }

    /// Verse text is corpus markup and is written as-is; the token and
    /// token-less lines are escaped.
    pub fn push(&mut self, line: &VerseLine) {
        let verse = if line.token.is_empty() {
            html! { p { (line.text) } }
        } else {
            html! {
                p {
                    span.verse-num { (line.token) }
                    " "
                    (PreEscaped(&line.text))
                }
            }
        };
        self.verses.push(verse);
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    pub fn finish(self) -> String {
        let body = html! {
            h1 { (self.title) }
            div.verses {
                @for verse in &self.verses {
                    (verse)
                }
            }
        };
        page(&self.language, &self.title, VERSE_STYLE, body).into_string()
    }
}

pub fn invalid_category_page(messages: &Messages, key: &str, entries: &[CategoryEntry]) -> String {
    let body = html! {
        h1 { (messages.invalid_param(key)) }
        p { (messages.accepted_values_message) }
        ul {
            @for entry in entries {
                li { code { (entry.key) } " — " (entry.label) }
            }
        }
    };
    page(
        &messages.language,
        &messages.invalid_param_title,
        INVALID_STYLE,
        body,
    )
    .into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verse_page_marks_tokens() {
        let mut page = VersePage::new(&Messages::default(), "Genesis", 2, 3);
        page.push(&VerseLine::parse("1:2 And the <i>earth</i>"));
        page.push(&VerseLine::parse("<Selah>"));
        assert_eq!(page.len(), 2);
        let html = page.finish();
        assert!(html.starts_with("<!DOCTYPE html><html lang=\"en\">"));
        assert!(html.contains("<title>Genesis (line 2/3)</title>"));
        assert!(html.contains("<p><span class=\"verse-num\">1:2</span> And the <i>earth</i></p>"));
        assert!(html.contains("<p>&lt;Selah&gt;</p>"));
        assert!(html.ends_with("</div></body></html>"));
    }

    #[test]
    fn verse_page_escapes_token_and_title() {
        let mut page = VersePage::new(&Messages::default(), "<b>Ruth</b>", 1, 1);
        page.push(&VerseLine::parse("<1:1> Whither thou goest"));
        let html = page.finish();
        assert!(html.contains("<h1>&lt;b&gt;Ruth&lt;/b&gt; (line 1/1)</h1>"));
        assert!(html.contains("<span class=\"verse-num\">&lt;1:1&gt;</span> Whither thou goest"));
        assert!(!html.contains("<b>Ruth"));
    }

    #[test]
    fn invalid_page_escapes_rejected_key() {
        let entries = vec![
            CategoryEntry {
                key: "nt".into(),
                label: "Matthew — Revelation".into(),
            },
            CategoryEntry {
                key: "<ot>".into(),
                label: "A & B".into(),
            },
        ];
        let html = invalid_category_page(&Messages::default(), "<script>", &entries);
        assert!(html.contains("<title>Invalid parameter</title>"));
        assert!(html.contains("Invalid category: &lt;script&gt;"));
        assert!(html.contains("<li><code>nt</code> — Matthew — Revelation</li>"));
        assert!(html.contains("<li><code>&lt;ot&gt;</code> — A &amp; B</li>"));
        assert!(!html.contains("<script>"));
    }
}
