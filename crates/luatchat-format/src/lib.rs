//! Content formatter for assistant-authored text.
//!
//! Converts raw model output into safe markup: HTML escaping first, then a
//! fixed, ordered list of rewrite stages (bold, italic, line breaks, fenced
//! code, inline code, legal-article highlighting). The pipeline is pure and
//! deterministic; malformed markers degrade to literal text instead of
//! failing.
//!
//! Only assistant content goes through [`Formatter::format`]. User-authored
//! text is rendered as plain escaped text via [`escape_html`], and
//! error-role content is pre-escaped markup built by the controller.

use regex::{Captures, Regex};

const ENTITIES: [&str; 5] = ["&amp;", "&lt;", "&gt;", "&quot;", "&#039;"];

/// Escape the five HTML-significant characters to their entity forms.
///
/// Idempotent: an `&` that already begins one of the produced entities is
/// left alone, so escaping already-escaped text changes nothing.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, ch) in text.char_indices() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            '&' => {
                let rest = &text[i..];
                if ENTITIES.iter().any(|e| rest.starts_with(e)) {
                    out.push('&');
                } else {
                    out.push_str("&amp;");
                }
            }
            c => out.push(c),
        }
    }
    out
}

/// Markdown-to-markup rewrite pipeline with pre-compiled patterns.
pub struct Formatter {
    bold_star: Regex,
    bold_under: Regex,
    italic_star: Regex,
    italic_under: Regex,
    code_block: Regex,
    inline_code: Regex,
    article: Regex,
}

impl Formatter {
    pub fn new() -> Self {
        Self {
            bold_star: Regex::new(r"\*\*(.*?)\*\*").unwrap(),
            bold_under: Regex::new(r"__(.*?)__").unwrap(),
            italic_star: Regex::new(r"\*(.*?)\*").unwrap(),
            italic_under: Regex::new(r"_(.*?)_").unwrap(),
            code_block: Regex::new(r"(?s)```(.*?)```").unwrap(),
            inline_code: Regex::new(r"`(.*?)`").unwrap(),
            article: Regex::new(r"Điều\s+(\d+)").unwrap(),
        }
    }

    /// Convert raw assistant text into safe, styled markup.
    ///
    /// Stage order matters: escaping runs first so no later rewrite can be
    /// defeated by injected markup, and bold runs before italic so `**`
    /// pairs are not consumed as two italic markers.
    pub fn format(&self, raw: &str) -> String {
        let mut out = escape_html(raw);
        out = self
            .bold_star
            .replace_all(&out, "<strong>$1</strong>")
            .into_owned();
        out = self
            .bold_under
            .replace_all(&out, "<strong>$1</strong>")
            .into_owned();
        out = self.italic_star.replace_all(&out, "<em>$1</em>").into_owned();
        out = self
            .italic_under
            .replace_all(&out, "<em>$1</em>")
            .into_owned();
        out = out.replace('\n', "<br>");
        out = self
            .code_block
            .replace_all(&out, |caps: &Captures| {
                format!("<pre><code>{}</code></pre>", caps[1].trim())
            })
            .into_owned();
        out = self
            .inline_code
            .replace_all(&out, "<code>$1</code>")
            .into_owned();
        out = self
            .article
            .replace_all(
                &out,
                "<strong style=\"color: var(--primary-color)\">Điều $1</strong>",
            )
            .into_owned();
        out
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}
