//! Terminal rendering of formatted messages.
//!
//! The formatter produces markup; this view translates it to ANSI styling
//! for the terminal. The translation is display-only and never feeds back
//! into stored content.

use colored::Colorize;
use std::sync::atomic::{AtomicBool, Ordering};

use luatchat_store::HistoryEntry;
use luatchat_types::Role;

use crate::controller::ChatView;

const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_ITALIC: &str = "\x1b[3m";
const ANSI_ITALIC_OFF: &str = "\x1b[23m";
const ANSI_CYAN: &str = "\x1b[36m";
const ANSI_YELLOW_BOLD: &str = "\x1b[1;33m";
const ANSI_RESET: &str = "\x1b[0m";

/// Translate formatter markup into terminal text with ANSI styling.
pub fn markup_to_terminal(markup: &str) -> String {
    let text = markup
        .replace("<br>", "\n")
        .replace("<pre><code>", "\n")
        .replace("</code></pre>", "\n")
        .replace("<code>", ANSI_CYAN)
        .replace("</code>", ANSI_RESET)
        .replace(
            "<strong style=\"color: var(--primary-color)\">",
            ANSI_YELLOW_BOLD,
        )
        .replace("<strong>", ANSI_BOLD)
        .replace("</strong>", ANSI_RESET)
        .replace("<em>", ANSI_ITALIC)
        .replace("</em>", ANSI_ITALIC_OFF);
    unescape_entities(&text)
}

/// Entities were produced for an HTML sink; the terminal wants the literal
/// characters back. `&amp;` goes last so freshly produced `&` cannot be
/// re-interpreted.
fn unescape_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
}

/// Console chat surface.
pub struct TerminalView {
    dark_mode: AtomicBool,
}

impl TerminalView {
    pub fn new(dark_mode: bool) -> Self {
        Self {
            dark_mode: AtomicBool::new(dark_mode),
        }
    }

    pub fn set_dark_mode(&self, on: bool) {
        self.dark_mode.store(on, Ordering::Relaxed);
    }
}

impl ChatView for TerminalView {
    fn take_input(&self) -> String {
        // The REPL passes the question explicitly; there is no ambient
        // input buffer to drain.
        String::new()
    }

    fn clear_input(&self) {}

    fn render_message(&self, role: Role, markup: &str) {
        let text = markup_to_terminal(markup);
        match role {
            Role::User => println!("\n{} {}", "Bạn:".blue().bold(), text),
            Role::Assistant => {
                let body = if self.dark_mode.load(Ordering::Relaxed) {
                    text.bright_white()
                } else {
                    text.normal()
                };
                println!("\n{} {}", "Trợ lý:".green().bold(), body);
            }
            Role::Error => println!("\n{}", text.red()),
            Role::System => println!("{}", text.bright_black()),
        }
    }

    fn show_pending(&self) {
        println!("{}", "● ● ●".bright_black());
    }

    fn hide_pending(&self) {}

    fn refresh_history(&self, _entries: &[HistoryEntry]) {
        // The terminal has no persistent side panel; /history redraws on
        // demand.
    }

    fn focus_input(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_markup_becomes_ansi_bold() {
        assert_eq!(
            markup_to_terminal("<strong>đậm</strong>"),
            format!("{}đậm{}", ANSI_BOLD, ANSI_RESET)
        );
    }

    #[test]
    fn test_line_breaks_and_entities_round_trip() {
        assert_eq!(markup_to_terminal("a<br>b &amp; c &lt;d&gt;"), "a\nb & c <d>");
    }

    #[test]
    fn test_article_highlight_gets_accent_style() {
        let markup = "<strong style=\"color: var(--primary-color)\">Điều 12</strong>";
        assert_eq!(
            markup_to_terminal(markup),
            format!("{}Điều 12{}", ANSI_YELLOW_BOLD, ANSI_RESET)
        );
    }

    #[test]
    fn test_double_escaped_ampersand_unescapes_once() {
        assert_eq!(markup_to_terminal("&amp;lt;"), "&lt;");
    }
}
