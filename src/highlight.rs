//! Syntax highlighting for code blocks.
//!
//! Wraps syntect with a fixed theme. Languages are looked up by token
//! (`rust`, `rs`, `py`, …); anything unknown falls back to plain text, so a
//! typo in a fence never fails a page.
//!
//! Block output:
//!
//! ```text
//! <div class="highlight"><pre style="background-color:#2b303b;"><code>
//!   <span class="line">…</span>
//!   <span class="line hl" style="background-color:#65737e;">…</span>
//! </code></pre></div>
//! ```
//!
//! Inline code uses `<span class="highlight-inline">` so stylesheets can lay
//! it out inside running text.

use maud::{Markup, PreEscaped, html};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, Theme, ThemeSet};
use syntect::html::{IncludeBackground, styled_line_to_highlighted_html};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("unknown highlight theme: {0}")]
    UnknownTheme(String),
    #[error("highlighting failed: {0}")]
    Syntect(#[from] syntect::Error),
}

/// Inclusive 1-based line ranges.
pub type LineRanges = Vec<(usize, usize)>;

/// Parse a highlighted-lines list like `1-3,5`.
///
/// Returns `None` for empty or malformed input; callers ignore it.
pub fn parse_ranges(text: &str) -> Option<LineRanges> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.split(',')
        .map(|part| {
            let (start, end) = match part.split_once('-') {
                Some((a, b)) => (
                    a.trim().parse::<usize>().ok()?,
                    b.trim().parse::<usize>().ok()?,
                ),
                None => {
                    let n = part.trim().parse::<usize>().ok()?;
                    (n, n)
                }
            };
            (start >= 1 && start <= end).then_some((start, end))
        })
        .collect()
}

/// Language and parameters from a fence info string.
///
/// Accepts `rust hl_lines=1-3,5` and `rust :hl_lines 1-3,5`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeParams {
    pub lang: Option<String>,
    pub hl_lines: LineRanges,
}

impl CodeParams {
    pub fn from_info(info: &str) -> Self {
        let mut params = CodeParams::default();
        let mut tokens = info.split_whitespace().peekable();

        if let Some(&first) = tokens.peek()
            && !first.starts_with(':')
            && !first.contains('=')
        {
            let lang = first.split(',').next().unwrap_or_default();
            if !lang.is_empty() {
                params.lang = Some(lang.to_string());
            }
            tokens.next();
        }

        while let Some(token) = tokens.next() {
            let value = if let Some(v) = token.strip_prefix("hl_lines=") {
                Some(v)
            } else if token == ":hl_lines" {
                tokens.next()
            } else {
                None
            };
            if let Some(ranges) = value.and_then(parse_ranges) {
                params.hl_lines = ranges;
            }
        }
        params
    }

    fn is_highlighted(&self, line: usize) -> bool {
        self.hl_lines
            .iter()
            .any(|&(start, end)| (start..=end).contains(&line))
    }
}

fn css_color(color: Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

pub struct Highlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    /// Load the default syntax set and the named theme.
    pub fn new(theme_name: &str) -> Result<Self, HighlightError> {
        let theme = ThemeSet::load_defaults()
            .themes
            .remove(theme_name)
            .ok_or_else(|| HighlightError::UnknownTheme(theme_name.to_string()))?;
        Ok(Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme,
        })
    }

    fn find_syntax(&self, lang: Option<&str>) -> &SyntaxReference {
        lang.and_then(|l| self.syntaxes.find_syntax_by_token(l))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text())
    }

    fn highlight_lines(
        &self,
        source: &str,
        lang: Option<&str>,
        mut wrap_line: impl FnMut(usize, String) -> String,
    ) -> Result<String, HighlightError> {
        let mut lines = HighlightLines::new(self.find_syntax(lang), &self.theme);
        let mut out = String::with_capacity(source.len() * 4);
        for (idx, line) in LinesWithEndings::from(source).enumerate() {
            let regions = lines.highlight_line(line, &self.syntaxes)?;
            let html = styled_line_to_highlighted_html(&regions[..], IncludeBackground::No)?;
            out.push_str(&wrap_line(idx + 1, html));
        }
        Ok(out)
    }

    /// Highlight a block of code.
    pub fn highlight_block(&self, source: &str, params: &CodeParams) -> Result<Markup, HighlightError> {
        let hl_style = self
            .theme
            .settings
            .line_highlight
            .map(|c| format!("background-color:{};", css_color(c)));
        let body = self.highlight_lines(source, params.lang.as_deref(), |number, html| {
            if params.is_highlighted(number) {
                html! { span.line.hl style=[hl_style.as_deref()] { (PreEscaped(html)) } }.into_string()
            } else {
                html! { span.line { (PreEscaped(html)) } }.into_string()
            }
        })?;
        let pre_style = self
            .theme
            .settings
            .background
            .map(|c| format!("background-color:{};", css_color(c)));
        Ok(html! {
            div.highlight {
                pre style=[pre_style] { code { (PreEscaped(body)) } }
            }
        })
    }

    /// Highlight an inline code span.
    pub fn highlight_inline(&self, source: &str, lang: Option<&str>) -> Result<Markup, HighlightError> {
        let body = self.highlight_lines(source, lang, |_, html| html)?;
        Ok(html! {
            span.highlight-inline { code { (PreEscaped(body)) } }
        })
    }
}
