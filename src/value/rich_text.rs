//! Formatted text values.
//!
//! Persisted as single-line markup with three tags: `<b>`, `<i>` and
//! `<color=#RRGGBB>`. Literal `<` and `&` are escaped as `&lt;` and `&amp;`.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)(b|i|color)(?:=#([0-9A-Fa-f]{6}))?>").expect("tag pattern is valid")
});

/// Style applied to one run of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    /// 0xRRGGBB
    pub color: Option<u32>,
}

/// Contiguous text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub style: TextStyle,
}

/// Formatted text as a list of styled runs.
///
/// Runs are kept normalized: no empty runs, no two adjacent runs with the
/// same style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichText {
    runs: Vec<TextRun>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RichTextError {
    StrayAngleBracket(usize),
    UnexpectedClose { tag: String, offset: usize },
    BadColorTag(usize),
    Unclosed(String),
}

impl fmt::Display for RichTextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RichTextError::StrayAngleBracket(at) => write!(f, "unrecognized '<' at offset {}", at),
            RichTextError::UnexpectedClose { tag, offset } => {
                write!(f, "closing </{}> at offset {} does not match", tag, offset)
            }
            RichTextError::BadColorTag(at) => write!(f, "malformed color tag at offset {}", at),
            RichTextError::Unclosed(tag) => write!(f, "<{}> is never closed", tag),
        }
    }
}

impl std::error::Error for RichTextError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Bold,
    Italic,
    Color(u32),
}

impl Tag {
    fn name(self) -> &'static str {
        match self {
            Tag::Bold => "b",
            Tag::Italic => "i",
            Tag::Color(_) => "color",
        }
    }
}

fn style_of(stack: &[Tag]) -> TextStyle {
    let mut style = TextStyle::default();
    for tag in stack {
        match tag {
            Tag::Bold => style.bold = true,
            Tag::Italic => style.italic = true,
            Tag::Color(c) => style.color = Some(*c),
        }
    }
    style
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;")
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<").replace("&amp;", "&")
}

impl RichText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unstyled text.
    pub fn plain(text: impl Into<String>) -> Self {
        let mut rich = Self::new();
        rich.push(text, TextStyle::default());
        rich
    }

    /// Append a run, merging with the previous run when styles match.
    pub fn push(&mut self, text: impl Into<String>, style: TextStyle) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.runs.last_mut()
            && last.style == style
        {
            last.text.push_str(&text);
            return;
        }
        self.runs.push(TextRun { text, style });
    }

    pub fn with(mut self, text: impl Into<String>, style: TextStyle) -> Self {
        self.push(text, style);
        self
    }

    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Text with all formatting removed.
    pub fn to_plain(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Copy with line breaks removed from every run.
    pub fn single_line(&self) -> Self {
        let mut out = Self::new();
        for run in &self.runs {
            out.push(crate::store::strip_line_breaks(&run.text), run.style);
        }
        out
    }

    /// Parse markup into runs.
    pub fn parse(markup: &str) -> Result<Self, RichTextError> {
        let mut out = Self::new();
        let mut stack: Vec<Tag> = Vec::new();
        let mut cursor = 0;

        for caps in TAG.captures_iter(markup) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let between = &markup[cursor..whole.start()];
            if let Some(pos) = between.find('<') {
                return Err(RichTextError::StrayAngleBracket(cursor + pos));
            }
            out.push(unescape(between), style_of(&stack));
            cursor = whole.end();

            let closing = !caps[1].is_empty();
            let hex = caps.get(3).map(|m| m.as_str());
            let tag = match (&caps[2], hex) {
                ("b", None) => Tag::Bold,
                ("i", None) => Tag::Italic,
                ("color", Some(hex)) if !closing => {
                    let rgb = u32::from_str_radix(hex, 16)
                        .map_err(|_| RichTextError::BadColorTag(whole.start()))?;
                    Tag::Color(rgb)
                }
                ("color", None) if closing => Tag::Color(0),
                _ => return Err(RichTextError::BadColorTag(whole.start())),
            };

            if closing {
                match stack.last() {
                    Some(open) if open.name() == tag.name() => {
                        stack.pop();
                    }
                    _ => {
                        return Err(RichTextError::UnexpectedClose {
                            tag: tag.name().to_string(),
                            offset: whole.start(),
                        });
                    }
                }
            } else {
                stack.push(tag);
            }
        }

        let rest = &markup[cursor..];
        if let Some(pos) = rest.find('<') {
            return Err(RichTextError::StrayAngleBracket(cursor + pos));
        }
        if let Some(open) = stack.last() {
            return Err(RichTextError::Unclosed(open.name().to_string()));
        }
        out.push(unescape(rest), style_of(&stack));
        Ok(out)
    }

    /// Render canonical markup: tags open as color, bold, italic per run.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for run in &self.runs {
            let style = run.style;
            if let Some(color) = style.color {
                out.push_str(&format!("<color=#{:06X}>", color));
            }
            if style.bold {
                out.push_str("<b>");
            }
            if style.italic {
                out.push_str("<i>");
            }
            out.push_str(&escape(&run.text));
            if style.italic {
                out.push_str("</i>");
            }
            if style.bold {
                out.push_str("</b>");
            }
            if style.color.is_some() {
                out.push_str("</color>");
            }
        }
        out
    }
}

impl fmt::Display for RichText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup())
    }
}
