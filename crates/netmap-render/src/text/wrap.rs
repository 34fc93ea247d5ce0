//! Label wrapping into fixed-size boxes.
//!
//! Lines are filled greedily word by word. A word that overflows is split with a linear backoff
//! over its prefixes: the longest prefix that still fits completes the current line. A word
//! with no fitting prefix after other content starts a fresh line instead. When the box is too
//! narrow for even a single glyph the result is empty and the caller decides how to fall back.

use super::{MeasureSurface, TextMeasurer, TextStyle};
use regex::Regex;
use std::collections::VecDeque;
use std::sync::OnceLock;

/// Multiplier applied to the natural line box when no explicit line height is configured.
const DEFAULT_LINE_HEIGHT: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrapOptions {
    pub max_width_px: f64,
    pub max_height_px: Option<f64>,
    /// Multiplier over the font's natural line box.
    pub line_height: Option<f64>,
}

impl WrapOptions {
    pub fn width(max_width_px: f64) -> Self {
        Self {
            max_width_px,
            max_height_px: None,
            line_height: None,
        }
    }

    pub fn with_max_height(mut self, max_height_px: f64) -> Self {
        self.max_height_px = Some(max_height_px);
        self
    }

    pub fn with_line_height(mut self, multiplier: f64) -> Self {
        self.line_height = Some(multiplier);
        self
    }
}

/// Splits text into alternating word and whitespace tokens; nothing is dropped, so the tokens
/// concatenate back to the input.
pub fn tokenize(text: &str) -> Vec<&str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\s+|\S+").expect("valid regex"));
    re.find_iter(text).map(|m| m.as_str()).collect()
}

struct LineBuffer {
    lines: Vec<String>,
    line_height: Option<f64>,
    max_height: Option<f64>,
}

impl LineBuffer {
    /// Commits a line; returns `false` once the height budget is exhausted (the excess has been
    /// dropped already).
    fn commit(&mut self, line: &str) -> bool {
        self.lines.push(line.trim_end().to_string());
        let (Some(line_height), Some(max_height)) = (self.line_height, self.max_height) else {
            return true;
        };
        if self.lines.len() as f64 * line_height > max_height {
            let keep = (max_height / line_height).floor().max(0.0) as usize;
            self.lines.truncate(keep);
            return false;
        }
        true
    }
}

/// Wraps `text` into lines no wider than `opts.max_width_px`.
///
/// Returns an empty vector when the text is empty or when a single glyph does not fit.
pub fn wrap_lines(
    text: &str,
    measurer: &dyn TextMeasurer,
    style: &TextStyle,
    opts: WrapOptions,
) -> Vec<String> {
    let max_width = opts.max_width_px;
    if text.trim().is_empty() || !(max_width.is_finite() && max_width > 0.0) {
        return Vec::new();
    }

    let mut surface = MeasureSurface::acquire(measurer, style);
    let line_height = opts.max_height_px.map(|_| {
        let multiplier = opts
            .line_height
            .filter(|m| m.is_finite() && *m > 0.0)
            .unwrap_or(DEFAULT_LINE_HEIGHT);
        surface.line_box() * multiplier
    });
    let mut out = LineBuffer {
        lines: Vec::new(),
        line_height,
        max_height: opts.max_height_px,
    };

    let mut tokens: VecDeque<String> = tokenize(text).into_iter().map(str::to_string).collect();
    let mut cur = String::new();

    while let Some(tok) = tokens.pop_front() {
        if tok.chars().all(char::is_whitespace) {
            if tok.contains('\n') {
                if !cur.trim().is_empty() && !out.commit(&cur) {
                    return out.lines;
                }
                cur.clear();
            } else if !cur.is_empty() {
                cur.push_str(&tok);
            }
            continue;
        }

        let candidate = format!("{cur}{tok}");
        if surface.width(candidate.trim_end()) <= max_width {
            cur = candidate;
            continue;
        }

        // Back off one character at a time until a prefix of the word fits after `cur`.
        let chars: Vec<char> = tok.chars().collect();
        let mut split_at = None;
        for p in (1..chars.len()).rev() {
            let head: String = chars[..p].iter().collect();
            if surface.width(&format!("{cur}{head}")) <= max_width {
                split_at = Some(p);
                break;
            }
        }
        let Some(p) = split_at else {
            if !cur.trim().is_empty() {
                let keep_going = out.commit(&cur);
                cur.clear();
                if !keep_going {
                    return out.lines;
                }
                tokens.push_front(tok);
                continue;
            }
            tracing::debug!(
                width = max_width,
                word = tok.as_str(),
                "label box too narrow for a single glyph"
            );
            return Vec::new();
        };

        let head: String = chars[..p].iter().collect();
        let tail: String = chars[p..].iter().collect();
        let line = format!("{cur}{head}");
        cur.clear();
        if !out.commit(&line) {
            return out.lines;
        }
        tokens.push_front(tail);
    }

    if !cur.trim().is_empty() {
        out.commit(&cur);
    }
    out.lines
}

/// [`wrap_lines`] joined with line breaks, ready for display.
pub fn wrap_text(
    text: &str,
    measurer: &dyn TextMeasurer,
    style: &TextStyle,
    opts: WrapOptions,
) -> String {
    wrap_lines(text, measurer, style, opts).join("\n")
}
