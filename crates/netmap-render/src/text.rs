use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

mod wrap;

pub use wrap::{WrapOptions, tokenize, wrap_lines, wrap_text};


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f64,
    pub font_weight: Option<String>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 10.0,
            font_weight: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

/// Width/height measurement primitive of the host drawing surface.
pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

/// Font-free measurer: every cell is `char_width_factor * font_size` wide (wide East Asian
/// glyphs take two cells), every line `line_height_factor * font_size` tall.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl DeterministicTextMeasurer {
    fn cell_factor(&self) -> f64 {
        if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        }
    }

    fn line_factor(&self) -> f64 {
        if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        }
    }
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let font_size = style.font_size.max(1.0);
        let lines: Vec<&str> = text.split('\n').collect();
        let max_cells = lines
            .iter()
            .map(|line| {
                line.chars()
                    .map(|ch| ch.width().unwrap_or(0))
                    .sum::<usize>()
            })
            .max()
            .unwrap_or(0);

        TextMetrics {
            width: max_cells as f64 * font_size * self.cell_factor(),
            height: lines.len() as f64 * font_size * self.line_factor(),
            line_count: lines.len(),
        }
    }
}

/// Private off-screen measurement surface bound to one measurer and style.
///
/// A surface lives for exactly one layout call and is released when it goes out of scope, on
/// every exit path. Repeated probes of the same string are answered from a local cache.
pub struct MeasureSurface<'a> {
    measurer: &'a dyn TextMeasurer,
    style: &'a TextStyle,
    widths: FxHashMap<String, f64>,
    probes: usize,
}

impl<'a> MeasureSurface<'a> {
    pub fn acquire(measurer: &'a dyn TextMeasurer, style: &'a TextStyle) -> Self {
        Self {
            measurer,
            style,
            widths: FxHashMap::default(),
            probes: 0,
        }
    }

    pub fn width(&mut self, text: &str) -> f64 {
        if let Some(&w) = self.widths.get(text) {
            return w;
        }
        self.probes += 1;
        let w = self.measurer.measure(text, self.style).width;
        self.widths.insert(text.to_string(), w);
        w
    }

    /// Height of a single line of text in this style.
    pub fn line_box(&mut self) -> f64 {
        self.probes += 1;
        let m = self.measurer.measure("Mg", self.style);
        m.height / m.line_count.max(1) as f64
    }

    pub fn probes(&self) -> usize {
        self.probes
    }
}

impl Drop for MeasureSurface<'_> {
    fn drop(&mut self) {
        tracing::trace!(probes = self.probes, "measurement surface released");
    }
}
