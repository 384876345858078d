//! Word-cloud layout shared by the PNG report and the dashboard.
//!
//! Layout is a pure function of the word counts and the canvas size, so the
//! same placement is drawn by both renderers.

/// Average glyph width as a fraction of the font size.
const GLYPH_ASPECT: f32 = 0.6;
const GAP: f32 = 6.0;

/// One word with its final position (top-left corner) on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    pub font_size: f32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PlacedWord {
    fn overlaps(&self, other: &PlacedWord) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CloudSize {
    pub width: f32,
    pub height: f32,
    pub min_font: f32,
    pub max_font: f32,
}

impl Default for CloudSize {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 400.0,
            min_font: 12.0,
            max_font: 64.0,
        }
    }
}

/// Estimated rendered width of `text` at `font_size`.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * GLYPH_ASPECT
}

/// Place words (most frequent first) in centred rows. Font size grows with
/// the square root of the count. Words that no longer fit are left out.
pub fn layout_word_cloud(words: &[(String, usize)], size: CloudSize) -> Vec<PlacedWord> {
    let max_count = words.iter().map(|(_, c)| *c).max().unwrap_or(0);
    if max_count == 0 {
        return Vec::new();
    }

    let font_for = |count: usize| {
        let t = (count as f32 / max_count as f32).sqrt();
        size.min_font + (size.max_font - size.min_font) * t
    };

    let mut placed = Vec::new();
    let mut row: Vec<PlacedWord> = Vec::new();
    let mut row_width = 0.0f32;
    let mut y = 0.0f32;

    for (text, count) in words {
        let font_size = font_for(*count);
        let width = text_width(text, font_size);
        if width > size.width {
            continue;
        }
        let needed = if row.is_empty() { width } else { row_width + GAP + width };
        if needed > size.width {
            y += flush_row(&mut row, row_width, size.width, y, &mut placed) + GAP;
            row_width = 0.0;
        }
        if y + font_size > size.height {
            break;
        }
        let x = if row.is_empty() { 0.0 } else { row_width + GAP };
        row.push(PlacedWord {
            text: text.clone(),
            font_size,
            x,
            y,
            width,
            height: font_size,
        });
        row_width = x + width;
    }
    flush_row(&mut row, row_width, size.width, y, &mut placed);
    debug_assert!(is_overlap_free(&placed));
    placed
}

/// Centre the current row horizontally, align words on the row baseline,
/// move them to `placed`, and return the row height.
fn flush_row(
    row: &mut Vec<PlacedWord>,
    row_width: f32,
    canvas_width: f32,
    y: f32,
    placed: &mut Vec<PlacedWord>,
) -> f32 {
    let height = row.iter().map(|w| w.height).fold(0.0, f32::max);
    let shift = ((canvas_width - row_width) / 2.0).max(0.0);
    for mut word in row.drain(..) {
        word.x += shift;
        word.y = y + (height - word.height);
        placed.push(word);
    }
    height
}

/// No two words overlap.
pub fn is_overlap_free(words: &[PlacedWord]) -> bool {
    words
        .iter()
        .enumerate()
        .all(|(i, a)| words[i + 1..].iter().all(|b| !a.overlaps(b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(n: usize) -> Vec<(String, usize)> {
        (0..n).map(|i| (format!("word{i}"), n - i)).collect()
    }

    #[test]
    fn empty_input_places_nothing() {
        assert!(layout_word_cloud(&[], CloudSize::default()).is_empty());
    }

    #[test]
    fn words_stay_on_canvas_without_overlap() {
        let size = CloudSize::default();
        let placed = layout_word_cloud(&counts(80), size);
        assert!(!placed.is_empty());
        assert!(is_overlap_free(&placed));
        for w in &placed {
            assert!(w.x >= 0.0 && w.x + w.width <= size.width + 0.01, "{w:?}");
            assert!(w.y >= 0.0 && w.y + w.height <= size.height + 0.01, "{w:?}");
        }
    }

    #[test]
    fn most_frequent_word_is_largest() {
        let placed = layout_word_cloud(&counts(10), CloudSize::default());
        assert_eq!(placed[0].text, "word0");
        assert_eq!(placed[0].font_size, CloudSize::default().max_font);
        assert!(placed.iter().all(|w| w.font_size <= placed[0].font_size));
    }

    #[test]
    fn too_many_words_are_truncated() {
        let size = CloudSize {
            width: 200.0,
            height: 60.0,
            ..CloudSize::default()
        };
        let placed = layout_word_cloud(&counts(200), size);
        assert!(placed.len() < 200);
        assert!(is_overlap_free(&placed));
    }
}
