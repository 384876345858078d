use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::aggregate::GroupKey;

// ---------------------------------------------------------------------------
// Plain RGB triple shared by the egui and plotters renderers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    fn from_hsl(hsl: Hsl) -> Self {
        let rgb: Srgb = hsl.into_color();
        Rgb(
            (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
            (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
            (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
        )
    }
}

impl From<Rgb> for Color32 {
    fn from(Rgb(r, g, b): Rgb) -> Self {
        Color32::from_rgb(r, g, b)
    }
}

impl From<Rgb> for plotters::style::RGBColor {
    fn from(Rgb(r, g, b): Rgb) -> Self {
        plotters::style::RGBColor(r, g, b)
    }
}

// ---------------------------------------------------------------------------
// Palette generators
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            Rgb::from_hsl(Hsl::new(hue, 0.75, 0.45))
        })
        .collect()
}

/// Base hue of each view: blues for years, greens for journals, purples for
/// sources, oranges for words.
pub fn view_hue(key: GroupKey) -> f32 {
    match key {
        GroupKey::Year => 210.0,
        GroupKey::Journal => 130.0,
        GroupKey::Source => 275.0,
        GroupKey::TitleWords => 25.0,
    }
}

/// `n` shades of one hue, darkest first, for bars ranked by count.
pub fn shades(hue: f32, n: usize) -> Vec<Rgb> {
    match n {
        0 => Vec::new(),
        1 => vec![Rgb::from_hsl(Hsl::new(hue, 0.6, 0.45))],
        _ => (0..n)
            .map(|i| {
                let t = i as f32 / (n - 1) as f32;
                Rgb::from_hsl(Hsl::new(hue, 0.6, 0.30 + 0.45 * t))
            })
            .collect(),
    }
}
