use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Lab, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgb(channel(rgb.red), channel(rgb.green), channel(rgb.blue))
}

// ---------------------------------------------------------------------------
// Diverging cold → warm scale
// ---------------------------------------------------------------------------

const LUT_SIZE: usize = 256;

/// Blue → light grey → red diverging map, interpolated in CIE Lab so the
/// perceived lightness changes evenly on both sides.
#[derive(Debug, Clone)]
pub struct Coolwarm {
    lut: Vec<Color32>,
}

impl Coolwarm {
    pub fn new() -> Self {
        let cold = lab_from_rgb8(59, 76, 192);
        let mid = lab_from_rgb8(221, 221, 221);
        let warm = lab_from_rgb8(180, 4, 38);

        let lut = (0..LUT_SIZE)
            .map(|i| {
                let t = i as f32 / (LUT_SIZE - 1) as f32;
                let lab = if t < 0.5 {
                    cold.mix(mid, t * 2.0)
                } else {
                    mid.mix(warm, (t - 0.5) * 2.0)
                };
                let rgb: Srgb = lab.into_color();
                to_color32(rgb)
            })
            .collect();
        Coolwarm { lut }
    }

    /// Colour at `t` in `[0, 1]`; values outside are clamped.
    pub fn sample(&self, t: f64) -> Color32 {
        let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
        self.lut[(t * (LUT_SIZE - 1) as f64).round() as usize]
    }
}

impl Default for Coolwarm {
    fn default() -> Self {
        Self::new()
    }
}

fn lab_from_rgb8(r: u8, g: u8, b: u8) -> Lab {
    Srgb::new(r, g, b).into_format::<f32>().into_color()
}

// ---------------------------------------------------------------------------
// Banded scale: value → band colour
// ---------------------------------------------------------------------------

/// Maps values to the colour of the level band they fall in, the way a
/// filled contour plot colours its regions.
#[derive(Debug, Clone)]
pub struct BandedScale {
    boundaries: Vec<f64>,
    colors: Vec<Color32>,
}

impl BandedScale {
    /// `boundaries` must be ascending with at least two entries; band `i`
    /// spans `boundaries[i]..boundaries[i + 1]`.
    pub fn new(boundaries: &[f64], map: &Coolwarm) -> Self {
        let bands = boundaries.len().saturating_sub(1).max(1);
        let colors = (0..bands)
            .map(|i| {
                let t = if bands == 1 { 0.5 } else { i as f64 / (bands - 1) as f64 };
                map.sample(t)
            })
            .collect();
        BandedScale {
            boundaries: boundaries.to_vec(),
            colors,
        }
    }

    pub fn band_count(&self) -> usize {
        self.colors.len()
    }

    pub fn band_color(&self, band: usize) -> Color32 {
        self.colors[band.min(self.colors.len() - 1)]
    }

    /// Colour for `value`, or `None` for NaN.
    pub fn color_for(&self, value: f64) -> Option<Color32> {
        if value.is_nan() {
            return None;
        }
        let band = self
            .boundaries
            .partition_point(|b| *b <= value)
            .saturating_sub(1);
        Some(self.band_color(band))
    }
}
