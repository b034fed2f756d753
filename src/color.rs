use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::locked::LockColor;

// ---------------------------------------------------------------------------
// Locked curve colours
// ---------------------------------------------------------------------------

pub fn lock_color(color: LockColor) -> Color32 {
    match color {
        LockColor::Red => Color32::from_rgb(214, 39, 40),
        LockColor::Blue => Color32::from_rgb(31, 119, 180),
        LockColor::Green => Color32::from_rgb(44, 160, 44),
        LockColor::Orange => Color32::from_rgb(255, 127, 14),
        LockColor::Purple => Color32::from_rgb(148, 103, 189),
    }
}

// ---------------------------------------------------------------------------
// Value colour map for the point overlay
// ---------------------------------------------------------------------------

/// Hue ramp from violet (low) to yellow (high).
const LOW_HUE: f32 = 270.0;
const HIGH_HUE: f32 = 60.0;

fn hsl_to_color32(hue: f32, lightness: f32) -> Color32 {
    let hsl = Hsl::new(hue, 0.75, lightness);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// Maps deformation values onto a continuous colour ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueColorMap {
    pub min: f64,
    pub max: f64,
}

impl ValueColorMap {
    /// Build from the values that will be drawn; `None` when there are none.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;
        Some(Self { min, max })
    }

    /// Position of `value` on the ramp, in `[0, 1]`.
    pub fn fraction(&self, value: f64) -> f32 {
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON {
            return 0.5;
        }
        (((value - self.min) / span).clamp(0.0, 1.0)) as f32
    }

    pub fn color_for(&self, value: f64) -> Color32 {
        let t = self.fraction(value);
        let hue = LOW_HUE + (HIGH_HUE + 360.0 - LOW_HUE) * t;
        hsl_to_color32(hue % 360.0, 0.35 + 0.25 * t)
    }

    /// Evenly spaced (value, colour) stops for a legend.
    pub fn legend_entries(&self, n: usize) -> Vec<(f64, Color32)> {
        let n = n.max(2);
        (0..n)
            .map(|i| {
                let v = self.min + (self.max - self.min) * i as f64 / (n - 1) as f64;
                (v, self.color_for(v))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_ends_differ_and_clamp() {
        let cm = ValueColorMap::from_values([1.0, f64::NAN, 5.0, 3.0]).unwrap();
        assert_eq!((cm.min, cm.max), (1.0, 5.0));
        assert_eq!(cm.fraction(3.0), 0.5);
        assert_eq!(cm.fraction(-10.0), 0.0);
        assert_ne!(cm.color_for(1.0), cm.color_for(5.0));
        assert_eq!(cm.color_for(9.0), cm.color_for(5.0));
    }

    #[test]
    fn flat_or_empty_inputs() {
        assert!(ValueColorMap::from_values(Vec::<f64>::new()).is_none());
        let flat = ValueColorMap::from_values([2.0, 2.0]).unwrap();
        assert_eq!(flat.fraction(2.0), 0.5);
        assert_eq!(flat.legend_entries(0).len(), 2);
    }
}
