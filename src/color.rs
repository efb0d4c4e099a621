use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::analysis::stats::Grade;

// ---------------------------------------------------------------------------
// Chart colours
// ---------------------------------------------------------------------------

/// Fill used for histogram bars.
pub const HISTOGRAM_FILL: Color32 = Color32::from_rgb(0x4f, 0xa3, 0xd9);

/// Fixed colour per grade band.
pub fn grade_color(grade: Grade) -> Color32 {
    match grade {
        Grade::Excellent => Color32::from_rgb(0x4c, 0xaf, 0x50),
        Grade::Good => Color32::from_rgb(0x21, 0x96, 0xf3),
        Grade::Average => Color32::from_rgb(0xff, 0xc1, 0x07),
        Grade::Weak => Color32::from_rgb(0xf4, 0x43, 0x36),
    }
}

fn hsl_to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// Red (low) to green (high) colour for a mean score in `lo..=hi`.
pub fn score_gradient(value: f64, lo: f64, hi: f64) -> Color32 {
    let t = if hi - lo > f64::EPSILON {
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    } else {
        1.0
    };
    hsl_to_color32(Hsl::new(t as f32 * 120.0, 0.70, 0.50))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_runs_red_to_green() {
        let low = score_gradient(2.0, 2.0, 8.0);
        let high = score_gradient(8.0, 2.0, 8.0);
        assert!(low.r() > low.g());
        assert!(high.g() > high.r());
        // Degenerate range does not divide by zero.
        assert_eq!(score_gradient(5.0, 5.0, 5.0), high);
    }

    #[test]
    fn grade_colours_are_distinct() {
        let colours: Vec<Color32> = Grade::ALL.iter().map(|g| grade_color(*g)).collect();
        for (i, a) in colours.iter().enumerate() {
            for b in &colours[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
