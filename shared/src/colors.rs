/// Deterministic badge color for a category label via CRC32 of its lower-cased
/// text, pulled into a saturation/lightness band that stays readable on the
/// dark sidebar.
pub fn category_color(category: &str) -> (u8, u8, u8) {
    let hash = crc32fast::hash(category.trim().to_lowercase().as_bytes());
    let bytes = hash.to_be_bytes();
    let (h, s, l) = rgb_to_hsl(bytes[0], bytes[1], bytes[2]);
    hsl_to_rgb(h, s.clamp(0.45, 0.8), l.clamp(0.45, 0.65))
}

/// Format RGBA as a CSS color string.
pub fn rgba_css(r: u8, g: u8, b: u8, a: f64) -> String {
    format!("rgba({r},{g},{b},{a})")
}

/// Convert RGB to HSL. Returns (h: 0..360, s: 0..1, l: 0..1).
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if (max - r).abs() < f64::EPSILON {
        let mut h = (g - b) / d;
        if g < b {
            h += 6.0;
        }
        h
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h * 60.0, s, l)
}

/// Convert HSL to RGB.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    if s.abs() < f64::EPSILON {
        let v = (l * 255.0).round() as u8;
        return (v, v, v);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;
    let h = h / 360.0;

    (
        (hue_to_rgb(p, q, h + 1.0 / 3.0) * 255.0).round() as u8,
        (hue_to_rgb(p, q, h) * 255.0).round() as u8,
        (hue_to_rgb(p, q, h - 1.0 / 3.0) * 255.0).round() as u8,
    )
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::{category_color, hsl_to_rgb, rgb_to_hsl, rgba_css};

    #[test]
    fn roundtrip_rgb_through_hsl_is_identity() {
        for (r, g, b) in [(0, 0, 0), (255, 255, 255), (255, 0, 0), (37, 91, 201)] {
            let (h, s, l) = rgb_to_hsl(r, g, b);
            assert_eq!(hsl_to_rgb(h, s, l), (r, g, b));
        }
    }

    #[test]
    fn category_color_ignores_case_and_padding() {
        assert_eq!(
            category_color("Software House"),
            category_color("  software house ")
        );
    }

    #[test]
    fn category_color_varies_between_categories() {
        assert_ne!(category_color("Software House"), category_color("Digital Agency"));
    }

    #[test]
    fn category_color_stays_in_readable_band() {
        for category in ["other", "software", "digital_agency", "consulting", ""] {
            let (r, g, b) = category_color(category);
            let (_, s, l) = rgb_to_hsl(r, g, b);
            assert!((0.40..=0.70).contains(&l), "{category}: lightness {l}");
            assert!(s > 0.3 || (r == g && g == b), "{category}: saturation {s}");
        }
    }

    #[test]
    fn rgba_css_formats_components() {
        assert_eq!(rgba_css(1, 2, 3, 0.5), "rgba(1,2,3,0.5)");
    }
}
