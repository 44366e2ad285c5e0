//! Theme color resolution for the artwork compositor.
//!
//! The frontend forwards its `--card` / `--card-foreground` custom
//! properties as space-separated HSL triplets (`"40 40% 98%"`). Resolution
//! is total: any token that fails to parse yields the fixed default, so the
//! compositor always receives a drawable color.

use image::Rgba;

/// Light beige card background.
pub const DEFAULT_BACKGROUND: Rgba<u8> = Rgba([0xfd, 0xfb, 0xf8, 0xff]);
/// Dark brown poem text.
pub const DEFAULT_FOREGROUND: Rgba<u8> = Rgba([0x3c, 0x2f, 0x2f, 0xff]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub background: Rgba<u8>,
    pub foreground: Rgba<u8>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND,
            foreground: DEFAULT_FOREGROUND,
        }
    }
}

impl Theme {
    /// Builds a theme from optional client-supplied tokens, falling back to
    /// the defaults wherever a token is absent or malformed.
    pub fn resolve(background: Option<&str>, foreground: Option<&str>) -> Self {
        Self {
            background: resolve_color(background, DEFAULT_BACKGROUND),
            foreground: resolve_color(foreground, DEFAULT_FOREGROUND),
        }
    }
}

/// Attempt a structured parse; on any failure substitute the fallback.
pub fn resolve_color(token: Option<&str>, fallback: Rgba<u8>) -> Rgba<u8> {
    token.and_then(parse_token).unwrap_or(fallback)
}

fn parse_token(s: &str) -> Option<Rgba<u8>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    parse_hsl_triplet(s)
}

fn parse_hex(s: &str) -> Option<Rgba<u8>> {
    if s.len() != 6 {
        return None;
    }
    let byte = |range: std::ops::Range<usize>| u8::from_str_radix(&s[range], 16).ok();
    Some(Rgba([byte(0..2)?, byte(2..4)?, byte(4..6)?, 0xff]))
}

/// Parses `"H S% L%"` as written into CSS custom properties by the theme,
/// e.g. `"40 40% 98%"`.
fn parse_hsl_triplet(s: &str) -> Option<Rgba<u8>> {
    let mut parts = s.split_whitespace();
    let h: f64 = parts.next()?.parse().ok()?;
    let s_pct: f64 = parts.next()?.strip_suffix('%')?.parse().ok()?;
    let l_pct: f64 = parts.next()?.strip_suffix('%')?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let (r, g, b) = hsl_to_rgb(h, s_pct / 100.0, l_pct / 100.0);
    Some(Rgba([r, g, b, 0xff]))
}

/// Standard HSL -> RGB conversion (sRGB space, s and l normalized 0..1).
fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    fn to_u8(x: f64) -> u8 {
        (x.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    if s == 0.0 {
        let v = to_u8(l);
        return (v, v, v);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    (
        to_u8(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        to_u8(hue_to_rgb(p, q, h)),
        to_u8(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_card_triplet() {
        // The default light theme token.
        let c = resolve_color(Some("40 40% 98%"), DEFAULT_FOREGROUND);
        assert_eq!(c, Rgba([252, 251, 248, 0xff]));
    }

    #[test]
    fn primary_hues_are_exact() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), (255, 0, 0));
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), (0, 255, 0));
        assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), (0, 0, 255));
        // Zero saturation collapses to gray regardless of hue.
        assert_eq!(hsl_to_rgb(123.0, 0.0, 0.5), (128, 128, 128));
    }

    #[test]
    fn parses_hex() {
        assert_eq!(
            resolve_color(Some("#3C2F2F"), DEFAULT_BACKGROUND),
            Rgba([0x3c, 0x2f, 0x2f, 0xff])
        );
    }

    #[test]
    fn malformed_tokens_fall_back() {
        for bad in ["", "forty 40% 98%", "40 40 98", "40 40% 98% 1", "#12345"] {
            assert_eq!(resolve_color(Some(bad), DEFAULT_BACKGROUND), DEFAULT_BACKGROUND);
        }
        assert_eq!(resolve_color(None, DEFAULT_FOREGROUND), DEFAULT_FOREGROUND);
    }

    #[test]
    fn resolve_is_total() {
        let theme = Theme::resolve(Some("not a color"), None);
        assert_eq!(theme, Theme::default());
    }
}
