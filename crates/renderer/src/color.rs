//! Resolution of CSS color strings into RGBA colors.

/// A color with straight (not premultiplied) alpha, each component in `[0, 1]`.
pub type Rgba = [f32; 4];

/// Maps a color value to an RGBA color.
///
/// Returns `None` when the value is not understood.
pub trait ColorResolver {
    fn resolve(&self, color: &str) -> Option<Rgba>;
}

/// Resolves hexadecimal, `rgb()`, `rgba()`, `hsl()`, `hsla()` and named CSS colors.
///
/// Only a subset of the CSS named colors is supported.
#[derive(Copy, Clone, Debug, Default)]
pub struct CssColors;

const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0x000000),
    ("silver", 0xc0c0c0),
    ("gray", 0x808080),
    ("grey", 0x808080),
    ("white", 0xffffff),
    ("maroon", 0x800000),
    ("red", 0xff0000),
    ("purple", 0x800080),
    ("fuchsia", 0xff00ff),
    ("magenta", 0xff00ff),
    ("green", 0x008000),
    ("lime", 0x00ff00),
    ("olive", 0x808000),
    ("yellow", 0xffff00),
    ("navy", 0x000080),
    ("blue", 0x0000ff),
    ("teal", 0x008080),
    ("aqua", 0x00ffff),
    ("cyan", 0x00ffff),
    ("orange", 0xffa500),
    ("brown", 0xa52a2a),
    ("pink", 0xffc0cb),
    ("gold", 0xffd700),
    ("indigo", 0x4b0082),
    ("violet", 0xee82ee),
    ("coral", 0xff7f50),
    ("salmon", 0xfa8072),
    ("tomato", 0xff6347),
    ("firebrick", 0xb22222),
    ("crimson", 0xdc143c),
    ("khaki", 0xf0e68c),
    ("tan", 0xd2b48c),
    ("beige", 0xf5f5dc),
    ("ivory", 0xfffff0),
    ("lavender", 0xe6e6fa),
    ("turquoise", 0x40e0d0),
    ("skyblue", 0x87ceeb),
    ("steelblue", 0x4682b4),
    ("royalblue", 0x4169e1),
    ("slategray", 0x708090),
    ("lightgray", 0xd3d3d3),
    ("lightgrey", 0xd3d3d3),
    ("darkgray", 0xa9a9a9),
    ("darkgrey", 0xa9a9a9),
    ("dimgray", 0x696969),
    ("whitesmoke", 0xf5f5f5),
    ("darkred", 0x8b0000),
    ("darkgreen", 0x006400),
    ("darkblue", 0x00008b),
    ("darkorange", 0xff8c00),
    ("forestgreen", 0x228b22),
    ("seagreen", 0x2e8b57),
    ("chocolate", 0xd2691e),
];

impl ColorResolver for CssColors {
    fn resolve(&self, color: &str) -> Option<Rgba> {
        let color = color.trim().to_ascii_lowercase();

        if color == "none" || color == "transparent" {
            return Some([0.0, 0.0, 0.0, 0.0]);
        }

        if let Some(hex) = color.strip_prefix('#') {
            return parse_hex(hex);
        }

        if let Some(args) = function_args(&color, "rgba").or_else(|| function_args(&color, "rgb")) {
            return parse_rgb(args);
        }

        if let Some(args) = function_args(&color, "hsla").or_else(|| function_args(&color, "hsl")) {
            return parse_hsl(args);
        }

        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == color)
            .map(|&(_, rgb)| from_rgb24(rgb))
    }
}

fn from_rgb24(rgb: u32) -> Rgba {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
        1.0,
    ]
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let digits: Option<Vec<u32>> = hex.chars().map(|c| c.to_digit(16)).collect();
    let d = digits?;

    let channel = |hi: u32, lo: u32| (hi * 16 + lo) as f32 / 255.0;
    match d.len() {
        3 => Some([channel(d[0], d[0]), channel(d[1], d[1]), channel(d[2], d[2]), 1.0]),
        4 => Some([
            channel(d[0], d[0]),
            channel(d[1], d[1]),
            channel(d[2], d[2]),
            channel(d[3], d[3]),
        ]),
        6 => Some([channel(d[0], d[1]), channel(d[2], d[3]), channel(d[4], d[5]), 1.0]),
        8 => Some([
            channel(d[0], d[1]),
            channel(d[2], d[3]),
            channel(d[4], d[5]),
            channel(d[6], d[7]),
        ]),
        _ => None,
    }
}

fn function_args<'l>(color: &'l str, name: &str) -> Option<Vec<&'l str>> {
    let inner = color.strip_prefix(name)?.trim_start().strip_prefix('(')?.strip_suffix(')')?;

    // Both the legacy comma syntax and the space separated syntax (with an
    // optional `/ alpha`) are accepted.
    Some(
        inner
            .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect(),
    )
}

fn parse_alpha(arg: Option<&&str>) -> Option<f32> {
    match arg {
        None => Some(1.0),
        Some(s) => parse_number_or_percentage(s, 1.0).map(clamp_unit),
    }
}

fn parse_number_or_percentage(s: &str, percent_scale: f32) -> Option<f32> {
    match s.strip_suffix('%') {
        Some(p) => p.parse::<f32>().ok().map(|v| v / 100.0 * percent_scale),
        None => s.parse::<f32>().ok(),
    }
}

fn parse_rgb(args: Vec<&str>) -> Option<Rgba> {
    if args.len() != 3 && args.len() != 4 {
        return None;
    }

    let mut rgba = [0.0; 4];
    for i in 0..3 {
        rgba[i] = clamp_unit(parse_number_or_percentage(args[i], 255.0)? / 255.0);
    }
    rgba[3] = parse_alpha(args.get(3))?;

    Some(rgba)
}

fn parse_hsl(args: Vec<&str>) -> Option<Rgba> {
    if args.len() != 3 && args.len() != 4 {
        return None;
    }

    let h = args[0].strip_suffix("deg").unwrap_or(args[0]).parse::<f32>().ok()?;
    let s = clamp_unit(parse_number_or_percentage(args[1], 1.0)?);
    let l = clamp_unit(parse_number_or_percentage(args[2], 1.0)?);
    let a = parse_alpha(args.get(3))?;

    let h = h.rem_euclid(360.0) / 360.0;
    let m2 = if l <= 0.5 { l * (s + 1.0) } else { l + s - l * s };
    let m1 = l * 2.0 - m2;

    Some([
        hue_to_rgb(m1, m2, h + 1.0 / 3.0),
        hue_to_rgb(m1, m2, h),
        hue_to_rgb(m1, m2, h - 1.0 / 3.0),
        a,
    ])
}

fn hue_to_rgb(m1: f32, m2: f32, h: f32) -> f32 {
    let h = h.rem_euclid(1.0);
    if h * 6.0 < 1.0 {
        m1 + (m2 - m1) * h * 6.0
    } else if h * 2.0 < 1.0 {
        m2
    } else if h * 3.0 < 2.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - h) * 6.0
    } else {
        m1
    }
}

fn clamp_unit(v: f32) -> f32 {
    v.max(0.0).min(1.0)
}

#[cfg(test)]
fn assert_color(color: &str, expected: Rgba) {
    let c = CssColors
        .resolve(color)
        .unwrap_or_else(|| panic!("failed to resolve {:?}", color));
    for i in 0..4 {
        assert!(
            (c[i] - expected[i]).abs() < 1e-3,
            "{:?}: {:?} != {:?}",
            color,
            c,
            expected
        );
    }
}

#[test]
fn hex_colors() {
    assert_color("#fff", [1.0, 1.0, 1.0, 1.0]);
    assert_color("#FF0000", [1.0, 0.0, 0.0, 1.0]);
    assert_color("#4682b4", [70.0 / 255.0, 130.0 / 255.0, 180.0 / 255.0, 1.0]);
    assert_color("#00ff0080", [0.0, 1.0, 0.0, 128.0 / 255.0]);
    assert_eq!(CssColors.resolve("#ff00"), Some([1.0, 1.0, 0.0, 0.0]));
    assert_eq!(CssColors.resolve("#ff00f"), None);
    assert_eq!(CssColors.resolve("#zzz"), None);
}

#[test]
fn functional_colors() {
    assert_color("rgb(255, 0, 0)", [1.0, 0.0, 0.0, 1.0]);
    assert_color("rgba(0, 0, 255, 0.5)", [0.0, 0.0, 1.0, 0.5]);
    assert_color("rgb(100%, 50%, 0%)", [1.0, 0.5, 0.0, 1.0]);
    assert_color("rgb(0 128 0 / 25%)", [0.0, 128.0 / 255.0, 0.0, 0.25]);
    assert_color("hsl(0, 100%, 50%)", [1.0, 0.0, 0.0, 1.0]);
    assert_color("hsl(120, 100%, 25%)", [0.0, 0.5, 0.0, 1.0]);
    assert_color("hsla(240deg, 100%, 50%, 0.3)", [0.0, 0.0, 1.0, 0.3]);
    assert_eq!(CssColors.resolve("rgb(1, 2)"), None);
    assert_eq!(CssColors.resolve("rgb(a, b, c)"), None);
}

#[test]
fn named_colors() {
    assert_color("steelblue", [70.0 / 255.0, 130.0 / 255.0, 180.0 / 255.0, 1.0]);
    assert_color(" Red ", [1.0, 0.0, 0.0, 1.0]);
    assert_color("transparent", [0.0, 0.0, 0.0, 0.0]);
    assert_color("none", [0.0, 0.0, 0.0, 0.0]);
    assert_eq!(CssColors.resolve("notacolor"), None);
}
