//! Colours used by the scene renderer and image export.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const GRID: Rgb = Rgb(230, 230, 230);
    pub const NODE_FILL: Rgb = Rgb(255, 255, 225);
    pub const HIGHLIGHT: Rgb = Rgb(30, 110, 230);
    pub const HANDLE: Rgb = Rgb(220, 60, 40);

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Parse a colour given as `#rrggbb`, `#rgb`, a `[r, g, b]` array of
/// `0.0..=1.0` floats, or a common colour name.
pub fn parse_color(val: &str) -> Option<Rgb> {
    let val = val.trim();
    if val.starts_with('[') && val.ends_with(']') {
        let inner = &val[1..val.len() - 1];
        let parts: Vec<f32> = inner
            .split(',')
            .map(|s| s.trim().parse::<f32>())
            .collect::<Result<_, _>>()
            .ok()?;
        if let [r, g, b] = parts[..] {
            let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
            return Some(Rgb(channel(r), channel(g), channel(b)));
        }
        return None;
    }
    if let Some(hex) = val.strip_prefix('#') {
        return parse_hex(hex);
    }
    match val.to_ascii_lowercase().as_str() {
        "white" => Some(Rgb::WHITE),
        "black" => Some(Rgb::BLACK),
        "red" => Some(Rgb(255, 0, 0)),
        "green" => Some(Rgb(0, 255, 0)),
        "blue" => Some(Rgb(0, 0, 255)),
        "yellow" => Some(Rgb(255, 255, 0)),
        "lightyellow" => Some(Rgb(255, 255, 224)),
        "lightblue" => Some(Rgb(173, 216, 230)),
        "gray" | "grey" => Some(Rgb(128, 128, 128)),
        "lightgray" | "lightgrey" => Some(Rgb(211, 211, 211)),
        "darkgray" | "darkgrey" => Some(Rgb(169, 169, 169)),
        _ => None,
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    let digit = |i: usize, len: usize| u8::from_str_radix(hex.get(i..i + len)?, 16).ok();
    match hex.len() {
        6 => Some(Rgb(digit(0, 2)?, digit(2, 2)?, digit(4, 2)?)),
        3 => Some(Rgb(
            digit(0, 1)? * 17,
            digit(1, 1)? * 17,
            digit(2, 1)? * 17,
        )),
        _ => None,
    }
}
