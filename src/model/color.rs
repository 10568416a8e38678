//! RGBA color.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An 8-bit per channel RGBA color.
///
/// The canonical text form is `(r,g,b,a)`. Parsing also accepts `(r,g,b)`
/// (opaque) and the hexadecimal forms `#rrggbb` / `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const RED: Color = Color::rgba(255, 0, 0, 255);
    pub const GREEN: Color = Color::rgba(0, 255, 0, 255);
    pub const BLUE: Color = Color::rgba(0, 0, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub fn channels(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_channels(c: [u8; 4]) -> Self {
        Self::rgba(c[0], c[1], c[2], c[3])
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Color {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex).ok_or(());
        }
        let inner = s
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or(())?;
        let parts = inner
            .split(',')
            .map(|p| p.trim().parse::<u8>().map_err(|_| ()))
            .collect::<Result<Vec<_>, ()>>()?;
        match parts.as_slice() {
            [r, g, b] => Ok(Self::rgb(*r, *g, *b)),
            [r, g, b, a] => Ok(Self::rgba(*r, *g, *b, *a)),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let c = Color::rgba(10, 20, 30, 40);
        assert_eq!(c.to_string(), "(10,20,30,40)");
        assert_eq!("(10,20,30,40)".parse::<Color>(), Ok(c));
        assert_eq!(" ( 10 , 20, 30 ,40 ) ".parse::<Color>(), Ok(c));
    }

    #[test]
    fn test_parse_alternate_forms() {
        assert_eq!("(1,2,3)".parse::<Color>(), Ok(Color::rgb(1, 2, 3)));
        assert_eq!("#ff0000".parse::<Color>(), Ok(Color::RED));
        assert_eq!("#0000ff80".parse::<Color>(), Ok(Color::rgba(0, 0, 255, 128)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("(1,2)".parse::<Color>().is_err());
        assert!("(256,0,0,0)".parse::<Color>().is_err());
        assert!("red".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
    }
}
