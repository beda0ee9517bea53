//! Strongly-typed numeric primitives for funnelgeo (zero-cost newtypes).
//!
//! Pixel quantities and angles never travel as bare `f64` through the
//! layout stages; values (the data being charted) stay plain `f64`.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use serde::Deserialize;

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
        }
    }
}

impl std::error::Error for NumericError {}

/// A length in screen pixels
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[repr(transparent)]
pub struct Px(pub f64);

impl Px {
    pub const ZERO: Px = Px(0.0);

    /// Create a Px with validation (rejects NaN/infinite)
    #[inline]
    pub fn try_new(val: f64) -> Result<Px, NumericError> {
        if val.is_nan() {
            Err(NumericError::NaN)
        } else if val.is_infinite() {
            Err(NumericError::Infinite)
        } else {
            Ok(Px(val))
        }
    }

    /// Get the raw value (use sparingly, prefer typed operations)
    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn min(self, other: Px) -> Px {
        Px(self.0.min(other.0))
    }

    #[inline]
    pub fn max(self, other: Px) -> Px {
        Px(self.0.max(other.0))
    }

    #[inline]
    pub fn ceil(self) -> Px {
        Px(self.0.ceil())
    }

    #[inline]
    pub fn round(self) -> Px {
        Px(self.0.round())
    }

    #[inline]
    pub fn floor(self) -> Px {
        Px(self.0.floor())
    }

    /// Checked ratio returning None if the divisor is zero
    #[inline]
    pub fn checked_ratio(self, rhs: Px) -> Option<f64> {
        if rhs.0 == 0.0 { None } else { Some(self.0 / rhs.0) }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl Add for Px {
    type Output = Px;
    fn add(self, rhs: Px) -> Px { Px(self.0 + rhs.0) }
}
impl Sub for Px {
    type Output = Px;
    fn sub(self, rhs: Px) -> Px { Px(self.0 - rhs.0) }
}
impl Mul<f64> for Px {
    type Output = Px;
    fn mul(self, rhs: f64) -> Px { Px(self.0 * rhs) }
}
impl Div<f64> for Px {
    type Output = Px;
    fn div(self, rhs: f64) -> Px { Px(self.0 / rhs) }
}

// NOTE: Px / Px is intentionally NOT implemented as a trait.
// Use Px::checked_ratio() so a zero-width envelope can't leak infinity.

impl Neg for Px {
    type Output = Px;
    fn neg(self) -> Px { Px(-self.0) }
}

impl AddAssign for Px {
    fn add_assign(&mut self, rhs: Px) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Px {
    fn sub_assign(&mut self, rhs: Px) {
        self.0 -= rhs.0;
    }
}

impl Sum for Px {
    fn sum<I: Iterator<Item = Px>>(iter: I) -> Px {
        iter.fold(Px::ZERO, |acc, px| acc + px)
    }
}

impl fmt::Display for Px {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px", self.0)
    }
}

/// Angle in degrees
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[repr(transparent)]
pub struct Degrees(pub f64);

impl Degrees {
    #[inline]
    pub fn from_radians(rad: f64) -> Degrees {
        Degrees(rad.to_degrees())
    }

    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn tan(self) -> f64 {
        self.0.to_radians().tan()
    }

    /// Whole-degree quantization
    #[inline]
    pub fn round(self) -> Degrees {
        Degrees(self.0.round())
    }

    #[inline]
    pub fn clamp(self, lo: Degrees, hi: Degrees) -> Degrees {
        Degrees(self.0.max(lo.0).min(hi.0))
    }
}

impl fmt::Display for Degrees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// Available drawing area handed over by the host
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: Px,
    pub height: Px,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Viewport { width: Px(width), height: Px(height) }
    }

    /// Both dimensions strictly positive and finite
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width.0 > 0.0 && self.height.0 > 0.0
    }
}

/// Error for color strings that look like hex but aren't
#[derive(Debug, Clone, PartialEq)]
pub struct ColorParseError(pub String);

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid hex color: {}", self.0)
    }
}

impl std::error::Error for ColorParseError {}

/// Fill color for a segment or label.
///
/// Hex strings are normalized to `Rgb`; anything else (named colors, CSS
/// functions) is carried through untouched for the renderer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum Color {
    Rgb(u8, u8, u8),
    Raw(String),
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color::Rgb(r, g, b)
    }

    /// `#rrggbb` for hex-backed colors, the raw string otherwise
    pub fn to_css(&self) -> String {
        self.to_string()
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(hex) = s.strip_prefix('#') else {
            return Ok(Color::Raw(s.to_string()));
        };
        let bad = || ColorParseError(s.to_string());
        let digit = |c: char| c.to_digit(16).map(|d| d as u8).ok_or_else(bad);
        let chars: Vec<char> = hex.chars().collect();
        match chars.len() {
            3 => {
                let r = digit(chars[0])?;
                let g = digit(chars[1])?;
                let b = digit(chars[2])?;
                Ok(Color::Rgb(r * 17, g * 17, b * 17))
            }
            6 => {
                let byte = |i: usize| -> Result<u8, ColorParseError> {
                    Ok(digit(chars[i])? * 16 + digit(chars[i + 1])?)
                };
                Ok(Color::Rgb(byte(0)?, byte(2)?, byte(4)?))
            }
            _ => Err(bad()),
        }
    }
}

impl From<String> for Color {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(Color::Raw(s))
    }
}

impl From<&str> for Color {
    fn from(s: &str) -> Self {
        Color::from(s.to_string())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Rgb(r, g, b) => write!(f, "#{:02x}{:02x}{:02x}", r, g, b),
            Color::Raw(s) => write!(f, "{}", s),
        }
    }
}
