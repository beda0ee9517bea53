//! Value label formatting (display units and decimal places)

/// Scale applied to a value before it is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayUnit {
    /// Pick a unit from the magnitude of the value
    Auto,
    None,
    Thousands,
    Millions,
    Billions,
    Trillions,
}

impl DisplayUnit {
    /// Map the host's numeric setting (0 = auto, 1 = none, 1000 = K, ...).
    /// Unrecognized numbers fall back to auto.
    pub fn from_setting(value: f64) -> DisplayUnit {
        match value {
            v if v == 1.0 => DisplayUnit::None,
            v if v == 1e3 => DisplayUnit::Thousands,
            v if v == 1e6 => DisplayUnit::Millions,
            v if v == 1e9 => DisplayUnit::Billions,
            v if v == 1e12 => DisplayUnit::Trillions,
            _ => DisplayUnit::Auto,
        }
    }

    fn for_magnitude(value: f64) -> DisplayUnit {
        let v = value.abs();
        if v >= 1e12 {
            DisplayUnit::Trillions
        } else if v >= 1e9 {
            DisplayUnit::Billions
        } else if v >= 1e6 {
            DisplayUnit::Millions
        } else if v >= 1e3 {
            DisplayUnit::Thousands
        } else {
            DisplayUnit::None
        }
    }

    fn divisor(self) -> f64 {
        match self {
            DisplayUnit::Auto | DisplayUnit::None => 1.0,
            DisplayUnit::Thousands => 1e3,
            DisplayUnit::Millions => 1e6,
            DisplayUnit::Billions => 1e9,
            DisplayUnit::Trillions => 1e12,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            DisplayUnit::Auto | DisplayUnit::None => "",
            DisplayUnit::Thousands => "K",
            DisplayUnit::Millions => "M",
            DisplayUnit::Billions => "bn",
            DisplayUnit::Trillions => "T",
        }
    }
}

/// Largest decimal count the host allows
const MAX_DECIMALS: f64 = 9.0;

/// Format `value` with the host's display unit and decimal place settings.
pub fn format_value(value: f64, display_unit: f64, decimal_places: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    let unit = match DisplayUnit::from_setting(display_unit) {
        DisplayUnit::Auto => DisplayUnit::for_magnitude(value),
        unit => unit,
    };
    let decimals = if decimal_places.is_finite() {
        decimal_places.round().clamp(0.0, MAX_DECIMALS) as usize
    } else {
        0
    };
    let scaled = value / unit.divisor();
    format!("{}{}", group_thousands(&format!("{:.*}", decimals, scaled)), unit.suffix())
}

/// Tooltip formatting: no unit, integers bare, fractions to two places.
pub fn format_plain(value: f64) -> String {
    let decimals = if value.fract() == 0.0 { 0.0 } else { 2.0 };
    format_value(value, 1.0, decimals)
}

/// Insert `,` separators into the integer part of a formatted number
fn group_thousands(formatted: &str) -> String {
    let (sign, rest) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}
