use std::fmt;

/// Standard resistor band colors.
///
/// Digits 0-9 map to black through white; gold and silver only appear as
/// multiplier (10^-1, 10^-2) or tolerance bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResistorColor {
    Silver,
    Gold,
    Black,
    Brown,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Violet,
    Grey,
    White,
}

impl ResistorColor {
    pub const ALL: [ResistorColor; 12] = [
        Self::Silver,
        Self::Gold,
        Self::Black,
        Self::Brown,
        Self::Red,
        Self::Orange,
        Self::Yellow,
        Self::Green,
        Self::Blue,
        Self::Violet,
        Self::Grey,
        Self::White,
    ];

    /// Digit or power-of-ten exponent this band stands for.
    pub const fn code(self) -> i32 {
        match self {
            Self::Silver => -2,
            Self::Gold => -1,
            Self::Black => 0,
            Self::Brown => 1,
            Self::Red => 2,
            Self::Orange => 3,
            Self::Yellow => 4,
            Self::Green => 5,
            Self::Blue => 6,
            Self::Violet => 7,
            Self::Grey => 8,
            Self::White => 9,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|color| color.code() == code)
    }

    /// Fill color used when printing the band on a label.
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Silver => "#C0C0C0",
            Self::Gold => "#CFB53B",
            Self::Black => "#000000",
            Self::Brown => "#964B00",
            Self::Red => "#FF0000",
            Self::Orange => "#FFA500",
            Self::Yellow => "#FFFF00",
            Self::Green => "#9ACD32",
            Self::Blue => "#6495ED",
            Self::Violet => "#EE82EE",
            Self::Grey => "#A0A0A0",
            Self::White => "#FFFFFF",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Black => "black",
            Self::Brown => "brown",
            Self::Red => "red",
            Self::Orange => "orange",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Violet => "violet",
            Self::Grey => "grey",
            Self::White => "white",
        }
    }

    /// Tolerance band for a percentage such as `±5%`, `1%` or `0.25`.
    ///
    /// Returns `None` for tolerances without a standard band.
    pub fn from_tolerance(tolerance: &str) -> Option<Self> {
        let trimmed = tolerance.trim();
        let trimmed = trimmed
            .strip_prefix('±')
            .or_else(|| trimmed.strip_prefix("+/-"))
            .unwrap_or(trimmed)
            .trim();
        let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
        let number = if number.contains('.') {
            number.trim_end_matches('0').trim_end_matches('.')
        } else {
            number
        };
        let color = match number {
            "1" => Self::Brown,
            "2" => Self::Red,
            "0.5" => Self::Green,
            "0.25" => Self::Blue,
            "0.1" => Self::Violet,
            "0.05" => Self::Grey,
            "5" => Self::Gold,
            "10" => Self::Silver,
            _ => return None,
        };
        Some(color)
    }
}

impl fmt::Display for ResistorColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for color in ResistorColor::ALL {
            assert_eq!(ResistorColor::from_code(color.code()), Some(color));
        }
        assert_eq!(ResistorColor::from_code(10), None);
        assert_eq!(ResistorColor::from_code(-3), None);
    }

    #[test]
    fn tolerance_bands() {
        assert_eq!(ResistorColor::from_tolerance("±5%"), Some(ResistorColor::Gold));
        assert_eq!(ResistorColor::from_tolerance("1%"), Some(ResistorColor::Brown));
        assert_eq!(ResistorColor::from_tolerance("+/-0.50%"), Some(ResistorColor::Green));
        assert_eq!(ResistorColor::from_tolerance("10.0"), Some(ResistorColor::Silver));
        assert_eq!(ResistorColor::from_tolerance("±20%"), None);
        assert_eq!(ResistorColor::from_tolerance("?"), None);
    }
}
