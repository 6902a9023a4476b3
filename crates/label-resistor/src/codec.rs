use crate::colors::ResistorColor;
use crate::error::ResistanceError;

/// Outline color drawn around a coded resistor.
pub const STROKE_HEX: &str = "#000000";
/// Outline color for an empty slot, matching the label background.
pub const BLANK_STROKE_HEX: &str = "#FFFFFF";

/// Bands of a decoded resistance: two significant digits and a multiplier,
/// plus an optional tolerance band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorBands {
    pub first: ResistorColor,
    pub second: ResistorColor,
    pub multiplier: ResistorColor,
    pub tolerance: Option<ResistorColor>,
}

impl ColorBands {
    /// First digit, second digit and power-of-ten exponent.
    pub fn digits(&self) -> (i32, i32, i32) {
        (
            self.first.code(),
            self.second.code(),
            self.multiplier.code(),
        )
    }
}

/// Result of decoding a resistance cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandCode {
    /// No value: the slot is drawn with white bands and a white outline.
    Blank,
    Coded(ColorBands),
}

impl BandCode {
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank)
    }

    /// The three value bands, in body order.
    pub fn bands(&self) -> [ResistorColor; 3] {
        match self {
            Self::Blank => [ResistorColor::White; 3],
            Self::Coded(bands) => [bands.first, bands.second, bands.multiplier],
        }
    }

    pub fn tolerance(&self) -> Option<ResistorColor> {
        match self {
            Self::Blank => None,
            Self::Coded(bands) => bands.tolerance,
        }
    }

    pub fn stroke_hex(&self) -> &'static str {
        match self {
            Self::Blank => BLANK_STROKE_HEX,
            Self::Coded(_) => STROKE_HEX,
        }
    }

    /// Attach a tolerance band. Blank codes stay blank.
    pub fn with_tolerance(self, tolerance: Option<ResistorColor>) -> Self {
        match self {
            Self::Blank => Self::Blank,
            Self::Coded(bands) => Self::Coded(ColorBands { tolerance, ..bands }),
        }
    }
}

fn multiplier_offset(suffix: char) -> Option<i32> {
    match suffix {
        'k' => Some(3),
        'M' => Some(6),
        'G' => Some(9),
        _ => None,
    }
}

/// Decode a resistance such as `4.7k`, `100` or `1M` into band colors.
///
/// The value is digits with an optional decimal point and an optional
/// `k`/`M`/`G` suffix; a trailing `Ω` is ignored. An empty value decodes to
/// [`BandCode::Blank`]. Sub-ohm values (`0.47`), values with a leading zero
/// (`01k`, `0`) and values whose digits past the second are non-zero are
/// rejected rather than rounded.
pub fn decode(value: &str) -> Result<BandCode, ResistanceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(BandCode::Blank);
    }
    let trimmed = trimmed.strip_suffix('Ω').unwrap_or(trimmed).trim_end();

    let (digits, offset) = match trimmed.chars().last() {
        Some(suffix) if suffix.is_ascii_alphabetic() => {
            let offset =
                multiplier_offset(suffix).ok_or_else(|| ResistanceError::UnknownMultiplier {
                    value: value.to_string(),
                    suffix,
                })?;
            (&trimmed[..trimmed.len() - suffix.len_utf8()], offset)
        }
        _ => (trimmed, 0),
    };
    if digits.is_empty() {
        return Err(ResistanceError::MissingDigits {
            value: value.to_string(),
        });
    }

    let mut seen_point = false;
    for (index, ch) in digits.char_indices() {
        let leading_point = ch == '.' && (index == 0 || seen_point);
        if leading_point || !(ch.is_ascii_digit() || ch == '.') {
            return Err(ResistanceError::InvalidCharacter {
                value: value.to_string(),
                found: ch,
            });
        }
        seen_point |= ch == '.';
    }

    let (significant, exponent) = match digits.find('.') {
        Some(1) if digits.starts_with('0') => {
            return Err(ResistanceError::SubOhm {
                value: value.to_string(),
            });
        }
        Some(point) => (digits.replace('.', ""), point as i32 - 2 + offset),
        None => (digits.to_string(), digits.len() as i32 - 2 + offset),
    };

    if significant.starts_with('0') {
        return Err(ResistanceError::LeadingZero {
            value: value.to_string(),
        });
    }

    let mut codes = significant.bytes().map(|b| i32::from(b - b'0'));
    let first = codes.next().unwrap_or(0);
    let second = codes.next().unwrap_or(0);
    if codes.any(|code| code != 0) {
        return Err(ResistanceError::TooManySignificantDigits {
            value: value.to_string(),
        });
    }

    let multiplier =
        ResistorColor::from_code(exponent).ok_or_else(|| ResistanceError::ExponentOutOfRange {
            value: value.to_string(),
            exponent,
        })?;
    let digit = |code: i32| ResistorColor::from_code(code).unwrap_or(ResistorColor::Black);
    Ok(BandCode::Coded(ColorBands {
        first: digit(first),
        second: digit(second),
        multiplier,
        tolerance: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits(value: &str) -> (i32, i32, i32) {
        match decode(value).expect("decodes") {
            BandCode::Coded(bands) => bands.digits(),
            BandCode::Blank => panic!("unexpected blank for {value}"),
        }
    }

    #[test]
    fn canonical_values() {
        assert_eq!(digits("4.7k"), (4, 7, 2));
        assert_eq!(digits("100"), (1, 0, 1));
        assert_eq!(digits("1M"), (1, 0, 5));
        assert_eq!(digits("2.2"), (2, 2, -1));
        assert_eq!(digits("10"), (1, 0, 0));
        assert_eq!(digits("5"), (5, 0, -1));
        assert_eq!(digits("1.5G"), (1, 5, 8));
        assert_eq!(digits("47.0k"), (4, 7, 3));
        assert_eq!(digits("330Ω"), (3, 3, 1));
    }

    #[test]
    fn empty_is_blank() {
        let code = decode("").expect("blank");
        assert!(code.is_blank());
        assert_eq!(code.bands(), [ResistorColor::White; 3]);
        assert_eq!(code.stroke_hex(), BLANK_STROKE_HEX);
    }

    #[test]
    fn rejects_sub_ohm() {
        assert!(matches!(decode("0.47"), Err(ResistanceError::SubOhm { .. })));
    }

    #[test]
    fn rejects_leading_zero() {
        assert!(matches!(decode("01k"), Err(ResistanceError::LeadingZero { .. })));
        assert!(matches!(decode("0"), Err(ResistanceError::LeadingZero { .. })));
        assert!(matches!(decode("00.5k"), Err(ResistanceError::LeadingZero { .. })));
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(matches!(
            decode("4.7m"),
            Err(ResistanceError::UnknownMultiplier { suffix: 'm', .. })
        ));
        assert!(matches!(decode("k"), Err(ResistanceError::MissingDigits { .. })));
        assert!(matches!(
            decode(".5k"),
            Err(ResistanceError::InvalidCharacter { found: '.', .. })
        ));
        assert!(matches!(
            decode("1.2.3"),
            Err(ResistanceError::InvalidCharacter { found: '.', .. })
        ));
        assert!(matches!(
            decode("4 7"),
            Err(ResistanceError::InvalidCharacter { found: ' ', .. })
        ));
        assert!(matches!(
            decode("4.75k"),
            Err(ResistanceError::TooManySignificantDigits { .. })
        ));
        assert!(matches!(
            decode("100G"),
            Err(ResistanceError::ExponentOutOfRange { exponent: 10, .. })
        ));
    }

    #[test]
    fn tolerance_is_carried_on_coded_values_only() {
        let gold = Some(ResistorColor::Gold);
        assert_eq!(decode("1k").unwrap().with_tolerance(gold).tolerance(), gold);
        assert_eq!(decode("").unwrap().with_tolerance(gold).tolerance(), None);
    }
}
