use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResistanceError {
    #[error("resistance {value:?} has no digits")]
    MissingDigits { value: String },

    #[error("resistance {value:?} has unknown multiplier suffix '{suffix}'")]
    UnknownMultiplier { value: String, suffix: char },

    #[error("resistance {value:?} contains unexpected character '{found}'")]
    InvalidCharacter { value: String, found: char },

    #[error("resistance {value:?} is below 1 ohm; sub-ohm band codes are not supported")]
    SubOhm { value: String },

    #[error("resistance {value:?} starts with a zero digit, which no first band can show")]
    LeadingZero { value: String },

    #[error("resistance {value:?} has more than two significant digits")]
    TooManySignificantDigits { value: String },

    #[error("resistance {value:?} needs multiplier 10^{exponent}, which has no band color")]
    ExponentOutOfRange { value: String, exponent: i32 },
}
