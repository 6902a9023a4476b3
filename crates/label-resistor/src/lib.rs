//! Resistor color band decoding.
//!
//! Resistance strings such as `4.7k` are decoded digit by digit without
//! going through floating point, so values like `4.69999999999k` can never
//! appear.

#![deny(unsafe_code)]

pub mod codec;
pub mod colors;
pub mod error;

pub use codec::{BLANK_STROKE_HEX, BandCode, ColorBands, STROKE_HEX, decode};
pub use colors::ResistorColor;
pub use error::ResistanceError;
