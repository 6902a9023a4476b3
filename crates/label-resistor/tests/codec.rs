use label_resistor::{BandCode, ResistanceError, ResistorColor, decode};
use proptest::prelude::*;

fn coded(value: &str) -> [ResistorColor; 3] {
    let code = decode(value).expect("decodes");
    assert!(!code.is_blank(), "{value} decoded blank");
    code.bands()
}

#[test]
fn decodes_e12_series_across_decades() {
    use ResistorColor::{Black, Brown, Orange, Red, Violet, Yellow};
    assert_eq!(coded("4.7k"), [Yellow, Violet, Red]);
    assert_eq!(coded("100"), [Brown, Black, Brown]);
    assert_eq!(coded("1M"), [Brown, Black, ResistorColor::Green]);
    assert_eq!(coded("33k"), [Orange, Orange, Orange]);
    assert_eq!(coded("1.2"), [Brown, Red, ResistorColor::Gold]);
}

#[test]
fn blank_slot_is_all_white() {
    assert_eq!(decode("").unwrap(), BandCode::Blank);
    assert_eq!(
        decode("").unwrap().bands().map(ResistorColor::hex),
        ["#FFFFFF"; 3]
    );
}

#[test]
fn errors_name_the_offending_value() {
    let err = decode("0.1k").unwrap_err();
    assert_eq!(
        err,
        ResistanceError::SubOhm {
            value: "0.1k".to_string()
        }
    );
    assert!(err.to_string().contains("0.1k"));
}

proptest! {
    #[test]
    fn plain_digit_strings_decode_exactly(first in 1i32..=9, second in 0i32..=9, zeros in 0usize..=8) {
        let value = format!("{first}{second}{}", "0".repeat(zeros));
        let BandCode::Coded(bands) = decode(&value).unwrap() else {
            panic!("blank for {value}");
        };
        prop_assert_eq!(bands.digits(), (first, second, zeros as i32));
    }

    #[test]
    fn suffix_and_decimal_forms_agree(first in 1i32..=9, second in 0i32..=9) {
        // d.d k == dd00
        let decimal = decode(&format!("{first}.{second}k")).unwrap();
        let plain = decode(&format!("{first}{second}00")).unwrap();
        prop_assert_eq!(decimal, plain);
    }
}
