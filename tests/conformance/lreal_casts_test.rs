//! LREAL special-cast acceptance table.
//!
//! # Acceptance Criteria
//!
//! - LREAL to bit-strings keeps the IEEE-754 encoding, truncated to width
//! - LREAL to BOOL truncates toward zero and compares against zero
//! - LREAL to REAL and to integers converts the value

use plc_datatypes::{cast, special_cast, Bool, Byte, DInt, DWord, LReal, LWord, Real, Word};

use super::common::typed;

/// `(value, LWORD pattern, BOOL)`.
const TABLE: [(f64, u64, bool); 5] = [
    (1.0, 0x3FF0_0000_0000_0000, true),
    (2.2874e6, 0x4141_7394_0000_0000, true),
    (-6.2587e-4, 0xBF44_822D_973C_F2FB, false),
    (1.0e-37, 0x3841_039D_428A_8B8F, false),
    (36.0, 0x4042_0000_0000_0000, true),
];

#[test]
fn test_bit_string_patterns() {
    for (value, pattern, _) in TABLE {
        let source = LReal::new(value);
        assert_eq!(cast::<LWord, _>(&source).value(), pattern, "{value}");
        assert_eq!(u64::from(cast::<DWord, _>(&source).value()), pattern & 0xFFFF_FFFF);
        assert_eq!(u64::from(cast::<Word, _>(&source).value()), pattern & 0xFFFF);
        assert_eq!(u64::from(cast::<Byte, _>(&source).value()), pattern & 0xFF);
    }
}

#[test]
fn test_bool_truth_table() {
    for (value, _, truth) in TABLE {
        assert_eq!(cast::<Bool, _>(&LReal::new(value)).value(), truth, "{value}");
    }
    assert!(!cast::<Bool, _>(&LReal::new(0.0)).value());
    assert!(!cast::<Bool, _>(&LReal::new(-0.9)).value());
}

#[test]
fn test_value_conversions() {
    assert_eq!(cast::<Real, _>(&LReal::new(36.0)).value(), 36.0);
    assert_eq!(cast::<DInt, _>(&LReal::new(2.2874e6)).value(), 2_287_400);
    assert_eq!(cast::<DInt, _>(&LReal::new(-36.9)).value(), -36);
    assert_eq!(cast::<DInt, _>(&LReal::new(1.0e300)).value(), i32::MAX);
}

#[test]
fn test_dynamic_special_cast_keeps_target_type() {
    let mut target = typed("BYTE#16#00");
    special_cast(typed("LREAL#-6.2587e-4").as_dyn(), target.as_dyn_mut()).unwrap();
    assert_eq!(target.to_string(), "BYTE#16#FB");

    let mut target = typed("BOOL#TRUE");
    special_cast(typed("LREAL#1.0e-37").as_dyn(), target.as_dyn_mut()).unwrap();
    assert_eq!(target.to_string(), "BOOL#FALSE");
}

#[test]
fn test_special_cast_rejects_non_real_source() {
    let mut target = typed("INT#0");
    assert!(special_cast(typed("DINT#5").as_dyn(), target.as_dyn_mut()).is_err());
    assert_eq!(target.to_string(), "INT#0");
}
