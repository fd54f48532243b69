//! Property tests for literal rendering and parsing.
//!
//! Every value rendered with `to_iec_string` must parse back to the same
//! bit pattern, and typed literals rendered by `AnyValue` must parse back
//! to an equal value.

use plc_datatypes::{
    cast_value, to_display_string, AnyValue, DataTypeId, Date, DateAndTime, DInt, IecAny, IecString, IecWString, LDate, LDateAndTime, LReal,
    LTime, LTimeOfDay, LWord, Real, SInt, Time, TimeOfDay, UDInt,
};
use proptest::prelude::*;

fn read_back<T: IecAny + Default>(value: &T) -> T {
    let text = to_display_string(value).unwrap();
    let mut parsed = T::default();
    assert_eq!(parsed.from_iec_string(&text), Ok(text.len()), "{text:?}");
    parsed
}

proptest! {
    #[test]
    fn prop_integers_read_back(a in any::<i8>(), b in any::<i32>(), c in any::<u32>(), d in any::<u64>()) {
        prop_assert_eq!(read_back(&SInt::new(a)).value(), a);
        prop_assert_eq!(read_back(&DInt::new(b)).value(), b);
        prop_assert_eq!(read_back(&UDInt::new(c)).value(), c);
        prop_assert_eq!(read_back(&LWord::new(d)).value(), d);
    }

    #[test]
    fn prop_reals_read_back(narrow in any::<u32>(), wide in any::<u64>()) {
        prop_assert_eq!(read_back(&Real::new(f32::from_bits(narrow))).value().to_bits(), narrow);
        prop_assert_eq!(read_back(&LReal::new(f64::from_bits(wide))).value().to_bits(), wide);
    }

    #[test]
    fn prop_durations_read_back(short in any::<i64>(), long in any::<i64>()) {
        prop_assert_eq!(read_back(&Time::new(short)).value(), short);
        prop_assert_eq!(read_back(&LTime::new(long)).value(), long);
    }

    #[test]
    fn prop_calendar_read_back(nanos in any::<u64>()) {
        let date = Date::new(nanos);
        prop_assert_eq!(read_back(&date), date);
        let date = LDate::new(nanos);
        prop_assert_eq!(read_back(&date), date);
        let tod = TimeOfDay::new(nanos);
        prop_assert_eq!(read_back(&tod), tod);
        let tod = LTimeOfDay::new(nanos);
        prop_assert_eq!(read_back(&tod), tod);
        let stamp = DateAndTime::new(nanos);
        prop_assert_eq!(read_back(&stamp).value(), nanos);
        let stamp = LDateAndTime::new(nanos);
        prop_assert_eq!(read_back(&stamp).value(), nanos);
    }

    #[test]
    fn prop_strings_read_back(bytes in prop::collection::vec(any::<u8>(), 0..64),
                              units in prop::collection::vec(any::<u16>(), 0..32)) {
        let narrow = IecString::from_bytes(bytes);
        prop_assert_eq!(read_back(&narrow), narrow);
        let wide = IecWString::from_units(units);
        prop_assert_eq!(read_back(&wide), wide);
    }

    #[test]
    fn prop_typed_literals_read_back(value in any::<i16>(), word in any::<u16>()) {
        for text in [format!("INT#{value}"), format!("WORD#{word}"), format!("UINT#16#{word:X}")] {
            let parsed = AnyValue::parse_typed(&text).unwrap();
            let again = AnyValue::parse_typed(&parsed.to_string()).unwrap();
            prop_assert_eq!(again, parsed);
        }
    }
}

#[test]
fn test_rendering_is_canonical() {
    for (text, rendered) in [
        ("int#+00042", "INT#42"),
        ("word#2#1111_0000", "WORD#16#F0"),
        ("LREAL#1E3", "LREAL#1000.0"),
        ("t#90m", "T#1h30m"),
        ("TIME_OF_DAY#7:05:00", "TOD#07:05:00.000"),
    ] {
        let value = AnyValue::parse_typed(text).unwrap();
        assert_eq!(value.to_string(), rendered, "{text}");
    }
}

#[test]
fn test_nan_payload_survives_reinterpretation() {
    let bits = AnyValue::parse_typed("LWORD#16#FFF8000000000001").unwrap();
    let real = cast_value(bits.as_dyn(), DataTypeId::LReal).unwrap();
    assert_eq!(real.to_string(), "LREAL#-NaN(16#8000000000001)");
    let again = AnyValue::parse_typed(&real.to_string()).unwrap();
    assert_eq!(again, real);
}

#[test]
fn test_leaf_rendering_omits_type_prefix() {
    assert_eq!(to_display_string(&SInt::new(-5)).unwrap(), "-5");
    assert_eq!(to_display_string(&LWord::new(255)).unwrap(), "16#FF");
    assert_eq!(to_display_string(&IecString::from("a'b")).unwrap(), "'a$'b'");
}
