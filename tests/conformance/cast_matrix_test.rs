//! Castability matrix tests.
//!
//! # Acceptance Criteria
//!
//! - Every type is up-castable to itself
//! - Widening inside an integer family is an up-cast, narrowing a down-cast
//! - Every up-cast between numeric types preserves the extreme values
//! - Unrelated families are not castable

use plc_common::config::CastPolicy;
use plc_datatypes::{
    cast_value, is_castable, is_castable_code, limits_summary, validate_connection, AnyValue, Castability,
    DataTypeError, DataTypeId, TypeClass,
};

use super::common::{numeric_ids, scalar_ids, typed, value};

#[test]
fn test_identity_is_up_cast() {
    for &id in DataTypeId::FIXED {
        assert_eq!(is_castable(id, id), Castability::UpCast, "{id}");
    }
    assert_eq!(
        is_castable(DataTypeId::External(500), DataTypeId::External(500)),
        Castability::UpCast
    );
}

#[test]
fn test_integer_families_widen_up_and_narrow_down() {
    let families = [
        [DataTypeId::SInt, DataTypeId::Int, DataTypeId::DInt, DataTypeId::LInt],
        [DataTypeId::USInt, DataTypeId::UInt, DataTypeId::UDInt, DataTypeId::ULInt],
        [DataTypeId::Byte, DataTypeId::Word, DataTypeId::DWord, DataTypeId::LWord],
    ];
    for family in families {
        for (i, &narrow) in family.iter().enumerate() {
            for &wide in &family[i + 1..] {
                assert_eq!(is_castable(narrow, wide), Castability::UpCast, "{narrow} -> {wide}");
                assert_eq!(is_castable(wide, narrow), Castability::DownCast, "{wide} -> {narrow}");
            }
        }
    }
}

#[test]
fn test_temporal_and_string_families() {
    let pairs = [
        (DataTypeId::Time, DataTypeId::LTime),
        (DataTypeId::Date, DataTypeId::LDate),
        (DataTypeId::TimeOfDay, DataTypeId::LTimeOfDay),
        (DataTypeId::DateAndTime, DataTypeId::LDateAndTime),
        (DataTypeId::String, DataTypeId::WString),
        (DataTypeId::Char, DataTypeId::WChar),
    ];
    for (short, long) in pairs {
        assert_eq!(is_castable(short, long), Castability::UpCast);
        assert_eq!(is_castable(long, short), Castability::DownCast);
    }
    assert_eq!(
        is_castable(DataTypeId::DateAndTime, DataTypeId::Date),
        Castability::DownCast
    );
    assert_eq!(
        is_castable(DataTypeId::Date, DataTypeId::DateAndTime),
        Castability::NotCastable
    );
}

#[test]
fn test_unrelated_families_not_castable() {
    for id in numeric_ids() {
        for other in [
            DataTypeId::Time,
            DataTypeId::Date,
            DataTypeId::TimeOfDay,
            DataTypeId::DateAndTime,
            DataTypeId::String,
            DataTypeId::WString,
            DataTypeId::Struct,
        ] {
            assert_eq!(is_castable(id, other), Castability::NotCastable, "{id} -> {other}");
            assert_eq!(is_castable(other, id), Castability::NotCastable, "{other} -> {id}");
        }
    }
}

#[test]
fn test_castable_codes() {
    assert_eq!(
        is_castable_code(DataTypeId::Int.code(), DataTypeId::DInt.code()),
        Castability::UpCast
    );
    assert_eq!(is_castable_code(3, 200), Castability::NotCastable);
    assert_eq!(is_castable_code(200, 3), Castability::NotCastable);
}

/// Extreme values of a numeric type, as typed values.
fn extremes(id: DataTypeId) -> Vec<AnyValue> {
    let Some(limits) = limits_summary(id) else {
        return Vec::new();
    };
    vec![value(id, &limits.max), value(id, &limits.lowest)]
}

#[test]
fn test_up_casts_preserve_extremes() {
    let mut checked = 0;
    for from in numeric_ids() {
        for to in scalar_ids() {
            if from == to || !is_castable(from, to).is_up_cast() {
                continue;
            }
            for source in extremes(from) {
                let widened = cast_value(source.as_dyn(), to).unwrap();
                assert_eq!(widened.data_type_id(), to);
                let back = cast_value(widened.as_dyn(), from).unwrap();
                assert_eq!(back, source, "{from} -> {to} -> {from}");
                checked += 1;
            }
        }
    }
    assert!(checked > 50, "only {checked} up-casts checked");
}

#[test]
fn test_narrowing_wraps() {
    let narrowed = cast_value(typed("INT#300").as_dyn(), DataTypeId::SInt).unwrap();
    assert_eq!(narrowed.to_string(), "SINT#44");
    let narrowed = cast_value(typed("DINT#-1").as_dyn(), DataTypeId::UInt).unwrap();
    assert_eq!(narrowed.to_string(), "UINT#65535");
    let flag = cast_value(typed("UDINT#256").as_dyn(), DataTypeId::Bool).unwrap();
    assert_eq!(flag.to_string(), "BOOL#TRUE");
}

#[test]
fn test_date_and_time_splits() {
    let stamp = typed("DT#2024-01-15-13:45:30");
    let date = cast_value(stamp.as_dyn(), DataTypeId::Date).unwrap();
    assert_eq!(date.to_string(), "D#2024-01-15");
    let time = cast_value(stamp.as_dyn(), DataTypeId::TimeOfDay).unwrap();
    assert_eq!(time.to_string(), "TOD#13:45:30.000");
}

#[test]
fn test_cast_value_rejects_unrelated() {
    assert_eq!(
        cast_value(typed("T#1s").as_dyn(), DataTypeId::LInt),
        Err(DataTypeError::NotCastable {
            from: DataTypeId::Time,
            to: DataTypeId::LInt
        })
    );
}

#[test]
fn test_connection_policy() {
    for id in scalar_ids() {
        assert!(validate_connection(id, id, CastPolicy::ImplicitOnly).is_ok());
    }
    assert_eq!(
        validate_connection(DataTypeId::LReal, DataTypeId::Real, CastPolicy::ImplicitOnly),
        Err(DataTypeError::ExplicitCastRequired {
            from: DataTypeId::LReal,
            to: DataTypeId::Real
        })
    );
    assert_eq!(
        validate_connection(DataTypeId::LReal, DataTypeId::Real, CastPolicy::AllowExplicit),
        Ok(Castability::DownCast)
    );
    let structural: Vec<_> = DataTypeId::FIXED
        .iter()
        .filter(|id| id.class() == TypeClass::Structural)
        .collect();
    for &id in structural {
        assert!(validate_connection(DataTypeId::Int, id, CastPolicy::AllowExplicit).is_err());
    }
}
