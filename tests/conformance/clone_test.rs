//! Cloning into caller storage, equality and the forced flag.
//!
//! # Acceptance Criteria
//!
//! - `clone_into_slot` produces an equal value of the same type
//! - The clone is independent of the original
//! - The forced flag is never copied by clones or assignments
//! - `equals` is reflexive and type-strict

use plc_datatypes::{AnyValue, AnyVariant, DataTypeId, IecAny, IecString, Int, ValueSlot};

use super::common::{scalar_ids, typed};

#[test]
fn test_clone_every_builtin() {
    let mut slot = ValueSlot::new();
    let ids = scalar_ids()
        .into_iter()
        .chain([DataTypeId::String, DataTypeId::WString, DataTypeId::Any]);
    for id in ids {
        let original = AnyValue::new(id).unwrap();
        let clone = original.as_dyn().clone_into_slot(&mut slot);
        assert_eq!(clone.data_type_id(), id);
        assert!(clone.equals(original.as_dyn()), "{id}");
        assert!(original.as_dyn().equals(clone), "{id}");
        if id.bit_width() > 0 {
            assert_eq!(clone.iec_memory_size(), id.iec_memory_size());
        }
    }
}

#[test]
fn test_clone_is_independent() {
    let original = typed("'motor'");
    let mut slot = ValueSlot::new();
    slot.store(AnyValue::from(IecString::from("other")));
    let clone = original.as_dyn().clone_into_slot(&mut slot);
    clone.from_iec_string("'valve'").unwrap();

    assert_eq!(original.to_string(), "'motor'");
    assert_eq!(slot.take().map(|value| value.to_string()), Some("'valve'".to_owned()));
    assert!(slot.is_empty());
}

#[test]
fn test_forced_flag_is_not_copied() {
    let mut source = Int::new(7);
    source.set_forced(true);

    let mut slot = ValueSlot::new();
    let clone = source.clone_into_slot(&mut slot);
    assert!(!clone.is_forced());
    assert!(clone.equals(&source));

    let mut target = Int::new(0);
    target.set_forced(true);
    target.set_value(&Int::new(9)).unwrap();
    assert!(target.is_forced());
    assert_eq!(target.value(), 9);

    let copy = source.clone();
    assert!(!copy.is_forced());
}

#[test]
fn test_equality_is_reflexive_and_type_strict() {
    let values = [
        typed("INT#5"),
        typed("UINT#5"),
        typed("WORD#5"),
        typed("LREAL#5.0"),
        typed("T#5ns"),
        typed("'5'"),
    ];
    for (i, a) in values.iter().enumerate() {
        assert!(a.as_dyn().equals(a.as_dyn()));
        for b in &values[i + 1..] {
            assert!(!a.as_dyn().equals(b.as_dyn()), "{a} == {b}");
        }
    }
}

#[test]
fn test_variant_holds_clone() {
    let variant = AnyVariant::new(typed("DINT#-3"));
    let mut slot = ValueSlot::new();
    let clone = variant.clone_into_slot(&mut slot);
    assert!(clone.equals(&variant));
    assert_eq!(clone.unwrap_any().data_type_id(), DataTypeId::DInt);
}
