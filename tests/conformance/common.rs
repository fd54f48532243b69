//! Shared helpers for the conformance tests.

#![allow(dead_code)] // Not every helper is used by every test module

use plc_datatypes::{AnyValue, DataTypeId, TypeClass};

/// Every built-in id with a storage cell.
pub fn scalar_ids() -> Vec<DataTypeId> {
    DataTypeId::FIXED
        .iter()
        .copied()
        .filter(|id| id.bit_width() > 0)
        .collect()
}

/// BOOL, integers, bit-strings and reals.
pub fn numeric_ids() -> Vec<DataTypeId> {
    scalar_ids()
        .into_iter()
        .filter(|id| {
            matches!(
                id.class(),
                TypeClass::Bool
                    | TypeClass::SignedInt
                    | TypeClass::UnsignedInt
                    | TypeClass::BitString
                    | TypeClass::Real
            )
        })
        .collect()
}

/// Parse a literal of a known type, panicking with context on failure.
pub fn value(type_id: DataTypeId, text: &str) -> AnyValue {
    AnyValue::parse_as(type_id, text).unwrap_or_else(|err| panic!("{type_id} {text:?}: {err}"))
}

/// Parse a self-describing literal such as `INT#5`.
pub fn typed(text: &str) -> AnyValue {
    AnyValue::parse_typed(text).unwrap_or_else(|err| panic!("{text:?}: {err}"))
}
