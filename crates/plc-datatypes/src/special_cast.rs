//! Conversions out of REAL and LREAL.
//!
//! Floating point sources do not follow the plain bit-pattern rules:
//!
//! - to a bit-string the IEEE encoding is kept and truncated to the width
//! - to an integer the value is truncated toward zero and saturated
//! - to BOOL the truncated value is compared against zero
//! - between REAL and LREAL the float is converted

use tracing::debug;

use plc_common::error::{DataTypeError, DataTypeResult};
use plc_common::iec_types::{DataTypeId, TypeClass};

use crate::any::IecAny;
use crate::cell::ValueCell;

/// Convert a REAL or LREAL cell. `None` for any other source or for a
/// target outside the numeric families.
pub(crate) fn special_cast_cell(from: DataTypeId, cell: ValueCell, to: DataTypeId) -> Option<ValueCell> {
    let value = match from {
        DataTypeId::Real => f64::from(cell.get_f32()),
        DataTypeId::LReal => cell.get_f64(),
        _ => return None,
    };
    let converted = match to.class() {
        TypeClass::BitString => ValueCell::canonical(to, cell.bits()),
        TypeClass::Bool => ValueCell::canonical(to, u64::from(value.trunc() != 0.0)),
        TypeClass::SignedInt => ValueCell::canonical(to, saturate_signed(value, to) as u64),
        TypeClass::UnsignedInt => ValueCell::canonical(to, saturate_unsigned(value, to)),
        TypeClass::Real => {
            let mut out = ValueCell::ZERO;
            if to == DataTypeId::Real {
                out.set_f32(value as f32);
            } else {
                out.set_f64(value);
            }
            out
        }
        _ => return None,
    };
    Some(converted)
}

// `as` from float truncates toward zero, saturates and maps NaN to 0.
fn saturate_signed(value: f64, to: DataTypeId) -> i64 {
    match to {
        DataTypeId::SInt => i64::from(value as i8),
        DataTypeId::Int => i64::from(value as i16),
        DataTypeId::DInt => i64::from(value as i32),
        _ => value as i64,
    }
}

fn saturate_unsigned(value: f64, to: DataTypeId) -> u64 {
    match to {
        DataTypeId::USInt => u64::from(value as u8),
        DataTypeId::UInt => u64::from(value as u16),
        DataTypeId::UDInt => u64::from(value as u32),
        _ => value as u64,
    }
}

/// Assign a REAL or LREAL `source` to `target` using the floating point rules.
///
/// # Errors
///
/// Returns [`DataTypeError::NotCastable`] when `source` is not a real or
/// `target` is not a numeric scalar.
pub fn special_cast(source: &dyn IecAny, target: &mut dyn IecAny) -> DataTypeResult<()> {
    let source = source.unwrap_any();
    let target = target.unwrap_any_mut();
    let (from, to) = (source.data_type_id(), target.data_type_id());
    let converted =
        special_cast_cell(from, *source.base().cell(), to).ok_or(DataTypeError::NotCastable { from, to })?;
    debug!(%from, %to, bits = converted.bits(), "special_cast");
    target.base_mut().set_cell(converted);
    Ok(())
}
