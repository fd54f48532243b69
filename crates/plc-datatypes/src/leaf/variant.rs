//! The `ANY` container.
//!
//! An [`AnyVariant`] holds at most one built-in value and is otherwise
//! transparent: [`IecAny::unwrap_any`] yields the payload, so assignments,
//! comparisons and casts act on the contained value.

use std::fmt::{self, Write as _};

use plc_common::error::DataTypeResult;
use plc_common::iec_types::DataTypeId;

use crate::any::{downcast_ref, AnyBase, IecAny, ValueSlot};
use crate::dynamic::{typed_literal_prefix, AnyValue};
use crate::literal;
use crate::type_name::TypeNameId;

use super::TypedValue;

/// Container for a value of any built-in type.
#[derive(Default)]
pub struct AnyVariant {
    base: AnyBase,
    payload: Option<Box<AnyValue>>,
}

impl AnyVariant {
    /// Wrap a value. Nested variants are flattened.
    #[must_use]
    pub fn new(value: impl Into<AnyValue>) -> Self {
        let mut variant = Self::default();
        variant.store(value.into());
        variant
    }

    /// Container without a value.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The contained value, if any.
    #[must_use]
    pub fn payload(&self) -> Option<&AnyValue> {
        self.payload.as_deref()
    }

    /// Remove and return the contained value.
    pub fn take(&mut self) -> Option<AnyValue> {
        self.payload.take().map(|payload| *payload)
    }

    /// Replace the contained value.
    pub fn store(&mut self, value: AnyValue) {
        self.payload = match value {
            AnyValue::Variant(inner) => inner.payload,
            other => Some(Box::new(other)),
        };
    }

    /// Type of the contained value; `ANY` when empty.
    #[must_use]
    pub fn payload_type(&self) -> DataTypeId {
        self.payload
            .as_deref()
            .map_or(DataTypeId::Any, AnyValue::data_type_id)
    }
}

impl Clone for AnyVariant {
    fn clone(&self) -> Self {
        Self {
            base: AnyBase::new(),
            payload: self.payload.clone(),
        }
    }
}

impl PartialEq for AnyVariant {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl fmt::Debug for AnyVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnyVariant").field(&self.payload).finish()
    }
}

impl fmt::Display for AnyVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Some(payload) => fmt::Display::fmt(payload, f),
            None => Ok(()),
        }
    }
}

impl TypedValue for AnyVariant {
    const TYPE_ID: DataTypeId = DataTypeId::Any;
}

impl IecAny for AnyVariant {
    fn base(&self) -> &AnyBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut AnyBase {
        &mut self.base
    }

    fn clone_into_slot<'a>(&self, slot: &'a mut ValueSlot) -> &'a mut dyn IecAny {
        slot.store(AnyValue::Variant(self.clone()))
    }

    fn set_value(&mut self, source: &dyn IecAny) -> DataTypeResult<()> {
        let value = AnyValue::from_dyn(source.unwrap_any())?;
        self.store(value);
        Ok(())
    }

    fn equals(&self, other: &dyn IecAny) -> bool {
        match &self.payload {
            Some(payload) => payload.as_dyn().equals(other),
            None => downcast_ref::<Self>(other.unwrap_any()).is_some_and(|other| other.payload.is_none()),
        }
    }

    fn from_iec_string(&mut self, text: &str) -> DataTypeResult<usize> {
        let (value, len) = AnyValue::parse_literal(text)?;
        self.store(value);
        Ok(len)
    }

    fn to_iec_string(&self, out: &mut [u8]) -> DataTypeResult<usize> {
        literal::render_into(out, |w| write!(w, "{self}"))
    }

    fn to_string_buffer_size(&self) -> usize {
        self.payload.as_deref().map_or(1, |payload| {
            let prefix = typed_literal_prefix(payload.data_type_id()).map_or(0, |name| name.len() + 1);
            prefix + payload.as_dyn().to_string_buffer_size()
        })
    }

    fn iec_memory_size(&self) -> usize {
        self.payload
            .as_deref()
            .map_or(0, |payload| payload.as_dyn().iec_memory_size())
    }

    fn type_name_id(&self) -> TypeNameId {
        self.payload
            .as_deref()
            .map_or(TypeNameId::Builtin(DataTypeId::Any), |payload| {
                payload.as_dyn().type_name_id()
            })
    }

    fn unwrap_any(&self) -> &dyn IecAny {
        match &self.payload {
            Some(payload) => payload.as_dyn(),
            None => self,
        }
    }

    fn unwrap_any_mut(&mut self) -> &mut dyn IecAny {
        match self.payload {
            Some(ref mut payload) => payload.as_dyn_mut(),
            None => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::any::to_display_string;
    use crate::leaf::{Bool, IecString, Int, LReal, SInt, Time};

    #[test]
    fn test_empty_variant() {
        let empty = AnyVariant::empty();
        assert_eq!(empty.data_type_id(), DataTypeId::Any);
        assert_eq!(empty.payload_type(), DataTypeId::Any);
        assert_eq!(empty.unwrap_any().data_type_id(), DataTypeId::Any);
        assert!(empty.equals(&AnyVariant::empty()));
        assert!(!empty.equals(&Int::new(0)));
        assert_eq!(empty.iec_memory_size(), 0);
        assert_eq!(to_display_string(&empty).unwrap(), "");
    }

    #[test]
    fn test_variant_is_transparent() {
        let variant = AnyVariant::new(Int::new(5));
        assert_eq!(variant.data_type_id(), DataTypeId::Any);
        assert_eq!(variant.unwrap_any().data_type_id(), DataTypeId::Int);
        assert_eq!(variant.iec_memory_size(), 2);
        assert!(variant.equals(&Int::new(5)));
        assert!(Int::new(5).equals(&variant));
        assert!(!variant.equals(&SInt::new(5)));
    }

    #[test]
    fn test_nested_variants_flatten() {
        let inner = AnyVariant::new(LReal::new(1.5));
        let outer = AnyVariant::new(AnyValue::Variant(inner));
        assert_eq!(outer.payload_type(), DataTypeId::LReal);
    }

    #[test]
    fn test_assignment_through_variant() {
        let mut variant = AnyVariant::empty();
        variant.set_value(&Time::new(1_000_000_000)).unwrap();
        assert_eq!(variant.payload_type(), DataTypeId::Time);

        let mut target = Int::default();
        target.set_value(&AnyVariant::new(SInt::new(-4))).unwrap();
        assert_eq!(target.value(), -4);
    }

    #[test]
    fn test_variant_literals() {
        let mut variant = AnyVariant::empty();
        assert_eq!(variant.from_iec_string("INT#-12"), Ok(7));
        assert_eq!(variant.payload_type(), DataTypeId::Int);
        assert_eq!(to_display_string(&variant).unwrap(), "INT#-12");

        assert_eq!(variant.from_iec_string("T#1s"), Ok(4));
        assert_eq!(to_display_string(&variant).unwrap(), "T#1s");

        variant.store(IecString::from("ok").into());
        assert_eq!(to_display_string(&variant).unwrap(), "'ok'");

        variant.store(Bool::new(true).into());
        assert_eq!(to_display_string(&variant).unwrap(), "BOOL#TRUE");
    }

    #[test]
    fn test_unwrap_mut_reaches_payload() {
        let mut variant = AnyVariant::new(Int::new(1));
        variant.unwrap_any_mut().set_value(&SInt::new(9)).unwrap();
        assert!(variant.equals(&Int::new(9)));
    }
}
