//! The polymorphic value base shared by every IEC data type.
//!
//! Every concrete type embeds an [`AnyBase`] (storage cell plus forced
//! flag) and implements [`IecAny`], so engine code can hold any value as
//! `&dyn IecAny` and copy, compare, parse and render it without knowing the
//! concrete type.

use std::any::Any;
use std::fmt;

use plc_common::error::{DataTypeError, DataTypeResult, ParseErrorKind};
use plc_common::iec_types::DataTypeId;

use crate::cell::ValueCell;
use crate::dynamic::AnyValue;
use crate::type_name::TypeNameId;

#[cfg(feature = "custom-serializable")]
use plc_common::error::WireErrorKind;

/// Storage shared by all values: one cell and the forced flag.
///
/// Deliberately not `Clone`. Leaf types copy through
/// [`AnyBase::copy_simple_from`], which only accepts types whose whole
/// state lives in the cell, and never carry the forced flag along.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AnyBase {
    cell: ValueCell,
    forced: bool,
}

impl AnyBase {
    /// Zero cell, not forced.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cell: ValueCell::ZERO,
            forced: false,
        }
    }

    pub(crate) const fn with_cell(cell: ValueCell) -> Self {
        Self {
            cell,
            forced: false,
        }
    }

    /// Current storage cell.
    #[must_use]
    pub fn cell(&self) -> &ValueCell {
        &self.cell
    }

    pub(crate) fn set_cell(&mut self, cell: ValueCell) {
        self.cell = cell;
    }

    /// Copy the cell of a trivially representable value. The forced flag
    /// of `self` is left untouched.
    pub fn copy_simple_from<T: SimpleValue>(&mut self, source: &T) {
        self.cell = *source.base().cell();
    }

    /// Whether the value is forced (overridden by an engineering tool).
    #[must_use]
    pub fn is_forced(&self) -> bool {
        self.forced
    }

    /// Set or clear the forced flag.
    pub fn set_forced(&mut self, forced: bool) {
        self.forced = forced;
    }
}

/// Marker for types whose entire state is the storage cell.
///
/// Only these may be copied with [`AnyBase::copy_simple_from`].
pub trait SimpleValue: IecAny {}

/// Object helpers available on every [`IecAny`] implementation.
///
/// Implemented by a blanket impl; never implement it by hand.
pub trait AnyObject: Any {
    /// Upcast for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;
    /// Mutable upcast for downcasting to the concrete type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// View as a trait object.
    fn as_iec(&self) -> &dyn IecAny;
    /// Mutable view as a trait object.
    fn as_iec_mut(&mut self) -> &mut dyn IecAny;
    /// Size of the concrete object in bytes.
    fn allocation_size(&self) -> usize;
}

impl<T: IecAny> AnyObject for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn as_iec(&self) -> &dyn IecAny {
        self
    }

    fn as_iec_mut(&mut self) -> &mut dyn IecAny {
        self
    }

    fn allocation_size(&self) -> usize {
        std::mem::size_of::<T>()
    }
}

/// The abstract IEC value.
///
/// Leaf types override what differs from the defaults: every leaf reports
/// its own id, converts on [`IecAny::set_value`] and owns its literal
/// grammar. String and container types additionally override equality and
/// memory accounting.
pub trait IecAny: AnyObject + fmt::Debug {
    /// Runtime type id. The abstract base is `ANY`.
    fn data_type_id(&self) -> DataTypeId {
        DataTypeId::Any
    }

    /// Shared storage.
    fn base(&self) -> &AnyBase;

    /// Mutable shared storage.
    fn base_mut(&mut self) -> &mut AnyBase;

    /// Clone into caller-provided storage and return the new value.
    ///
    /// The clone carries the value only; its forced flag is cleared.
    fn clone_into_slot<'a>(&self, slot: &'a mut ValueSlot) -> &'a mut dyn IecAny;

    /// Assign from another value.
    ///
    /// The default copies the raw cell. Leaves override this to convert
    /// through the cast engine and reject incompatible sources.
    ///
    /// # Errors
    ///
    /// Returns [`DataTypeError::NotCastable`] when no conversion exists.
    fn set_value(&mut self, source: &dyn IecAny) -> DataTypeResult<()> {
        let cell = *source.unwrap_any().base().cell();
        self.base_mut().set_cell(cell);
        Ok(())
    }

    /// Same type id and bit-identical content. No promotion: `INT#0` does
    /// not equal `SINT#0`.
    fn equals(&self, other: &dyn IecAny) -> bool {
        let other = other.unwrap_any();
        self.data_type_id() == other.data_type_id() && self.base().cell() == other.base().cell()
    }

    /// Parse a literal from the start of `text`. Returns the number of bytes
    /// consumed; on error the value is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`DataTypeError::Parse`] when no valid literal is found.
    fn from_iec_string(&mut self, text: &str) -> DataTypeResult<usize>;

    /// Render the literal into `out` followed by a NUL byte. Returns the
    /// number of text bytes written, excluding the terminator.
    ///
    /// # Errors
    ///
    /// Returns [`DataTypeError::BufferTooSmall`] when `out` cannot hold the
    /// literal and terminator.
    fn to_iec_string(&self, out: &mut [u8]) -> DataTypeResult<usize>;

    /// Worst-case buffer size for [`IecAny::to_iec_string`], terminator included.
    fn to_string_buffer_size(&self) -> usize;

    /// Size of the value in IEC memory layout.
    fn iec_memory_size(&self) -> usize {
        self.data_type_id().iec_memory_size()
    }

    /// Name identifier of the type.
    fn type_name_id(&self) -> TypeNameId {
        TypeNameId::Builtin(self.data_type_id())
    }

    /// The contained value for containers, `self` otherwise.
    fn unwrap_any(&self) -> &dyn IecAny {
        self.as_iec()
    }

    /// Mutable counterpart of [`IecAny::unwrap_any`].
    fn unwrap_any_mut(&mut self) -> &mut dyn IecAny {
        self.as_iec_mut()
    }

    /// Whether the value is forced.
    fn is_forced(&self) -> bool {
        self.base().is_forced()
    }

    /// Set or clear the forced flag.
    fn set_forced(&mut self, forced: bool) {
        self.base_mut().set_forced(forced);
    }

    /// Bytes needed by [`IecAny::serialize_custom`].
    #[cfg(feature = "custom-serializable")]
    fn required_serialization_size(&self) -> usize {
        0
    }

    /// Wire tag written before the custom payload.
    #[cfg(feature = "custom-serializable")]
    fn serialization_tag(&self) -> u8 {
        0xFF
    }

    /// Write the custom payload. Returns bytes written.
    ///
    /// # Errors
    ///
    /// The default reports the type as unsupported.
    #[cfg(feature = "custom-serializable")]
    fn serialize_custom(&self, _out: &mut [u8]) -> DataTypeResult<usize> {
        Err(DataTypeError::Wire(WireErrorKind::Unsupported))
    }

    /// Whether `tag` introduces a payload of this type.
    #[cfg(feature = "custom-serializable")]
    fn deserialize_tag(&mut self, _tag: u8) -> bool {
        false
    }

    /// Read the custom payload. Returns bytes consumed.
    ///
    /// # Errors
    ///
    /// The default reports the type as unsupported.
    #[cfg(feature = "custom-serializable")]
    fn deserialize_custom(&mut self, _input: &[u8]) -> DataTypeResult<usize> {
        Err(DataTypeError::Wire(WireErrorKind::Unsupported))
    }
}

/// Downcast a trait object to a concrete value type.
#[must_use]
pub fn downcast_ref<T: IecAny>(value: &dyn IecAny) -> Option<&T> {
    value.as_any().downcast_ref::<T>()
}

/// Mutable counterpart of [`downcast_ref`].
pub fn downcast_mut<T: IecAny>(value: &mut dyn IecAny) -> Option<&mut T> {
    value.as_any_mut().downcast_mut::<T>()
}

/// Render a value's literal into an owned string.
///
/// # Errors
///
/// Propagates rendering failures from the value.
pub fn to_display_string(value: &dyn IecAny) -> DataTypeResult<String> {
    let mut buf = vec![0u8; value.to_string_buffer_size()];
    let len = value.to_iec_string(&mut buf)?;
    buf.truncate(len);
    String::from_utf8(buf)
        .map_err(|_| DataTypeError::parse(value.data_type_id(), ParseErrorKind::InvalidCharacter))
}

/// Caller-owned storage for [`IecAny::clone_into_slot`].
///
/// Holds any built-in value inline; types registered outside the fixed set
/// are boxed.
#[derive(Debug, Default)]
pub struct ValueSlot {
    value: Option<SlotValue>,
}

#[derive(Debug)]
enum SlotValue {
    Builtin(AnyValue),
    Boxed(Box<dyn IecAny>),
}

impl ValueSlot {
    /// Empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self { value: None }
    }

    /// Store a built-in value, replacing any previous content.
    pub fn store(&mut self, value: AnyValue) -> &mut dyn IecAny {
        match self.value.insert(SlotValue::Builtin(value)) {
            SlotValue::Builtin(stored) => stored.as_dyn_mut(),
            SlotValue::Boxed(stored) => stored.as_mut(),
        }
    }

    /// Store an externally defined value, replacing any previous content.
    pub fn store_boxed(&mut self, value: Box<dyn IecAny>) -> &mut dyn IecAny {
        match self.value.insert(SlotValue::Boxed(value)) {
            SlotValue::Builtin(stored) => stored.as_dyn_mut(),
            SlotValue::Boxed(stored) => stored.as_mut(),
        }
    }

    /// The stored value, if any.
    #[must_use]
    pub fn get(&self) -> Option<&dyn IecAny> {
        self.value.as_ref().map(|value| match value {
            SlotValue::Builtin(stored) => stored.as_dyn(),
            SlotValue::Boxed(stored) => stored.as_ref(),
        })
    }

    /// Whether the slot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// Drop the stored value.
    pub fn clear(&mut self) {
        self.value = None;
    }

    /// Move a built-in value out of the slot.
    pub fn take(&mut self) -> Option<AnyValue> {
        match self.value.take() {
            Some(SlotValue::Builtin(value)) => Some(value),
            Some(boxed) => {
                self.value = Some(boxed);
                None
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::{DInt, Int, IecString, LReal, SInt};

    #[test]
    fn test_base_zero_initialised() {
        let base = AnyBase::new();
        assert_eq!(*base.cell(), ValueCell::ZERO);
        assert!(!base.is_forced());
        assert_eq!(base, AnyBase::default());
    }

    #[test]
    fn test_forced_flag_not_copied() {
        let mut source = Int::new(42);
        source.set_forced(true);

        let mut base = AnyBase::new();
        base.copy_simple_from(&source);
        assert_eq!(base.cell().get_i16(), 42);
        assert!(!base.is_forced());

        let copy = source.clone();
        assert_eq!(copy.value(), 42);
        assert!(!copy.is_forced());
    }

    #[test]
    fn test_equals_is_type_strict() {
        let a = Int::new(0);
        let b = SInt::new(0);
        assert!(a.equals(&a));
        assert!(a.equals(&Int::new(0)));
        assert!(!a.equals(&b));
        assert!(!a.equals(&Int::new(1)));
    }

    #[test]
    fn test_allocation_size_and_downcast() {
        let value = LReal::new(1.5);
        let object: &dyn IecAny = &value;
        assert_eq!(object.allocation_size(), std::mem::size_of::<LReal>());
        assert_eq!(downcast_ref::<LReal>(object).map(LReal::value), Some(1.5));
        assert!(downcast_ref::<Int>(object).is_none());
    }

    #[test]
    fn test_clone_into_slot() {
        let mut slot = ValueSlot::new();
        assert!(slot.is_empty());

        let mut source = DInt::new(-7);
        source.set_forced(true);
        let clone = source.clone_into_slot(&mut slot);
        assert_eq!(clone.data_type_id(), DataTypeId::DInt);
        assert!(!clone.is_forced());
        assert!(clone.equals(&source));

        // A second clone replaces the first.
        IecString::from("abc").clone_into_slot(&mut slot);
        assert_eq!(slot.get().map(|value| value.data_type_id()), Some(DataTypeId::String));

        let taken = slot.take();
        assert!(taken.is_some());
        assert!(slot.is_empty());
    }

    #[test]
    fn test_to_display_string() {
        assert_eq!(to_display_string(&Int::new(-300)).unwrap(), "-300");
        assert_eq!(to_display_string(&IecString::from("a'b")).unwrap(), "'a$'b'");
    }
}
