//! IEC 61131-3 / IEC 61499 elementary data types.
//!
//! Every value embeds an [`AnyBase`] (an 8-byte [`ValueCell`] plus the
//! forced flag) and is handled polymorphically through [`IecAny`]:
//!
//! - [`leaf`]: the concrete types (BOOL .. LDATE_AND_TIME, STRING, ANY)
//! - [`cast`]: castability table, compile-time cast markers and the cast engine
//! - [`special_cast`]: conversions out of REAL/LREAL
//! - [`limits`]: numeric limits per type
//! - [`dynamic`]: [`AnyValue`], a value of any built-in type chosen at runtime
//! - [`type_name`]: type name parsing and interning
//! - [`wire`]: compact tagged binary encoding
//!
//! ```
//! use plc_datatypes::{implicit_cast, DInt, IecAny, Int};
//!
//! let wide: DInt = implicit_cast(&Int::new(-7));
//! assert_eq!(wide.value(), -7);
//!
//! let mut parsed = Int::default();
//! parsed.from_iec_string("INT#16#7FFF").unwrap();
//! assert_eq!(parsed.value(), i16::MAX);
//! ```

pub mod any;
mod calendar;
pub mod cast;
pub mod cell;
pub mod dynamic;
pub mod leaf;
pub mod limits;
mod literal;
pub mod special_cast;
pub mod type_name;
pub mod wire;

pub use any::{downcast_mut, downcast_ref, to_display_string, AnyBase, IecAny, SimpleValue, ValueSlot};
pub use cast::{cast, implicit_cast, try_cast, is_castable, is_castable_code, Castability, ExplicitCast, ImplicitCast};
pub use cell::ValueCell;
pub use dynamic::{cast_value, validate_connection, AnyValue};
pub use leaf::*;
pub use limits::{limits_summary, LimitsSummary, NumericLimits, PrimitiveLimits};
pub use special_cast::special_cast;
pub use type_name::{parse_type_name, ParsedTypeName, StringDictionary, StringId, TypeNameId};
pub use wire::WireCodec;

pub use plc_common::error::{DataTypeError, DataTypeResult};
pub use plc_common::iec_types::{DataTypeId, TypeClass};
