//! Fixed-size storage cell for scalar values.
//!
//! The cell holds the 64-bit pattern of whatever scalar currently occupies
//! it and carries no discriminant: the owning leaf type knows which view is
//! valid. Content is kept canonical so that bit equality means value
//! equality:
//!
//! - unsigned integers, bit-strings, chars, BOOL: zero-extended
//! - signed integers: sign-extended
//! - REAL: IEEE-754 single in the low 32 bits, upper bits zero
//! - LREAL: IEEE-754 double
//! - DATE/LDATE: midnight of the day
//! - TIME_OF_DAY/LTIME_OF_DAY: below one day
//!
//! Typed accessors are crate-private. Byte access goes through
//! [`ValueCell::data`] (host order) or the byte-order generic
//! [`ValueCell::write_bytes`] / [`ValueCell::read_bytes`].

use byteorder::{ByteOrder, NativeEndian};
use plc_common::iec_types::{DataTypeId, TypeClass};

use crate::calendar::NANOS_PER_DAY;

/// Byte order of the build target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    /// Least significant byte first.
    Little,
    /// Most significant byte first.
    Big,
}

/// Byte order the typed accessors and [`ValueCell::data`] are laid out in.
pub const HOST_ENDIANNESS: Endianness = if cfg!(target_endian = "big") {
    Endianness::Big
} else {
    Endianness::Little
};

/// Size of the cell in bytes.
pub const CELL_SIZE: usize = 8;

/// 64-bit untagged value storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ValueCell {
    bits: u64,
}

impl ValueCell {
    /// Cell holding the unsigned zero pattern.
    pub const ZERO: Self = Self { bits: 0 };

    pub(crate) const fn from_bits(bits: u64) -> Self {
        Self { bits }
    }

    /// Fit a raw pattern to the width of `type_id`: truncate, then sign-extend
    /// for signed integers and durations or zero-extend otherwise. Reals and
    /// non-scalar ids keep the pattern masked to their width. Dates drop
    /// the time of day and times of day wrap at midnight.
    pub(crate) fn canonical(type_id: DataTypeId, bits: u64) -> Self {
        let width = type_id.bit_width();
        if width == 0 {
            return Self::ZERO;
        }
        let masked = bits & low_mask(width);
        let class = type_id.class();
        let signed = matches!(class, TypeClass::SignedInt | TypeClass::Duration);
        if class == TypeClass::Date {
            Self::from_bits(masked - masked % NANOS_PER_DAY)
        } else if class == TypeClass::TimeOfDay {
            Self::from_bits(masked % NANOS_PER_DAY)
        } else if signed && width < 64 {
            let shift = 64 - width;
            Self::from_bits((((masked << shift) as i64) >> shift) as u64)
        } else {
            Self::from_bits(masked)
        }
    }

    /// Raw 64-bit pattern.
    #[inline]
    #[must_use]
    pub const fn bits(&self) -> u64 {
        self.bits
    }

    /// Host-order byte view of the cell.
    #[inline]
    #[must_use]
    pub fn data(&self) -> [u8; CELL_SIZE] {
        let mut out = [0u8; CELL_SIZE];
        NativeEndian::write_u64(&mut out, self.bits);
        out
    }

    /// Rebuild a cell from its host-order byte view.
    #[inline]
    #[must_use]
    pub fn from_data(data: [u8; CELL_SIZE]) -> Self {
        Self {
            bits: NativeEndian::read_u64(&data),
        }
    }

    /// Write the low `width` bytes of the value in byte order `B`.
    ///
    /// Returns the number of bytes written, or `None` when `width` is not
    /// in `1..=8` or `out` is shorter than `width`.
    pub fn write_bytes<B: ByteOrder>(&self, width: usize, out: &mut [u8]) -> Option<usize> {
        if !(1..=CELL_SIZE).contains(&width) || out.len() < width {
            return None;
        }
        let masked = self.bits & low_mask(width as u32 * 8);
        B::write_uint(&mut out[..width], masked, width);
        Some(width)
    }

    /// Read `width` bytes in byte order `B`, sign-extending when `signed`.
    pub fn read_bytes<B: ByteOrder>(width: usize, input: &[u8], signed: bool) -> Option<Self> {
        if !(1..=CELL_SIZE).contains(&width) || input.len() < width {
            return None;
        }
        let bits = if signed {
            B::read_int(&input[..width], width) as u64
        } else {
            B::read_uint(&input[..width], width)
        };
        Some(Self { bits })
    }

    #[inline]
    pub(crate) fn largest_uint(&self) -> u64 {
        self.bits
    }

    #[inline]
    pub(crate) fn set_largest_uint(&mut self, value: u64) {
        self.bits = value;
    }

    #[inline]
    pub(crate) fn largest_int(&self) -> i64 {
        self.bits as i64
    }

    #[inline]
    pub(crate) fn set_largest_int(&mut self, value: i64) {
        self.bits = value as u64;
    }

    #[inline]
    pub(crate) fn set_bool(&mut self, value: bool) {
        self.bits = u64::from(value);
    }

    #[inline]
    pub(crate) fn get_bool(&self) -> bool {
        self.bits != 0
    }

    #[inline]
    pub(crate) fn set_u8(&mut self, value: u8) {
        self.bits = u64::from(value);
    }

    #[inline]
    pub(crate) fn get_u8(&self) -> u8 {
        self.bits as u8
    }

    #[inline]
    pub(crate) fn set_u16(&mut self, value: u16) {
        self.bits = u64::from(value);
    }

    #[inline]
    pub(crate) fn get_u16(&self) -> u16 {
        self.bits as u16
    }

    #[inline]
    pub(crate) fn set_u32(&mut self, value: u32) {
        self.bits = u64::from(value);
    }

    #[inline]
    pub(crate) fn get_u32(&self) -> u32 {
        self.bits as u32
    }

    #[inline]
    pub(crate) fn set_u64(&mut self, value: u64) {
        self.bits = value;
    }

    #[inline]
    pub(crate) fn get_u64(&self) -> u64 {
        self.bits
    }

    #[inline]
    pub(crate) fn set_i8(&mut self, value: i8) {
        self.set_largest_int(i64::from(value));
    }

    #[inline]
    pub(crate) fn get_i8(&self) -> i8 {
        self.bits as i8
    }

    #[inline]
    pub(crate) fn set_i16(&mut self, value: i16) {
        self.set_largest_int(i64::from(value));
    }

    #[inline]
    pub(crate) fn get_i16(&self) -> i16 {
        self.bits as i16
    }

    #[inline]
    pub(crate) fn set_i32(&mut self, value: i32) {
        self.set_largest_int(i64::from(value));
    }

    #[inline]
    pub(crate) fn get_i32(&self) -> i32 {
        self.bits as i32
    }

    #[inline]
    pub(crate) fn set_i64(&mut self, value: i64) {
        self.set_largest_int(value);
    }

    #[inline]
    pub(crate) fn get_i64(&self) -> i64 {
        self.bits as i64
    }

    #[inline]
    pub(crate) fn set_char(&mut self, value: u8) {
        self.set_u8(value);
    }

    #[inline]
    pub(crate) fn get_char(&self) -> u8 {
        self.get_u8()
    }

    #[inline]
    pub(crate) fn set_char16(&mut self, value: u16) {
        self.set_u16(value);
    }

    #[inline]
    pub(crate) fn get_char16(&self) -> u16 {
        self.get_u16()
    }

    #[inline]
    pub(crate) fn set_f32(&mut self, value: f32) {
        self.bits = u64::from(value.to_bits());
    }

    #[inline]
    pub(crate) fn get_f32(&self) -> f32 {
        f32::from_bits(self.bits as u32)
    }

    #[inline]
    pub(crate) fn set_f64(&mut self, value: f64) {
        self.bits = value.to_bits();
    }

    #[inline]
    pub(crate) fn get_f64(&self) -> f64 {
        f64::from_bits(self.bits)
    }
}

/// Mask selecting the low `bits` bits.
#[inline]
pub(crate) const fn low_mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{BigEndian, LittleEndian};

    #[test]
    fn test_zero_initialised() {
        assert_eq!(ValueCell::default(), ValueCell::ZERO);
        assert_eq!(ValueCell::ZERO.data(), [0; CELL_SIZE]);
    }

    #[test]
    fn test_signed_values_are_sign_extended() {
        let mut cell = ValueCell::ZERO;
        cell.set_i8(-1);
        assert_eq!(cell.bits(), u64::MAX);
        assert_eq!(cell.get_i8(), -1);
        assert_eq!(cell.get_i64(), -1);

        cell.set_i16(-2);
        assert_eq!(cell.get_i16(), -2);
        assert_eq!(cell.largest_int(), -2);
    }

    #[test]
    fn test_unsigned_values_are_zero_extended() {
        let mut cell = ValueCell::ZERO;
        cell.set_u8(0xFF);
        assert_eq!(cell.bits(), 0xFF);
        cell.set_char16(0xFFFE);
        assert_eq!(cell.bits(), 0xFFFE);
        cell.set_bool(true);
        assert_eq!(cell.bits(), 1);
        assert!(cell.get_bool());
    }

    #[test]
    fn test_float_patterns() {
        let mut cell = ValueCell::ZERO;
        cell.set_f32(1.0);
        assert_eq!(cell.bits(), 0x3F80_0000);
        assert_eq!(cell.get_f32(), 1.0);

        cell.set_f64(-6.2587e-4);
        assert_eq!(cell.bits(), 0xBF44_822D_973C_F2FB);
        assert_eq!(cell.get_f64(), -6.2587e-4);
    }

    #[test]
    fn test_host_data_view_roundtrip() {
        let cell = ValueCell::from_bits(0x0102_0304_0506_0708);
        let data = cell.data();
        match HOST_ENDIANNESS {
            Endianness::Little => assert_eq!(data[0], 0x08),
            Endianness::Big => assert_eq!(data[0], 0x01),
        }
        assert_eq!(ValueCell::from_data(data), cell);
    }

    fn check_byte_order<B: ByteOrder>(expected_dword: [u8; 4]) {
        let cell = ValueCell::from_bits(0x1122_3344);
        let mut out = [0u8; 4];
        assert_eq!(cell.write_bytes::<B>(4, &mut out), Some(4));
        assert_eq!(out, expected_dword);
        assert_eq!(ValueCell::read_bytes::<B>(4, &out, false), Some(cell));

        // Narrow writes keep the low-order bytes only.
        let mut narrow = [0u8; 1];
        assert_eq!(cell.write_bytes::<B>(1, &mut narrow), Some(1));
        assert_eq!(narrow, [0x44]);

        // Signed reads sign-extend.
        let negative = ValueCell::read_bytes::<B>(1, &[0xFE], true).unwrap();
        assert_eq!(negative.get_i64(), -2);

        assert_eq!(cell.write_bytes::<B>(0, &mut out), None);
        assert_eq!(cell.write_bytes::<B>(9, &mut [0u8; 16]), None);
        assert_eq!(ValueCell::read_bytes::<B>(4, &[0u8; 2], false), None);
    }

    #[test]
    fn test_byte_order_matrix() {
        check_byte_order::<BigEndian>([0x11, 0x22, 0x33, 0x44]);
        check_byte_order::<LittleEndian>([0x44, 0x33, 0x22, 0x11]);
    }

    #[test]
    fn test_canonical_fits_width() {
        assert_eq!(ValueCell::canonical(DataTypeId::SInt, 0xFF).get_i64(), -1);
        assert_eq!(ValueCell::canonical(DataTypeId::Int, 0x1_0005).get_i64(), 5);
        assert_eq!(ValueCell::canonical(DataTypeId::Byte, 0x1234).bits(), 0x34);
        assert_eq!(ValueCell::canonical(DataTypeId::Bool, 0b10).bits(), 0);
        assert_eq!(ValueCell::canonical(DataTypeId::Bool, 0b11).bits(), 1);
        assert_eq!(ValueCell::canonical(DataTypeId::Real, u64::MAX).bits(), 0xFFFF_FFFF);
        assert_eq!(ValueCell::canonical(DataTypeId::String, 7), ValueCell::ZERO);
    }

    #[test]
    fn test_canonical_calendar_values() {
        assert_eq!(ValueCell::canonical(DataTypeId::Date, NANOS_PER_DAY + 5).bits(), NANOS_PER_DAY);
        assert_eq!(ValueCell::canonical(DataTypeId::LDate, 5).bits(), 0);
        assert_eq!(ValueCell::canonical(DataTypeId::TimeOfDay, NANOS_PER_DAY + 7).bits(), 7);
        assert_eq!(ValueCell::canonical(DataTypeId::LTimeOfDay, NANOS_PER_DAY - 1).bits(), NANOS_PER_DAY - 1);
        assert_eq!(ValueCell::canonical(DataTypeId::DateAndTime, u64::MAX).bits(), u64::MAX);
    }

    #[test]
    fn test_low_mask() {
        assert_eq!(low_mask(1), 1);
        assert_eq!(low_mask(8), 0xFF);
        assert_eq!(low_mask(64), u64::MAX);
    }
}
