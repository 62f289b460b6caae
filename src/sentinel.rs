//! "Leave unchanged" values understood by the feeder firmware.
//!
//! A partial update writes a whole record; every field the caller does not
//! want to touch carries the sentinel for its type and the firmware skips it.
//! The bit patterns are part of the firmware contract and must not change.

/// Float fields: quiet NaN.
pub const FLOAT_NO_CHANGE: f32 = f32::from_bits(FLOAT_NO_CHANGE_BITS);
/// Bit pattern of [`FLOAT_NO_CHANGE`] as it appears on the wire.
pub const FLOAT_NO_CHANGE_BITS: u32 = 0x7FC0_0000;
/// Unsigned 16-bit PWM fields.
pub const PWM_NO_CHANGE: u16 = 0xFFFF;
/// Signed 32-bit encoder counter.
pub const ENCODER_NO_CHANGE: i32 = i32::MIN;
/// Unsigned 32-bit counters.
pub const U32_NO_CHANGE: u32 = 0xFFFF_FFFF;
/// RGB component, for firmware revisions that honour per-channel no-change.
pub const RGB_NO_CHANGE_COMPONENT: u8 = 0xFF;

/// A wire primitive with a reserved "leave unchanged" value.
pub trait NoChange: Copy {
    const NO_CHANGE: Self;

    fn is_no_change(&self) -> bool;
}

impl NoChange for f32 {
    const NO_CHANGE: Self = FLOAT_NO_CHANGE;

    /// Any NaN counts, the firmware tests with `isnan`.
    fn is_no_change(&self) -> bool {
        self.is_nan()
    }
}

impl NoChange for u16 {
    const NO_CHANGE: Self = PWM_NO_CHANGE;

    fn is_no_change(&self) -> bool {
        *self == PWM_NO_CHANGE
    }
}

impl NoChange for i32 {
    const NO_CHANGE: Self = ENCODER_NO_CHANGE;

    fn is_no_change(&self) -> bool {
        *self == ENCODER_NO_CHANGE
    }
}

impl NoChange for u32 {
    const NO_CHANGE: Self = U32_NO_CHANGE;

    fn is_no_change(&self) -> bool {
        *self == U32_NO_CHANGE
    }
}

/// The caller's value, or the type's sentinel when there is none.
pub fn or_no_change<T: NoChange>(value: Option<T>) -> T {
    value.unwrap_or(T::NO_CHANGE)
}

#[test]
fn test_float_sentinel_bits() {
    assert!(FLOAT_NO_CHANGE.is_nan());
    assert_eq!(FLOAT_NO_CHANGE.to_bits(), 0x7FC0_0000);
    assert_eq!(FLOAT_NO_CHANGE.to_le_bytes(), [0x00, 0x00, 0xc0, 0x7f]);
}

#[test]
fn test_integer_sentinels() {
    assert_eq!(PWM_NO_CHANGE.to_le_bytes(), [0xff, 0xff]);
    assert_eq!(ENCODER_NO_CHANGE.to_le_bytes(), [0x00, 0x00, 0x00, 0x80]);
    assert_eq!(U32_NO_CHANGE.to_le_bytes(), [0xff; 4]);
}

#[test]
fn test_is_no_change() {
    assert!(f32::NAN.is_no_change());
    assert!(!0.0_f32.is_no_change());
    assert!(0xFFFF_u16.is_no_change());
    assert!(!0xFFFE_u16.is_no_change());
    assert!(i32::MIN.is_no_change());
    assert!(!(-1_i32).is_no_change());
    assert!(u32::MAX.is_no_change());
    assert!(!0_u32.is_no_change());
}

#[test]
fn test_or_no_change() {
    assert_eq!(or_no_change(Some(7_u16)), 7);
    assert_eq!(or_no_change::<u16>(None), PWM_NO_CHANGE);
    assert_eq!(or_no_change::<i32>(None), ENCODER_NO_CHANGE);
    assert!(or_no_change::<f32>(None).is_nan());
}
