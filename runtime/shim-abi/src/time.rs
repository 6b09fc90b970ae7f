//! Timeout records accepted by `select` and `pselect`

/// Seconds + microseconds
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timeval {
    pub tv_sec: i64,
    pub tv_usec: i64,
}

/// Seconds + nanoseconds
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timespec {
    pub tv_sec: i64,
    pub tv_nsec: i64,
}

impl Timeval {
    pub const fn new(tv_sec: i64, tv_usec: i64) -> Self {
        Self { tv_sec, tv_usec }
    }

    /// Whole milliseconds, saturating, never negative
    pub fn as_millis_clamped(&self) -> i32 {
        let ms = self
            .tv_sec
            .saturating_mul(1000)
            .saturating_add(self.tv_usec / 1000);
        ms.clamp(0, i32::MAX as i64) as i32
    }
}

impl Timespec {
    pub const fn new(tv_sec: i64, tv_nsec: i64) -> Self {
        Self { tv_sec, tv_nsec }
    }

    /// Same instant at microsecond precision, rounded toward zero
    pub const fn to_timeval(&self) -> Timeval {
        Timeval {
            tv_sec: self.tv_sec,
            tv_usec: self.tv_nsec / 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_conversion() {
        assert_eq!(Timeval::new(1, 500_000).as_millis_clamped(), 1500);
        assert_eq!(Timeval::new(0, 999).as_millis_clamped(), 0);
        assert_eq!(Timeval::new(0, 0).as_millis_clamped(), 0);
    }

    #[test]
    fn test_negative_clamped_to_zero() {
        assert_eq!(Timeval::new(-3, 0).as_millis_clamped(), 0);
        assert_eq!(Timeval::new(0, -5000).as_millis_clamped(), 0);
    }

    #[test]
    fn test_huge_saturates() {
        assert_eq!(Timeval::new(i64::MAX, 0).as_millis_clamped(), i32::MAX);
    }

    #[test]
    fn test_nanos_floor_to_micros() {
        let tv = Timespec::new(2, 1_999).to_timeval();
        assert_eq!(tv, Timeval::new(2, 1));
    }
}
