//! An integer guaranteed to be a PowerOf2.

use core::{num, ops};

/// PowerOf2
///
/// An integral guaranteed to be non-zero and a power of 2.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct PowerOf2(num::NonZeroUsize);

impl PowerOf2 {
    /// Creates a new instance of PowerOf2.
    ///
    /// Or nothing if the value is not a power of 2.
    pub fn new(value: usize) -> Option<PowerOf2> {
        if value.is_power_of_two() {
            //  Safety:
            //  -   Value is a power of 2, as per the if check.
            Some(unsafe { PowerOf2::new_unchecked(value) })
        } else {
            None
        }
    }

    /// Creates a new instance of PowerOf2.
    ///
    /// #   Safety
    ///
    /// Assumes that the value is a power of 2.
    pub const unsafe fn new_unchecked(value: usize) -> PowerOf2 {
        //  Safety:
        //  -   A power of 2 cannot be 0.
        PowerOf2(num::NonZeroUsize::new_unchecked(value))
    }

    /// Returns the inner value.
    pub const fn value(&self) -> usize { self.0.get() }

    const fn bit_index(&self) -> usize { self.value().trailing_zeros() as usize }

    const fn mask(&self) -> usize { self.value() - 1 }
}

impl ops::Div<PowerOf2> for usize {
    type Output = usize;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn div(self, rhs: PowerOf2) -> usize { self >> rhs.bit_index() }
}

impl ops::Mul<PowerOf2> for usize {
    type Output = usize;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn mul(self, rhs: PowerOf2) -> usize { self << rhs.bit_index() }
}

impl ops::Rem<PowerOf2> for usize {
    type Output = usize;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn rem(self, rhs: PowerOf2) -> usize { self & rhs.mask() }
}

#[cfg(test)]
mod tests {

use super::*;

fn pow2(value: usize) -> PowerOf2 { PowerOf2::new(value).expect("Power of 2") }

#[test]
fn power_of_2_new() {
    fn new(value: usize) -> Option<usize> {
        PowerOf2::new(value).map(|p| p.value())
    }

    assert_eq!(None, new(0));
    assert_eq!(Some(1), new(1));
    assert_eq!(None, new(6));
    assert_eq!(Some(8), new(8));
    assert_eq!(None, new(24));
    assert_eq!(Some(512), new(512));
    assert_eq!(None, new(513));
}

#[test]
fn power_of_2_div() {
    assert_eq!(0, 7 / pow2(8));
    assert_eq!(1, 8 / pow2(8));
    assert_eq!(1, 15 / pow2(8));
    assert_eq!(64, 512 / pow2(8));
}

#[test]
fn power_of_2_mul() {
    assert_eq!(0, 0 * pow2(8));
    assert_eq!(8, 1 * pow2(8));
    assert_eq!(24, 3 * pow2(8));
    assert_eq!(512, 64 * pow2(8));
}

#[test]
fn power_of_2_rem() {
    assert_eq!(0, 0 % pow2(8));
    assert_eq!(1, 9 % pow2(8));
    assert_eq!(7, 15 % pow2(8));
    assert_eq!(0, 512 % pow2(8));
}

}
