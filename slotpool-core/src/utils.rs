//! A collection of utilities.

mod power_of_2;

pub use power_of_2::PowerOf2;

/// Returns the padding required to bring `address` up to the next multiple of `alignment`.
///
/// `alignment` may be any non-zero value: slot sizes are multiples of the base size, not powers of 2.
pub(crate) fn padding_for(address: usize, alignment: usize) -> usize {
    debug_assert!(alignment > 0);

    (alignment - address % alignment) % alignment
}

#[cfg(test)]
mod tests {

use super::*;

#[test]
fn padding_for_power_of_2() {
    assert_eq!(0, padding_for(0, 8));
    assert_eq!(7, padding_for(1, 8));
    assert_eq!(1, padding_for(7, 8));
    assert_eq!(0, padding_for(8, 8));
    assert_eq!(0, padding_for(4096, 512));
    assert_eq!(504, padding_for(4104, 512));
}

#[test]
fn padding_for_multiple_of_8() {
    assert_eq!(0, padding_for(0, 24));
    assert_eq!(16, padding_for(8, 24));
    assert_eq!(8, padding_for(16, 24));
    assert_eq!(0, padding_for(24, 24));
    assert_eq!(0, padding_for(4104, 24));
    assert_eq!(8, padding_for(4096, 24));
    assert_eq!(16, padding_for(4112, 24));
    assert_eq!(56, padding_for(4104, 80));
}

}
