//! Default configuration.

use slotpool_core::{Configuration, PowerOf2};

/// Default Configuration.
///
/// -   Blocks of 4 KB.
/// -   Size classes in increments of 8 bytes, up to 512 bytes, for a total of 64 classes.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultConfiguration;

impl Configuration for DefaultConfiguration {
    const BLOCK_SIZE: usize = 4 * 1024;

    //  Safety:
    //  -   8 is a power of 2.
    const SLOT_BASE_SIZE: PowerOf2 = unsafe { PowerOf2::new_unchecked(8) };

    const MAX_SLOT_SIZE: usize = 512;
}
