//! The API of slotpool-core.

mod configuration;
mod error;
mod platform;
mod pools;
mod size_class;

pub use configuration::{Configuration, Properties};
pub use error::PoolError;
pub use platform::Platform;
pub use pools::{ArenaStatistics, Pools};
pub use size_class::{ClassIndex, Layout, PowerOf2, Route};
