//! Deferred execution
//!
//! Every scheduled guide effect lives in a [`TimerRegistry`] until it fires,
//! is stopped by a `stop_timer` action, or the zone changes.

mod key;
mod registry;

pub use key::{IdAllocator, TimerKey, ENGINE_ID_SEED};
pub use registry::TimerRegistry;
