#![doc = include_str!("../README.md")]

mod builder;
mod cache;
mod entry;
mod error;
mod guard;
mod heap;
#[cfg(feature = "metrics")]
mod metrics;
mod slots;
mod store;

pub use builder::CacheBuilder;
pub use cache::HeapedCache;
pub use error::Error;
pub use guard::Guard;
#[cfg(feature = "metrics")]
pub use metrics::CacheMetrics;
