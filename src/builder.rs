use std::hash::Hash;

use crate::cache::HeapedCache;
use crate::error::Error;

/// Default number of spare slots reserved above `max_rows`.
pub(crate) const DEFAULT_TOLERANCE: usize = 5;

/// Builder for configuring a [`HeapedCache`].
///
/// # Example
///
/// ```
/// use heaped_cache::CacheBuilder;
///
/// let cache = CacheBuilder::new(10_000)
///     .tolerance(8)
///     .build::<u64, String>();
///
/// assert_eq!(cache.capacity(), 10_000);
/// ```
#[derive(Debug, Clone)]
pub struct CacheBuilder {
	max_rows: usize,
	tolerance: usize,
}

impl CacheBuilder {
	/// Create a new builder for a cache holding at most `max_rows` entries.
	pub fn new(max_rows: usize) -> Self {
		Self {
			max_rows,
			tolerance: DEFAULT_TOLERANCE,
		}
	}

	/// Set how many spare slots are reserved above `max_rows`.
	///
	/// Storage is allocated once for `max_rows + tolerance` entries. An
	/// insertion overflows the cache by exactly one entry before the oldest
	/// is evicted, so at least one spare slot is always kept; smaller values
	/// are raised to one.
	///
	/// Default: 5
	pub fn tolerance(mut self, tolerance: usize) -> Self {
		self.tolerance = tolerance.max(1);
		self
	}

	/// Build the cache.
	///
	/// # Panics
	///
	/// Panics if `max_rows` is zero. Use [`try_build`](Self::try_build) to get
	/// an error instead.
	pub fn build<K, V>(self) -> HeapedCache<K, V>
	where
		K: Hash + Eq + Clone,
	{
		match self.try_build() {
			Ok(cache) => cache,
			Err(err) => panic!("{err}"),
		}
	}

	/// Build the cache, rejecting a zero capacity.
	pub fn try_build<K, V>(self) -> Result<HeapedCache<K, V>, Error>
	where
		K: Hash + Eq + Clone,
	{
		if self.max_rows == 0 {
			return Err(Error::ZeroCapacity);
		}
		Ok(HeapedCache::from_parts(self.max_rows, self.tolerance))
	}
}

impl Default for CacheBuilder {
	/// Create a builder with default settings and 1024 rows.
	fn default() -> Self {
		Self::new(1024)
	}
}
