//! Cache activity counters.

/// Snapshot of cache activity.
///
/// Counters are cumulative since construction or the last
/// [`clear`](crate::HeapedCache::clear).
///
/// # Example
///
/// ```
/// use heaped_cache::HeapedCache;
///
/// let cache: HeapedCache<u64, String> = HeapedCache::new(2);
/// cache.push(1, "one".to_string());
/// cache.push(2, "two".to_string());
/// cache.push(3, "three".to_string());
/// cache.get(&3);
/// cache.get(&1);
///
/// let metrics = cache.metrics();
/// assert_eq!(metrics.evictions, 1);
/// assert_eq!(metrics.hit_rate(), 0.5);
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheMetrics {
	/// Lookups that found the key (`get`, `get_clone`, `get_ref`, and
	/// `get_or_push` hits).
	pub hits: u64,
	/// Lookups that did not find the key.
	pub misses: u64,
	/// New keys stored.
	pub inserts: u64,
	/// Existing keys overwritten.
	pub updates: u64,
	/// Entries evicted because the cache went over capacity.
	pub evictions: u64,
	/// Entries explicitly removed via `remove`.
	pub removals: u64,
	/// Entries drained via `pop`.
	pub pops: u64,
	/// Loader invocations by `get_or_push`.
	pub loads: u64,
	/// Current number of entries.
	pub entry_count: usize,
	/// Maximum number of entries.
	pub capacity_rows: usize,
}

impl CacheMetrics {
	/// Hit rate as a ratio between 0.0 and 1.0.
	///
	/// Returns 0.0 if there have been no lookups.
	pub fn hit_rate(&self) -> f64 {
		let total = self.total_accesses();
		if total == 0 {
			0.0
		} else {
			self.hits as f64 / total as f64
		}
	}

	/// Fraction of the row capacity in use.
	pub fn utilization(&self) -> f64 {
		if self.capacity_rows == 0 {
			0.0
		} else {
			self.entry_count as f64 / self.capacity_rows as f64
		}
	}

	/// Total number of lookups (hits + misses).
	pub fn total_accesses(&self) -> u64 {
		self.hits + self.misses
	}

	/// Total number of writes (inserts + updates).
	pub fn total_writes(&self) -> u64 {
		self.inserts + self.updates
	}
}
