use std::borrow::Borrow;
use std::hash::Hash;
#[cfg(feature = "metrics")]
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, trace};

use crate::builder::DEFAULT_TOLERANCE;
use crate::error::Error;
use crate::guard::Guard;
#[cfg(feature = "metrics")]
use crate::metrics::CacheMetrics;
use crate::store::Store;

/// Thread-safe, fixed-capacity cache that evicts the entry written longest
/// ago.
///
/// The cache can be shared across threads via `Arc<HeapedCache>`.
///
/// # Eviction
///
/// Every entry carries the time it was last *written*. Once an insertion
/// takes the cache above its row limit, the entry with the oldest write is
/// evicted. Reads never refresh an entry, so this is write-order eviction,
/// not LRU: a key read a million times is still evicted before a key
/// written a moment later.
///
/// Lookups are O(1). Insertions, updates, removals and evictions are
/// O(log n). Storage for `max_rows` entries plus a small tolerance is
/// allocated once at construction.
///
/// # Locking
///
/// All operations, reads included, run under one mutex shared by the key
/// index and the recency heap. Returned values are `Arc<V>` handles that stay
/// valid after the entry is evicted; [`get_ref`](Self::get_ref) is the only
/// way to borrow a value in place, and it holds the lock while borrowed.
///
/// # Example
///
/// ```
/// use heaped_cache::HeapedCache;
///
/// let cache = HeapedCache::new(2);
/// cache.push("a", 1);
/// cache.push("b", 2);
/// cache.push("c", 3);
///
/// assert_eq!(cache.len(), 2);
/// assert!(cache.get(&"a").is_none());
/// assert_eq!(cache.get(&"c").as_deref(), Some(&3));
/// ```
pub struct HeapedCache<K, V> {
	/// Index, arena and heap, always locked together
	store: Mutex<Store<K, V>>,
	/// Metrics: lookups that found the key
	#[cfg(feature = "metrics")]
	hits: AtomicU64,
	/// Metrics: lookups that missed
	#[cfg(feature = "metrics")]
	misses: AtomicU64,
	/// Metrics: new keys
	#[cfg(feature = "metrics")]
	inserts: AtomicU64,
	/// Metrics: overwritten keys
	#[cfg(feature = "metrics")]
	updates: AtomicU64,
	/// Metrics: overflow evictions
	#[cfg(feature = "metrics")]
	evictions: AtomicU64,
	/// Metrics: explicit removals
	#[cfg(feature = "metrics")]
	removals: AtomicU64,
	/// Metrics: explicit pops
	#[cfg(feature = "metrics")]
	pops: AtomicU64,
	/// Metrics: loader invocations
	#[cfg(feature = "metrics")]
	loads: AtomicU64,
}

impl<K, V> HeapedCache<K, V>
where
	K: Hash + Eq + Clone,
{
	/// Create a cache holding at most `max_rows` entries.
	///
	/// # Panics
	///
	/// Panics if `max_rows` is zero.
	pub fn new(max_rows: usize) -> Self {
		Self::with_tolerance(max_rows, DEFAULT_TOLERANCE)
	}

	/// Create a cache holding at most `max_rows` entries, rejecting zero.
	pub fn try_new(max_rows: usize) -> Result<Self, Error> {
		if max_rows == 0 {
			return Err(Error::ZeroCapacity);
		}
		Ok(Self::from_parts(max_rows, DEFAULT_TOLERANCE))
	}

	/// Create a cache reserving `max_rows + tolerance` slots up front.
	///
	/// See [`CacheBuilder::tolerance`](crate::CacheBuilder::tolerance).
	///
	/// # Panics
	///
	/// Panics if `max_rows` is zero.
	pub fn with_tolerance(max_rows: usize, tolerance: usize) -> Self {
		crate::CacheBuilder::new(max_rows).tolerance(tolerance).build()
	}

	/// Internal constructor; `max_rows` is already validated.
	pub(crate) fn from_parts(max_rows: usize, tolerance: usize) -> Self {
		debug!(max_rows, tolerance, "creating heaped cache");
		Self {
			store: Mutex::new(Store::new(max_rows, tolerance)),
			#[cfg(feature = "metrics")]
			hits: AtomicU64::new(0),
			#[cfg(feature = "metrics")]
			misses: AtomicU64::new(0),
			#[cfg(feature = "metrics")]
			inserts: AtomicU64::new(0),
			#[cfg(feature = "metrics")]
			updates: AtomicU64::new(0),
			#[cfg(feature = "metrics")]
			evictions: AtomicU64::new(0),
			#[cfg(feature = "metrics")]
			removals: AtomicU64::new(0),
			#[cfg(feature = "metrics")]
			pops: AtomicU64::new(0),
			#[cfg(feature = "metrics")]
			loads: AtomicU64::new(0),
		}
	}

	/// Look up a value. Does not refresh the entry's recency.
	///
	/// # Runtime Complexity
	///
	/// Expected case: O(1)
	pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
	where
		K: Borrow<Q>,
		Q: Hash + Eq + ?Sized,
	{
		let store = self.store.lock();
		let value = store.get(key).cloned();
		drop(store);
		self.record_lookup(value.is_some());
		value
	}

	/// Look up a value and clone it out of the cache.
	pub fn get_clone<Q>(&self, key: &Q) -> Option<V>
	where
		K: Borrow<Q>,
		Q: Hash + Eq + ?Sized,
		V: Clone,
	{
		let store = self.store.lock();
		let value = store.get(key).map(|arc| V::clone(arc));
		drop(store);
		self.record_lookup(value.is_some());
		value
	}

	/// Borrow a value in place. The returned guard holds the cache lock.
	///
	/// # Warning
	///
	/// Do NOT hold this guard across `.await` points or call back into the
	/// cache while it is alive. Use [`get`](Self::get) instead.
	pub fn get_ref<Q>(&self, key: &Q) -> Option<Guard<'_, V>>
	where
		K: Borrow<Q>,
		Q: Hash + Eq + ?Sized,
	{
		let store = self.store.lock();
		match MutexGuard::try_map(store, |store| store.value_mut(key)) {
			Ok(mapped) => {
				self.record_lookup(true);
				Some(Guard::new(mapped))
			}
			Err(_) => {
				self.record_lookup(false);
				None
			}
		}
	}

	/// Check if a key is present. Not counted as a lookup.
	pub fn contains<Q>(&self, key: &Q) -> bool
	where
		K: Borrow<Q>,
		Q: Hash + Eq + ?Sized,
	{
		self.store.lock().contains(key)
	}

	/// Insert or overwrite a value, stamping it as the newest write.
	///
	/// If the key is new and the cache is full, the entry with the oldest
	/// write is evicted. Returns a handle to the stored value.
	///
	/// # Runtime Complexity
	///
	/// O(log n)
	pub fn push(&self, key: K, value: V) -> Arc<V> {
		self.push_arc(key, Arc::new(value))
	}

	/// Like [`push`](Self::push), for a value that is already shared.
	pub fn push_arc(&self, key: K, value: Arc<V>) -> Arc<V> {
		let mut store = self.store.lock();
		self.push_locked(&mut store, key, Arc::clone(&value));
		value
	}

	/// Push an optional value. `None` is rejected and leaves the cache
	/// untouched.
	pub fn push_opt(&self, key: K, value: Option<V>) -> Option<Arc<V>> {
		let value = value?;
		Some(self.push(key, value))
	}

	/// Push many values under a single lock acquisition.
	///
	/// Capacity is enforced after every item, so the cache never holds more
	/// than `max_rows` entries once this returns, however many items the
	/// iterator yields. Returns the number of entries evicted.
	pub fn push_many<I>(&self, items: I) -> usize
	where
		I: IntoIterator<Item = (K, V)>,
	{
		let mut store = self.store.lock();
		items
			.into_iter()
			.map(|(key, value)| self.push_locked(&mut store, key, Arc::new(value)))
			.sum()
	}

	/// Return the value for `key`, loading and storing it on a miss.
	///
	/// A hit returns the existing value without refreshing its recency. On a
	/// miss, `loader` runs **while the cache lock is held**, then its value is
	/// pushed exactly as [`push`](Self::push) would. If the loader returns
	/// `None` the cache is left unchanged and `None` is returned.
	///
	/// Holding the lock guarantees the loader runs at most once per missing
	/// key, even when many threads race on the same key. In exchange:
	///
	/// - the loader must not call back into this cache (it would deadlock);
	/// - the loader should be quick, since every other caller waits for it.
	///
	/// A panicking loader leaves the cache unchanged.
	pub fn get_or_push<F>(&self, key: K, loader: F) -> Option<Arc<V>>
	where
		F: FnOnce(&K) -> Option<V>,
	{
		let mut store = self.store.lock();

		if let Some(value) = store.get(&key) {
			let value = Arc::clone(value);
			self.record_lookup(true);
			return Some(value);
		}
		self.record_lookup(false);

		trace!("invoking loader for missing key");
		#[cfg(feature = "metrics")]
		self.loads.fetch_add(1, Ordering::Relaxed);

		let value = Arc::new(loader(&key)?);
		self.push_locked(&mut store, key, Arc::clone(&value));
		Some(value)
	}

	/// Remove a key. Returns `true` if it was present.
	///
	/// # Runtime Complexity
	///
	/// O(log n)
	pub fn remove<Q>(&self, key: &Q) -> bool
	where
		K: Borrow<Q>,
		Q: Hash + Eq + ?Sized,
	{
		let removed = self.store.lock().remove(key);
		let Some(_value) = removed else {
			return false;
		};

		trace!("removed entry");
		#[cfg(feature = "metrics")]
		self.removals.fetch_add(1, Ordering::Relaxed);

		true
	}

	/// Remove and return the value with the oldest write.
	pub fn pop(&self) -> Option<Arc<V>> {
		self.pop_entry().map(|(_, value)| value)
	}

	/// Remove and return the key and value with the oldest write.
	pub fn pop_entry(&self) -> Option<(K, Arc<V>)> {
		let popped = self.store.lock().pop();

		#[cfg(feature = "metrics")]
		if popped.is_some() {
			self.pops.fetch_add(1, Ordering::Relaxed);
		}

		popped
	}

	/// Key of the next entry to be evicted.
	pub fn peek_oldest(&self) -> Option<K> {
		self.store.lock().peek_oldest().cloned()
	}

	/// Time since the next entry to be evicted was written.
	pub fn oldest_age(&self) -> Option<Duration> {
		self.store.lock().oldest_age()
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.store.lock().len()
	}

	/// Check if cache is empty.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Maximum number of entries.
	pub fn capacity(&self) -> usize {
		self.store.lock().max_rows()
	}

	/// Drop all entries. Keeps the allocated storage.
	pub fn clear(&self) {
		let mut store = self.store.lock();
		debug!(dropped = store.len(), "clearing heaped cache");
		store.clear();
		drop(store);

		// Reset all metrics
		#[cfg(feature = "metrics")]
		{
			self.hits.store(0, Ordering::Relaxed);
			self.misses.store(0, Ordering::Relaxed);
			self.inserts.store(0, Ordering::Relaxed);
			self.updates.store(0, Ordering::Relaxed);
			self.evictions.store(0, Ordering::Relaxed);
			self.removals.store(0, Ordering::Relaxed);
			self.pops.store(0, Ordering::Relaxed);
			self.loads.store(0, Ordering::Relaxed);
		}
	}

	/// Get a snapshot of the activity counters.
	#[cfg(feature = "metrics")]
	pub fn metrics(&self) -> CacheMetrics {
		let (entry_count, capacity_rows) = {
			let store = self.store.lock();
			(store.len(), store.max_rows())
		};
		CacheMetrics {
			hits: self.hits.load(Ordering::Relaxed),
			misses: self.misses.load(Ordering::Relaxed),
			inserts: self.inserts.load(Ordering::Relaxed),
			updates: self.updates.load(Ordering::Relaxed),
			evictions: self.evictions.load(Ordering::Relaxed),
			removals: self.removals.load(Ordering::Relaxed),
			pops: self.pops.load(Ordering::Relaxed),
			loads: self.loads.load(Ordering::Relaxed),
			entry_count,
			capacity_rows,
		}
	}

	/// Push with the lock already held. Returns the number of evictions.
	fn push_locked(&self, store: &mut Store<K, V>, key: K, value: Arc<V>) -> usize {
		let (previous, evicted) = store.push(key, value);

		#[cfg(feature = "metrics")]
		{
			if previous.is_some() {
				self.updates.fetch_add(1, Ordering::Relaxed);
			} else {
				self.inserts.fetch_add(1, Ordering::Relaxed);
			}
			self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
		}
		#[cfg(not(feature = "metrics"))]
		let _ = previous;

		evicted
	}

	#[cfg_attr(not(feature = "metrics"), allow(unused_variables))]
	fn record_lookup(&self, hit: bool) {
		#[cfg(feature = "metrics")]
		if hit {
			self.hits.fetch_add(1, Ordering::Relaxed);
		} else {
			self.misses.fetch_add(1, Ordering::Relaxed);
		}
	}

	#[cfg(test)]
	pub(crate) fn is_locked(&self) -> bool {
		self.store.is_locked()
	}

	#[cfg(test)]
	pub(crate) fn check_invariants(&self) {
		self.store.lock().check_invariants();
	}
}
