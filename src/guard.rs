use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use parking_lot::MappedMutexGuard;

/// RAII guard for a borrowed value. Holds the cache lock while alive.
///
/// **Intentionally `!Send`** so it cannot be held across `.await` points in
/// a `Send` future. Every other cache operation, from any thread, blocks
/// until the guard is dropped, and calling back into the same cache while
/// holding one deadlocks.
///
/// For anything longer-lived, use [`HeapedCache::get`](crate::HeapedCache::get),
/// which returns an `Arc<V>` that stays valid after eviction.
///
/// # Example
///
/// ```
/// use heaped_cache::HeapedCache;
///
/// let cache: HeapedCache<u64, String> = HeapedCache::new(8);
/// cache.push(1, "one".to_string());
///
/// let len = {
///     let guard = cache.get_ref(&1).unwrap();
///     guard.len()
/// }; // lock released here
///
/// assert_eq!(len, 3);
/// ```
///
/// A guard cannot be moved to another thread:
///
/// ```compile_fail
/// use heaped_cache::HeapedCache;
///
/// fn require_send<T: Send>(_: T) {}
///
/// let cache: HeapedCache<u64, String> = HeapedCache::new(8);
/// cache.push(1, "one".to_string());
/// require_send(cache.get_ref(&1).unwrap());
/// ```
pub struct Guard<'a, V> {
	inner: MappedMutexGuard<'a, Arc<V>>,
}

impl<'a, V> Guard<'a, V> {
	pub(crate) fn new(inner: MappedMutexGuard<'a, Arc<V>>) -> Self {
		Self {
			inner,
		}
	}

	/// Clone the shared handle out of the guard.
	pub fn to_arc(&self) -> Arc<V> {
		Arc::clone(&self.inner)
	}
}

impl<V> Deref for Guard<'_, V> {
	type Target = V;

	fn deref(&self) -> &V {
		&self.inner
	}
}

impl<V: fmt::Debug> fmt::Debug for Guard<'_, V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		(**self).fmt(f)
	}
}

impl<V: fmt::Display> fmt::Display for Guard<'_, V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		(**self).fmt(f)
	}
}

impl<V: PartialEq> PartialEq<V> for Guard<'_, V> {
	fn eq(&self, other: &V) -> bool {
		**self == *other
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::HeapedCache;

	#[test]
	fn test_guard_is_sync() {
		fn assert_sync<T: Sync>() {}
		assert_sync::<Guard<i32>>();
	}

	#[test]
	fn test_guard_deref_and_to_arc() {
		let cache: HeapedCache<u64, String> = HeapedCache::new(4);
		cache.push(1, "one".to_string());

		let arc = {
			let guard = cache.get_ref(&1).expect("key should exist");
			assert_eq!(*guard, "one".to_string());
			assert_eq!(format!("{guard}"), "one");
			guard.to_arc()
		};

		// Handle outlives both the guard and the entry.
		assert!(cache.remove(&1));
		assert_eq!(*arc, "one");
	}

	#[test]
	fn test_guard_holds_lock() {
		let cache: HeapedCache<u64, u64> = HeapedCache::new(4);
		cache.push(1, 10);

		let guard = cache.get_ref(&1).expect("key should exist");
		assert!(cache.is_locked(), "lock should be held by the guard");
		drop(guard);
		assert!(!cache.is_locked());
		assert_eq!(cache.len(), 1);
	}
}
