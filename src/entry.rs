use std::cmp::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Recency timestamp assigned on every write.
///
/// Ordered by `seq` first, so two writes landing on the same `Instant` still
/// have a strict, deterministic order. `seq` is handed out under the cache
/// lock and therefore never goes backwards.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Stamp {
	/// Write sequence number (per cache, strictly increasing)
	pub seq: u64,
	/// Instant the write happened
	pub at: Instant,
}

impl Stamp {
	pub fn new(seq: u64) -> Self {
		Self {
			seq,
			at: Instant::now(),
		}
	}

	/// Time elapsed since this stamp was taken.
	pub fn age(&self) -> Duration {
		self.at.elapsed()
	}
}

impl PartialEq for Stamp {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}

impl Eq for Stamp {}

impl PartialOrd for Stamp {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Stamp {
	fn cmp(&self, other: &Self) -> Ordering {
		self.seq.cmp(&other.seq).then_with(|| self.at.cmp(&other.at))
	}
}

/// A live cache record.
///
/// Owned by the slot arena. Both the identity index and the recency heap
/// refer to it through its `SlotId`, never by holding the record itself.
pub(crate) struct Entry<K, V> {
	/// Key, kept so that evicting the heap root can erase it from the index
	pub key: K,
	/// Shared payload handed out to readers
	pub value: Arc<V>,
	/// Last write time, drives eviction order
	pub refreshed: Stamp,
	/// Current slot of this entry in the heap array
	pub position: usize,
}

impl<K, V> Entry<K, V> {
	/// Create a new entry. The position is set when the heap places it.
	pub fn new(key: K, value: Arc<V>, refreshed: Stamp) -> Self {
		Self {
			key,
			value,
			refreshed,
			position: 0,
		}
	}

	/// Replace the payload and refresh the timestamp.
	///
	/// Returns the previous payload. The caller is responsible for re-fixing
	/// the heap at `self.position` afterwards.
	pub fn overwrite(&mut self, value: Arc<V>, refreshed: Stamp) -> Arc<V> {
		self.refreshed = refreshed;
		std::mem::replace(&mut self.value, value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_stamp_orders_by_sequence() {
		let older = Stamp::new(1);
		let newer = Stamp::new(2);

		assert!(older < newer);
		assert_eq!(older.cmp(&older), Ordering::Equal);
	}

	#[test]
	fn test_stamp_same_instant_is_still_strict() {
		let at = Instant::now();
		let a = Stamp {
			seq: 7,
			at,
		};
		let b = Stamp {
			seq: 8,
			at,
		};

		assert!(a < b);
		assert_ne!(a, b);
	}

	#[test]
	fn test_entry_creation() {
		let entry = Entry::new("k", Arc::new(42u32), Stamp::new(0));

		assert_eq!(entry.key, "k");
		assert_eq!(*entry.value, 42);
		assert_eq!(entry.position, 0);
	}

	#[test]
	fn test_entry_overwrite() {
		let mut entry = Entry::new("k", Arc::new(1u32), Stamp::new(0));
		entry.position = 3;

		let old = entry.overwrite(Arc::new(2), Stamp::new(5));

		assert_eq!(*old, 1);
		assert_eq!(*entry.value, 2);
		assert_eq!(entry.refreshed.seq, 5);
		// overwrite never touches the heap slot
		assert_eq!(entry.position, 3);
	}
}
