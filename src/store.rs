use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use ahash::RandomState;
use tracing::trace;

use crate::entry::{Entry, Stamp};
use crate::heap::RecencyHeap;
use crate::slots::{SlotId, Slots};

/// Identity index plus recency heap over one shared entry arena.
///
/// The store is not thread-safe on its own; [`HeapedCache`](crate::HeapedCache)
/// wraps it in a mutex so that the index and the heap are always mutated
/// together.
pub(crate) struct Store<K, V> {
	/// Key to arena handle
	index: HashMap<K, SlotId, RandomState>,
	/// Owner of every live entry
	slots: Slots<K, V>,
	/// Handles ordered by last write
	heap: RecencyHeap,
	/// Maximum number of live entries at rest
	max_rows: usize,
	/// Next write sequence number
	next_seq: u64,
}

impl<K, V> Store<K, V>
where
	K: Hash + Eq + Clone,
{
	/// Create a store for `max_rows` entries, reserving `max_rows + tolerance`
	/// slots up front so the one-entry overflow window never reallocates.
	pub fn new(max_rows: usize, tolerance: usize) -> Self {
		let reserved = max_rows + tolerance;
		Self {
			index: HashMap::with_capacity_and_hasher(reserved, RandomState::new()),
			slots: Slots::with_capacity(reserved),
			heap: RecencyHeap::with_capacity(reserved),
			max_rows,
			next_seq: 0,
		}
	}

	pub fn get<Q>(&self, key: &Q) -> Option<&Arc<V>>
	where
		K: Borrow<Q>,
		Q: Hash + Eq + ?Sized,
	{
		let id = self.index.get(key)?;
		Some(&self.slots[*id].value)
	}

	/// Mutable access to the stored handle, used to build lock-holding guards.
	///
	/// Only the `Arc` is exposed; callers cannot reach the stamp or position.
	pub fn value_mut<Q>(&mut self, key: &Q) -> Option<&mut Arc<V>>
	where
		K: Borrow<Q>,
		Q: Hash + Eq + ?Sized,
	{
		let id = *self.index.get(key)?;
		Some(&mut self.slots[id].value)
	}

	pub fn contains<Q>(&self, key: &Q) -> bool
	where
		K: Borrow<Q>,
		Q: Hash + Eq + ?Sized,
	{
		self.index.contains_key(key)
	}

	/// Insert or overwrite `key`.
	///
	/// A new key is added to both structures; if that pushes the live count
	/// above `max_rows` the oldest entries are evicted until it no longer does.
	/// An existing key has its value replaced and its stamp refreshed, and is
	/// re-sorted in place.
	///
	/// Returns the replaced value (if the key existed) and the number of
	/// entries evicted.
	pub fn push(&mut self, key: K, value: Arc<V>) -> (Option<Arc<V>>, usize) {
		let stamp = self.next_stamp();

		if let Some(&id) = self.index.get(&key) {
			let entry = &mut self.slots[id];
			let previous = entry.overwrite(value, stamp);
			let position = entry.position;
			self.heap.fix(&mut self.slots, position);
			return (Some(previous), 0);
		}

		let id = self.slots.insert(Entry::new(key.clone(), value, stamp));
		self.heap.push(&mut self.slots, id);
		self.index.insert(key, id);

		(None, self.evict_overflow())
	}

	/// Remove `key` from both structures, returning its value.
	pub fn remove<Q>(&mut self, key: &Q) -> Option<Arc<V>>
	where
		K: Borrow<Q>,
		Q: Hash + Eq + ?Sized,
	{
		let id = *self.index.get(key)?;
		let position = self.slots[id].position;
		// Heap first: a failed heap precondition must leave the index intact.
		let removed = self.heap.remove_at(&mut self.slots, position);
		debug_assert_eq!(removed, id);
		self.index.remove(key);
		Some(self.slots.remove(id).value)
	}

	/// Remove and return the oldest entry.
	pub fn pop(&mut self) -> Option<(K, Arc<V>)> {
		if self.heap.is_empty() {
			return None;
		}
		Some(self.pop_root())
	}

	/// Key of the oldest entry.
	pub fn peek_oldest(&self) -> Option<&K> {
		let id = self.heap.root()?;
		Some(&self.slots[id].key)
	}

	/// Time since the oldest entry was written.
	pub fn oldest_age(&self) -> Option<Duration> {
		let id = self.heap.root()?;
		Some(self.slots[id].refreshed.age())
	}

	pub fn len(&self) -> usize {
		self.index.len()
	}

	pub fn max_rows(&self) -> usize {
		self.max_rows
	}

	/// Drop every entry. Keeps the allocations.
	pub fn clear(&mut self) {
		self.index.clear();
		self.heap.clear();
		self.slots.clear();
	}

	fn next_stamp(&mut self) -> Stamp {
		let stamp = Stamp::new(self.next_seq);
		self.next_seq += 1;
		stamp
	}

	fn evict_overflow(&mut self) -> usize {
		let mut evicted = 0;
		while self.index.len() > self.max_rows {
			self.pop_root();
			evicted += 1;
		}
		if evicted > 0 {
			trace!(evicted, max_rows = self.max_rows, "evicted oldest entries on overflow");
		}
		evicted
	}

	/// # Panics
	///
	/// Panics if the heap is empty.
	fn pop_root(&mut self) -> (K, Arc<V>) {
		let id = self.heap.pop_root(&mut self.slots);
		let entry = self.slots.remove(id);
		self.index.remove(&entry.key);
		(entry.key, entry.value)
	}

	/// Assert every structural invariant of the store.
	#[cfg(test)]
	pub fn check_invariants(&self) {
		assert_eq!(self.index.len(), self.heap.len(), "index and heap sizes differ");
		assert_eq!(self.index.len(), self.slots.len(), "index and arena sizes differ");
		assert!(self.index.len() <= self.max_rows, "live count above max_rows at rest");

		for (key, &id) in &self.index {
			let entry = self.slots.get(id).expect("index points at a vacant slot");
			assert!(&entry.key == key, "arena entry key differs from index key");
			assert_eq!(self.heap.get(entry.position), Some(id), "position field is stale");
		}

		for i in 1..self.heap.len() {
			let parent = (i - 1) / 2;
			assert!(
				self.heap.stamp_at(&self.slots, parent) <= self.heap.stamp_at(&self.slots, i),
				"heap property violated at {i}"
			);
		}
	}
}
