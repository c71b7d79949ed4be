use std::ops::{Index, IndexMut};

use crate::entry::Entry;

/// Stable handle to an entry in the arena.
///
/// Handles are reused after the entry they pointed to is released, so a
/// handle must never be kept past the removal of its entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SlotId(u32);

impl SlotId {
	#[inline]
	fn index(self) -> usize {
		self.0 as usize
	}
}

/// Arena owning every live entry.
///
/// Freed slots go onto a free list and are reused before the backing vector
/// grows, so once `capacity` entries have been allocated the arena never
/// reallocates.
pub(crate) struct Slots<K, V> {
	slots: Vec<Option<Entry<K, V>>>,
	free: Vec<SlotId>,
	live: usize,
}

impl<K, V> Slots<K, V> {
	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			slots: Vec::with_capacity(capacity),
			free: Vec::with_capacity(capacity),
			live: 0,
		}
	}

	/// Store an entry and return its handle.
	pub fn insert(&mut self, entry: Entry<K, V>) -> SlotId {
		self.live += 1;
		if let Some(id) = self.free.pop() {
			self.slots[id.index()] = Some(entry);
			return id;
		}
		let id = SlotId(u32::try_from(self.slots.len()).expect("slot arena exceeded u32::MAX entries"));
		self.slots.push(Some(entry));
		id
	}

	/// Release a slot, returning the entry it held.
	///
	/// # Panics
	///
	/// Panics if the slot is already vacant.
	pub fn remove(&mut self, id: SlotId) -> Entry<K, V> {
		let entry = self.slots[id.index()].take().expect("released a vacant slot");
		self.free.push(id);
		self.live -= 1;
		entry
	}

	#[cfg(test)]
	pub fn get(&self, id: SlotId) -> Option<&Entry<K, V>> {
		self.slots.get(id.index()).and_then(Option::as_ref)
	}

	#[cfg(test)]
	pub fn len(&self) -> usize {
		self.live
	}

	/// Drop every entry. Keeps the allocation.
	pub fn clear(&mut self) {
		self.slots.clear();
		self.free.clear();
		self.live = 0;
	}
}

impl<K, V> Index<SlotId> for Slots<K, V> {
	type Output = Entry<K, V>;

	fn index(&self, id: SlotId) -> &Entry<K, V> {
		self.slots[id.index()].as_ref().expect("dangling slot handle")
	}
}

impl<K, V> IndexMut<SlotId> for Slots<K, V> {
	fn index_mut(&mut self, id: SlotId) -> &mut Entry<K, V> {
		self.slots[id.index()].as_mut().expect("dangling slot handle")
	}
}
