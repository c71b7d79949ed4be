use crate::slots::{SlotId, Slots};

/// Array-backed binary min-heap of slot handles, ordered by entry recency.
///
/// The root is always the entry with the oldest `refreshed` stamp. Every
/// entry stores its own array position, and every primitive that moves a
/// handle writes the new position back into the entry, so an arbitrary entry
/// can be removed or re-sorted in O(log n) without searching for it.
///
/// The heap does not own entries; it is always driven together with the
/// [`Slots`] arena that does.
pub(crate) struct RecencyHeap {
	items: Vec<SlotId>,
}

#[inline]
fn parent(i: usize) -> usize {
	(i - 1) / 2
}

#[inline]
fn left(i: usize) -> usize {
	2 * i + 1
}

impl RecencyHeap {
	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			items: Vec::with_capacity(capacity),
		}
	}

	#[cfg(test)]
	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Handle of the oldest entry, if any.
	pub fn root(&self) -> Option<SlotId> {
		self.items.first().copied()
	}

	/// Append an entry and sift it up into place.
	pub fn push<K, V>(&mut self, slots: &mut Slots<K, V>, id: SlotId) {
		let last = self.items.len();
		self.items.push(id);
		slots[id].position = last;
		self.sift_up(slots, last);
	}

	/// Remove and return the oldest entry's handle.
	///
	/// # Panics
	///
	/// Panics if the heap is empty.
	pub fn pop_root<K, V>(&mut self, slots: &mut Slots<K, V>) -> SlotId {
		assert!(!self.items.is_empty(), "pop_root called on an empty recency heap");
		self.remove_at(slots, 0)
	}

	/// Remove the handle at `position` and restore the heap property.
	///
	/// The last handle is swapped into the hole, then fixed up in both
	/// directions since it may belong above or below the vacated slot.
	///
	/// # Panics
	///
	/// Panics if `position` is out of range.
	pub fn remove_at<K, V>(&mut self, slots: &mut Slots<K, V>, position: usize) -> SlotId {
		let len = self.items.len();
		assert!(position < len, "heap position {position} out of range (len {len})");

		let last = len - 1;
		self.swap(slots, position, last);
		let Some(removed) = self.items.pop() else {
			unreachable!("heap was checked to be non-empty");
		};
		if position < self.items.len() {
			self.fix(slots, position);
		}
		removed
	}

	/// Restore the heap property for the handle at `position` after its
	/// stamp changed in either direction.
	pub fn fix<K, V>(&mut self, slots: &mut Slots<K, V>, position: usize) {
		if !self.sift_up(slots, position) {
			self.sift_down(slots, position);
		}
	}

	/// Drop every handle. Keeps the allocation.
	pub fn clear(&mut self) {
		self.items.clear();
	}

	/// Handle stored at `position`.
	#[cfg(test)]
	pub fn get(&self, position: usize) -> Option<SlotId> {
		self.items.get(position).copied()
	}

	/// Move the handle at `i` towards the root. Returns whether it moved.
	fn sift_up<K, V>(&mut self, slots: &mut Slots<K, V>, mut i: usize) -> bool {
		let start = i;
		while i > 0 {
			let p = parent(i);
			if slots[self.items[i]].refreshed >= slots[self.items[p]].refreshed {
				break;
			}
			self.swap(slots, i, p);
			i = p;
		}
		i != start
	}

	/// Move the handle at `i` towards the leaves. Ties prefer the left child.
	fn sift_down<K, V>(&mut self, slots: &mut Slots<K, V>, mut i: usize) {
		let len = self.items.len();
		loop {
			let l = left(i);
			if l >= len {
				break;
			}
			let r = l + 1;
			let mut child = l;
			if r < len && slots[self.items[r]].refreshed < slots[self.items[l]].refreshed {
				child = r;
			}
			if slots[self.items[child]].refreshed >= slots[self.items[i]].refreshed {
				break;
			}
			self.swap(slots, i, child);
			i = child;
		}
	}

	fn swap<K, V>(&mut self, slots: &mut Slots<K, V>, i: usize, j: usize) {
		if i == j {
			return;
		}
		self.items.swap(i, j);
		slots[self.items[i]].position = i;
		slots[self.items[j]].position = j;
	}

	/// Recency stamp of the handle at `position`.
	#[cfg(test)]
	pub fn stamp_at<K, V>(&self, slots: &Slots<K, V>, position: usize) -> crate::entry::Stamp {
		slots[self.items[position]].refreshed
	}
}
