//! Single-shot dirty tracking for nodes and links.
//!
//! Each entity class keeps a sorted set of stale indices until the set grows
//! to cover the whole class, at which point it escalates to a plain "all"
//! flag. Everything is cleared once drained by a render pass.

use std::collections::BTreeSet;
use std::fmt;

use super::network::LinkData;

/// The two entity classes owned by the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityClass {
	/// Circles.
	Nodes,
	/// Segments.
	Links,
}

impl fmt::Display for EntityClass {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Nodes => "nodes",
			Self::Links => "links",
		})
	}
}

/// What a drain tells the consumer to recompute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pending {
	/// Every entity of the class.
	All,
	/// Only these indices, ascending.
	Indices(Vec<usize>),
}

impl Pending {
	/// Whether there is nothing to do.
	pub fn is_empty(&self) -> bool {
		matches!(self, Self::Indices(indices) if indices.is_empty())
	}
}

#[derive(Clone, Debug, Default)]
struct ClassQueue {
	pending: BTreeSet<usize>,
	all: bool,
}

impl ClassQueue {
	fn mark(&mut self, indices: impl IntoIterator<Item = usize>, count: usize) {
		if self.all {
			return;
		}
		self.pending.extend(indices);
		self.all = self.pending.len() >= count;
	}

	fn mark_all(&mut self) {
		self.all = true;
		self.pending.clear();
	}

	fn drain(&mut self, count: usize) -> Pending {
		let queue = std::mem::take(self);
		if queue.all || queue.pending.len() >= count {
			return Pending::All;
		}
		Pending::Indices(queue.pending.into_iter().filter(|&i| i < count).collect())
	}
}

/// Staging area between mutations and the next render.
#[derive(Clone, Debug, Default)]
pub struct UpdateQueue {
	nodes: ClassQueue,
	links: ClassQueue,
	transform: bool,
}

impl UpdateQueue {
	/// Empty queue.
	pub fn new() -> Self {
		Self::default()
	}

	fn class_mut(&mut self, class: EntityClass) -> &mut ClassQueue {
		match class {
			EntityClass::Nodes => &mut self.nodes,
			EntityClass::Links => &mut self.links,
		}
	}

	fn class(&self, class: EntityClass) -> &ClassQueue {
		match class {
			EntityClass::Nodes => &self.nodes,
			EntityClass::Links => &self.links,
		}
	}

	/// Queue indices of `class`; escalates once `count` distinct indices are queued.
	pub fn mark_indices(
		&mut self,
		class: EntityClass,
		indices: impl IntoIterator<Item = usize>,
		count: usize,
	) {
		self.class_mut(class).mark(indices, count);
	}

	/// Escalate `class` straight to "all".
	pub fn mark_all(&mut self, class: EntityClass) {
		self.class_mut(class).mark_all();
	}

	/// Flag the transform for re-upload to the backend.
	pub fn mark_transform(&mut self) {
		self.transform = true;
	}

	/// Whether `class` is escalated.
	pub fn is_all(&self, class: EntityClass) -> bool {
		self.class(class).all
	}

	/// Number of individually queued indices of `class`.
	pub fn queued(&self, class: EntityClass) -> usize {
		self.class(class).pending.len()
	}

	/// Take the pending work for `class`, judged against `count` as it is now.
	pub fn drain(&mut self, class: EntityClass, count: usize) -> Pending {
		self.class_mut(class).drain(count)
	}

	/// Take the transform flag.
	pub fn take_transform(&mut self) -> bool {
		std::mem::take(&mut self.transform)
	}

	/// Forget everything queued.
	pub fn clear(&mut self) {
		*self = Self::default();
	}
}

/// Indices of every link with an endpoint in `nodes`.
///
/// Linear in the number of links; meant to run once per update batch.
pub fn find_links(links: &[LinkData], nodes: &[usize]) -> Vec<usize> {
	let dirty: BTreeSet<usize> = nodes.iter().copied().collect();
	links
		.iter()
		.enumerate()
		.filter(|(_, link)| dirty.contains(&link.from) || dirty.contains(&link.to))
		.map(|(i, _)| i)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn queued_indices_drain_sorted_and_unique() {
		let mut queue = UpdateQueue::new();
		queue.mark_indices(EntityClass::Nodes, [4, 1, 4, 2], 10);
		assert_eq!(queue.queued(EntityClass::Nodes), 3);
		assert_eq!(
			queue.drain(EntityClass::Nodes, 10),
			Pending::Indices(vec![1, 2, 4])
		);
		assert!(queue.drain(EntityClass::Nodes, 10).is_empty());
	}

	#[test]
	fn escalates_when_every_index_is_queued() {
		let mut queue = UpdateQueue::new();
		queue.mark_indices(EntityClass::Links, [2, 0, 0], 3);
		assert!(!queue.is_all(EntityClass::Links));
		queue.mark_indices(EntityClass::Links, [1], 3);
		assert!(queue.is_all(EntityClass::Links));
		assert_eq!(queue.drain(EntityClass::Links, 3), Pending::All);
		assert!(!queue.is_all(EntityClass::Links));
	}

	#[test]
	fn escalation_ignores_later_marks() {
		let mut queue = UpdateQueue::new();
		queue.mark_all(EntityClass::Nodes);
		queue.mark_indices(EntityClass::Nodes, [7], 100);
		assert_eq!(queue.queued(EntityClass::Nodes), 0);
		assert_eq!(queue.drain(EntityClass::Nodes, 100), Pending::All);
	}

	#[test]
	fn drain_uses_count_at_drain_time() {
		let mut queue = UpdateQueue::new();
		queue.mark_indices(EntityClass::Nodes, [0, 5, 9], 10);
		assert_eq!(
			queue.drain(EntityClass::Nodes, 6),
			Pending::Indices(vec![0, 5])
		);

		queue.mark_indices(EntityClass::Nodes, [0, 1], 10);
		assert_eq!(queue.drain(EntityClass::Nodes, 2), Pending::All);
	}

	#[test]
	fn classes_are_independent() {
		let mut queue = UpdateQueue::new();
		queue.mark_all(EntityClass::Nodes);
		queue.mark_indices(EntityClass::Links, [1], 4);
		assert_eq!(queue.drain(EntityClass::Links, 4), Pending::Indices(vec![1]));
		assert_eq!(queue.drain(EntityClass::Nodes, 4), Pending::All);
	}

	#[test]
	fn transform_flag_is_single_shot() {
		let mut queue = UpdateQueue::new();
		queue.mark_transform();
		assert!(queue.take_transform());
		assert!(!queue.take_transform());
	}

	#[test]
	fn find_links_matches_either_endpoint_only() {
		let links = [
			LinkData::new(0, 1),
			LinkData::new(1, 2),
			LinkData::new(2, 3),
			LinkData::new(3, 0),
		];
		assert_eq!(find_links(&links, &[0]), vec![0, 3]);
		assert_eq!(find_links(&links, &[2, 1]), vec![0, 1, 2]);
		assert!(find_links(&links, &[9]).is_empty());
		assert!(find_links(&links, &[]).is_empty());
	}
}
