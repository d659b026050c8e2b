use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Serialize, Deserialize};

use crate::catalog::{Category, Part, PartId};
use crate::compatibility::PartLookup;

/// One candidate configuration, at most one part per category.
///
/// Totals are kept in step with the parts, summed in category order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
	parts: BTreeMap<Category, Arc<Part>>,
	total_price: f64,
	total_score: f64,
}

impl Build {
	/// A later part replaces an earlier one of the same category.
	pub fn from_parts(parts: impl IntoIterator<Item = Arc<Part>>) -> Self {
		let parts: BTreeMap<Category, Arc<Part>> = parts.into_iter().map(|p| (p.category(), p)).collect();
		Self::from_map(parts)
	}

	fn from_map(parts: BTreeMap<Category, Arc<Part>>) -> Self {
		let total_price = parts.values().map(|p| p.price).sum();
		let total_score = parts.values().map(|p| p.score).sum();
		Self { parts, total_price, total_score }
	}

	pub fn get(&self, category: Category) -> Option<&Arc<Part>> {
		self.parts.get(&category)
	}

	pub fn contains(&self, category: Category) -> bool {
		self.parts.contains_key(&category)
	}

	/// Parts in category order.
	pub fn parts(&self) -> impl Iterator<Item = &Arc<Part>> {
		self.parts.values()
	}

	pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
		self.parts.keys().copied()
	}

	pub fn part_ids(&self) -> Vec<&PartId> {
		self.parts.values().map(|p| &p.id).collect()
	}

	/// Copy of the build with `part` added or replacing the part of its category.
	pub fn with_part(&self, part: Arc<Part>) -> Self {
		let mut parts = self.parts.clone();
		parts.insert(part.category(), part);
		Self::from_map(parts)
	}

	pub fn without(&self, category: Category) -> Self {
		let mut parts = self.parts.clone();
		parts.remove(&category);
		Self::from_map(parts)
	}

	pub fn total_price(&self) -> f64 {
		self.total_price
	}

	pub fn total_score(&self) -> f64 {
		self.total_score
	}

	pub fn len(&self) -> usize {
		self.parts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.parts.is_empty()
	}
}

impl PartLookup for Build {
	fn part(&self, category: Category) -> Option<&Part> {
		self.parts.get(&category).map(|p| p.as_ref())
	}
}

/// A partial selection threaded through the exhaustive search.
///
/// Each step pushes a [`Link`] living on that step's stack frame, so sibling branches never
/// see each other's choices and backtracking needs no undo.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Selection<'a> {
	head: Option<&'a Link<'a>>,
	price: f64,
}

#[derive(Debug)]
pub(crate) struct Link<'a> {
	part: &'a Arc<Part>,
	next: Option<&'a Link<'a>>,
}

impl<'a> Selection<'a> {
	pub fn price(&self) -> f64 {
		self.price
	}

	pub fn is_empty(&self) -> bool {
		self.head.is_none()
	}

	/// Link for `part` on top of this selection, pass it to [`push`](Selection::push).
	pub fn link(&self, part: &'a Arc<Part>) -> Link<'a> {
		Link { part, next: self.head }
	}

	pub fn push(link: &'a Link<'a>, price: f64) -> Self {
		Self { head: Some(link), price }
	}

	pub fn iter(&self) -> impl Iterator<Item = &'a Arc<Part>> {
		std::iter::successors(self.head, |l| l.next).map(|l| l.part)
	}

	pub fn to_build(&self) -> Build {
		Build::from_parts(self.iter().cloned())
	}
}

impl PartLookup for Selection<'_> {
	fn part(&self, category: Category) -> Option<&Part> {
		self.iter().find(|p| p.category() == category).map(|p| p.as_ref())
	}
}
