//! Partitioning and ranking of generated builds.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use serde::{Serialize, Deserialize};

use crate::catalog::{Category, PartId};
use crate::generator::{Build, SearchOutcome, Tolerance, TopN};

/// Builds split by budget, best first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ranking {
	/// At or under budget.
	pub within: Vec<Build>,
	/// Over budget but within the tolerance.
	pub near: Vec<Build>,
}

fn ids(build: &Build) -> Vec<PartId> {
	build.part_ids().into_iter().cloned().collect()
}

/// Higher score first, then cheaper, then by part ids so the order never depends on input order.
pub fn compare(a: &Build, b: &Build) -> Ordering {
	b.total_score().total_cmp(&a.total_score())
		.then(a.total_price().total_cmp(&b.total_price()))
		.then_with(|| a.part_ids().cmp(&b.part_ids()))
}

/// Deduplicates, partitions and sorts `builds`, keeping the best `top_n` of each partition.
///
/// Without a budget every build counts as within budget.
pub fn rank(builds: impl IntoIterator<Item = Build>, budget: Option<f64>, tolerance: Tolerance, top_n: TopN) -> Ranking {
	let mut seen = HashSet::new();
	let mut builds: Vec<Build> = builds.into_iter().filter(|b| seen.insert(ids(b))).collect();
	builds.sort_by(compare);

	let mut ranking = Ranking::default();
	for build in builds {
		let price = build.total_price();
		match budget {
			None => ranking.within.push(build),
			Some(budget) if price <= budget => ranking.within.push(build),
			Some(budget) if price <= budget + tolerance.margin(budget) => ranking.near.push(build),
			Some(_) => {},
		}
	}

	ranking.within.truncate(top_n.within);
	ranking.near.truncate(top_n.near);
	ranking
}

/// How the search that produced a [`Recommendation`] went.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchNotes {
	/// Builds emitted before ranking.
	pub candidates: usize,
	/// The search hit a cap so better builds might exist.
	pub truncated: bool,
	pub cancelled: bool,
	/// Active categories no build could include.
	pub unmatched: BTreeSet<Category>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
	Found,
	NoConfigurationsFound,
}

impl std::fmt::Display for Status {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Status::Found => f.write_str("configurations found"),
			Status::NoConfigurationsFound => f.write_str("no configurations found"),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
	pub within: Vec<Build>,
	pub near: Vec<Build>,
	pub notes: SearchNotes,
}

impl Recommendation {
	pub fn status(&self) -> Status {
		if self.is_empty() { Status::NoConfigurationsFound } else { Status::Found }
	}

	pub fn is_empty(&self) -> bool {
		self.within.is_empty() && self.near.is_empty()
	}

	/// Best build within budget, or the best near-budget one when nothing fits.
	pub fn best(&self) -> Option<&Build> {
		self.within.first().or_else(|| self.near.first())
	}
}

pub(crate) fn recommend(outcome: SearchOutcome, budget: Option<f64>, tolerance: Tolerance, top_n: TopN) -> Recommendation {
	let notes = SearchNotes {
		candidates: outcome.builds.len(),
		truncated: outcome.truncated,
		cancelled: outcome.cancelled,
		unmatched: outcome.unmatched(),
	};
	let ranking = rank(outcome.builds, budget, tolerance, top_n);
	Recommendation {
		within: ranking.within,
		near: ranking.near,
		notes,
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;
	use crate::catalog::{Part, PartSpec};
	use crate::catalog::part::ProcessorSpec;

	/// A single processor build with the given price and score.
	fn build(name: &str, price: f64, score: f64) -> Build {
		let mut part = Part::new(name, price, PartSpec::Processor(ProcessorSpec::default()));
		part.score = score;
		Build::from_parts(vec![Arc::new(part)])
	}

	fn names(builds: &[Build]) -> Vec<&str> {
		builds.iter().filter_map(|b| b.get(Category::Processor)).map(|p| p.name.as_str()).collect()
	}

	#[test]
	fn higher_score_wins_within_budget() {
		let ranking = rank(vec![build("a", 90_000.0, 50.0), build("b", 95_000.0, 80.0)], Some(100_000.0), Tolerance::default(), TopN::default());
		assert_eq!(names(&ranking.within), vec!["b", "a"]);
		assert!(ranking.near.is_empty());
	}

	#[test]
	fn equal_scores_prefer_cheaper() {
		let ranking = rank(vec![build("a", 20.0, 5.0), build("b", 10.0, 5.0)], None, Tolerance::default(), TopN::default());
		assert_eq!(names(&ranking.within), vec!["b", "a"]);
	}

	#[test]
	fn partitions_by_budget_and_tolerance() {
		let ranking = rank(
			vec![build("in", 100.0, 1.0), build("edge", 150.0, 1.0), build("near", 149.0, 1.0), build("out", 151.0, 1.0)],
			Some(100.0),
			Tolerance::Absolute(50.0),
			TopN::default(),
		);
		assert_eq!(names(&ranking.within), vec!["in"]);
		assert_eq!(names(&ranking.near), vec!["near", "edge"]);
	}

	#[test]
	fn fraction_tolerance() {
		let ranking = rank(vec![build("near", 109.0, 1.0), build("out", 111.0, 1.0)], Some(100.0), Tolerance::Fraction(0.1), TopN::default());
		assert_eq!(names(&ranking.near), vec!["near"]);
	}

	#[test]
	fn truncates_each_partition() {
		let builds: Vec<Build> = (0..10).map(|i| build(&format!("w{}", i), 10.0 + i as f64, i as f64)).collect();
		let ranking = rank(builds, None, Tolerance::default(), TopN { within: 5, near: 3 });
		assert_eq!(ranking.within.len(), 5);
		assert_eq!(names(&ranking.within)[0], "w9");
	}

	#[test]
	fn duplicates_are_collapsed() {
		let ranking = rank(vec![build("a", 10.0, 1.0), build("a", 10.0, 1.0)], None, Tolerance::default(), TopN::default());
		assert_eq!(ranking.within.len(), 1);
	}

	#[test]
	fn empty_recommendation_reports_status() {
		let recommendation = recommend(SearchOutcome::default(), Some(100.0), Tolerance::default(), TopN::default());
		assert_eq!(recommendation.status(), Status::NoConfigurationsFound);
		assert_eq!(recommendation.status().to_string(), "no configurations found");
		assert!(recommendation.best().is_none());
	}
}
