//! # Build generation
//!
//! Searches the catalog for combinations of parts, one per active category, that satisfy every
//! compatibility rule and fit under a price ceiling.
//!
//! Two strategies are offered. [`Strategy::Exhaustive`] backtracks over every compatible
//! combination until a candidate cap is reached. [`Strategy::Greedy`] builds a handful of
//! configurations from the best value parts and then improves them by swapping parts, trading
//! completeness for speed on large catalogs.
//!
//! Neither strategy treats an incompatible part or an unaffordable part as an error. A category
//! where nothing fits the current selection is left out of the build and reported back through
//! [`SearchOutcome::unmatched`]. A category with a fitting part that is over budget is never left
//! out: the exhaustive search drops that branch and the greedy search drops that start.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::time::{Duration, Instant};

use serde::{Serialize, Deserialize};

use crate::catalog::{Catalog, Category, Part};
use crate::compatibility::{PartLookup, RuleEngine};

mod build;
pub use build::Build;
pub(crate) use build::Selection;

mod exhaustive;
mod greedy;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Strategy {
	#[default]
	Exhaustive,
	Greedy,
}

impl std::str::FromStr for Strategy {
	type Err = crate::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_lowercase().as_str() {
			"exhaustive" => Ok(Strategy::Exhaustive),
			"greedy" => Ok(Strategy::Greedy),
			other => Err(crate::Error::Parse(format!("unknown strategy \"{}\", expected exhaustive or greedy", other))),
		}
	}
}

impl std::fmt::Display for Strategy {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Strategy::Exhaustive => f.write_str("exhaustive"),
			Strategy::Greedy => f.write_str("greedy"),
		}
	}
}

/// How far over budget a build may go and still be offered as an alternative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tolerance {
	Absolute(f64),
	/// A fraction of the budget, `0.1` allows builds up to 10% over.
	Fraction(f64),
}

impl Default for Tolerance {
	fn default() -> Self {
		Tolerance::Absolute(100_000.0)
	}
}

impl Tolerance {
	pub fn margin(&self, budget: f64) -> f64 {
		match self {
			Tolerance::Absolute(amount) => *amount,
			Tolerance::Fraction(fraction) => budget * fraction,
		}
	}

	fn is_valid(&self) -> bool {
		let value = match self {
			Tolerance::Absolute(v) | Tolerance::Fraction(v) => *v,
		};
		value.is_finite() && value >= 0.0
	}
}

/// Number of builds kept per partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TopN {
	pub within: usize,
	pub near: usize,
}

impl Default for TopN {
	fn default() -> Self {
		Self { within: 5, near: 3 }
	}
}

/// Whether a graphics card is searched for when the processor has integrated graphics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GraphicsGate {
	/// Always look for a card.
	#[default]
	Always,
	/// Never add a card to a processor with integrated graphics.
	SkipWithIntegrated,
	/// Offer builds both with and without a card.
	OptionalWithIntegrated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Gate {
	Include,
	Skip,
	Optional,
}

/// What to generate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
	pub categories: BTreeSet<Category>,
	/// No budget means only the candidate cap limits the search.
	pub budget: Option<f64>,
	pub tolerance: Tolerance,
	pub top_n: TopN,
	pub strategy: Strategy,
}

impl BuildRequest {
	pub fn new(categories: impl IntoIterator<Item = Category>) -> Self {
		Self {
			categories: categories.into_iter().collect(),
			budget: None,
			tolerance: Tolerance::default(),
			top_n: TopN::default(),
			strategy: Strategy::default(),
		}
	}

	pub fn with_budget(mut self, budget: f64) -> Self {
		self.budget = Some(budget);
		self
	}

	pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
		self.tolerance = tolerance;
		self
	}

	pub fn with_top_n(mut self, top_n: TopN) -> Self {
		self.top_n = top_n;
		self
	}

	pub fn with_strategy(mut self, strategy: Strategy) -> Self {
		self.strategy = strategy;
		self
	}

	/// # Errors
	/// - [`NoActiveCategories`](crate::Error::NoActiveCategories) when no categories are requested.
	/// - [`InvalidBudget`](crate::Error::InvalidBudget) when a budget is given that isn't a positive number.
	/// - [`Validation`](crate::Error::Validation) when the tolerance is negative or not a number.
	pub fn validate(&self) -> crate::Result<()> {
		if self.categories.is_empty() {
			return Err(crate::Error::NoActiveCategories);
		}
		if let Some(budget) = self.budget {
			if !budget.is_finite() || budget <= 0.0 {
				return Err(crate::Error::InvalidBudget(budget));
			}
		}
		if !self.tolerance.is_valid() {
			return Err(crate::Error::Validation(format!("tolerance must be a non-negative number, got {:?}", self.tolerance)));
		}
		Ok(())
	}

	/// Highest total price a generated build may have.
	pub fn ceiling(&self) -> Option<f64> {
		self.budget.map(|b| b + self.tolerance.margin(b))
	}
}

/// Cooperative cancellation shared between a search and whoever started it.
///
/// Clones share the same flag. A deadline makes the token cancel itself once it passes.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
	flag: Arc<AtomicBool>,
	deadline: Option<Instant>,
}

impl CancelToken {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_timeout(timeout: Duration) -> Self {
		Self {
			flag: Arc::default(),
			deadline: Instant::now().checked_add(timeout),
		}
	}

	pub fn cancel(&self) {
		self.flag.store(true, AtomicOrdering::Relaxed);
	}

	pub fn is_cancelled(&self) -> bool {
		self.flag.load(AtomicOrdering::Relaxed) || self.deadline.map_or(false, |d| Instant::now() >= d)
	}
}

/// Limits and tuning for a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchSettings {
	/// The search stops once this many builds have been emitted.
	pub max_candidates: usize,
	/// The search stops after this many candidate checks.
	pub max_expansions: usize,
	pub greedy_starts: usize,
	pub improvement_rounds: usize,
	/// Candidates per category considered for pairwise swaps.
	pub swap_width: usize,
	pub graphics_gate: GraphicsGate,
}

impl Default for SearchSettings {
	fn default() -> Self {
		Self {
			max_candidates: 5000,
			max_expansions: 2_000_000,
			greedy_starts: 8,
			improvement_rounds: 32,
			swap_width: 6,
			graphics_gate: GraphicsGate::default(),
		}
	}
}

/// Builds found by a search and how the search went.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
	pub builds: Vec<Build>,
	/// A cap was hit, more builds may exist.
	pub truncated: bool,
	pub cancelled: bool,
	/// Candidate checks performed.
	pub expansions: usize,
	skipped: BTreeSet<Category>,
	matched: BTreeSet<Category>,
}

impl SearchOutcome {
	/// Active categories where no part ever fit, either because the catalog has none or
	/// because none was compatible with the rest of the selection.
	pub fn unmatched(&self) -> BTreeSet<Category> {
		self.skipped.difference(&self.matched).copied().collect()
	}

	pub(crate) fn record(&mut self, category: Category, compatible: bool) {
		if compatible {
			self.matched.insert(category);
		} else {
			self.skipped.insert(category);
		}
	}

	pub(crate) fn emit(&mut self, build: Build, cap: usize) -> ControlFlow<()> {
		self.builds.push(build);
		if self.builds.len() >= cap {
			log::warn!("Search stopped after reaching the cap of {} candidate builds", cap);
			self.truncated = true;
			return ControlFlow::Break(());
		}
		ControlFlow::Continue(())
	}

	fn merge(&mut self, other: SearchOutcome) {
		self.builds.extend(other.builds);
		self.truncated |= other.truncated;
		self.cancelled |= other.cancelled;
		self.expansions += other.expansions;
		self.skipped.extend(other.skipped);
		self.matched.extend(other.matched);
	}
}

pub(crate) fn within(ceiling: Option<f64>, price: f64) -> bool {
	ceiling.map_or(true, |c| price <= c)
}

fn by_value(a: &&Arc<Part>, b: &&Arc<Part>) -> Ordering {
	b.value_density().total_cmp(&a.value_density())
		.then(a.price.total_cmp(&b.price))
		.then_with(|| a.id.cmp(&b.id))
}

fn by_score(a: &&Arc<Part>, b: &&Arc<Part>) -> Ordering {
	b.score.total_cmp(&a.score)
		.then(a.price.total_cmp(&b.price))
		.then_with(|| a.id.cmp(&b.id))
}

/// A search over one catalog for one set of categories.
pub struct Generator<'c> {
	engine: &'c RuleEngine,
	settings: &'c SearchSettings,
	cancel: &'c CancelToken,
	order: Vec<Category>,
	/// Best value first.
	candidates: BTreeMap<Category, Vec<&'c Arc<Part>>>,
	/// Best score first.
	ranked: BTreeMap<Category, Vec<&'c Arc<Part>>>,
	empty: BTreeSet<Category>,
}

impl<'c> Generator<'c> {
	/// # Errors
	/// - [`RuleCycle`](crate::Error::RuleCycle) when no search order exists for the engine's rules.
	pub fn new(catalog: &'c Catalog, engine: &'c RuleEngine, settings: &'c SearchSettings, cancel: &'c CancelToken, categories: &BTreeSet<Category>) -> crate::Result<Self> {
		let order = engine.search_order(categories.iter().copied())?;

		let mut candidates = BTreeMap::new();
		let mut ranked = BTreeMap::new();
		let mut empty = BTreeSet::new();
		for &category in &order {
			let mut parts: Vec<&Arc<Part>> = catalog.parts_in(category).iter().collect();
			if parts.is_empty() {
				log::debug!("No {} parts in catalog, builds will leave it out", category);
				empty.insert(category);
				continue;
			}
			parts.sort_by(by_value);
			let mut by_score_order = parts.clone();
			by_score_order.sort_by(by_score);
			candidates.insert(category, parts);
			ranked.insert(category, by_score_order);
		}

		log::debug!("Searching categories in order {:?}", order);
		Ok(Self { engine, settings, cancel, order, candidates, ranked, empty })
	}

	pub fn order(&self) -> &[Category] {
		&self.order
	}

	pub(crate) fn candidates(&self, category: Category) -> &[&'c Arc<Part>] {
		self.candidates.get(&category).map(|v| v.as_slice()).unwrap_or(&[])
	}

	pub(crate) fn ranked(&self, category: Category) -> &[&'c Arc<Part>] {
		self.ranked.get(&category).map(|v| v.as_slice()).unwrap_or(&[])
	}

	pub(crate) fn gate<L: PartLookup + ?Sized>(&self, category: Category, selection: &L) -> Gate {
		if category != Category::GraphicsCard {
			return Gate::Include;
		}
		let integrated = selection.part(Category::Processor)
			.and_then(Part::processor)
			.map_or(false, |p| p.integrated_graphics);
		match (integrated, self.settings.graphics_gate) {
			(false, _) | (true, GraphicsGate::Always) => Gate::Include,
			(true, GraphicsGate::SkipWithIntegrated) => Gate::Skip,
			(true, GraphicsGate::OptionalWithIntegrated) => Gate::Optional,
		}
	}

	/// Whether `build` may hold a graphics card given its processor.
	/// `include_optional` decides for processors where the card is optional.
	pub(crate) fn admits(&self, build: &Build, include_optional: bool) -> bool {
		let has_card = build.contains(Category::GraphicsCard);
		match self.gate(Category::GraphicsCard, build) {
			Gate::Include => true,
			Gate::Skip => !has_card,
			Gate::Optional => include_optional || !has_card,
		}
	}

	pub fn respects_gate(&self, build: &Build) -> bool {
		self.admits(build, true)
	}

	/// Runs `strategy`.
	///
	/// Builds above `ceiling` are never returned. Greedy search runs once against `budget` and once
	/// against `ceiling` so both cheaper and near-budget builds are found.
	pub fn run(&self, strategy: Strategy, budget: Option<f64>, ceiling: Option<f64>) -> SearchOutcome {
		let mut outcome = match strategy {
			Strategy::Exhaustive => exhaustive::search(self, ceiling),
			Strategy::Greedy => {
				let mut outcome = greedy::search(self, budget);
				if ceiling != budget && !outcome.cancelled && !outcome.truncated {
					outcome.merge(greedy::search(self, ceiling));
				}
				outcome
			},
		};
		outcome.skipped.extend(self.empty.iter().copied());
		outcome
	}
}

/// Generates and ranks builds for `request`.
///
/// # Errors
/// - Anything [`BuildRequest::validate`] rejects, before any search is attempted.
/// - [`RuleCycle`](crate::Error::RuleCycle) when no search order exists for the configured rules.
pub fn generate(catalog: &Catalog, request: &BuildRequest, options: &crate::PcBuildOptions, cancel: &CancelToken) -> crate::Result<crate::Recommendation> {
	request.validate()?;

	let engine = options.rule_engine();
	let settings = options.search_settings();
	let generator = Generator::new(catalog, &engine, &settings, cancel, &request.categories)?;

	let started = Instant::now();
	let outcome = generator.run(request.strategy, request.budget, request.ceiling());
	log::info!(
		"{} search emitted {} builds after {} checks in {:?}",
		request.strategy, outcome.builds.len(), outcome.expansions, started.elapsed()
	);
	if outcome.cancelled {
		log::warn!("Search was cancelled, results are partial");
	}

	Ok(crate::ranking::recommend(outcome, request.budget, request.tolerance, request.top_n))
}
