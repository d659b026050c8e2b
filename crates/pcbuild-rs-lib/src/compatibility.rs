//! # Compatibility rules
//!
//! Every rule relates a small set of categories and is only evaluated when the parts it needs
//! are present, so the same rules work on partial selections during a search and on finished
//! builds. A failed rule is not an error, it is the normal way a search learns a candidate
//! doesn't fit.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Serialize, Deserialize};

use crate::catalog::{Category, Part, PcieVersion, TokenSet};

mod rules;
mod search_order;

/// Anything that can answer "which part fills this category".
///
/// Builds, partial selections and plain maps all implement this so rules can be evaluated on each.
pub trait PartLookup {
	fn part(&self, category: Category) -> Option<&Part>;
}

impl PartLookup for BTreeMap<Category, Arc<Part>> {
	fn part(&self, category: Category) -> Option<&Part> {
		self.get(&category).map(|p| p.as_ref())
	}
}

/// A selection with one extra part laid over it.
struct WithCandidate<'a, L: ?Sized> {
	base: &'a L,
	candidate: &'a Part,
}

impl<L: PartLookup + ?Sized> PartLookup for WithCandidate<'_, L> {
	fn part(&self, category: Category) -> Option<&Part> {
		if category == self.candidate.category() {
			Some(self.candidate)
		} else {
			self.base.part(category)
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rule {
	/// Processor and motherboard use the same socket.
	SocketMatch,
	/// Motherboard and memory use the same memory type.
	MemoryType,
	/// The motherboard supports the storage interface.
	StorageInterface,
	/// The motherboard has a slot for the graphics card's PCIe version.
	PcieSlot,
	/// The cooler mounts on the processor's socket.
	CoolerSocket,
	/// The case fits the motherboard's form factor.
	CaseFormFactor,
	/// The power supply covers everything drawing power.
	PowerBudget,
}

impl Rule {
	pub const ALL: [Rule; 7] = [
		Rule::SocketMatch,
		Rule::MemoryType,
		Rule::StorageInterface,
		Rule::PcieSlot,
		Rule::CoolerSocket,
		Rule::CaseFormFactor,
		Rule::PowerBudget,
	];

	/// Edges `(from, to)` where `to` is constrained by what was chosen for `from`.
	pub fn dependencies(&self) -> &'static [(Category, Category)] {
		use Category::*;
		match self {
			Rule::SocketMatch => &[(Processor, Motherboard)],
			Rule::MemoryType => &[(Motherboard, Ram)],
			Rule::StorageInterface => &[(Motherboard, Storage)],
			Rule::PcieSlot => &[(Motherboard, GraphicsCard)],
			Rule::CoolerSocket => &[(Processor, Cooler)],
			Rule::CaseFormFactor => &[(Motherboard, Case)],
			Rule::PowerBudget => &[(Processor, PowerSupply), (GraphicsCard, PowerSupply), (Cooler, PowerSupply)],
		}
	}

	pub fn involves(&self, category: Category) -> bool {
		self.dependencies().iter().any(|(from, to)| *from == category || *to == category)
	}
}

impl std::fmt::Display for Rule {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}", self)
	}
}

/// Why a part can't join a selection.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Incompatibility {
	#[error("processor socket \"{processor}\" does not match motherboard socket \"{motherboard}\"")]
	SocketMismatch { processor: String, motherboard: String },
	#[error("motherboard takes \"{motherboard}\" memory, not \"{ram}\"")]
	MemoryTypeMismatch { motherboard: String, ram: String },
	#[error("motherboard does not support the \"{interface}\" storage interface (supports {supported})")]
	StorageInterfaceUnsupported { interface: String, supported: TokenSet },
	#[error("graphics card needs PCIe {card}, motherboard offers {supported}")]
	PcieUnsupported { card: PcieVersion, supported: String },
	#[error("cooler does not fit socket \"{socket}\" (fits {supported})")]
	CoolerSocketUnsupported { socket: String, supported: TokenSet },
	#[error("case does not fit a \"{form_factor}\" motherboard (fits {supported})")]
	FormFactorUnsupported { form_factor: String, supported: TokenSet },
	#[error("power supply provides {wattage}W, build needs {required}W")]
	InsufficientPower { wattage: f64, required: f64 },
}

impl Incompatibility {
	pub fn rule(&self) -> Rule {
		match self {
			Incompatibility::SocketMismatch { .. } => Rule::SocketMatch,
			Incompatibility::MemoryTypeMismatch { .. } => Rule::MemoryType,
			Incompatibility::StorageInterfaceUnsupported { .. } => Rule::StorageInterface,
			Incompatibility::PcieUnsupported { .. } => Rule::PcieSlot,
			Incompatibility::CoolerSocketUnsupported { .. } => Rule::CoolerSocket,
			Incompatibility::FormFactorUnsupported { .. } => Rule::CaseFormFactor,
			Incompatibility::InsufficientPower { .. } => Rule::PowerBudget,
		}
	}
}

/// How much headroom a power supply must have.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PowerPolicy {
	/// Added on top of the summed draw for everything not in the catalog, drives, fans, board.
	pub overhead_watts: f64,
	pub safety_multiplier: f64,
}

impl Default for PowerPolicy {
	fn default() -> Self {
		Self {
			overhead_watts: 100.0,
			safety_multiplier: 1.0,
		}
	}
}

impl PowerPolicy {
	pub fn required_watts(&self, draw: f64) -> f64 {
		(draw + self.overhead_watts) * self.safety_multiplier
	}
}

/// Which graphics cards a motherboard accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PciePolicy {
	/// Any card up to the newest version the board lists. Slots are backwards compatible.
	#[default]
	AtMostSupported,
	/// Only versions the board lists.
	Exact,
}

#[derive(Debug, Clone)]
pub struct RuleEngine {
	rules: Vec<Rule>,
	power: PowerPolicy,
	pcie: PciePolicy,
}

impl Default for RuleEngine {
	fn default() -> Self {
		Self::new(PowerPolicy::default(), PciePolicy::default())
	}
}

impl RuleEngine {
	/// Creates an engine enforcing every rule.
	pub fn new(power: PowerPolicy, pcie: PciePolicy) -> Self {
		Self {
			rules: Rule::ALL.to_vec(),
			power,
			pcie,
		}
	}

	/// Restricts the engine to `rules`.
	pub fn with_rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
		let rules: BTreeSet<Rule> = rules.into_iter().collect();
		self.rules = rules.into_iter().collect();
		self
	}

	pub fn rules(&self) -> &[Rule] {
		&self.rules
	}

	pub fn power_policy(&self) -> &PowerPolicy {
		&self.power
	}

	pub fn pcie_policy(&self) -> PciePolicy {
		self.pcie
	}

	/// Checks whether `candidate` can join `partial`.
	///
	/// Only rules involving the candidate's category are evaluated, the partial selection is
	/// assumed to already be consistent. If `partial` already holds a part of the candidate's
	/// category the candidate takes its place.
	pub fn check<L: PartLookup + ?Sized>(&self, partial: &L, candidate: &Part) -> Result<(), Incompatibility> {
		let view = WithCandidate { base: partial, candidate };
		let category = candidate.category();
		for rule in self.rules.iter().filter(|r| r.involves(category)) {
			rule.evaluate(&view, self)?;
		}
		Ok(())
	}

	/// Evaluates every rule over a whole build, returning the first failure.
	pub fn validate<L: PartLookup + ?Sized>(&self, build: &L) -> Result<(), Incompatibility> {
		for rule in &self.rules {
			rule.evaluate(build, self)?;
		}
		Ok(())
	}

	/// Every rule the build fails.
	pub fn violations<L: PartLookup + ?Sized>(&self, build: &L) -> Vec<Incompatibility> {
		self.rules.iter().filter_map(|rule| rule.evaluate(build, self).err()).collect()
	}

	/// Watts a power supply must deliver for the parts in `build`.
	pub fn required_power<L: PartLookup + ?Sized>(&self, build: &L) -> f64 {
		let draw: f64 = [Category::Processor, Category::GraphicsCard, Category::Cooler].iter()
			.filter_map(|c| build.part(*c))
			.map(|p| p.power_draw())
			.sum();
		self.power.required_watts(draw)
	}

	/// Order in which categories should be filled.
	///
	/// A topological order of the rules' dependency edges over `active`, always picking the
	/// category that prunes hardest among those ready.
	/// # Errors
	/// - [`RuleCycle`](crate::Error::RuleCycle) if the rules' dependencies form a cycle.
	pub fn search_order(&self, active: impl IntoIterator<Item = Category>) -> crate::Result<Vec<Category>> {
		let active: BTreeSet<Category> = active.into_iter().collect();
		search_order::search_order(&self.rules, &active)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::catalog::part::*;

	fn cpu(socket: &str, power: f64) -> Arc<Part> {
		Arc::new(Part::new(format!("cpu {}", socket), 100.0, PartSpec::Processor(ProcessorSpec { socket: socket.into(), power, ..Default::default() })))
	}

	fn board(socket: &str) -> Arc<Part> {
		Arc::new(Part::new(format!("board {}", socket), 100.0, PartSpec::Motherboard(MotherboardSpec { socket: socket.into(), ..Default::default() })))
	}

	fn psu(wattage: f64) -> Arc<Part> {
		Arc::new(Part::new(format!("psu {}", wattage), 100.0, PartSpec::PowerSupply(PowerSupplySpec { wattage })))
	}

	fn selection(parts: &[Arc<Part>]) -> BTreeMap<Category, Arc<Part>> {
		parts.iter().map(|p| (p.category(), p.clone())).collect()
	}

	#[test]
	fn check_ignores_rules_missing_a_side() {
		let engine = RuleEngine::default();
		assert!(engine.check(&selection(&[]), &board("am5")).is_ok());
	}

	#[test]
	fn check_rejects_socket_mismatch() {
		let engine = RuleEngine::default();
		let err = engine.check(&selection(&[cpu("am5", 65.0)]), &board("lga1700")).unwrap_err();
		assert_eq!(err.rule(), Rule::SocketMatch);
		assert!(err.to_string().contains("lga1700"));
	}

	#[test]
	fn candidate_replaces_same_category() {
		let engine = RuleEngine::default();
		let partial = selection(&[cpu("lga1700", 65.0), board("am5")]);
		assert!(engine.check(&partial, &cpu("am5", 65.0)).is_ok());
	}

	#[test]
	fn power_budget_uses_overhead() {
		let engine = RuleEngine::default();
		let partial = selection(&[cpu("am5", 200.0)]);
		assert!(engine.check(&partial, &psu(300.0)).is_ok());
		assert!(matches!(
			engine.check(&partial, &psu(299.0)),
			Err(Incompatibility::InsufficientPower { required, .. }) if required == 300.0
		));
	}

	#[test]
	fn safety_multiplier_scales_requirement() {
		let engine = RuleEngine::new(PowerPolicy { overhead_watts: 100.0, safety_multiplier: 1.5 }, PciePolicy::default());
		assert_eq!(engine.required_power(&selection(&[cpu("am5", 100.0)])), 300.0);
	}

	#[test]
	fn disabled_rules_are_not_checked() {
		let engine = RuleEngine::default().with_rules([Rule::PowerBudget]);
		assert!(engine.check(&selection(&[cpu("am5", 65.0)]), &board("lga1700")).is_ok());
		assert_eq!(engine.rules(), &[Rule::PowerBudget]);
	}

	#[test]
	fn violations_lists_every_failure() {
		let engine = RuleEngine::default();
		let build = selection(&[cpu("am5", 500.0), board("lga1700"), psu(100.0)]);
		let rules: Vec<Rule> = engine.violations(&build).iter().map(|v| v.rule()).collect();
		assert_eq!(rules, vec![Rule::SocketMatch, Rule::PowerBudget]);
		assert_eq!(engine.validate(&build).unwrap_err().rule(), Rule::SocketMatch);
	}

	#[test]
	fn every_rule_involves_its_categories() {
		assert!(Rule::PowerBudget.involves(Category::Cooler));
		assert!(!Rule::PowerBudget.involves(Category::Case));
		assert!(Rule::CaseFormFactor.involves(Category::Motherboard));
	}
}
