//! The canonical part representation.

use serde::{Serialize, Deserialize};

use super::Category;
use super::PcieVersion;
use super::TokenSet;

/// A stable identifier for a part.
///
/// Taken from the catalog record when it has one, otherwise derived from the category and name
/// so the same part keeps its id across catalog refreshes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartId(String);

impl PartId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn derive(category: Category, name: &str) -> Self {
		let digest = sha256::digest(format!("{}:{}", category, name.trim().to_lowercase()));
		Self(digest[..16].to_string())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for PartId {
	fn from(value: &str) -> Self {
		Self(value.to_string())
	}
}

impl AsRef<str> for PartId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for PartId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorSpec {
	pub socket: String,
	/// Watts drawn.
	pub power: f64,
	/// GHz.
	pub frequency: f64,
	pub cores: f64,
	pub integrated_graphics: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotherboardSpec {
	pub socket: String,
	pub ram_type: String,
	pub form_factor: String,
	pub supported_interfaces: TokenSet,
	/// Sorted ascending.
	pub pcie_versions: Vec<PcieVersion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RamSpec {
	pub ram_type: String,
	/// MHz.
	pub frequency: f64,
	/// GB.
	pub capacity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageSpec {
	pub interface: String,
	pub capacity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphicsCardSpec {
	pub pcie_version: Option<PcieVersion>,
	pub power: f64,
	/// GB of video memory.
	pub memory: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseSpec {
	pub supported_form_factors: TokenSet,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoolerSpec {
	pub supported_sockets: TokenSet,
	pub power: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerSupplySpec {
	/// Watts supplied.
	pub wattage: f64,
}

/// Category specific attributes of a part.
///
/// All comparison strings are already normalized and list attributes already split into sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PartSpec {
	Processor(ProcessorSpec),
	Motherboard(MotherboardSpec),
	Ram(RamSpec),
	Storage(StorageSpec),
	GraphicsCard(GraphicsCardSpec),
	Case(CaseSpec),
	Cooler(CoolerSpec),
	Monitor,
	PowerSupply(PowerSupplySpec),
	Keyboard,
	Mouse,
	OperatingSystem,
}

impl PartSpec {
	pub fn category(&self) -> Category {
		match self {
			PartSpec::Processor(_) => Category::Processor,
			PartSpec::Motherboard(_) => Category::Motherboard,
			PartSpec::Ram(_) => Category::Ram,
			PartSpec::Storage(_) => Category::Storage,
			PartSpec::GraphicsCard(_) => Category::GraphicsCard,
			PartSpec::Case(_) => Category::Case,
			PartSpec::Cooler(_) => Category::Cooler,
			PartSpec::Monitor => Category::Monitor,
			PartSpec::PowerSupply(_) => Category::PowerSupply,
			PartSpec::Keyboard => Category::Keyboard,
			PartSpec::Mouse => Category::Mouse,
			PartSpec::OperatingSystem => Category::OperatingSystem,
		}
	}

	/// Performance proxy for the part.
	///
	/// Categories without a meaningful performance axis score a flat `1`
	/// so they never skew comparisons between builds.
	pub fn score(&self) -> f64 {
		let score = match self {
			PartSpec::Processor(p) => p.frequency * 10.0 + p.cores * 5.0,
			PartSpec::GraphicsCard(g) => g.memory * 10.0 + g.pcie_version.map_or(0.0, |v| v.major() as f64),
			PartSpec::Ram(r) => r.frequency / 100.0 + r.capacity,
			_ => 1.0,
		};
		score.max(0.0)
	}

	/// Whether any attribute the category's score formula reads is set.
	pub fn has_score_inputs(&self) -> bool {
		match self {
			PartSpec::Processor(p) => p.frequency > 0.0 || p.cores > 0.0,
			PartSpec::GraphicsCard(g) => g.memory > 0.0 || g.pcie_version.is_some(),
			PartSpec::Ram(r) => r.frequency > 0.0 || r.capacity > 0.0,
			_ => false,
		}
	}

	/// Watts this part draws from the power supply.
	pub fn power_draw(&self) -> f64 {
		match self {
			PartSpec::Processor(p) => p.power,
			PartSpec::GraphicsCard(g) => g.power,
			PartSpec::Cooler(c) => c.power,
			_ => 0.0,
		}
	}
}

/// A single catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
	pub id: PartId,
	pub name: String,
	pub description: String,
	pub price: f64,
	pub score: f64,
	pub spec: PartSpec,
}

impl Part {
	/// Creates a part with a derived id and a score computed from `spec`.
	pub fn new(name: impl Into<String>, price: f64, spec: PartSpec) -> Self {
		let name = name.into().trim().to_string();
		Self {
			id: PartId::derive(spec.category(), &name),
			name,
			description: String::new(),
			price,
			score: spec.score(),
			spec,
		}
	}

	pub fn with_id(mut self, id: PartId) -> Self {
		self.id = id;
		self
	}

	/// Overrides the score computed from the spec.
	pub fn with_score(mut self, score: f64) -> Self {
		self.score = score;
		self
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = description.into().trim().to_string();
		self
	}

	pub fn category(&self) -> Category {
		self.spec.category()
	}

	/// Parts without a name or with a non positive price never enter a catalog.
	pub fn is_valid(&self) -> bool {
		!self.name.is_empty() && self.price.is_finite() && self.price > 0.0 && self.score.is_finite()
	}

	/// Score per unit of price, used to order candidates.
	pub fn value_density(&self) -> f64 {
		self.score / self.price
	}

	pub fn power_draw(&self) -> f64 {
		self.spec.power_draw()
	}

	pub fn processor(&self) -> Option<&ProcessorSpec> {
		if let PartSpec::Processor(s) = &self.spec { Some(s) } else { None }
	}

	pub fn motherboard(&self) -> Option<&MotherboardSpec> {
		if let PartSpec::Motherboard(s) = &self.spec { Some(s) } else { None }
	}

	pub fn ram(&self) -> Option<&RamSpec> {
		if let PartSpec::Ram(s) = &self.spec { Some(s) } else { None }
	}

	pub fn storage(&self) -> Option<&StorageSpec> {
		if let PartSpec::Storage(s) = &self.spec { Some(s) } else { None }
	}

	pub fn graphics_card(&self) -> Option<&GraphicsCardSpec> {
		if let PartSpec::GraphicsCard(s) = &self.spec { Some(s) } else { None }
	}

	pub fn case(&self) -> Option<&CaseSpec> {
		if let PartSpec::Case(s) = &self.spec { Some(s) } else { None }
	}

	pub fn cooler(&self) -> Option<&CoolerSpec> {
		if let PartSpec::Cooler(s) = &self.spec { Some(s) } else { None }
	}

	pub fn power_supply(&self) -> Option<&PowerSupplySpec> {
		if let PartSpec::PowerSupply(s) = &self.spec { Some(s) } else { None }
	}
}
