//! User configuration, stored as JSON.

use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};

use crate::compatibility::{PciePolicy, PowerPolicy, RuleEngine};
use crate::generator::{GraphicsGate, SearchSettings, Strategy, Tolerance, TopN};
use crate::templates::BuildTemplate;

/// Base directory for pcbuild-rs files of one kind, `None` when the environment doesn't say where.
fn app_dir(xdg_var: &str, home_fallback: &str) -> Option<PathBuf> {
	#[cfg(target_os = "windows")]
	let path = {
		let _ = (xdg_var, home_fallback);
		std::env::var_os("APPDATA").map(PathBuf::from)
	};

	#[cfg(not(target_os = "windows"))]
	let path = match std::env::var_os(xdg_var) {
		Some(e) => Some(PathBuf::from(e)),
		None => std::env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback)),
	};

	path.map(|p| p.join("pcbuild-rs"))
}

/// Default location of the configuration file.
pub fn default_config_path() -> Option<PathBuf> {
	app_dir("XDG_CONFIG_HOME", ".config").map(|p| p.join("config.json"))
}

/// Largest whole number of seconds a [`chrono::Duration`] holds.
const MAX_TTL_SECS: i64 = i64::MAX / 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PcBuildOptions {
	data_dir: Option<PathBuf>,
	catalog_ttl_secs: i64,
	power: PowerPolicy,
	pcie: PciePolicy,
	search: SearchSettings,
	tolerance: Tolerance,
	top_n: TopN,
	strategy: Strategy,
	templates: Vec<BuildTemplate>,
}

impl Default for PcBuildOptions {
	fn default() -> Self {
		Self {
			data_dir: app_dir("XDG_DATA_HOME", ".local/share"),
			catalog_ttl_secs: 60 * 60,
			power: PowerPolicy::default(),
			pcie: PciePolicy::default(),
			search: SearchSettings::default(),
			tolerance: Tolerance::default(),
			top_n: TopN::default(),
			strategy: Strategy::default(),
			templates: crate::templates::default_templates(),
		}
	}
}

impl PcBuildOptions {
	/// Reads options from a JSON file, missing fields take their defaults.
	///
	/// # Errors
	/// - [`IO`](crate::Error::IO) when opening the file.
	/// - [`SerdeJSON`](crate::Error::SerdeJSON) when the file isn't valid options JSON.
	pub fn load_from_disk(path: impl AsRef<Path>) -> crate::Result<Self> {
		let file = std::fs::File::open(path)?;
		Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
	}

	/// # Errors
	/// - [`IO`](crate::Error::IO) when creating the file or its parent directories.
	/// - [`SerdeJSON`](crate::Error::SerdeJSON) when serializing.
	pub fn save_to_disk(&self, path: impl AsRef<Path>) -> crate::Result<()> {
		let path = path.as_ref();
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		let file = std::fs::File::create(path)?;
		serde_json::to_writer_pretty(file, self)?;
		Ok(())
	}

	pub fn data_dir(&self) -> Option<&PathBuf> {
		self.data_dir.as_ref()
	}
	pub fn set_data_dir(&mut self, data_dir: PathBuf) {
		self.data_dir = Some(data_dir);
	}

	/// Where the catalog snapshot is cached, if there is a data directory.
	pub fn catalog_cache_path(&self) -> Option<PathBuf> {
		self.data_dir.as_ref().map(|d| d.join("catalog.bin"))
	}

	/// How long a cached catalog stays fresh.
	///
	/// Negative values mean never fresh, values beyond what a duration can hold are capped.
	pub fn catalog_ttl(&self) -> chrono::Duration {
		chrono::Duration::seconds(self.catalog_ttl_secs.clamp(0, MAX_TTL_SECS))
	}
	pub fn set_catalog_ttl(&mut self, ttl: chrono::Duration) {
		self.catalog_ttl_secs = ttl.num_seconds();
	}

	pub fn power_policy(&self) -> &PowerPolicy {
		&self.power
	}
	pub fn set_power_policy(&mut self, power: PowerPolicy) {
		self.power = power;
	}

	pub fn pcie_policy(&self) -> PciePolicy {
		self.pcie
	}
	pub fn set_pcie_policy(&mut self, pcie: PciePolicy) {
		self.pcie = pcie;
	}

	pub fn graphics_gate(&self) -> GraphicsGate {
		self.search.graphics_gate
	}
	pub fn set_graphics_gate(&mut self, gate: GraphicsGate) {
		self.search.graphics_gate = gate;
	}

	pub fn max_candidates(&self) -> usize {
		self.search.max_candidates
	}
	/// returns if the value was accepted, the cap must be at least one.
	pub fn set_max_candidates(&mut self, max_candidates: usize) -> bool {
		if max_candidates > 0 {
			self.search.max_candidates = max_candidates;
			true
		} else {
			false
		}
	}

	pub fn greedy_starts(&self) -> usize {
		self.search.greedy_starts
	}
	pub fn set_greedy_starts(&mut self, greedy_starts: usize) {
		self.search.greedy_starts = greedy_starts;
	}

	pub fn improvement_rounds(&self) -> usize {
		self.search.improvement_rounds
	}
	pub fn set_improvement_rounds(&mut self, rounds: usize) {
		self.search.improvement_rounds = rounds;
	}

	pub fn swap_width(&self) -> usize {
		self.search.swap_width
	}
	pub fn set_swap_width(&mut self, width: usize) {
		self.search.swap_width = width;
	}

	pub fn tolerance(&self) -> Tolerance {
		self.tolerance
	}
	pub fn set_tolerance(&mut self, tolerance: Tolerance) {
		self.tolerance = tolerance;
	}

	pub fn top_n(&self) -> TopN {
		self.top_n
	}
	pub fn set_top_n(&mut self, top_n: TopN) {
		self.top_n = top_n;
	}

	pub fn strategy(&self) -> Strategy {
		self.strategy
	}
	pub fn set_strategy(&mut self, strategy: Strategy) {
		self.strategy = strategy;
	}

	pub fn templates(&self) -> &[BuildTemplate] {
		&self.templates
	}
	pub fn set_templates(&mut self, templates: Vec<BuildTemplate>) {
		self.templates = templates;
	}

	pub fn rule_engine(&self) -> RuleEngine {
		RuleEngine::new(self.power, self.pcie)
	}

	pub fn search_settings(&self) -> SearchSettings {
		self.search.clone()
	}
}
