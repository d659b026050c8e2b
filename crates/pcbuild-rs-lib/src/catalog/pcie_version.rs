use std::sync::OnceLock;
use serde::{Serialize, Deserialize};

/// A PCI Express revision such as `4.0`.
///
/// Ordered by `(major, minor)` so a slot can be compared against what a card asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PcieVersion {
	major: u8,
	minor: u8,
}

fn version_pattern() -> &'static regex::Regex {
	static PATTERN: OnceLock<regex::Regex> = OnceLock::new();
	PATTERN.get_or_init(|| regex::Regex::new(r"(\d+)(?:\.(\d+))?").expect("version pattern is valid"))
}

impl PcieVersion {
	pub fn new(major: u8, minor: u8) -> Self {
		Self { major, minor }
	}

	/// Reads the first version number out of tokens like `4.0`, `PCIe 4.0`, `pcie4` or `Gen 5`.
	pub fn parse(s: &str) -> Option<Self> {
		let captures = version_pattern().captures(s)?;
		let major = captures.get(1)?.as_str().parse::<u8>().ok()?;
		let minor = match captures.get(2) {
			Some(m) => m.as_str().parse::<u8>().ok()?,
			None => 0,
		};
		Some(Self { major, minor })
	}

	/// Parses a comma separated list, unreadable entries are dropped.
	pub fn parse_list(s: &str) -> Vec<Self> {
		let mut versions: Vec<Self> = s.split(',').filter_map(Self::parse).collect();
		versions.sort();
		versions.dedup();
		versions
	}

	pub fn major(&self) -> u8 {
		self.major
	}

	pub fn minor(&self) -> u8 {
		self.minor
	}
}

impl std::fmt::Display for PcieVersion {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}.{}", self.major, self.minor)
	}
}
