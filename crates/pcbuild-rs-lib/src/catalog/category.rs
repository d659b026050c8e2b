use serde::{Serialize, Deserialize};

/// A component slot in a build.
///
/// Serialized using the same tokens the catalog sheets use, e.g. `graphicsCard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
	Processor,
	Motherboard,
	Ram,
	Storage,
	GraphicsCard,
	Case,
	Cooler,
	Monitor,
	PowerSupply,
	Keyboard,
	Mouse,
	OperatingSystem,
}

impl Category {
	pub const ALL: [Category; 12] = [
		Category::Processor,
		Category::Motherboard,
		Category::Ram,
		Category::Storage,
		Category::GraphicsCard,
		Category::Case,
		Category::Cooler,
		Category::Monitor,
		Category::PowerSupply,
		Category::Keyboard,
		Category::Mouse,
		Category::OperatingSystem,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			Category::Processor => "processor",
			Category::Motherboard => "motherboard",
			Category::Ram => "ram",
			Category::Storage => "storage",
			Category::GraphicsCard => "graphicsCard",
			Category::Case => "case",
			Category::Cooler => "cooler",
			Category::Monitor => "monitor",
			Category::PowerSupply => "powerSupply",
			Category::Keyboard => "keyboard",
			Category::Mouse => "mouse",
			Category::OperatingSystem => "operatingSystem",
		}
	}

	/// Position in the preferred search order.
	///
	/// Categories that constrain many others come first so incompatible branches are cut early,
	/// the power supply comes last as it depends on everything drawing power.
	pub(crate) fn search_rank(&self) -> usize {
		match self {
			Category::Processor => 0,
			Category::Motherboard => 1,
			Category::Ram => 2,
			Category::Storage => 3,
			Category::GraphicsCard => 4,
			Category::Cooler => 5,
			Category::Case => 6,
			Category::Monitor => 7,
			Category::Keyboard => 8,
			Category::Mouse => 9,
			Category::OperatingSystem => 10,
			Category::PowerSupply => 11,
		}
	}
}

impl std::str::FromStr for Category {
	type Err = crate::Error;

	/// Accepts the sheet tokens in any case, `graphics_card` and `graphics-card` spellings included.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let key: String = s.chars()
			.filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
			.collect::<String>()
			.to_lowercase();

		Category::ALL.iter()
			.find(|c| c.as_str().to_lowercase() == key)
			.copied()
			.ok_or_else(|| crate::Error::Parse(format!("unknown category \"{}\"", s.trim())))
	}
}

impl std::fmt::Display for Category {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test] fn parses_sheet_tokens() { assert_eq!("graphicsCard".parse::<Category>().unwrap(), Category::GraphicsCard) }
	#[test] fn parse_is_case_insensitive() { assert_eq!(" PowerSupply ".parse::<Category>().unwrap(), Category::PowerSupply) }
	#[test] fn parse_accepts_snake_case() { assert_eq!("operating_system".parse::<Category>().unwrap(), Category::OperatingSystem) }
	#[test] fn parse_rejects_unknown() { assert!("toaster".parse::<Category>().is_err()) }
	#[test] fn parse_rejects_empty() { assert!("".parse::<Category>().is_err()) }

	#[test]
	fn display_round_trips() {
		for c in Category::ALL {
			assert_eq!(c.to_string().parse::<Category>().unwrap(), c);
		}
	}

	#[test]
	fn serializes_as_sheet_token() {
		assert_eq!(serde_json::to_string(&Category::GraphicsCard).unwrap(), "\"graphicsCard\"");
	}

	#[test]
	fn power_supply_is_searched_last() {
		let last = Category::ALL.iter().max_by_key(|c| c.search_rank()).unwrap();
		assert_eq!(*last, Category::PowerSupply);
	}
}
