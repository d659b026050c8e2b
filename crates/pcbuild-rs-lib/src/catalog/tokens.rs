use std::collections::BTreeSet;
use serde::{Serialize, Deserialize};

/// Trims and case-folds a value that takes part in equality comparisons.
pub fn normalize_token(s: &str) -> String {
	s.trim().to_lowercase()
}

/// A set of normalized tokens, parsed once from a comma separated list such as `"AM4, AM5"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet(BTreeSet<String>);

impl TokenSet {
	pub fn parse(list: &str) -> Self {
		list.split(',').map(normalize_token).filter(|t| !t.is_empty()).collect()
	}

	/// `token` is expected to already be normalized.
	pub fn contains(&self, token: &str) -> bool {
		self.0.contains(token)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}
}

impl FromIterator<String> for TokenSet {
	fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
		TokenSet(iter.into_iter().collect())
	}
}

impl std::fmt::Display for TokenSet {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let joined: Vec<&str> = self.iter().collect();
		f.write_str(&joined.join(", "))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parse_trims_and_folds() {
		let set = TokenSet::parse(" ATX, Micro-ATX ,mini-itx");
		assert!(set.contains("atx"));
		assert!(set.contains("micro-atx"));
		assert!(set.contains("mini-itx"));
		assert_eq!(set.len(), 3);
	}

	#[test]
	fn parse_skips_empty_tokens() {
		assert!(TokenSet::parse(" , ,").is_empty());
		assert_eq!(TokenSet::parse("AM5,,AM5").len(), 1);
	}

	#[test]
	fn single_token_is_a_set_of_one() {
		assert_eq!(TokenSet::parse("LGA1700").iter().collect::<Vec<_>>(), vec!["lga1700"]);
	}
}
