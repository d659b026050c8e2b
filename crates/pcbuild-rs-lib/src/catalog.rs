//! # Part catalog
//!
//! Catalog providers export parts as loosely typed JSON, prices as strings and socket lists as
//! comma separated text. Everything is normalized once when the catalog is built so the rest of
//! the library only ever compares trimmed, lowercased tokens and parsed numbers.
//!
//! A [`Catalog`] is immutable once built. Parts are held behind [`Arc`]s so builds can share them
//! with the catalog and with each other.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::sync::Arc;

mod category;
pub use category::Category;

mod tokens;
pub use tokens::normalize_token;
pub use tokens::TokenSet;

mod pcie_version;
pub use pcie_version::PcieVersion;

pub mod part;
pub use part::Part;
pub use part::PartId;
pub use part::PartSpec;

pub mod import;
pub use import::RawRecord;
pub use import::RecordRejected;

mod snapshot;
pub use snapshot::CatalogSnapshot;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
	parts: Vec<Arc<Part>>,
	by_category: BTreeMap<Category, Vec<Arc<Part>>>,
}

impl Catalog {
	/// Builds a catalog, dropping invalid parts and any part whose id was already seen.
	pub fn from_parts(parts: impl IntoIterator<Item = Part>) -> Self {
		Self::from_shared(parts.into_iter().map(Arc::new))
	}

	pub fn from_shared(parts: impl IntoIterator<Item = Arc<Part>>) -> Self {
		let mut seen = HashSet::new();
		let mut catalog = Catalog::default();

		for part in parts {
			if !part.is_valid() {
				log::debug!("Dropping invalid part \"{}\"", part.name);
				continue;
			}
			if !seen.insert(part.id.clone()) {
				log::debug!("Dropping duplicate part {} \"{}\"", part.id, part.name);
				continue;
			}
			catalog.by_category.entry(part.category()).or_default().push(part.clone());
			catalog.parts.push(part);
		}

		catalog
	}

	/// Normalizes every record, records that can't be normalized are logged and skipped.
	pub fn from_records(records: impl IntoIterator<Item = RawRecord>) -> Self {
		let parts = records.into_iter().filter_map(|record| match record.normalize() {
			Ok(part) => Some(part),
			Err(e) => {
				log::debug!("Rejected catalog record: {}", e);
				None
			},
		});
		Self::from_parts(parts)
	}

	/// Builds a catalog from a parsed catalog document.
	///
	/// # Errors
	/// - [`Parse`](crate::Error::Parse) when the document isn't a list of records or a set of category tabs.
	pub fn from_json(value: serde_json::Value) -> crate::Result<Self> {
		let records = import::records_from_json(value)?;
		let total = records.len();
		let catalog = Self::from_records(records);
		log::info!("Loaded {} parts from {} catalog records", catalog.len(), total);
		Ok(catalog)
	}

	/// # Errors
	/// - [`SerdeJSON`](crate::Error::SerdeJSON) when the input is not valid JSON.
	/// - [`Parse`](crate::Error::Parse) when the document has the wrong shape.
	pub fn from_reader(reader: impl std::io::Read) -> crate::Result<Self> {
		let value: serde_json::Value = serde_json::from_reader(reader)?;
		Self::from_json(value)
	}

	/// # Errors
	/// - [`IO`](crate::Error::IO) when opening the file.
	/// - Same as [`from_reader`](Catalog::from_reader).
	pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
		let file = std::fs::File::open(path)?;
		Self::from_reader(std::io::BufReader::new(file))
	}

	pub fn parts(&self) -> &[Arc<Part>] {
		&self.parts
	}

	/// Parts of a single category in catalog order.
	pub fn parts_in(&self, category: Category) -> &[Arc<Part>] {
		self.by_category.get(&category).map(|v| v.as_slice()).unwrap_or(&[])
	}

	pub fn get(&self, id: &PartId) -> Option<&Arc<Part>> {
		self.parts.iter().find(|p| &p.id == id)
	}

	pub fn len(&self) -> usize {
		self.parts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.parts.is_empty()
	}

	/// Categories that have at least one part.
	pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
		self.by_category.keys().copied()
	}
}
