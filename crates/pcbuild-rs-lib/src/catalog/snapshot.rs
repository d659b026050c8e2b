use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

use super::{Catalog, Part};

/// A catalog together with the time it was fetched.
///
/// Snapshots are cheap to clone and can be replaced wholesale when the catalog is refreshed,
/// searches already running keep the snapshot they started with.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
	catalog: Arc<Catalog>,
	fetched_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
struct StoredSnapshot {
	fetched_at: DateTime<Utc>,
	parts: Vec<Arc<Part>>,
}

impl CatalogSnapshot {
	/// Creates a snapshot fetched now.
	pub fn new(catalog: Catalog) -> Self {
		Self::with_timestamp(catalog, Utc::now())
	}

	pub fn with_timestamp(catalog: Catalog, fetched_at: DateTime<Utc>) -> Self {
		Self { catalog: Arc::new(catalog), fetched_at }
	}

	pub fn catalog(&self) -> &Arc<Catalog> {
		&self.catalog
	}

	pub fn fetched_at(&self) -> DateTime<Utc> {
		self.fetched_at
	}

	pub fn is_fresh_at(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
		now.signed_duration_since(self.fetched_at) < ttl
	}

	/// Whether the snapshot is younger than `ttl`.
	pub fn is_fresh(&self, ttl: chrono::Duration) -> bool {
		self.is_fresh_at(Utc::now(), ttl)
	}

	/// Writes the snapshot to `path`, creating parent directories as needed.
	///
	/// # Errors
	/// - [`IO`](crate::Error::IO) when creating the file or its parent directories.
	/// - [`Bincode`](crate::Error::Bincode) when serializing.
	pub fn save_to_disk(&self, path: impl AsRef<Path>) -> crate::Result<()> {
		let path = path.as_ref();
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		let stored = StoredSnapshot {
			fetched_at: self.fetched_at,
			parts: self.catalog.parts().to_vec(),
		};
		let file = std::fs::File::create(path)?;
		bincode::serialize_into(std::io::BufWriter::new(file), &stored)?;
		log::debug!("Saved catalog snapshot to {}", path.display());
		Ok(())
	}

	/// # Errors
	/// - [`IO`](crate::Error::IO) when opening the file.
	/// - [`Bincode`](crate::Error::Bincode) when the file is not a snapshot written by this version.
	pub fn load_from_disk(path: impl AsRef<Path>) -> crate::Result<Self> {
		let file = std::fs::File::open(path)?;
		let stored: StoredSnapshot = bincode::deserialize_from(std::io::BufReader::new(file))?;
		Ok(Self {
			catalog: Arc::new(Catalog::from_shared(stored.parts)),
			fetched_at: stored.fetched_at,
		})
	}
}
