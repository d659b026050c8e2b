pub mod error;
pub use error::Result;
pub use error::Error;

pub mod catalog;
pub use catalog::Catalog;
pub use catalog::CatalogSnapshot;
pub use catalog::Category;
pub use catalog::Part;

pub mod compatibility;
pub use compatibility::RuleEngine;

pub mod generator;
pub use generator::generate;
pub use generator::Build;
pub use generator::BuildRequest;
pub use generator::CancelToken;

pub mod ranking;
pub use ranking::Recommendation;

pub mod templates;

pub mod config;
pub use config::PcBuildOptions;
