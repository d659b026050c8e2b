//! Library error type.

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error("JSON error: {0}")]
	SerdeJSON(#[from] serde_json::Error),
	#[error("bincode error: {0}")]
	Bincode(#[from] bincode::Error),
	#[error("parsing error: {0}")]
	Parse(String),
	#[error("validation error: {0}")]
	Validation(String),
	#[error("budget must be a positive number, got {0}")]
	InvalidBudget(f64),
	#[error("no categories selected")]
	NoActiveCategories,
	#[error("compatibility rules depend on each other in a cycle through {0}")]
	RuleCycle(crate::catalog::Category),
}
