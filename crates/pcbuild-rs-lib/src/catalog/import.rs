//! Functions for reading parts from loosely typed catalog records.
//!
//! Catalog providers hand over JSON, either as an array of records keyed by attribute name
//! or as spreadsheet style rows grouped by category tab. Both shapes end up as [`RawRecord`]s
//! which are normalized into [`Part`]s. Records that can't be normalized are dropped.

use serde_json::{Map, Value};

use super::*;
use super::part::*;

/// Why a record was left out of the catalog.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordRejected {
	#[error("record is not a JSON object")]
	NotAnObject,
	#[error("record has no category")]
	MissingCategory,
	#[error("unknown category \"{0}\"")]
	UnknownCategory(String),
	#[error("record has no name")]
	MissingName,
	#[error("price must be positive, got {0}")]
	InvalidPrice(f64),
}

/// An unprocessed catalog entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
	fields: Map<String, Value>,
}

impl RawRecord {
	pub fn from_json(value: Value) -> Result<Self, RecordRejected> {
		match value {
			Value::Object(fields) => Ok(Self { fields }),
			_ => Err(RecordRejected::NotAnObject),
		}
	}

	pub fn set(&mut self, key: &str, value: impl Into<Value>) {
		self.fields.insert(key.to_string(), value.into());
	}

	fn get(&self, keys: &[&str]) -> Option<&Value> {
		keys.iter().find_map(|k| self.fields.get(*k)).filter(|v| !v.is_null())
	}

	/// Trimmed text of the first present key, numbers and booleans are written out.
	fn text(&self, keys: &[&str]) -> String {
		match self.get(keys) {
			Some(Value::String(s)) => s.trim().to_string(),
			Some(Value::Number(n)) => n.to_string(),
			Some(Value::Bool(b)) => b.to_string(),
			_ => String::new(),
		}
	}

	fn token(&self, keys: &[&str]) -> String {
		normalize_token(&self.text(keys))
	}

	fn tokens(&self, keys: &[&str]) -> TokenSet {
		match self.get(keys) {
			/* Some providers already send lists */
			Some(Value::Array(items)) => items.iter()
				.filter_map(|v| v.as_str())
				.map(normalize_token)
				.filter(|t| !t.is_empty())
				.collect(),
			_ => TokenSet::parse(&self.text(keys)),
		}
	}

	/// Numeric value of the first present key, anything unreadable is `0`.
	fn number(&self, keys: &[&str]) -> f64 {
		let n = match self.get(keys) {
			Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
			Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
			_ => 0.0,
		};
		if n.is_finite() { n } else { 0.0 }
	}

	fn flag(&self, keys: &[&str]) -> bool {
		match self.get(keys) {
			Some(Value::Bool(b)) => *b,
			Some(Value::String(s)) => s.to_lowercase().contains("true"),
			Some(Value::Number(n)) => n.as_f64().map_or(false, |n| n != 0.0),
			_ => false,
		}
	}

	/// Turns the record into a part.
	///
	/// # Errors
	/// The record is rejected when it has no usable category, no name or a price that isn't positive.
	pub fn normalize(&self) -> Result<Part, RecordRejected> {
		let category_token = self.text(&["category"]);
		if category_token.is_empty() {
			return Err(RecordRejected::MissingCategory);
		}
		let category: Category = category_token.parse().map_err(|_| RecordRejected::UnknownCategory(category_token.clone()))?;

		let name = self.text(&["name"]);
		if name.is_empty() {
			return Err(RecordRejected::MissingName);
		}

		let price = self.number(&["price"]);
		if price <= 0.0 {
			return Err(RecordRejected::InvalidPrice(price));
		}

		let spec = match category {
			Category::Processor => PartSpec::Processor(ProcessorSpec {
				socket: self.token(&["socket"]),
				power: self.number(&["power"]),
				frequency: self.number(&["frequency"]),
				cores: self.number(&["cores"]),
				integrated_graphics: self.flag(&["integratedGraphics"]),
			}),
			Category::Motherboard => PartSpec::Motherboard(MotherboardSpec {
				socket: self.token(&["socket"]),
				ram_type: self.token(&["ramType"]),
				form_factor: self.token(&["formFactor"]),
				supported_interfaces: self.tokens(&["supportedInterfaces"]),
				pcie_versions: PcieVersion::parse_list(&self.text(&["pcieVersions", "pcieVersion"])),
			}),
			Category::Ram => PartSpec::Ram(RamSpec {
				ram_type: self.token(&["ramType"]),
				frequency: self.number(&["frequency"]),
				capacity: self.number(&["capacity"]),
			}),
			Category::Storage => PartSpec::Storage(StorageSpec {
				interface: self.token(&["interface"]),
				capacity: self.number(&["capacity"]),
			}),
			Category::GraphicsCard => PartSpec::GraphicsCard(GraphicsCardSpec {
				pcie_version: PcieVersion::parse(&self.text(&["pcieVersion"])),
				power: self.number(&["power"]),
				memory: self.number(&["memory"]),
			}),
			Category::Case => PartSpec::Case(CaseSpec {
				supported_form_factors: self.tokens(&["supportedFormFactors", "formFactor"]),
			}),
			Category::Cooler => PartSpec::Cooler(CoolerSpec {
				supported_sockets: self.tokens(&["supportedSockets", "sockets", "socket"]),
				power: self.number(&["power"]),
			}),
			Category::PowerSupply => PartSpec::PowerSupply(PowerSupplySpec {
				wattage: self.number(&["wattage"]),
			}),
			Category::Monitor => PartSpec::Monitor,
			Category::Keyboard => PartSpec::Keyboard,
			Category::Mouse => PartSpec::Mouse,
			Category::OperatingSystem => PartSpec::OperatingSystem,
		};

		/* Sheets carry a single performance figure instead of the attributes the formula uses */
		let performance = self.number(&["performance"]);
		let mut part = Part::new(name, price, spec).with_description(self.text(&["description"]));
		if performance > 0.0 && !part.spec.has_score_inputs() {
			part = part.with_score(performance);
		}
		let id = self.text(&["id"]);
		if !id.is_empty() {
			part = part.with_id(PartId::new(id));
		}
		Ok(part)
	}
}

/// Converts one spreadsheet row into a record.
///
/// Row layout is `[name, price, description, performance, socket, F, integratedGraphics]`.
/// Column `F` holds whichever single attribute the category's tab uses it for.
pub fn record_from_sheet_row(category: Category, row: &[Value]) -> RawRecord {
	let cell = |i: usize| row.get(i).cloned().unwrap_or(Value::Null);

	let mut record = RawRecord::default();
	record.set("category", category.as_str());
	record.set("name", cell(0));
	record.set("price", cell(1));
	record.set("description", cell(2));
	record.set("performance", cell(3));

	match category {
		Category::Cooler => record.set("supportedSockets", cell(4)),
		_ => record.set("socket", cell(4)),
	}

	match category {
		Category::Processor | Category::GraphicsCard => record.set("power", cell(5)),
		Category::Motherboard => record.set("formFactor", cell(5)),
		Category::Case => record.set("supportedFormFactors", cell(5)),
		Category::PowerSupply => record.set("wattage", cell(5)),
		_ => {},
	}

	record.set("integratedGraphics", cell(6));
	record
}

pub fn records_from_sheet_rows(category: Category, rows: &[Value]) -> Vec<RawRecord> {
	rows.iter()
		.filter_map(|row| match row.as_array() {
			Some(cells) => Some(record_from_sheet_row(category, cells)),
			None => {
				log::debug!("Skipping {} sheet row, not an array", category);
				None
			},
		})
		.collect()
}

/// Reads records from a catalog document.
///
/// Accepts either an array of record objects or an object mapping category tab names to rows.
/// # Errors
/// - [`Parse`](crate::Error::Parse) when the document is neither shape.
pub fn records_from_json(value: Value) -> crate::Result<Vec<RawRecord>> {
	match value {
		Value::Array(items) => Ok(
			items.into_iter()
				.enumerate()
				.filter_map(|(i, item)| match RawRecord::from_json(item) {
					Ok(r) => Some(r),
					Err(e) => {
						log::debug!("Skipping catalog entry {}: {}", i, e);
						None
					},
				})
				.collect()
		),
		Value::Object(tabs) => {
			let mut records = Vec::new();
			for (tab, rows) in tabs {
				let category: Category = match tab.parse() {
					Ok(c) => c,
					Err(_) => {
						log::warn!("Ignoring catalog tab \"{}\", not a known category", tab);
						continue;
					},
				};
				match rows.as_array() {
					Some(rows) => records.extend(records_from_sheet_rows(category, rows)),
					None => log::warn!("Ignoring catalog tab \"{}\", rows must be an array", tab),
				}
			}
			Ok(records)
		},
		_ => Err(crate::Error::Parse("catalog must be an array of records or an object of category rows".to_string())),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn record(value: Value) -> RawRecord {
		RawRecord::from_json(value).unwrap()
	}

	#[test]
	fn normalizes_processor() {
		let part = record(json!({
			"category": "processor",
			"name": "  Ryzen 7 7700 ",
			"price": "150000",
			"socket": " AM5 ",
			"power": 65,
			"frequency": "3.8",
			"cores": 8,
			"integratedGraphics": "TRUE",
		})).normalize().unwrap();

		assert_eq!(part.name, "Ryzen 7 7700");
		assert_eq!(part.price, 150000.0);
		let cpu = part.processor().unwrap();
		assert_eq!(cpu.socket, "am5");
		assert_eq!(cpu.power, 65.0);
		assert!(cpu.integrated_graphics);
		assert_eq!(part.score, 3.8 * 10.0 + 8.0 * 5.0);
	}

	#[test]
	fn normalizes_set_valued_fields() {
		let board = record(json!({
			"category": "motherboard",
			"name": "B650",
			"price": 90000,
			"supportedInterfaces": "SATA, NVMe",
			"pcieVersion": "4.0, 5.0",
			"ramType": "DDR5",
		})).normalize().unwrap();
		let board = board.motherboard().unwrap();
		assert!(board.supported_interfaces.contains("nvme"));
		assert!(board.supported_interfaces.contains("sata"));
		assert_eq!(board.pcie_versions, vec![PcieVersion::new(4, 0), PcieVersion::new(5, 0)]);
		assert_eq!(board.ram_type, "ddr5");

		let cooler = record(json!({ "category": "cooler", "name": "Tower", "price": 1, "sockets": ["AM4", "AM5"] })).normalize().unwrap();
		assert!(cooler.cooler().unwrap().supported_sockets.contains("am5"));
	}

	#[test]
	fn missing_numbers_default_to_zero() {
		let gpu = record(json!({ "category": "graphicsCard", "name": "GPU", "price": 5, "power": "lots" })).normalize().unwrap();
		let gpu = gpu.graphics_card().unwrap();
		assert_eq!(gpu.power, 0.0);
		assert_eq!(gpu.memory, 0.0);
		assert_eq!(gpu.pcie_version, None);
	}

	#[test]
	fn rejects_malformed_records() {
		assert_eq!(record(json!({ "name": "x", "price": 1 })).normalize(), Err(RecordRejected::MissingCategory));
		assert_eq!(record(json!({ "category": "toaster", "name": "x", "price": 1 })).normalize(), Err(RecordRejected::UnknownCategory("toaster".to_string())));
		assert_eq!(record(json!({ "category": "mouse", "price": 1 })).normalize(), Err(RecordRejected::MissingName));
		assert_eq!(record(json!({ "category": "mouse", "name": "x", "price": 0 })).normalize(), Err(RecordRejected::InvalidPrice(0.0)));
		assert_eq!(record(json!({ "category": "mouse", "name": "x", "price": -3 })).normalize(), Err(RecordRejected::InvalidPrice(-3.0)));
		assert_eq!(RawRecord::from_json(json!([1, 2])), Err(RecordRejected::NotAnObject));
	}

	#[test]
	fn explicit_id_is_kept() {
		let part = record(json!({ "id": "sku-1", "category": "mouse", "name": "x", "price": 1 })).normalize().unwrap();
		assert_eq!(part.id.as_str(), "sku-1");
	}

	#[test]
	fn sheet_row_column_f_depends_on_category() {
		let cpu = record_from_sheet_row(Category::Processor, &[json!("CPU"), json!("1000"), json!(""), json!("5"), json!("AM5"), json!("65"), json!("false")]).normalize().unwrap();
		assert_eq!(cpu.processor().unwrap().power, 65.0);
		assert!(!cpu.processor().unwrap().integrated_graphics);

		let board = record_from_sheet_row(Category::Motherboard, &[json!("MB"), json!("1000"), json!(""), json!(""), json!("AM5"), json!("ATX")]).normalize().unwrap();
		assert_eq!(board.motherboard().unwrap().form_factor, "atx");

		let case = record_from_sheet_row(Category::Case, &[json!("Case"), json!("1000"), json!(""), json!(""), json!(""), json!("ATX, mATX")]).normalize().unwrap();
		assert!(case.case().unwrap().supported_form_factors.contains("matx"));

		let psu = record_from_sheet_row(Category::PowerSupply, &[json!("PSU"), json!("1000"), json!(""), json!(""), json!(""), json!("650")]).normalize().unwrap();
		assert_eq!(psu.power_supply().unwrap().wattage, 650.0);

		let cooler = record_from_sheet_row(Category::Cooler, &[json!("Cooler"), json!("1000"), json!(""), json!(""), json!("AM4, LGA1700")]).normalize().unwrap();
		assert!(cooler.cooler().unwrap().supported_sockets.contains("lga1700"));
	}

	#[test]
	fn sheet_performance_becomes_the_score() {
		let cpu = record_from_sheet_row(Category::Processor, &[json!("CPU"), json!(1000), json!(""), json!(90), json!("AM5"), json!(65)]).normalize().unwrap();
		assert_eq!(cpu.score, 90.0);

		let case = record_from_sheet_row(Category::Case, &[json!("Case"), json!(1000), json!(""), json!("12")]).normalize().unwrap();
		assert_eq!(case.score, 12.0);

		let blank = record_from_sheet_row(Category::Case, &[json!("Case"), json!(1000), json!(""), json!("")]).normalize().unwrap();
		assert_eq!(blank.score, 1.0);
	}

	#[test]
	fn formula_wins_over_performance() {
		let cpu = record(json!({ "category": "processor", "name": "CPU", "price": 1, "frequency": 4, "cores": 8, "performance": 3 })).normalize().unwrap();
		assert_eq!(cpu.score, 80.0);
	}

	#[test]
	fn short_sheet_rows_are_dropped_by_normalization() {
		let rec = record_from_sheet_row(Category::Mouse, &[json!("Mouse")]);
		assert_eq!(rec.normalize(), Err(RecordRejected::InvalidPrice(0.0)));
	}

	#[test]
	fn reads_both_document_shapes() {
		let records = records_from_json(json!([
			{ "category": "mouse", "name": "a", "price": 1 },
			"not a record",
		])).unwrap();
		assert_eq!(records.len(), 1);

		let records = records_from_json(json!({
			"mouse": [["a", "1"], ["b", "2"]],
			"unknownTab": [["c", "3"]],
			"keyboard": "not rows",
		})).unwrap();
		assert_eq!(records.len(), 2);

		assert!(records_from_json(json!(42)).is_err());
	}
}
