//! Various helper functions for testing
//!
//! functions in this module should use results and not use any panics to avoid confusion in callers

use std::io::Write;

use serde_json::{json, Value};

pub fn processor(name: &str, price: f64, socket: &str, power: f64) -> Value {
	json!({ "category": "processor", "name": name, "price": price, "socket": socket, "power": power, "frequency": 4.0, "cores": 6 })
}

pub fn processor_with_graphics(name: &str, price: f64, socket: &str, power: f64) -> Value {
	json!({ "category": "processor", "name": name, "price": price, "socket": socket, "power": power, "frequency": 3.8, "cores": 6, "integratedGraphics": "TRUE" })
}

pub fn motherboard(name: &str, price: f64, socket: &str, ram_type: &str, form_factor: &str) -> Value {
	json!({
		"category": "motherboard",
		"name": name,
		"price": price,
		"socket": socket,
		"ramType": ram_type,
		"formFactor": form_factor,
		"supportedInterfaces": "SATA, NVMe",
		"pcieVersions": "4.0",
	})
}

pub fn ram(name: &str, price: f64, ram_type: &str, capacity: f64) -> Value {
	json!({ "category": "ram", "name": name, "price": price, "ramType": ram_type, "frequency": 3200, "capacity": capacity })
}

pub fn storage(name: &str, price: f64, interface: &str) -> Value {
	json!({ "category": "storage", "name": name, "price": price, "interface": interface, "capacity": 1000 })
}

pub fn graphics_card(name: &str, price: f64, power: f64, memory: f64) -> Value {
	json!({ "category": "graphicsCard", "name": name, "price": price, "power": power, "memory": memory, "pcieVersion": "4.0" })
}

pub fn case(name: &str, price: f64, form_factors: &str) -> Value {
	json!({ "category": "case", "name": name, "price": price, "supportedFormFactors": form_factors })
}

pub fn cooler(name: &str, price: f64, sockets: &str) -> Value {
	json!({ "category": "cooler", "name": name, "price": price, "supportedSockets": sockets, "power": 5 })
}

pub fn power_supply(name: &str, price: f64, wattage: f64) -> Value {
	json!({ "category": "powerSupply", "name": name, "price": price, "wattage": wattage })
}

/// A part from a category with no attributes, e.g. `monitor` or `mouse`.
pub fn peripheral(category: &str, name: &str, price: f64) -> Value {
	json!({ "category": category, "name": name, "price": price })
}

/// A small but complete catalog spanning two platforms.
pub fn sample_catalog() -> Value {
	Value::Array(vec![
		processor("Ryzen 5 7600", 90_000.0, "AM5", 65.0),
		processor_with_graphics("Ryzen 5 8600G", 80_000.0, "AM5", 65.0),
		processor("Core i5-13400F", 85_000.0, "LGA1700", 65.0),
		motherboard("B650 Gaming", 70_000.0, "AM5", "DDR5", "ATX"),
		motherboard("B760M Pro", 60_000.0, "LGA1700", "DDR4", "mATX"),
		ram("32GB DDR5", 40_000.0, "DDR5", 32.0),
		ram("16GB DDR4", 20_000.0, "DDR4", 16.0),
		storage("1TB NVMe", 25_000.0, "NVMe"),
		graphics_card("RTX 4060", 120_000.0, 115.0, 8.0),
		graphics_card("RX 7800 XT", 200_000.0, 263.0, 16.0),
		case("Midi Tower", 30_000.0, "ATX, mATX"),
		cooler("Tower Cooler", 15_000.0, "AM4, AM5, LGA1700"),
		power_supply("450W Bronze", 20_000.0, 450.0),
		power_supply("750W Gold", 45_000.0, 750.0),
		peripheral("monitor", "27\" IPS", 60_000.0),
	])
}

/// Writes `catalog` to a JSON file in a fresh temporary directory.
///
/// The directory is removed when the returned handle is dropped.
pub fn write_catalog_file(catalog: &Value) -> Result<(tempfile::TempDir, std::path::PathBuf), Error> {
	let dir = tempfile::tempdir()?;
	let path = dir.path().join("catalog.json");
	let mut f = std::fs::File::create(&path)?;
	f.write_all(serde_json::to_string(catalog)?.as_bytes())?;
	Ok((dir, path))
}

/// Parses `catalog` into a [`Catalog`](pcbuild_rs::Catalog).
pub fn load_catalog(catalog: Value) -> Result<pcbuild_rs::Catalog, Error> {
	Ok(pcbuild_rs::Catalog::from_json(catalog)?)
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error("JSON error: {0}")]
	SerdeJSON(#[from] serde_json::Error),
	#[error("pcbuild-rs error: {0}")]
	PcBuildRs(#[from] pcbuild_rs::Error),
}
