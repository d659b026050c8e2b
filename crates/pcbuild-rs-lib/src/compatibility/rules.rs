//! Predicates behind each [`Rule`].

use crate::catalog::{Category, Part};

use super::*;

impl Rule {
	/// Evaluates the rule over `parts`. Rules missing a side pass.
	pub(super) fn evaluate<L: PartLookup + ?Sized>(&self, parts: &L, engine: &RuleEngine) -> Result<(), Incompatibility> {
		let processor = parts.part(Category::Processor).and_then(Part::processor);
		let motherboard = parts.part(Category::Motherboard).and_then(Part::motherboard);

		match self {
			Rule::SocketMatch => {
				if let (Some(cpu), Some(board)) = (processor, motherboard) {
					if cpu.socket != board.socket {
						return Err(Incompatibility::SocketMismatch {
							processor: cpu.socket.clone(),
							motherboard: board.socket.clone(),
						});
					}
				}
			},
			Rule::MemoryType => {
				let ram = parts.part(Category::Ram).and_then(Part::ram);
				if let (Some(board), Some(ram)) = (motherboard, ram) {
					if board.ram_type != ram.ram_type {
						return Err(Incompatibility::MemoryTypeMismatch {
							motherboard: board.ram_type.clone(),
							ram: ram.ram_type.clone(),
						});
					}
				}
			},
			Rule::StorageInterface => {
				let storage = parts.part(Category::Storage).and_then(Part::storage);
				if let (Some(board), Some(storage)) = (motherboard, storage) {
					if !member_of(&storage.interface, &board.supported_interfaces) {
						return Err(Incompatibility::StorageInterfaceUnsupported {
							interface: storage.interface.clone(),
							supported: board.supported_interfaces.clone(),
						});
					}
				}
			},
			Rule::PcieSlot => {
				let card = parts.part(Category::GraphicsCard).and_then(Part::graphics_card);
				if let (Some(board), Some(card)) = (motherboard, card) {
					let (Some(wanted), Some(newest)) = (card.pcie_version, board.pcie_versions.iter().max()) else {
						return Ok(());
					};
					let fits = match engine.pcie_policy() {
						PciePolicy::AtMostSupported => wanted <= *newest,
						PciePolicy::Exact => board.pcie_versions.contains(&wanted),
					};
					if !fits {
						let supported: Vec<String> = board.pcie_versions.iter().map(|v| v.to_string()).collect();
						return Err(Incompatibility::PcieUnsupported {
							card: wanted,
							supported: supported.join(", "),
						});
					}
				}
			},
			Rule::CoolerSocket => {
				let cooler = parts.part(Category::Cooler).and_then(Part::cooler);
				if let (Some(cpu), Some(cooler)) = (processor, cooler) {
					if !member_of(&cpu.socket, &cooler.supported_sockets) {
						return Err(Incompatibility::CoolerSocketUnsupported {
							socket: cpu.socket.clone(),
							supported: cooler.supported_sockets.clone(),
						});
					}
				}
			},
			Rule::CaseFormFactor => {
				let case = parts.part(Category::Case).and_then(Part::case);
				if let (Some(board), Some(case)) = (motherboard, case) {
					if !member_of(&board.form_factor, &case.supported_form_factors) {
						return Err(Incompatibility::FormFactorUnsupported {
							form_factor: board.form_factor.clone(),
							supported: case.supported_form_factors.clone(),
						});
					}
				}
			},
			Rule::PowerBudget => {
				if let Some(psu) = parts.part(Category::PowerSupply).and_then(Part::power_supply) {
					let required = engine.required_power(parts);
					if psu.wattage < required {
						return Err(Incompatibility::InsufficientPower {
							wattage: psu.wattage,
							required,
						});
					}
				}
			},
		}

		Ok(())
	}
}

/// Membership where an undeclared value on either side doesn't constrain anything.
fn member_of(token: &str, set: &TokenSet) -> bool {
	token.is_empty() || set.is_empty() || set.contains(token)
}
