//! Backtracking search over every compatible combination.

use std::ops::ControlFlow;

use super::*;

pub(super) fn search(generator: &Generator<'_>, ceiling: Option<f64>) -> SearchOutcome {
	let mut search = Exhaustive {
		generator,
		ceiling,
		outcome: SearchOutcome::default(),
	};
	let _ = search.descend(0, Selection::default());
	search.outcome
}

struct Exhaustive<'g, 'c> {
	generator: &'g Generator<'c>,
	ceiling: Option<f64>,
	outcome: SearchOutcome,
}

impl Exhaustive<'_, '_> {
	/// Fills the category at `depth` and everything after it.
	fn descend(&mut self, depth: usize, selection: Selection<'_>) -> ControlFlow<()> {
		let generator = self.generator;

		if generator.cancel.is_cancelled() {
			self.outcome.cancelled = true;
			return ControlFlow::Break(());
		}

		let Some(&category) = generator.order.get(depth) else {
			if selection.is_empty() {
				return ControlFlow::Continue(());
			}
			/* Ranking sees the build's own total, which may differ from the running sum in the last bit */
			let build = selection.to_build();
			if !within(self.ceiling, build.total_price()) {
				return ControlFlow::Continue(());
			}
			return self.outcome.emit(build, generator.settings.max_candidates);
		};

		let candidates = generator.candidates(category);
		if candidates.is_empty() {
			return self.descend(depth + 1, selection);
		}

		let gate = generator.gate(category, &selection);
		match gate {
			Gate::Skip => return self.descend(depth + 1, selection),
			/* Without the part first, then with each candidate */
			Gate::Optional => self.descend(depth + 1, selection)?,
			Gate::Include => {},
		}

		let mut compatible = false;
		for &part in candidates {
			self.outcome.expansions += 1;
			if self.outcome.expansions > generator.settings.max_expansions {
				log::warn!("Search stopped after {} candidate checks", generator.settings.max_expansions);
				self.outcome.truncated = true;
				return ControlFlow::Break(());
			}

			if generator.engine.check(&selection, part).is_err() {
				continue;
			}
			compatible = true;

			let price = selection.price() + part.price;
			if !within(self.ceiling, price) {
				continue;
			}

			let link = selection.link(part);
			self.descend(depth + 1, Selection::push(&link, price))?;
		}

		if gate == Gate::Include {
			self.outcome.record(category, compatible);
			if !compatible {
				log::trace!("Nothing in {} fits the current selection, leaving it out", category);
				return self.descend(depth + 1, selection);
			}
		}

		ControlFlow::Continue(())
	}
}
