//! Greedy construction followed by local improvement.
//!
//! Each start fixes one part of the first category and fills the rest with the best value part
//! that fits, keeping enough budget back for the cheapest part of every category still to come.
//! A start that can't afford some compatible part of a category is abandoned. The result is then
//! improved by replacing one part, or two parts at once, whenever that raises the total score
//! without breaking compatibility or the ceiling and without leaving out a category that fits.

use super::*;

pub(super) fn search(generator: &Generator<'_>, ceiling: Option<f64>) -> SearchOutcome {
	let mut outcome = SearchOutcome::default();

	let Some(first) = generator.order.iter().copied().find(|c| !generator.candidates(*c).is_empty()) else {
		return outcome;
	};
	let starts = generator.candidates(first).iter().take(generator.settings.greedy_starts.max(1));

	let variants: &[bool] = match generator.settings.graphics_gate {
		GraphicsGate::OptionalWithIntegrated => &[true, false],
		_ => &[true],
	};

	for &seed in starts {
		for &include_optional in variants {
			if generator.cancel.is_cancelled() {
				outcome.cancelled = true;
				return outcome;
			}
			let Some(build) = construct(generator, &mut outcome, seed, ceiling, include_optional) else {
				continue;
			};
			let build = improve(generator, &mut outcome, build, ceiling, include_optional);
			if outcome.emit(build, generator.settings.max_candidates).is_break() {
				return outcome;
			}
		}
	}

	outcome
}

fn construct(generator: &Generator<'_>, outcome: &mut SearchOutcome, seed: &Arc<Part>, ceiling: Option<f64>, include_optional: bool) -> Option<Build> {
	let mut build = Build::default();

	for (depth, &category) in generator.order.iter().enumerate() {
		if generator.cancel.is_cancelled() {
			outcome.cancelled = true;
			return None;
		}
		if !wanted(generator, category, &build, include_optional) {
			continue;
		}

		let pool = if category == seed.category() { std::slice::from_ref(&seed) } else { generator.candidates(category) };
		let mut compatible = false;
		let mut chosen = None;
		for &part in pool {
			outcome.expansions += 1;
			if generator.engine.check(&build, part).is_err() {
				continue;
			}
			compatible = true;
			let next = build.with_part(part.clone());
			if within(ceiling, next.total_price() + reserve(generator, depth, &next, include_optional)) {
				chosen = Some(next);
				break;
			}
		}
		outcome.record(category, compatible);

		match chosen {
			Some(next) => build = next,
			/* A part fits but none is affordable, this start can't make a full build */
			None if compatible || category == seed.category() => return None,
			None => {},
		}
	}

	(!build.is_empty()).then_some(build)
}

/// Whether `category` has to be filled for this variant, given the processor in `build`.
fn wanted<L: PartLookup + ?Sized>(generator: &Generator<'_>, category: Category, build: &L, include_optional: bool) -> bool {
	if generator.candidates(category).is_empty() {
		return false;
	}
	match generator.gate(category, build) {
		Gate::Include => true,
		Gate::Optional => include_optional,
		Gate::Skip => false,
	}
}

/// Lower bound on the price of the categories still to fill after `depth`.
///
/// Only parts that fit `build` count, a category where nothing fits will be left out anyway.
fn reserve(generator: &Generator<'_>, depth: usize, build: &Build, include_optional: bool) -> f64 {
	generator.order[depth + 1..].iter()
		.filter(|&&c| wanted(generator, c, build, include_optional))
		.filter_map(|&c| {
			generator.candidates(c).iter()
				.filter(|p| generator.engine.check(build, p).is_ok())
				.map(|p| p.price)
				.min_by(f64::total_cmp)
		})
		.sum()
}

/// No wanted category is missing from `build` while one of its parts would fit.
fn is_complete(generator: &Generator<'_>, outcome: &mut SearchOutcome, build: &Build, include_optional: bool) -> bool {
	for &category in &generator.order {
		if build.contains(category) || !wanted(generator, category, build, include_optional) {
			continue;
		}
		for &part in generator.candidates(category) {
			outcome.expansions += 1;
			if generator.engine.check(build, part).is_ok() {
				return false;
			}
		}
	}
	true
}

fn improve(generator: &Generator<'_>, outcome: &mut SearchOutcome, mut build: Build, ceiling: Option<f64>, include_optional: bool) -> Build {
	for _ in 0..generator.settings.improvement_rounds {
		if generator.cancel.is_cancelled() {
			outcome.cancelled = true;
			break;
		}
		let next = best_single_swap(generator, outcome, &build, ceiling, include_optional)
			.or_else(|| best_pair_swap(generator, outcome, &build, ceiling, include_optional));
		match next {
			Some(better) => build = better,
			None => break,
		}
	}
	build
}

/// Higher score wins, cheaper breaks ties.
fn preferred(candidate: &Build, best: &Option<Build>) -> bool {
	match best {
		None => true,
		Some(best) => match candidate.total_score().total_cmp(&best.total_score()) {
			Ordering::Greater => true,
			Ordering::Equal => candidate.total_price() < best.total_price(),
			Ordering::Less => false,
		},
	}
}

fn best_single_swap(generator: &Generator<'_>, outcome: &mut SearchOutcome, build: &Build, ceiling: Option<f64>, include_optional: bool) -> Option<Build> {
	let mut best = None;

	for &category in &generator.order {
		let current = build.get(category);
		let (current_price, current_score) = current.map_or((0.0, 0.0), |p| (p.price, p.score));

		for &part in generator.candidates(category) {
			if current.map_or(false, |c| c.id == part.id) || part.score <= current_score {
				continue;
			}
			if !within(ceiling, build.total_price() - current_price + part.price) {
				continue;
			}
			outcome.expansions += 1;
			if generator.engine.check(build, part).is_err() {
				continue;
			}
			let candidate = build.with_part(part.clone());
			if !within(ceiling, candidate.total_price()) || !generator.admits(&candidate, include_optional) || !preferred(&candidate, &best) {
				continue;
			}
			if is_complete(generator, outcome, &candidate, include_optional) {
				best = Some(candidate);
			}
		}
	}

	best
}

fn best_pair_swap(generator: &Generator<'_>, outcome: &mut SearchOutcome, build: &Build, ceiling: Option<f64>, include_optional: bool) -> Option<Build> {
	let width = generator.settings.swap_width;
	let mut best = None;

	for (i, &first) in generator.order.iter().enumerate() {
		for &second in &generator.order[i + 1..] {
			let (first_price, first_score) = build.get(first).map_or((0.0, 0.0), |p| (p.price, p.score));
			let (second_price, second_score) = build.get(second).map_or((0.0, 0.0), |p| (p.price, p.score));

			for &a in generator.ranked(first).iter().take(width) {
				for &b in generator.ranked(second).iter().take(width) {
					let unchanged = build.get(first).map_or(false, |p| p.id == a.id)
						|| build.get(second).map_or(false, |p| p.id == b.id);
					if unchanged || a.score + b.score <= first_score + second_score {
						continue;
					}
					if !within(ceiling, build.total_price() - first_price - second_price + a.price + b.price) {
						continue;
					}
					outcome.expansions += 1;
					let candidate = build.with_part(a.clone()).with_part(b.clone());
					if !within(ceiling, candidate.total_price()) || generator.engine.validate(&candidate).is_err() || !generator.admits(&candidate, include_optional) {
						continue;
					}
					if preferred(&candidate, &best) && is_complete(generator, outcome, &candidate, include_optional) {
						best = Some(candidate);
					}
				}
			}
		}
	}

	best
}
