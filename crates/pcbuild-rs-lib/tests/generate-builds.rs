use pcbuild_rs::*;
use pcbuild_rs::generator::{Strategy, Tolerance};
use pcbuild_rs::ranking::Status;
use pcbuild_rs_test_utils as utils;
use serde_json::Value;

fn catalog(records: Vec<Value>) -> Catalog {
	utils::load_catalog(Value::Array(records)).expect("failed to load catalog")
}

fn run(catalog: &Catalog, request: &BuildRequest) -> Recommendation {
	let _ = env_logger::builder().is_test(true).try_init();
	generate(catalog, request, &PcBuildOptions::default(), &CancelToken::new()).expect("generation failed")
}

fn all_builds(recommendation: &Recommendation) -> impl Iterator<Item = &Build> {
	recommendation.within.iter().chain(recommendation.near.iter())
}

/// Checks the properties every result must have regardless of catalog.
fn assert_invariants(recommendation: &Recommendation, budget: f64, tolerance: f64) {
	let engine = RuleEngine::default();
	for build in all_builds(recommendation) {
		if let (Some(cpu), Some(board)) = (build.get(Category::Processor), build.get(Category::Motherboard)) {
			assert_eq!(cpu.processor().unwrap().socket, board.motherboard().unwrap().socket);
		}
		if let (Some(cpu), Some(psu)) = (build.get(Category::Processor), build.get(Category::PowerSupply)) {
			let gpu_power = build.get(Category::GraphicsCard).map_or(0.0, |g| g.power_draw());
			assert!(psu.power_supply().unwrap().wattage >= cpu.power_draw() + gpu_power + 100.0);
		}
		assert!(engine.validate(build).is_ok());

		let price: f64 = build.parts().map(|p| p.price).sum();
		let score: f64 = build.parts().map(|p| p.score).sum();
		assert!((build.total_price() - price).abs() < 1e-6);
		assert!((build.total_score() - score).abs() < 1e-6);
	}

	assert!(recommendation.within.iter().all(|b| b.total_price() <= budget));
	assert!(recommendation.near.iter().all(|b| b.total_price() > budget && b.total_price() <= budget + tolerance));
	for build in &recommendation.within {
		assert!(!recommendation.near.contains(build));
	}
}

/// Checks no build leaves out a requested category while one of its parts would fit it.
fn assert_complete(catalog: &Catalog, request: &BuildRequest, recommendation: &Recommendation) {
	let engine = RuleEngine::default();
	for build in all_builds(recommendation) {
		for &category in request.categories.iter().filter(|c| !build.contains(**c)) {
			for part in catalog.parts_in(category) {
				assert!(engine.check(build, part).is_err(), "{} fits but the build has no {}", part.name, category);
			}
		}
	}
}

#[test]
fn matching_socket_pair_is_the_only_build() {
	let catalog = catalog(vec![
		utils::processor("CPU", 100_000.0, "AM5", 65.0),
		utils::motherboard("Board", 50_000.0, "AM5", "DDR5", "ATX"),
	]);
	let request = BuildRequest::new([Category::Processor, Category::Motherboard]).with_budget(150_000.0);
	let recommendation = run(&catalog, &request);

	assert_eq!(recommendation.within.len(), 1);
	let build = &recommendation.within[0];
	assert_eq!(build.len(), 2);
	assert_eq!(build.total_price(), 150_000.0);
	assert!(recommendation.near.is_empty());
}

#[test]
fn mismatched_socket_is_never_paired() {
	let catalog = catalog(vec![
		utils::processor("CPU", 100_000.0, "AM5", 65.0),
		utils::motherboard("Board", 50_000.0, "LGA1700", "DDR5", "ATX"),
	]);
	let request = BuildRequest::new([Category::Processor, Category::Motherboard]).with_budget(150_000.0);
	let recommendation = run(&catalog, &request);

	assert!(all_builds(&recommendation).all(|b| !(b.contains(Category::Processor) && b.contains(Category::Motherboard))));
	assert!(recommendation.notes.unmatched.contains(&Category::Motherboard));
}

#[test]
fn undersized_power_supply_is_never_chosen() {
	let catalog = catalog(vec![
		utils::processor("CPU", 100.0, "AM5", 65.0),
		utils::graphics_card("GPU", 100.0, 200.0, 8.0),
		utils::power_supply("300W", 10.0, 300.0),
		utils::power_supply("400W", 20.0, 400.0),
	]);
	let request = BuildRequest::new([Category::Processor, Category::GraphicsCard, Category::PowerSupply]);
	let recommendation = run(&catalog, &request);

	assert!(!recommendation.is_empty());
	for build in all_builds(&recommendation).filter(|b| b.contains(Category::GraphicsCard)) {
		let psu = build.get(Category::PowerSupply).expect("build should have a power supply");
		assert_eq!(psu.name, "400W");
	}
}

#[test]
fn higher_score_ranks_first_within_budget() {
	let catalog = catalog(vec![
		serde_json::json!({ "category": "processor", "name": "Slow", "price": 90_000, "frequency": 2.5, "cores": 5 }),
		serde_json::json!({ "category": "processor", "name": "Fast", "price": 95_000, "frequency": 4, "cores": 8 }),
	]);
	let request = BuildRequest::new([Category::Processor]).with_budget(100_000.0);
	let recommendation = run(&catalog, &request);

	let names: Vec<&str> = recommendation.within.iter().map(|b| b.get(Category::Processor).unwrap().name.as_str()).collect();
	assert_eq!(names, vec!["Fast", "Slow"]);
	assert_eq!(recommendation.within[0].total_score(), 80.0);
	assert_eq!(recommendation.within[1].total_score(), 50.0);
}

#[test]
fn empty_category_is_left_out() {
	let catalog = catalog(vec![
		utils::processor("CPU", 100.0, "AM5", 65.0),
		utils::motherboard("Board", 50.0, "AM5", "DDR5", "ATX"),
	]);
	let request = BuildRequest::new([Category::Processor, Category::Motherboard, Category::Case]);
	let recommendation = run(&catalog, &request);

	assert_eq!(recommendation.within.len(), 1);
	assert!(!recommendation.within[0].contains(Category::Case));
	assert!(recommendation.notes.unmatched.contains(&Category::Case));
}

#[test]
fn empty_catalog_finds_nothing() {
	let recommendation = run(&Catalog::default(), &BuildRequest::new(Category::ALL).with_budget(1000.0));
	assert_eq!(recommendation.status(), Status::NoConfigurationsFound);
}

#[test]
fn invalid_requests_are_rejected() {
	let catalog = utils::load_catalog(utils::sample_catalog()).unwrap();
	let options = PcBuildOptions::default();
	let cancel = CancelToken::new();

	let negative = BuildRequest::new([Category::Processor]).with_budget(-5.0);
	assert!(matches!(generate(&catalog, &negative, &options, &cancel), Err(Error::InvalidBudget(_))));

	let empty = BuildRequest::new(Vec::<Category>::new()).with_budget(1000.0);
	assert!(matches!(generate(&catalog, &empty, &options, &cancel), Err(Error::NoActiveCategories)));
}

#[test]
fn exhaustive_results_hold_invariants() {
	let catalog = utils::load_catalog(utils::sample_catalog()).unwrap();
	let request = BuildRequest::new(Category::ALL).with_budget(400_000.0);
	let recommendation = run(&catalog, &request);

	assert_eq!(recommendation.status(), Status::Found);
	assert!(recommendation.within.len() <= 5);
	assert!(recommendation.near.len() <= 3);
	assert_invariants(&recommendation, 400_000.0, 100_000.0);

	let scores: Vec<f64> = recommendation.within.iter().map(|b| b.total_score()).collect();
	assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn greedy_results_hold_invariants() {
	let catalog = utils::load_catalog(utils::sample_catalog()).unwrap();
	let request = BuildRequest::new(Category::ALL)
		.with_budget(400_000.0)
		.with_tolerance(Tolerance::Fraction(0.25))
		.with_strategy(Strategy::Greedy);
	let recommendation = run(&catalog, &request);

	/* The cheapest full build costs 435,000 */
	assert!(recommendation.within.is_empty());
	assert!(!recommendation.near.is_empty());
	assert_invariants(&recommendation, 400_000.0, 100_000.0);
	assert_complete(&catalog, &request, &recommendation);
}

#[test]
fn greedy_keeps_money_for_every_category() {
	let catalog = catalog(vec![
		serde_json::json!({ "category": "processor", "name": "Cheap", "price": 100, "socket": "AM5", "frequency": 4, "cores": 6 }),
		serde_json::json!({ "category": "processor", "name": "Fast", "price": 300, "socket": "AM5", "frequency": 4, "cores": 16 }),
		utils::motherboard("Board", 100.0, "AM5", "DDR5", "ATX"),
		utils::power_supply("750W", 100.0, 750.0),
	]);
	let request = BuildRequest::new([Category::Processor, Category::Motherboard, Category::PowerSupply])
		.with_budget(400.0)
		.with_tolerance(Tolerance::Absolute(0.0));

	let exhaustive = run(&catalog, &request);
	let greedy = run(&catalog, &request.clone().with_strategy(Strategy::Greedy));

	assert_eq!(greedy.within, exhaustive.within);
	assert_eq!(greedy.within.len(), 1);
	assert!(greedy.within[0].contains(Category::PowerSupply));
	assert_complete(&catalog, &request, &greedy);
}

#[test]
fn greedy_matches_exhaustive_at_tight_budget() {
	let catalog = utils::load_catalog(utils::sample_catalog()).unwrap();
	let request = BuildRequest::new(Category::ALL)
		.with_budget(450_000.0)
		.with_tolerance(Tolerance::Absolute(0.0));

	let exhaustive = run(&catalog, &request);
	let greedy = run(&catalog, &request.clone().with_strategy(Strategy::Greedy));

	/* Only the LGA1700 platform with the smaller card and power supply fits */
	assert_eq!(exhaustive.within.len(), 1);
	assert_eq!(greedy.within.first(), exhaustive.within.first());
	assert_eq!(greedy.within[0].total_price(), 435_000.0);
	assert_complete(&catalog, &request, &greedy);
	assert_complete(&catalog, &request, &exhaustive);
}

#[test]
fn generation_is_idempotent() {
	let catalog = utils::load_catalog(utils::sample_catalog()).unwrap();
	let request = BuildRequest::new(Category::ALL).with_budget(350_000.0);
	assert_eq!(run(&catalog, &request), run(&catalog, &request));

	let greedy = request.with_strategy(Strategy::Greedy);
	assert_eq!(run(&catalog, &greedy), run(&catalog, &greedy));
}

#[test]
fn cancelled_generation_returns_partial_results() {
	let catalog = utils::load_catalog(utils::sample_catalog()).unwrap();
	let cancel = CancelToken::new();
	cancel.cancel();
	let request = BuildRequest::new(Category::ALL).with_budget(400_000.0);
	let recommendation = generate(&catalog, &request, &PcBuildOptions::default(), &cancel).unwrap();
	assert!(recommendation.notes.cancelled);
	assert!(recommendation.is_empty());
}

#[test]
fn candidate_cap_marks_results_partial() {
	let catalog = utils::load_catalog(utils::sample_catalog()).unwrap();
	let mut options = PcBuildOptions::default();
	options.set_max_candidates(2);
	let request = BuildRequest::new(Category::ALL);
	let recommendation = generate(&catalog, &request, &options, &CancelToken::new()).unwrap();
	assert!(recommendation.notes.truncated);
	assert_eq!(recommendation.notes.candidates, 2);
}
