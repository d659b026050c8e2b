use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use pcbuild_rs::catalog::Category;
use pcbuild_rs::generator::{Strategy, Tolerance, TopN};
use pcbuild_rs::{Build, BuildRequest, CancelToken, Catalog, CatalogSnapshot, PcBuildOptions, Recommendation};

#[tokio::main]
async fn main() {
	let mut opts;

	/* Parse console input */
	let parsed_options = {
		let args: Vec<String> = std::env::args().collect();

		opts = getopts::Options::new();
		opts.optflag( "h", "help",               "Show help");
		opts.optflag( "v", "verbose",            "Increased vebosity");
		opts.optopt(  "c", "catalog",            "Catalog JSON file", "FILE");
		opts.optopt(  "",  "config",             "Options JSON file", "FILE");
		opts.optopt(  "b", "budget",             "Budget for generated builds", "AMOUNT");
		opts.optopt(  "",  "categories",         "Comma separated categories to include", "LIST");
		opts.optopt(  "t", "tolerance",          "How far over budget alternatives may go", "AMOUNT");
		opts.optopt(  "",  "tolerance-fraction", "Tolerance as a fraction of the budget", "FRACTION");
		opts.optopt(  "",  "within",             "Number of builds within budget to show", "N");
		opts.optopt(  "",  "near",               "Number of near budget builds to show", "N");
		opts.optopt(  "s", "strategy",           "exhaustive or greedy", "NAME");
		opts.optopt(  "",  "timeout",            "Stop searching after this many seconds", "SECONDS");
		opts.optflag( "",  "json",               "Print results as JSON");
		opts.optflag( "",  "cache",              "Use and refresh the cached catalog snapshot");
		opts.parsing_style(getopts::ParsingStyle::FloatingFrees);

		let parsed_options = match opts.parse(&args[1..]) {
			Ok(m)  => { m }
			Err(e) => { println!("Unable to parse options: {}", e); return }
		};

		if parsed_options.opt_present("h") || parsed_options.free.is_empty() {
			eprintln!("{}", opts.usage("Usage: pcbuild-rs-terminal [options] <generate|list|templates>"));
			return;
		}

		parsed_options
	};

	let default_level = if parsed_options.opt_present("v") { "debug" } else { "warn" };
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

	let config_path = parsed_options.opt_str("config")
		.map(std::path::PathBuf::from)
		.or_else(pcbuild_rs::config::default_config_path);
	let config = match &config_path {
		Some(path) if path.exists() => PcBuildOptions::load_from_disk(path).unwrap_or_else(|e| {
			log::warn!("Failed to read config file: {}", e);
			log::warn!("Using default config.");
			PcBuildOptions::default()
		}),
		_ => PcBuildOptions::default(),
	};

	let result = match parsed_options.free[0].as_str() {
		"generate" => generate(&parsed_options, &config).await,
		"list" => list(&parsed_options, &config),
		"templates" => templates(&parsed_options, &config).await,
		other => Err(Error::InvalidArgument("command", other.to_string())),
	};

	if let Err(e) = result {
		log::error!("{}", e);
		std::process::exit(1);
	}
}

/// Loads the catalog from `--catalog`, or from the cached snapshot when `--cache` is set and it is still fresh.
fn load_catalog(parsed_options: &getopts::Matches, config: &PcBuildOptions) -> Result<Arc<Catalog>, Error> {
	let use_cache = parsed_options.opt_present("cache");
	let cache_path = config.catalog_cache_path();

	let cached = match (use_cache, &cache_path) {
		(true, Some(path)) if path.exists() => match CatalogSnapshot::load_from_disk(path) {
			Ok(snapshot) => Some(snapshot),
			Err(e) => {
				log::warn!("Failed to read cached catalog, DB format likely changed: {}", e);
				None
			},
		},
		_ => None,
	};

	if let Some(snapshot) = &cached {
		if snapshot.is_fresh(config.catalog_ttl()) {
			log::debug!("Using cached catalog from {}", snapshot.fetched_at());
			return Ok(snapshot.catalog().clone());
		}
	}

	let Some(catalog_path) = parsed_options.opt_str("c") else {
		return match cached {
			Some(snapshot) => {
				log::warn!("Cached catalog from {} is stale and no --catalog was given, using it anyway", snapshot.fetched_at());
				Ok(snapshot.catalog().clone())
			},
			None => Err(Error::MissingArgument("--catalog")),
		};
	};

	let snapshot = CatalogSnapshot::new(Catalog::from_file(&catalog_path)?);
	if use_cache {
		match &cache_path {
			Some(path) => {
				if let Err(e) = snapshot.save_to_disk(path) {
					log::warn!("Failed to cache catalog: {}", e);
				}
			},
			None => log::warn!("No data directory available, catalog not cached."),
		}
	}
	Ok(snapshot.catalog().clone())
}

fn parse_opt<T: std::str::FromStr>(parsed_options: &getopts::Matches, name: &'static str) -> Result<Option<T>, Error> {
	match parsed_options.opt_str(name) {
		Some(s) => s.trim().parse::<T>().map(Some).map_err(|_| Error::InvalidArgument(name, s)),
		None => Ok(None),
	}
}

fn parse_categories(parsed_options: &getopts::Matches) -> Result<Option<BTreeSet<Category>>, Error> {
	let Some(list) = parsed_options.opt_str("categories") else {
		return Ok(None);
	};
	let categories = list.split(',')
		.filter(|s| !s.trim().is_empty())
		.map(|s| s.parse::<Category>())
		.collect::<Result<BTreeSet<_>, _>>()?;
	Ok(Some(categories))
}

fn build_request(parsed_options: &getopts::Matches, config: &PcBuildOptions) -> Result<BuildRequest, Error> {
	let categories = parse_categories(parsed_options)?.unwrap_or_else(|| Category::ALL.into_iter().collect());

	let tolerance = match (parse_opt::<f64>(parsed_options, "tolerance")?, parse_opt::<f64>(parsed_options, "tolerance-fraction")?) {
		(Some(_), Some(_)) => return Err(Error::InvalidArgument("tolerance", "use either --tolerance or --tolerance-fraction".to_string())),
		(Some(amount), None) => Tolerance::Absolute(amount),
		(None, Some(fraction)) => Tolerance::Fraction(fraction),
		(None, None) => config.tolerance(),
	};

	let top_n = TopN {
		within: parse_opt(parsed_options, "within")?.unwrap_or(config.top_n().within),
		near: parse_opt(parsed_options, "near")?.unwrap_or(config.top_n().near),
	};

	let strategy = match parsed_options.opt_str("strategy") {
		Some(s) => s.parse::<Strategy>()?,
		None => config.strategy(),
	};

	let mut request = BuildRequest::new(categories)
		.with_tolerance(tolerance)
		.with_top_n(top_n)
		.with_strategy(strategy);
	if let Some(budget) = parse_opt::<f64>(parsed_options, "budget")? {
		request = request.with_budget(budget);
	}
	Ok(request)
}

/// Runs `job` off the async runtime, cancelling it once `--timeout` elapses.
async fn run_cancellable<T, F>(parsed_options: &getopts::Matches, job: F) -> Result<T, Error>
where
	T: Send + 'static,
	F: FnOnce(CancelToken) -> pcbuild_rs::Result<T> + Send + 'static,
{
	let timeout = parse_opt::<f64>(parsed_options, "timeout")?
		.map(|secs| Duration::try_from_secs_f64(secs).map_err(|_| Error::InvalidArgument("timeout", secs.to_string())))
		.transpose()?;

	let cancel = CancelToken::new();
	let mut task = tokio::task::spawn_blocking({
		let cancel = cancel.clone();
		move || job(cancel)
	});

	let result = match timeout {
		Some(timeout) => match tokio::time::timeout(timeout, &mut task).await {
			Ok(result) => result,
			Err(_) => {
				log::warn!("Search timed out after {:?}, keeping builds found so far", timeout);
				cancel.cancel();
				task.await
			},
		},
		None => task.await,
	};

	Ok(result??)
}

async fn generate(parsed_options: &getopts::Matches, config: &PcBuildOptions) -> Result<(), Error> {
	let catalog = load_catalog(parsed_options, config)?;
	let request = build_request(parsed_options, config)?;
	log::debug!("Generating builds for {:?}", request);

	let options = config.clone();
	let recommendation = run_cancellable(parsed_options, move |cancel| {
		pcbuild_rs::generate(&catalog, &request, &options, &cancel)
	}).await?;

	if parsed_options.opt_present("json") {
		println!("{}", serde_json::to_string_pretty(&recommendation)?);
	} else {
		print_recommendation(&recommendation);
	}
	Ok(())
}

fn list(parsed_options: &getopts::Matches, config: &PcBuildOptions) -> Result<(), Error> {
	let catalog = load_catalog(parsed_options, config)?;
	let categories = parse_categories(parsed_options)?;

	for category in catalog.categories() {
		if categories.as_ref().map_or(false, |c| !c.contains(&category)) {
			continue;
		}
		println!("{}:", category);
		for part in catalog.parts_in(category) {
			println!("\t{}\t{}\tPRICE: {}\tSCORE: {}", part.id, part.name, part.price, part.score);
		}
	}
	Ok(())
}

async fn templates(parsed_options: &getopts::Matches, config: &PcBuildOptions) -> Result<(), Error> {
	let catalog = load_catalog(parsed_options, config)?;

	let options = config.clone();
	let results = run_cancellable(parsed_options, move |cancel| {
		pcbuild_rs::templates::generate_templates(&catalog, options.templates(), &options, &cancel)
	}).await?;

	if parsed_options.opt_present("json") {
		println!("{}", serde_json::to_string_pretty(&results)?);
		return Ok(());
	}

	for template in &results {
		println!("{} (budget {}):", template.name, template.budget);
		match &template.build {
			Some(build) => print_build(build),
			None => println!("\tno configurations found"),
		}
	}
	Ok(())
}

fn print_build(build: &Build) {
	println!("\tTOTAL: {} SCORE: {}", build.total_price(), build.total_score());
	for part in build.parts() {
		println!("\t\t{}: {} ({})", part.category(), part.name, part.price);
	}
}

fn print_recommendation(recommendation: &Recommendation) {
	if recommendation.is_empty() {
		println!("{}", recommendation.status());
	}
	if !recommendation.within.is_empty() {
		println!("Within budget:");
		for build in &recommendation.within {
			print_build(build);
		}
	}
	if !recommendation.near.is_empty() {
		println!("Near budget:");
		for build in &recommendation.near {
			print_build(build);
		}
	}

	let notes = &recommendation.notes;
	if !notes.unmatched.is_empty() {
		let unmatched: Vec<String> = notes.unmatched.iter().map(|c| c.to_string()).collect();
		println!("No compatible parts for: {}", unmatched.join(", "));
	}
	if notes.truncated {
		println!("Search stopped early after {} candidates, results are partial.", notes.candidates);
	}
	if notes.cancelled {
		println!("Search timed out, results are partial.");
	}
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("pcbuild-rs error: {0}")]
	PcBuildRsError(#[from] pcbuild_rs::Error),
	#[error("Missing argument {0}")]
	MissingArgument(&'static str),
	#[error("Invalid value for {0}: {1}")]
	InvalidArgument(&'static str, String),
	#[error("Background task failed: {0}")]
	Task(#[from] tokio::task::JoinError),
	#[error("JSON error: {0}")]
	SerdeJSON(#[from] serde_json::Error),
}
