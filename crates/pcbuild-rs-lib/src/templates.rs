//! Named build presets, one recommended build per budget tier.

use std::collections::BTreeSet;

use serde::{Serialize, Deserialize};

use crate::catalog::{Catalog, Category};
use crate::generator::{Build, BuildRequest, CancelToken, GraphicsGate, Strategy, TopN};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTemplate {
	pub name: String,
	pub budget: f64,
	pub categories: BTreeSet<Category>,
	#[serde(default = "default_template_strategy")]
	pub strategy: Strategy,
	/// Overrides the configured gate when set.
	#[serde(default)]
	pub graphics_gate: Option<GraphicsGate>,
}

fn default_template_strategy() -> Strategy {
	Strategy::Greedy
}

impl BuildTemplate {
	/// A template over every category except the operating system, with no card for processors
	/// that have integrated graphics.
	pub fn new(name: impl Into<String>, budget: f64) -> Self {
		Self {
			name: name.into(),
			budget,
			categories: Category::ALL.into_iter().filter(|c| *c != Category::OperatingSystem).collect(),
			strategy: default_template_strategy(),
			graphics_gate: Some(GraphicsGate::SkipWithIntegrated),
		}
	}
}

pub fn default_templates() -> Vec<BuildTemplate> {
	vec![
		BuildTemplate::new("Office PC", 200_000.0),
		BuildTemplate::new("Budget gaming", 300_000.0),
		BuildTemplate::new("Optimal gaming", 400_000.0),
	]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateBuild {
	pub name: String,
	pub budget: f64,
	/// `None` when nothing in the catalog fits the template.
	pub build: Option<Build>,
}

/// Generates the best build for each template.
///
/// The best build within the template's budget is preferred, otherwise the best one within the
/// configured tolerance over it.
/// # Errors
/// Same as [`generate`](crate::generate) for any template.
pub fn generate_templates(catalog: &Catalog, templates: &[BuildTemplate], options: &crate::PcBuildOptions, cancel: &CancelToken) -> crate::Result<Vec<TemplateBuild>> {
	let mut results = Vec::with_capacity(templates.len());

	for template in templates {
		let mut options = options.clone();
		if let Some(gate) = template.graphics_gate {
			options.set_graphics_gate(gate);
		}

		let request = BuildRequest::new(template.categories.iter().copied())
			.with_budget(template.budget)
			.with_tolerance(options.tolerance())
			.with_top_n(TopN { within: 1, near: 1 })
			.with_strategy(template.strategy);

		let recommendation = crate::generate(catalog, &request, &options, cancel)?;
		let build = recommendation.best().cloned();
		if build.is_none() {
			log::info!("No build found for template \"{}\"", template.name);
		}

		results.push(TemplateBuild {
			name: template.name.clone(),
			budget: template.budget,
			build,
		});
	}

	Ok(results)
}
