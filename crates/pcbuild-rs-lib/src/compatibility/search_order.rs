use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use petgraph::prelude::*;

use crate::catalog::Category;
use super::Rule;

/// Kahn's algorithm over the rule dependency graph, ties broken by [`Category::search_rank`].
pub(super) fn search_order(rules: &[Rule], active: &BTreeSet<Category>) -> crate::Result<Vec<Category>> {
	let mut graph = DiGraphMap::<Category, Rule>::new();
	for category in active {
		graph.add_node(*category);
	}
	for rule in rules {
		for (from, to) in rule.dependencies() {
			if active.contains(from) && active.contains(to) {
				graph.add_edge(*from, *to, *rule);
			}
		}
	}

	let mut in_degree: BTreeMap<Category, usize> = graph.nodes()
		.map(|n| (n, graph.neighbors_directed(n, Incoming).count()))
		.collect();

	let mut ready: BinaryHeap<Reverse<(usize, Category)>> = in_degree.iter()
		.filter(|(_, d)| **d == 0)
		.map(|(c, _)| Reverse((c.search_rank(), *c)))
		.collect();

	let mut order = Vec::with_capacity(graph.node_count());
	while let Some(Reverse((_, category))) = ready.pop() {
		order.push(category);
		for next in graph.neighbors_directed(category, Outgoing) {
			if let Some(d) = in_degree.get_mut(&next) {
				*d -= 1;
				if *d == 0 {
					ready.push(Reverse((next.search_rank(), next)));
				}
			}
		}
	}

	if let Some((stuck, _)) = in_degree.into_iter().find(|(_, d)| *d > 0) {
		return Err(crate::Error::RuleCycle(stuck));
	}

	log::trace!("Search order: {:?}", order);
	Ok(order)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn full_order_is_canonical() {
		let active: BTreeSet<Category> = Category::ALL.into_iter().collect();
		let order = search_order(&Rule::ALL, &active).unwrap();
		assert_eq!(order, vec![
			Category::Processor,
			Category::Motherboard,
			Category::Ram,
			Category::Storage,
			Category::GraphicsCard,
			Category::Cooler,
			Category::Case,
			Category::Monitor,
			Category::Keyboard,
			Category::Mouse,
			Category::OperatingSystem,
			Category::PowerSupply,
		]);
	}

	#[test]
	fn only_active_categories_are_ordered() {
		let active: BTreeSet<Category> = [Category::PowerSupply, Category::Mouse, Category::Processor].into_iter().collect();
		assert_eq!(search_order(&Rule::ALL, &active).unwrap(), vec![Category::Processor, Category::Mouse, Category::PowerSupply]);
	}

	#[test]
	fn empty_set_gives_empty_order() {
		assert!(search_order(&Rule::ALL, &BTreeSet::new()).unwrap().is_empty());
	}
}
