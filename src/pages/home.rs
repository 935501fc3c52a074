use leptos::prelude::*;
use log::{error, info};

use crate::components::knowledge_graph::{
	KnowledgeGraphCanvas, KnowledgeNode, parse_nodes, sort_for_display,
};

/// Bundled snapshot of the knowledge-point service response.
const KNOWLEDGE_POINTS: &str = include_str!("knowledge_points.json");

fn load_nodes() -> Vec<KnowledgeNode> {
	match parse_nodes(KNOWLEDGE_POINTS) {
		Ok(mut nodes) => {
			sort_for_display(&mut nodes);
			info!("loaded {} knowledge points", nodes.len());
			nodes
		}
		Err(err) => {
			error!("{err}");
			Vec::new()
		}
	}
}

/// The node set handed to the canvas; a fresh list on every toggle.
fn visible_nodes(all: &[KnowledgeNode], only_practised: bool) -> Vec<KnowledgeNode> {
	all.iter()
		.filter(|n| !only_practised || n.weight > 0)
		.cloned()
		.collect()
}

/// Knowledge map page
#[component]
pub fn Home() -> impl IntoView {
	let all_nodes = StoredValue::new(load_nodes());
	let (only_practised, set_only_practised) = signal(false);
	let (selected, set_selected) = signal(None::<KnowledgeNode>);

	let nodes = Signal::derive(move || {
		let practised = only_practised.get();
		all_nodes.with_value(|nodes| visible_nodes(nodes, practised))
	});

	let parent_name = move |node: &KnowledgeNode| {
		let parent = node.parent.as_ref()?;
		all_nodes.with_value(|nodes| {
			nodes
				.iter()
				.find(|n| n.id == *parent)
				.map(|n| n.name.clone())
		})
	};

	view! {
		<div class="knowledge-map">
			<header class="graph-overlay">
				<h1>"Knowledge Map"</h1>
				<p class="subtitle">"Scroll to zoom. Drag to pan. Click a topic for details."</p>
				<label>
					<input
						type="checkbox"
						prop:checked=only_practised
						on:change=move |ev| set_only_practised.set(event_target_checked(&ev))
					/>
					" Only topics with questions"
				</label>
			</header>

			<KnowledgeGraphCanvas
				nodes=nodes
				on_node_selected=move |node: KnowledgeNode| set_selected.set(Some(node))
			/>

			<aside class="node-detail">
				{move || match selected.get() {
					Some(node) => {
						let parent = parent_name(&node);
						view! {
							<h2>{node.name.clone()}</h2>
							<p class="node-weight">{format!("{} questions", node.weight)}</p>
							{parent.map(|p| view! { <p class="node-parent">"Part of " {p}</p> })}
							<p class="node-description">{node.description.clone()}</p>
							<button on:click=move |_| set_selected.set(None)>"Close"</button>
						}
							.into_any()
					}
					None => view! { <p class="hint">"No topic selected"</p> }.into_any(),
				}}
			</aside>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bundled_points_load_heaviest_first() {
		let nodes = load_nodes();
		assert_eq!(nodes.len(), 14);
		assert_eq!(nodes[0].name, "金融理论");
		assert!(nodes.windows(2).all(|w| w[0].weight >= w[1].weight));
	}

	#[test]
	fn toggle_swaps_in_a_smaller_node_set() {
		let all = load_nodes();
		let practised = visible_nodes(&all, true);

		assert_eq!(visible_nodes(&all, false), all);
		assert_eq!(practised.len(), 12);
		assert!(practised.iter().all(|n| n.weight > 0));
		assert!(practised.iter().any(|n| n.name == "金融理论"), "hub stays");
	}
}
