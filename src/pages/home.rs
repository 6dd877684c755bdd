use leptos::prelude::*;

use crate::components::network_view::NetworkView;
use crate::grapher::{LinkData, Network, NodeData};

const SWATCHES: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

/// Generate a sample network (random tree) with nodes on a spiral.
fn generate_sample_data(n: usize) -> Network {
	let nodes = (0..n)
		.map(|i| {
			let angle = i as f64 * 0.5;
			let distance = 10.0 + 4.0 * i as f64;
			NodeData::new(distance * angle.cos(), distance * angle.sin(), 5.0)
				.with_color((i % SWATCHES.len()).to_string())
		})
		.collect();

	let links = (1..n)
		.map(|i| {
			let target = (rand_simple(i) * (i as f64)) as usize;
			LinkData::new(i, target)
		})
		.collect();

	Network { nodes, links }
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let network = Signal::derive(move || generate_sample_data(200));
	let palette: Vec<String> = SWATCHES.iter().map(|s| (*s).to_owned()).collect();

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<NetworkView data=network palette=palette fullscreen=true />
				<div class="graph-overlay">
					<h1>"Network Grapher"</h1>
					<p class="subtitle">"Drag nodes to pin them. Scroll to zoom. Drag background to pan."</p>
				</div>
			</div>
		</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sample_is_a_tree_over_swatch_keys() {
		let data = generate_sample_data(50);
		assert_eq!(data.nodes.len(), 50);
		assert_eq!(data.links.len(), 49);
		assert!(data.links.iter().all(|l| l.to < l.from));
		assert_eq!(data.nodes[12].color, Some("2".into()));
	}
}
