use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use crate::grapher::Network;

/// Position changes below this are not pushed to the renderer.
const MIN_MOVE: f64 = 0.01;

/// Caller-side force layout feeding positions into a [`Network`].
///
/// Simulation nodes carry the index of the network node they drive.
pub struct Layout {
	graph: ForceGraph<usize, ()>,
	indices: Vec<DefaultNodeIdx>,
	pub running: bool,
}

impl Layout {
	pub fn new(network: &Network) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});

		let indices: Vec<DefaultNodeIdx> = network
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				graph.add_node(NodeData {
					x: node.x as f32,
					y: node.y as f32,
					mass: 10.0,
					is_anchor: false,
					user_data: i,
				})
			})
			.collect();

		for link in &network.links {
			if let (Some(&src), Some(&tgt)) = (indices.get(link.from), indices.get(link.to)) {
				graph.add_edge(src, tgt, EdgeData::default());
			}
		}

		Self {
			graph,
			indices,
			running: true,
		}
	}

	/// Advance the simulation and copy positions into `network`.
	///
	/// Returns the indices of the nodes that moved.
	pub fn step(&mut self, dt: f32, network: &mut Network) -> Vec<usize> {
		if self.running {
			self.graph.update(dt);
		}
		let mut moved = Vec::new();
		self.graph.visit_nodes(|node| {
			let i = node.data.user_data;
			let Some(data) = network.nodes.get_mut(i) else {
				return;
			};
			let (x, y) = (f64::from(node.x()), f64::from(node.y()));
			if (data.x - x).abs() > MIN_MOVE || (data.y - y).abs() > MIN_MOVE {
				data.x = x;
				data.y = y;
				moved.push(i);
			}
		});
		moved.sort_unstable();
		moved
	}

	/// Hold node `index` at a data position until released.
	pub fn pin(&mut self, index: usize, x: f64, y: f64) {
		let Some(&target) = self.indices.get(index) else {
			return;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() == target {
				node.data.x = x as f32;
				node.data.y = y as f32;
				node.data.is_anchor = true;
			}
		});
	}

	/// Let node `index` move freely again.
	pub fn release(&mut self, index: usize) {
		let Some(&target) = self.indices.get(index) else {
			return;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() == target {
				node.data.is_anchor = false;
			}
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::grapher::{LinkData, NodeData as Data};

	fn network() -> Network {
		Network {
			nodes: vec![
				Data::new(0.0, 0.0, 5.0),
				Data::new(30.0, 0.0, 5.0),
				Data::new(0.0, 30.0, 5.0),
			],
			links: vec![LinkData::new(0, 1), LinkData::new(1, 9)],
		}
	}

	#[test]
	fn paused_layout_reports_no_movement() {
		let mut data = network();
		let mut layout = Layout::new(&data);
		layout.running = false;
		assert!(layout.step(0.016, &mut data).is_empty());
	}

	#[test]
	fn pinned_nodes_follow_the_pin() {
		let mut data = network();
		let mut layout = Layout::new(&data);
		layout.running = false;
		layout.pin(2, 50.0, 60.0);
		assert_eq!(layout.step(0.016, &mut data), [2]);
		assert_eq!((data.nodes[2].x, data.nodes[2].y), (50.0, 60.0));

		layout.pin(7, 1.0, 1.0);
		layout.release(2);
		assert!(layout.step(0.016, &mut data).is_empty());
	}
}
