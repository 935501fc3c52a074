//! Pairwise-repulsion layout with a spring to the origin.
//!
//! Every tick visits each unordered pair once (O(N²)), which is fine for the
//! few hundred knowledge points a map holds.

use rand::Rng;

use super::types::KnowledgeNode;

/// Tunables for [`LayoutEngine`].
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
	/// Inverse-square repulsion constant.
	pub repulsion: f64,
	/// Pull of every node towards the origin, per unit of distance.
	pub centering: f64,
	/// Velocity multiplier applied once per tick.
	pub damping: f64,
	/// Floor on pair distance so coincident nodes do not blow up.
	pub min_distance: f64,
	/// Width of the box new nodes are scattered in.
	pub spawn_width: f64,
	/// Height of the box new nodes are scattered in.
	pub spawn_height: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			repulsion: 1500.0,
			centering: 0.01,
			damping: 0.9,
			min_distance: 1.0,
			spawn_width: 800.0,
			spawn_height: 600.0,
		}
	}
}

/// Physical state of one node, in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Body {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
}

impl Body {
	pub fn speed(&self) -> f64 {
		(self.vx * self.vx + self.vy * self.vy).sqrt()
	}
}

/// Unit vector used to push apart a pair sitting on exactly the same spot.
/// Derived from the pair's indices so a stack of nodes fans out instead of
/// moving as one.
fn split_direction(i: usize, j: usize) -> (f64, f64) {
	const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;
	let angle = GOLDEN_ANGLE * (i * 31 + j) as f64;
	(angle.cos(), angle.sin())
}

/// Owns the node set and one [`Body`] per node, index-aligned.
pub struct LayoutEngine {
	nodes: Vec<KnowledgeNode>,
	bodies: Vec<Body>,
	config: LayoutConfig,
}

impl LayoutEngine {
	pub fn new(nodes: Vec<KnowledgeNode>, config: LayoutConfig, rng: &mut impl Rng) -> Self {
		let mut engine = Self {
			nodes: Vec::new(),
			bodies: Vec::new(),
			config,
		};
		engine.reset(nodes, rng);
		engine
	}

	/// Replace the node set. All previous physical state is dropped; every
	/// node starts at a random spot with zero velocity.
	pub fn reset(&mut self, nodes: Vec<KnowledgeNode>, rng: &mut impl Rng) {
		let (w, h) = (self.config.spawn_width, self.config.spawn_height);
		self.bodies = nodes
			.iter()
			.map(|_| Body {
				x: (rng.random::<f64>() - 0.5) * w,
				y: (rng.random::<f64>() - 0.5) * h,
				vx: 0.0,
				vy: 0.0,
			})
			.collect();
		self.nodes = nodes;
	}

	/// Advance the simulation by one step.
	pub fn tick(&mut self) {
		let LayoutConfig {
			repulsion,
			centering,
			damping,
			min_distance,
			..
		} = self.config;
		let n = self.bodies.len();

		for i in 0..n {
			for j in (i + 1)..n {
				let (head, tail) = self.bodies.split_at_mut(j);
				let (a, b) = (&mut head[i], &mut tail[0]);
				let (dx, dy) = (b.x - a.x, b.y - a.y);
				let raw = (dx * dx + dy * dy).sqrt();
				let (ux, uy) = if raw > 0.0 {
					(dx / raw, dy / raw)
				} else {
					split_direction(i, j)
				};
				let distance = raw.max(min_distance);
				let force = repulsion / (distance * distance);
				let (fx, fy) = (ux * force, uy * force);
				a.vx -= fx;
				a.vy -= fy;
				b.vx += fx;
				b.vy += fy;
			}
		}

		for body in &mut self.bodies {
			body.vx -= body.x * centering;
			body.vy -= body.y * centering;
			body.vx *= damping;
			body.vy *= damping;
			body.x += body.vx;
			body.y += body.vy;
		}
	}

	pub fn nodes(&self) -> &[KnowledgeNode] {
		&self.nodes
	}

	pub fn bodies(&self) -> &[Body] {
		&self.bodies
	}

	/// Node records paired with their physical state.
	pub fn iter(&self) -> impl Iterator<Item = (&KnowledgeNode, &Body)> {
		self.nodes.iter().zip(&self.bodies)
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Average speed across all bodies; zero for an empty graph.
	pub fn mean_speed(&self) -> f64 {
		if self.bodies.is_empty() {
			return 0.0;
		}
		self.bodies.iter().map(Body::speed).sum::<f64>() / self.bodies.len() as f64
	}

	#[cfg(test)]
	pub(crate) fn bodies_mut(&mut self) -> &mut [Body] {
		&mut self.bodies
	}
}
