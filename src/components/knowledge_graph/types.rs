use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::GraphError;

/// Name of the node that acts as hub when no explicit id is configured.
pub const DEFAULT_HUB_LABEL: &str = "金融理论";

/// Smallest drawn radius, in world units.
pub const BASE_RADIUS: f64 = 5.0;

/// Opaque node identity as supplied by the data service.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
	/// Numeric primary key.
	Int(i64),
	/// Any other textual key.
	Text(String),
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NodeId::Int(id) => write!(f, "{id}"),
			NodeId::Text(id) => f.write_str(id),
		}
	}
}

/// One knowledge point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeNode {
	pub id: NodeId,
	pub name: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub parent: Option<NodeId>,
	/// Associated-content count; the service calls it `questions_count`.
	#[serde(rename = "questions_count", default)]
	pub weight: u32,
}

impl KnowledgeNode {
	/// A bare record with a numeric id, no description and no parent.
	pub fn new(id: i64, name: impl Into<String>, weight: u32) -> Self {
		Self {
			id: NodeId::Int(id),
			name: name.into(),
			description: String::new(),
			parent: None,
			weight,
		}
	}

	/// Drawn radius in world units; grows with the square root of the weight.
	pub fn radius(&self) -> f64 {
		BASE_RADIUS + f64::from(self.weight).sqrt() * 2.0
	}
}

/// Picks the single node every other node is linked to.
#[derive(Clone, Debug, PartialEq)]
pub enum HubSelector {
	/// Match on the node's display name.
	Label(String),
	/// Match on the node's id.
	Id(NodeId),
}

impl Default for HubSelector {
	fn default() -> Self {
		HubSelector::Label(DEFAULT_HUB_LABEL.to_owned())
	}
}

impl HubSelector {
	pub fn matches(&self, node: &KnowledgeNode) -> bool {
		match self {
			HubSelector::Label(label) => node.name == *label,
			HubSelector::Id(id) => node.id == *id,
		}
	}

	/// Index of the first matching node, if any.
	pub fn find(&self, nodes: &[KnowledgeNode]) -> Option<usize> {
		nodes.iter().position(|node| self.matches(node))
	}
}

/// Decode the data service's knowledge-point list.
pub fn parse_nodes(json: &str) -> Result<Vec<KnowledgeNode>, GraphError> {
	Ok(serde_json::from_str(json)?)
}

/// Heaviest first, ties broken by name.
pub fn sort_for_display(nodes: &mut [KnowledgeNode]) {
	nodes.sort_by(|a, b| match b.weight.cmp(&a.weight) {
		Ordering::Equal => a.name.cmp(&b.name),
		other => other,
	});
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn radius_grows_with_square_root_of_weight() {
		assert_eq!(KnowledgeNode::new(1, "a", 0).radius(), 5.0);
		assert_eq!(KnowledgeNode::new(1, "a", 9).radius(), 11.0);
		assert_eq!(KnowledgeNode::new(1, "a", 100).radius(), 25.0);
	}

	#[test]
	fn parses_service_records() {
		let nodes = parse_nodes(
			r#"[
				{"id": 1, "name": "Hub", "description": "root", "parent": null, "questions_count": 9},
				{"id": "kp-2", "name": "A", "description": "", "parent": 1}
			]"#,
		)
		.unwrap();

		assert_eq!(nodes.len(), 2);
		assert_eq!(nodes[0].id, NodeId::Int(1));
		assert_eq!(nodes[0].weight, 9);
		assert_eq!(nodes[1].id, NodeId::Text("kp-2".into()));
		assert_eq!(nodes[1].parent, Some(NodeId::Int(1)));
		assert_eq!(nodes[1].weight, 0, "missing count defaults to zero");
	}

	#[test]
	fn rejects_non_list_payload() {
		assert!(matches!(
			parse_nodes(r#"{"id": 1}"#),
			Err(GraphError::MalformedNodes(_))
		));
	}

	#[test]
	fn hub_found_by_label_or_id() {
		let nodes = vec![
			KnowledgeNode::new(1, "A", 0),
			KnowledgeNode::new(2, DEFAULT_HUB_LABEL, 0),
			KnowledgeNode::new(3, DEFAULT_HUB_LABEL, 0),
		];

		assert_eq!(HubSelector::default().find(&nodes), Some(1));
		assert_eq!(HubSelector::Id(NodeId::Int(3)).find(&nodes), Some(2));
		assert_eq!(HubSelector::Label("missing".into()).find(&nodes), None);
	}

	#[test]
	fn display_order_is_weight_then_name() {
		let mut nodes = vec![
			KnowledgeNode::new(1, "b", 2),
			KnowledgeNode::new(2, "c", 5),
			KnowledgeNode::new(3, "a", 2),
		];
		sort_for_display(&mut nodes);

		let names: Vec<_> = nodes.iter().map(|n| n.name.as_str()).collect();
		assert_eq!(names, ["c", "a", "b"]);
	}
}
