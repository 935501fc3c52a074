use thiserror::Error;

/// Failures at the visualizer's edges. The simulation itself cannot fail.
#[derive(Debug, Error)]
pub enum GraphError {
	/// The canvas refused to hand out a 2D context.
	#[error("2d canvas context unavailable: {0}")]
	ContextUnavailable(String),
	/// The node payload was not a list of knowledge points.
	#[error("malformed node payload: {0}")]
	MalformedNodes(#[from] serde_json::Error),
}
