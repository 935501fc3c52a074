//! Force-directed knowledge-point map drawn on a 2D canvas.
//!
//! [`layout`] moves the nodes, [`transform`] maps them to the canvas,
//! [`scene`] and the private painter draw them, and [`frame_loop`] keeps
//! exactly one redraw loop alive per mounted canvas.

mod component;
mod error;
pub mod frame_loop;
pub mod layout;
mod render;
pub mod scene;
pub mod state;
pub mod transform;
mod types;

pub use component::KnowledgeGraphCanvas;
pub use error::GraphError;
pub use types::{
	BASE_RADIUS, DEFAULT_HUB_LABEL, HubSelector, KnowledgeNode, NodeId, parse_nodes,
	sort_for_display,
};
