// pathway-domain library entry point
pub mod causal_edge;
pub mod causal_graph;
pub mod causal_node;
pub mod dot;
pub mod error;
pub mod kappa_rule;
pub mod merge;
pub mod species;
pub mod transform;
pub use causal_edge::CausalEdge;
pub use causal_graph::{CausalGraph, NodesType};
pub use causal_node::CausalNode;
pub use dot::{parse_dot, render_dot, DotOptions};
pub use error::DomainError;
