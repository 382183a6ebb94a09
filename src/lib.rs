//! Co-voting graphs of the Brazilian Chamber of Deputies.
//!
//! Roll-call incidence matrices (vote events x legislators) are recoded under
//! an abstention and an obstruction policy, scored pairwise into an adjacency
//! matrix, and thresholded into an undirected graph.

pub mod adjacency;
pub mod error;
pub mod graph;
pub mod incidence;
pub mod metadata;
pub mod plan;
pub mod policy;
pub mod store;

pub use adjacency::{build_adjacency, build_adjacency_named, AdjacencyMatrix};
pub use error::{AdjacencyError, Error, IncidenceError, PolicyError, PolicyKind, Result};
pub use graph::{export_to_graphviz, threshold_graph, GraphSummary, LegislatorGraph, LegislatorNode};
pub use incidence::{IncidenceMatrix, RecodedMatrix};
pub use metadata::{LegislatorDirectory, LegislatorInfo, LegislatorRecord, Region};
pub use plan::{run_plan, RunPlan, RunReport};
pub use policy::{AbstentionPolicy, Metric, ObstructionPolicy, PolicySet};
pub use store::{ArtifactKey, ArtifactStore};
