//! Package dependency analysis

pub mod external;
pub mod graph;

pub use external::DependencyChecker;
pub use graph::{Cycle, DependencyGraph, cycle_edges};
