// Utility modules: road graph, geometry helpers, data loading and rendering

pub mod distance;
pub mod init_map;
pub mod plot;
pub mod spatial_graph;

pub use self::spatial_graph::{GraphOptions, SpatialGraph};
