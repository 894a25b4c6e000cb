pub mod clustering;

pub use clustering::{Cluster, ClusterId, Clustering, InputPoint, PointId, ProjectedPoint};
