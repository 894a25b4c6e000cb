pub mod clustering;

pub use clustering::{ClusteringResult, ClusteringWorker};
