//! # maplet-cluster
//!
//! Marker clustering for a host map widget, with animated transitions
//! between cluster sets.
//!
//! Nearby points are grouped by screen distance into cluster markers. When
//! the camera changes, the points are re-clustered and the markers glide
//! from their old clusters to their new ones instead of jumping. The host
//! supplies the projection, the marker storage and the frame callbacks
//! through the traits in [`traits`].

pub mod animation;
pub mod background;
pub mod core;
pub mod input;
pub mod prelude;
pub mod spatial;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    clock::{Clock, ManualClock, SystemClock},
    config::{ClusteringConfig, Options},
    geo::{LatLng, LatLngBounds, Point},
    map::{ClickOutcome, ClusterMap},
    viewport::Viewport,
};

pub use animation::{
    driver::{AnimationPhase, ClusterTransitionsAnimation, FrameOutcome},
    interpolation::{EasingFunction, Interpolator},
    transitions::{ClusterTransition, TransitionKind, TransitionPlanner},
};

pub use background::clustering::{ClusteringResult, ClusteringWorker};

pub use input::debounce::CameraChangeDebouncer;

pub use spatial::clustering::{Cluster, ClusterId, Clustering, InputPoint, PointId};

pub use traits::{
    CameraPosition, CameraTarget, HostAccess, MapHost, MarkerAppearance, MarkerHandle,
    ProcessingListener, Projection, TransitionHost,
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, ClusterError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    /// A back-reference to the map, options or host was empty at use
    #[error("host torn down: {0} is gone")]
    TornDownHost(&'static str),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("an animation is already running")]
    ConcurrentAnimate,

    #[error("no projection available")]
    ProjectionUnavailable,

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("worker error: {0}")]
    Worker(String),
}

/// Install `env_logger` as the `log` backend. Safe to call more than once.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env().try_init();
}
