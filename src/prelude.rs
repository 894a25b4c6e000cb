//! Prelude module for common maplet-cluster types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use maplet_cluster::prelude::*;`

pub use crate::core::{
    clock::{Clock, ManualClock, SystemClock},
    config::{
        ClusterClickBehavior, ClusterInfoWindowClickBehavior, ClusteringConfig, Options,
        SinglePointClickBehavior, SinglePointInfoWindowClickBehavior,
    },
    geo::{LatLng, LatLngBounds, Point},
    map::{ClickOutcome, ClusterMap},
    viewport::Viewport,
};

pub use crate::animation::{
    driver::{AnimationPhase, ClusterTransitionsAnimation, FrameOutcome},
    interpolation::{EasingFunction, Interpolator},
    transitions::{ClusterTransition, TransitionKind, TransitionPlanner},
};

pub use crate::spatial::clustering::{
    Cluster, ClusterId, Clustering, InputPoint, PointId, ProjectedPoint,
};

pub use crate::input::debounce::CameraChangeDebouncer;

pub use crate::traits::{
    CameraPosition, CameraTarget, HostAccess, MapHost, MarkerAppearance, MarkerHandle,
    ProcessingListener, Projection, TransitionHost,
};

pub use crate::{ClusterError, Result};

pub use std::{rc::Rc, sync::Arc};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
