//! Host-facing trait abstractions
//!
//! The clustering core never owns the map widget or the callback receivers
//! of the embedding application. It reaches them through these traits and
//! holds them as [`HostAccess`] back-references, so a torn-down host is
//! observed as absent instead of being kept alive.

use crate::core::geo::{LatLng, LatLngBounds, Point};
use std::rc::{Rc, Weak};
use std::sync::Arc;

/// Geographic to screen conversion at a fixed camera.
///
/// Implementations are plain snapshots of the camera, which lets a
/// clustering pass run on a worker thread.
pub trait Projection: Send + Sync {
    /// Screen pixel position relative to the viewport, `None` when the
    /// position cannot be projected
    fn project(&self, position: &LatLng) -> Option<Point>;

    /// Geographic region currently visible in the viewport
    fn visible_region(&self) -> LatLngBounds;
}

/// Opaque identifier of a marker owned by the host map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

/// What a marker stands for; hosts pick icons from this
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerAppearance {
    /// A cluster holding exactly one input point
    Single,
    /// A resting cluster of `size` points
    Cluster { size: usize },
    /// A temporary marker moving `size` points during a transition
    InTransition { size: usize },
}

impl MarkerAppearance {
    /// Appearance of a resting marker for a cluster of `size` points
    pub fn for_cluster(size: usize) -> Self {
        if size == 1 {
            MarkerAppearance::Single
        } else {
            MarkerAppearance::Cluster { size }
        }
    }
}

/// Where a camera move should end up
#[derive(Debug, Clone, PartialEq)]
pub enum CameraTarget {
    Center(LatLng),
    Bounds { bounds: LatLngBounds, padding: u32 },
}

/// Camera state reported with a camera-change notification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPosition {
    pub target: LatLng,
    pub zoom: f64,
}

impl CameraPosition {
    pub fn new(target: LatLng, zoom: f64) -> Self {
        Self { target, zoom }
    }
}

/// The host map widget
pub trait MapHost {
    /// Projection for the current camera, `None` while the map has no
    /// layout yet
    fn projection(&self) -> Option<Arc<dyn Projection>>;

    /// Animate the camera to `target` over `duration_ms`
    fn move_camera(&self, target: CameraTarget, duration_ms: u64);

    fn add_marker(&self, position: LatLng, appearance: MarkerAppearance) -> MarkerHandle;

    fn set_marker_position(&self, marker: MarkerHandle, position: LatLng);

    fn remove_marker(&self, marker: MarkerHandle);
}

/// Receives cluster transition lifecycle callbacks
pub trait TransitionHost {
    /// Delivered before the first position update of a transition
    fn on_cluster_transition_starting(&self);

    /// Delivered after the last frame, or after an explicit cancel
    fn on_cluster_transition_finished(&self);
}

/// Receives clustering pass lifecycle callbacks
pub trait ProcessingListener {
    fn on_clustering_started(&self) {}

    fn on_clustering_finished(&self) {}
}

/// Non-owning, nullable back-reference to a host object.
///
/// Every use goes through [`HostAccess::try_get`]; an empty result means
/// the host has been torn down and the pending action is abandoned.
pub struct HostAccess<T: ?Sized> {
    inner: Option<Weak<T>>,
}

impl<T: ?Sized> HostAccess<T> {
    pub fn new(host: &Rc<T>) -> Self {
        Self {
            inner: Some(Rc::downgrade(host)),
        }
    }

    /// A reference that was never attached to anything
    pub fn detached() -> Self {
        Self { inner: None }
    }

    pub fn try_get(&self) -> Option<Rc<T>> {
        self.inner.as_ref().and_then(Weak::upgrade)
    }

    pub fn is_attached(&self) -> bool {
        self.inner
            .as_ref()
            .map(|weak| weak.strong_count() > 0)
            .unwrap_or(false)
    }
}

impl<T: ?Sized> From<Weak<T>> for HostAccess<T> {
    fn from(weak: Weak<T>) -> Self {
        Self { inner: Some(weak) }
    }
}

impl<T: ?Sized> Clone for HostAccess<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: ?Sized> Default for HostAccess<T> {
    fn default() -> Self {
        Self::detached()
    }
}

impl<T: ?Sized> std::fmt::Debug for HostAccess<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostAccess")
            .field("attached", &self.is_attached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counter {
        started: Cell<u32>,
    }

    impl TransitionHost for Counter {
        fn on_cluster_transition_starting(&self) {
            self.started.set(self.started.get() + 1);
        }

        fn on_cluster_transition_finished(&self) {}
    }

    #[test]
    fn test_host_access_observes_teardown() {
        let host = Rc::new(Counter {
            started: Cell::new(0),
        });
        let weak: Weak<dyn TransitionHost> = Rc::downgrade(&host) as Weak<dyn TransitionHost>;
        let access = HostAccess::from(weak);

        assert!(access.is_attached());
        access
            .try_get()
            .unwrap()
            .on_cluster_transition_starting();
        assert_eq!(host.started.get(), 1);

        drop(host);
        assert!(!access.is_attached());
        assert!(access.try_get().is_none());
    }

    #[test]
    fn test_detached_access_is_empty() {
        let access: HostAccess<dyn TransitionHost> = HostAccess::detached();
        assert!(access.try_get().is_none());
        assert!(!access.is_attached());
    }

    #[test]
    fn test_marker_appearance_for_cluster() {
        assert_eq!(MarkerAppearance::for_cluster(1), MarkerAppearance::Single);
        assert_eq!(
            MarkerAppearance::for_cluster(4),
            MarkerAppearance::Cluster { size: 4 }
        );
    }
}
