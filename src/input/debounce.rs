//! Camera change debouncing
//!
//! Camera notifications arrive at frame rate while the user pans. The
//! debouncer forwards one of them and then swallows the rest until its
//! dirty window has elapsed.

use crate::core::constants::DEFAULT_DIRTY_LIFETIME_MS;
use crate::traits::CameraPosition;

#[derive(Debug, Clone)]
pub struct CameraChangeDebouncer {
    dirty: Option<u64>,
    lifetime_ms: u64,
}

impl Default for CameraChangeDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DIRTY_LIFETIME_MS)
    }
}

impl CameraChangeDebouncer {
    pub fn new(lifetime_ms: u64) -> Self {
        Self {
            dirty: None,
            lifetime_ms,
        }
    }

    pub fn set_lifetime(&mut self, lifetime_ms: u64) {
        self.lifetime_ms = lifetime_ms;
    }

    /// Timestamp of the last forwarded event or explicit mark
    pub fn dirty_since(&self) -> Option<u64> {
        self.dirty
    }

    /// Whether an event at `now` would be swallowed.
    ///
    /// A mark in the future (the clock went backwards) keeps the debouncer
    /// dirty until it is reached.
    pub fn is_dirty(&self, now: u64) -> bool {
        match self.dirty {
            None => false,
            Some(dirty) if now < dirty => true,
            Some(dirty) => now - dirty < self.lifetime_ms,
        }
    }

    /// Forward `camera` if the debouncer is clean at `now`, and start a new
    /// dirty window from `now`.
    pub fn on_camera_change(&mut self, camera: CameraPosition, now: u64) -> Option<CameraPosition> {
        if self.is_dirty(now) {
            log::trace!("camera change at {}ms swallowed", now);
            return None;
        }
        self.dirty = Some(now);
        Some(camera)
    }

    /// Mark the debouncer dirty from `now`, e.g. when a transition starts
    pub fn set_dirty(&mut self, now: u64) {
        self.dirty = Some(now);
    }

    /// Forget the dirty mark; the next event is forwarded
    pub fn reset(&mut self) {
        self.dirty = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;

    fn camera(zoom: f64) -> CameraPosition {
        CameraPosition::new(LatLng::new(37.7749, -122.4194), zoom)
    }

    #[test]
    fn test_burst_forwards_leading_edge_of_each_window() {
        let mut debouncer = CameraChangeDebouncer::new(200);
        let forwarded: Vec<u64> = [0u64, 50, 150, 210, 250, 410]
            .iter()
            .filter(|&&t| debouncer.on_camera_change(camera(t as f64), t).is_some())
            .copied()
            .collect();
        assert_eq!(forwarded, vec![0, 210, 410]);
    }

    #[test]
    fn test_forwarded_camera_is_passed_through() {
        let mut debouncer = CameraChangeDebouncer::default();
        assert_eq!(debouncer.on_camera_change(camera(12.0), 5), Some(camera(12.0)));
        assert_eq!(debouncer.dirty_since(), Some(5));
    }

    #[test]
    fn test_window_boundary_is_clean() {
        let mut debouncer = CameraChangeDebouncer::new(200);
        debouncer.set_dirty(1_000);
        assert!(debouncer.is_dirty(1_199));
        assert!(!debouncer.is_dirty(1_200));
    }

    #[test]
    fn test_set_dirty_suppresses_until_lifetime() {
        let mut debouncer = CameraChangeDebouncer::new(100);
        debouncer.set_dirty(500);
        assert!(debouncer.on_camera_change(camera(3.0), 550).is_none());
        assert!(debouncer.on_camera_change(camera(3.0), 600).is_some());
    }

    #[test]
    fn test_clock_going_backwards_is_dirty() {
        let mut debouncer = CameraChangeDebouncer::new(100);
        debouncer.set_dirty(500);
        assert!(debouncer.on_camera_change(camera(3.0), 10).is_none());
    }

    #[test]
    fn test_reset_and_zero_lifetime() {
        let mut debouncer = CameraChangeDebouncer::new(200);
        debouncer.set_dirty(100);
        debouncer.reset();
        assert!(debouncer.on_camera_change(camera(1.0), 101).is_some());

        debouncer.set_lifetime(0);
        assert!(debouncer.on_camera_change(camera(1.0), 101).is_some());
        assert!(debouncer.on_camera_change(camera(1.0), 101).is_some());
    }
}
