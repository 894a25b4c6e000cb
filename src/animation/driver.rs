//! Plays a list of cluster transitions on the host map
//!
//! The driver owns at most one running animation. Progress is derived from
//! the host's frame timestamps: each [`ClusterTransitionsAnimation::on_frame`]
//! computes `v` from the elapsed time and moves every temporary marker to
//! its interpolated position.

use crate::animation::interpolation::Interpolator;
use crate::animation::transitions::ClusterTransition;
use crate::core::config::Options;
use crate::core::geo::LatLng;
use crate::traits::{HostAccess, MapHost, MarkerAppearance, MarkerHandle, TransitionHost};
use crate::{ClusterError, Result};

/// Lifecycle of the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPhase {
    Idle,
    Starting,
    Running,
    Ending,
}

/// What a delivered frame did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// No animation was running
    Idle,
    /// Markers moved to progress `v`
    Running { progress: f64 },
    /// Terminal frame delivered, host notified
    Finished,
    /// A host reference was gone; state dropped without notification
    Abandoned,
}

struct AnimationState<T> {
    transitions: Vec<ClusterTransition<T>>,
    markers: Vec<MarkerHandle>,
    started_at: u64,
    duration_ms: u64,
    interpolator: Interpolator,
    value: f64,
}

pub struct ClusterTransitionsAnimation<T> {
    map: HostAccess<dyn MapHost>,
    options: HostAccess<Options>,
    host: HostAccess<dyn TransitionHost>,
    phase: AnimationPhase,
    state: Option<AnimationState<T>>,
}

impl<T> ClusterTransitionsAnimation<T> {
    pub fn new(
        map: HostAccess<dyn MapHost>,
        options: HostAccess<Options>,
        host: HostAccess<dyn TransitionHost>,
    ) -> Self {
        Self {
            map,
            options,
            host,
            phase: AnimationPhase::Idle,
            state: None,
        }
    }

    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == AnimationPhase::Idle
    }

    /// Current progress `v`, `None` while idle
    pub fn progress(&self) -> Option<f64> {
        self.state.as_ref().map(|state| state.value)
    }

    /// Transitions of the running animation
    pub fn transitions(&self) -> &[ClusterTransition<T>] {
        self.state
            .as_ref()
            .map(|state| state.transitions.as_slice())
            .unwrap_or(&[])
    }

    /// Positions of the temporary markers at the current progress, in
    /// transition order
    pub fn marker_positions(&self) -> Vec<LatLng> {
        self.state
            .as_ref()
            .map(|state| {
                state
                    .transitions
                    .iter()
                    .map(|transition| transition.position_at(state.value))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Start animating `transitions` at time `now`.
    ///
    /// Returns `false` without side effects when an animation is already
    /// running, when the list is empty, or when a host reference is gone.
    pub fn animate(&mut self, transitions: Vec<ClusterTransition<T>>, now: u64) -> bool {
        match self.start(transitions, now) {
            Ok(started) => started,
            Err(err) => {
                log::debug!("cluster transition not started: {}", err);
                false
            }
        }
    }

    fn start(&mut self, transitions: Vec<ClusterTransition<T>>, now: u64) -> Result<bool> {
        if self.state.is_some() {
            return Err(ClusterError::ConcurrentAnimate);
        }
        if transitions.is_empty() {
            return Ok(false);
        }

        let options = self
            .options
            .try_get()
            .ok_or(ClusterError::TornDownHost("options"))?;
        let host = self
            .host
            .try_get()
            .ok_or(ClusterError::TornDownHost("transition host"))?;
        let map = self.map.try_get().ok_or(ClusterError::TornDownHost("map"))?;

        self.phase = AnimationPhase::Starting;
        host.on_cluster_transition_starting();

        let markers = transitions
            .iter()
            .map(|transition| {
                map.add_marker(
                    transition.origin(),
                    MarkerAppearance::InTransition {
                        size: transition.size(),
                    },
                )
            })
            .collect();

        log::debug!(
            "starting cluster transition: {} transitions over {}ms",
            transitions.len(),
            options.transition_duration_ms
        );

        self.state = Some(AnimationState {
            transitions,
            markers,
            started_at: now,
            duration_ms: options.transition_duration_ms,
            interpolator: options.transition_interpolator.clone(),
            value: 0.0,
        });
        self.phase = AnimationPhase::Running;
        Ok(true)
    }

    /// Deliver a frame at time `now`
    pub fn on_frame(&mut self, now: u64) -> FrameOutcome {
        let Some(state) = self.state.as_mut() else {
            return FrameOutcome::Idle;
        };

        let map = match (self.map.try_get(), self.host.try_get()) {
            (Some(map), Some(_)) => map,
            (map, _) => {
                log::debug!("host torn down mid-transition, abandoning");
                self.phase = AnimationPhase::Ending;
                if let (Some(map), Some(state)) = (map, self.state.take()) {
                    for marker in state.markers {
                        map.remove_marker(marker);
                    }
                }
                self.state = None;
                self.phase = AnimationPhase::Idle;
                return FrameOutcome::Abandoned;
            }
        };

        let elapsed = now.saturating_sub(state.started_at);
        state.value = state.interpolator.progress(elapsed, state.duration_ms);
        for (transition, marker) in state.transitions.iter().zip(&state.markers) {
            map.set_marker_position(*marker, transition.position_at(state.value));
        }

        if elapsed >= state.duration_ms {
            self.end();
            FrameOutcome::Finished
        } else {
            FrameOutcome::Running {
                progress: state.value,
            }
        }
    }

    /// Stop the running animation where it is. The host still receives
    /// `on_cluster_transition_finished`. Returns `false` when idle.
    pub fn cancel(&mut self) -> bool {
        if self.state.is_none() {
            return false;
        }
        log::debug!(
            "cancelling cluster transition at progress {:.3}",
            self.progress().unwrap_or_default()
        );
        self.end();
        true
    }

    fn end(&mut self) {
        self.phase = AnimationPhase::Ending;
        if let Some(state) = self.state.take() {
            if let Some(map) = self.map.try_get() {
                for marker in state.markers {
                    map.remove_marker(marker);
                }
            }
        }
        self.phase = AnimationPhase::Idle;
        if let Some(host) = self.host.try_get() {
            host.on_cluster_transition_finished();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::interpolation::EasingFunction;
    use crate::animation::transitions::TransitionPlanner;
    use crate::spatial::clustering::{Cluster, ClusterId, InputPoint, PointId};
    use crate::traits::{CameraTarget, Projection};
    use std::cell::{Cell, RefCell};
    use std::rc::{Rc, Weak};
    use std::sync::Arc;

    #[derive(Default)]
    struct RecordingMap {
        next: Cell<u64>,
        live: RefCell<Vec<(MarkerHandle, LatLng)>>,
        updates: Cell<usize>,
        history: RefCell<Vec<(MarkerHandle, LatLng)>>,
    }

    impl MapHost for RecordingMap {
        fn projection(&self) -> Option<Arc<dyn Projection>> {
            None
        }

        fn move_camera(&self, _target: CameraTarget, _duration_ms: u64) {}

        fn add_marker(&self, position: LatLng, _appearance: MarkerAppearance) -> MarkerHandle {
            let handle = MarkerHandle(self.next.get());
            self.next.set(self.next.get() + 1);
            self.live.borrow_mut().push((handle, position));
            handle
        }

        fn set_marker_position(&self, marker: MarkerHandle, position: LatLng) {
            self.updates.set(self.updates.get() + 1);
            self.history.borrow_mut().push((marker, position));
            for entry in self.live.borrow_mut().iter_mut() {
                if entry.0 == marker {
                    entry.1 = position;
                }
            }
        }

        fn remove_marker(&self, marker: MarkerHandle) {
            self.live.borrow_mut().retain(|(handle, _)| *handle != marker);
        }
    }

    #[derive(Default)]
    struct Callbacks {
        log: RefCell<Vec<&'static str>>,
    }

    impl TransitionHost for Callbacks {
        fn on_cluster_transition_starting(&self) {
            self.log.borrow_mut().push("starting");
        }

        fn on_cluster_transition_finished(&self) {
            self.log.borrow_mut().push("finished");
        }
    }

    struct Fixture {
        map: Rc<RecordingMap>,
        options: Rc<Options>,
        host: Rc<Callbacks>,
        driver: ClusterTransitionsAnimation<()>,
    }

    fn fixture(options: Options) -> Fixture {
        let map = Rc::new(RecordingMap::default());
        let options = Rc::new(options);
        let host = Rc::new(Callbacks::default());
        let driver = ClusterTransitionsAnimation::new(
            HostAccess::from(Rc::downgrade(&map) as Weak<dyn MapHost>),
            HostAccess::new(&options),
            HostAccess::from(Rc::downgrade(&host) as Weak<dyn TransitionHost>),
        );
        Fixture {
            map,
            options,
            host,
            driver,
        }
    }

    fn moving(from: LatLng, to: LatLng) -> Vec<ClusterTransition<()>> {
        let a = Arc::new(InputPoint::new(PointId(0), to, ()).unwrap());
        let b = Arc::new(InputPoint::new(PointId(1), from, ()).unwrap());
        let previous = vec![
            Cluster::from_points(ClusterId(0), vec![Arc::clone(&a)]).unwrap(),
            Cluster::from_points(ClusterId(1), vec![Arc::clone(&b)]).unwrap(),
        ];
        let next = vec![Cluster::from_points(ClusterId(0), vec![a, b]).unwrap()];
        TransitionPlanner::plan(&previous, &next)
    }

    #[test]
    fn test_full_lifecycle() {
        let mut f = fixture(Options::default());
        let transitions = moving(LatLng::new(0.0, 0.0), LatLng::new(10.0, 20.0));
        assert!(f.driver.animate(transitions, 1_000));
        assert_eq!(f.driver.phase(), AnimationPhase::Running);
        assert_eq!(*f.host.log.borrow(), vec!["starting"]);
        assert_eq!(f.map.live.borrow().len(), 2);
        assert_eq!(f.map.updates.get(), 0);
        assert_eq!(
            f.driver.marker_positions(),
            vec![LatLng::new(10.0, 20.0), LatLng::new(0.0, 0.0)]
        );

        assert_eq!(
            f.driver.on_frame(1_150),
            FrameOutcome::Running { progress: 0.5 }
        );
        assert_eq!(f.map.live.borrow()[1].1, LatLng::new(5.0, 10.0));

        assert_eq!(f.driver.on_frame(1_300), FrameOutcome::Finished);
        assert!(f.driver.is_idle());
        assert!(f.map.live.borrow().is_empty());
        assert_eq!(*f.host.log.borrow(), vec!["starting", "finished"]);
        assert_eq!(f.driver.on_frame(1_400), FrameOutcome::Idle);
    }

    #[test]
    fn test_terminal_frame_lands_on_destination() {
        let options = Options::default().with_transition_interpolator(EasingFunction::EaseInOutSine);
        let mut f = fixture(options);
        let from = LatLng::new(1.0, 1.0);
        let to = LatLng::new(3.0, -7.0);
        f.driver.animate(moving(from, to), 0);

        f.driver.on_frame(120);
        assert_ne!(f.driver.marker_positions()[1], to);

        assert_eq!(f.driver.on_frame(5_000), FrameOutcome::Finished);
        let history = f.map.history.borrow();
        let last_of = |handle: MarkerHandle| {
            history
                .iter()
                .rev()
                .find(|(h, _)| *h == handle)
                .map(|(_, position)| *position)
        };
        assert_eq!(last_of(MarkerHandle(0)), Some(to));
        assert_eq!(last_of(MarkerHandle(1)), Some(to));
        assert_eq!(f.driver.progress(), None);
    }

    #[test]
    fn test_second_animate_is_ignored() {
        let mut f = fixture(Options::default());
        assert!(f.driver.animate(moving(LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0)), 0));
        assert!(!f.driver.animate(moving(LatLng::new(5.0, 5.0), LatLng::new(6.0, 6.0)), 10));
        assert_eq!(f.map.live.borrow().len(), 2);
        assert_eq!(*f.host.log.borrow(), vec!["starting"]);

        f.driver.on_frame(300);
        assert_eq!(*f.host.log.borrow(), vec!["starting", "finished"]);
    }

    #[test]
    fn test_empty_transition_list_stays_idle() {
        let mut f = fixture(Options::default());
        assert!(!f.driver.animate(Vec::new(), 0));
        assert!(f.driver.is_idle());
        assert!(f.host.log.borrow().is_empty());
    }

    #[test]
    fn test_missing_options_prevents_start() {
        let mut f = fixture(Options::default());
        f.options = Rc::new(Options::default());
        assert!(!f.driver.animate(moving(LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0)), 0));
        assert!(f.host.log.borrow().is_empty());
        assert!(f.map.live.borrow().is_empty());
    }

    #[test]
    fn test_cancel_pins_progress_and_notifies() {
        let mut f = fixture(Options::default());
        f.driver
            .animate(moving(LatLng::new(0.0, 0.0), LatLng::new(10.0, 10.0)), 0);
        f.driver.on_frame(75);
        let updates = f.map.updates.get();

        assert!(f.driver.cancel());
        assert!(f.driver.is_idle());
        assert!(f.map.live.borrow().is_empty());
        assert_eq!(f.map.updates.get(), updates);
        assert_eq!(*f.host.log.borrow(), vec!["starting", "finished"]);
        assert!(!f.driver.cancel());
    }

    #[test]
    fn test_torn_down_host_abandons_silently() {
        let mut f = fixture(Options::default());
        f.driver
            .animate(moving(LatLng::new(0.0, 0.0), LatLng::new(10.0, 10.0)), 0);
        f.driver.on_frame(50);
        let updates = f.map.updates.get();
        let recorded = f.host.log.borrow().clone();

        // Replacing the only strong reference tears the first host down
        f.host = Rc::new(Callbacks::default());

        assert_eq!(f.driver.on_frame(100), FrameOutcome::Abandoned);
        assert!(f.driver.is_idle());
        assert_eq!(f.map.updates.get(), updates);
        assert!(f.map.live.borrow().is_empty());
        assert_eq!(recorded, vec!["starting"]);
        assert!(f.host.log.borrow().is_empty());
        assert_eq!(f.driver.on_frame(150), FrameOutcome::Idle);
    }

    #[test]
    fn test_torn_down_map_abandons_silently() {
        let mut f = fixture(Options::default());
        f.driver
            .animate(moving(LatLng::new(0.0, 0.0), LatLng::new(10.0, 10.0)), 0);
        assert!(matches!(f.driver.on_frame(50), FrameOutcome::Running { .. }));

        // The driver only holds a weak reference to the widget
        f.map = Rc::new(RecordingMap::default());

        assert_eq!(f.driver.on_frame(100), FrameOutcome::Abandoned);
        assert!(f.driver.is_idle());
        assert_eq!(f.driver.phase(), AnimationPhase::Idle);
        assert_eq!(*f.host.log.borrow(), vec!["starting"]);
        assert_eq!(f.map.updates.get(), 0);
        assert!(f.map.live.borrow().is_empty());
        assert_eq!(f.driver.on_frame(150), FrameOutcome::Idle);
        assert!(f.host.log.borrow().iter().all(|event| *event != "finished"));
    }
}
