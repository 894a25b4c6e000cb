//! The host-facing clustering facade
//!
//! [`ClusterMap`] owns the installed points and the current cluster set, and
//! ties the stages together: camera change, debouncer, clustering pass
//! (inline or on the worker), transition planning, animation, and finally
//! placing the resting markers for the new set.

use crate::animation::driver::{ClusterTransitionsAnimation, FrameOutcome};
use crate::animation::transitions::TransitionPlanner;
use crate::background::clustering::ClusteringWorker;
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::{
    ClusterClickBehavior, ClusterInfoWindowClickBehavior, Options, SinglePointClickBehavior,
    SinglePointInfoWindowClickBehavior,
};
use crate::core::geo::LatLng;
use crate::input::debounce::CameraChangeDebouncer;
use crate::spatial::clustering::{Cluster, Clustering, InputPoint, PointId};
use crate::traits::{
    CameraPosition, CameraTarget, HostAccess, MapHost, MarkerAppearance, MarkerHandle,
    ProcessingListener, TransitionHost,
};
use crate::{ClusterError, Result};
use std::rc::Rc;
use std::sync::Arc;

/// What a click on a marker or its info window resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    ZoomedToBounds,
    ShowedInfoWindow,
    /// The host should close the open info window
    HideInfoWindow,
    Ignored,
}

pub struct ClusterMap<T> {
    map: HostAccess<dyn MapHost>,
    options: Rc<Options>,
    processing: HostAccess<dyn ProcessingListener>,
    clock: Rc<dyn Clock>,
    points: Vec<Arc<InputPoint<T>>>,
    clusters: Vec<Cluster<T>>,
    /// Resting markers of `clusters`, parallel to it
    markers: Vec<MarkerHandle>,
    /// Cluster set installed once the running animation ends
    pending: Option<Vec<Cluster<T>>>,
    animation: ClusterTransitionsAnimation<T>,
    debouncer: CameraChangeDebouncer,
    worker: Option<ClusteringWorker<T>>,
    generation: u64,
    outstanding: Option<u64>,
    deferred: bool,
}

impl<T: Send + Sync + 'static> ClusterMap<T> {
    pub fn new(
        map: HostAccess<dyn MapHost>,
        options: Options,
        transition_host: HostAccess<dyn TransitionHost>,
    ) -> Result<Self> {
        options.validate()?;
        let options = Rc::new(options);

        let worker = if options.background_clustering {
            match ClusteringWorker::spawn() {
                Ok(worker) => Some(worker),
                Err(err) => {
                    log::warn!("background clustering unavailable, clustering inline: {}", err);
                    None
                }
            }
        } else {
            None
        };

        let animation =
            ClusterTransitionsAnimation::new(map.clone(), HostAccess::new(&options), transition_host);
        let debouncer = CameraChangeDebouncer::new(
            options.clustering_on_camera_change_listener_dirty_lifetime_millis,
        );

        Ok(Self {
            map,
            options,
            processing: HostAccess::detached(),
            clock: Rc::new(SystemClock::new()),
            points: Vec::new(),
            clusters: Vec::new(),
            markers: Vec::new(),
            pending: None,
            animation,
            debouncer,
            worker,
            generation: 0,
            outstanding: None,
            deferred: false,
        })
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_processing_listener(mut self, listener: HostAccess<dyn ProcessingListener>) -> Self {
        self.processing = listener;
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The resting cluster set
    pub fn clusters(&self) -> &[Cluster<T>] {
        &self.clusters
    }

    pub fn points(&self) -> &[Arc<InputPoint<T>>] {
        &self.points
    }

    pub fn animation(&self) -> &ClusterTransitionsAnimation<T> {
        &self.animation
    }

    pub fn is_animating(&self) -> bool {
        !self.animation.is_idle()
    }

    /// Whether a background pass is outstanding
    pub fn is_clustering(&self) -> bool {
        self.outstanding.is_some()
    }

    /// Install a new point set and run the initial clustering pass.
    ///
    /// Points with invalid coordinates are skipped. Each accepted point is
    /// identified by its index in `data`. Returns the number accepted.
    pub fn set_data<I>(&mut self, data: I) -> usize
    where
        I: IntoIterator<Item = (LatLng, T)>,
    {
        self.reset();

        let mut points = Vec::new();
        for (index, (position, payload)) in data.into_iter().enumerate() {
            match InputPoint::new(PointId(index), position, payload) {
                Ok(point) => points.push(Arc::new(point)),
                Err(err) => log::warn!("skipping input: {}", err),
            }
        }
        self.points = points;
        log::info!("installed {} points", self.points.len());

        self.update_clusters();
        self.points.len()
    }

    /// Remove all markers and points, cancelling any running animation
    pub fn clear(&mut self) {
        self.reset();
        self.points.clear();
    }

    fn reset(&mut self) {
        self.animation.cancel();
        self.pending = None;
        self.remove_markers();
        self.clusters.clear();
        // Results of passes submitted before now are stale
        self.generation += 1;
        self.outstanding = None;
        self.deferred = false;
        self.debouncer.reset();
    }

    /// Camera-change notification from the host. Returns `true` when it
    /// triggered a clustering pass.
    pub fn on_camera_change(&mut self, camera: CameraPosition) -> bool {
        if !self.options.enable_clustering_on_camera_change {
            return false;
        }
        if self.is_animating() || self.is_clustering() {
            log::debug!("camera change while busy, coalescing");
            self.deferred = true;
            return false;
        }

        let now = self.clock.now_millis();
        if self.debouncer.on_camera_change(camera, now).is_none() {
            return false;
        }
        log::debug!(
            "camera changed to ({:.5}, {:.5}) at zoom {:.2}",
            camera.target.lat,
            camera.target.lng,
            camera.zoom
        );
        self.update_clusters();
        true
    }

    /// Re-cluster against the current camera. While a transition runs or a
    /// pass is outstanding the request is coalesced and runs afterwards.
    pub fn update_clusters(&mut self) {
        if self.is_animating() || self.is_clustering() {
            self.deferred = true;
            return;
        }
        let Some(map) = self.map.try_get() else {
            log::debug!("{}, skipping clustering pass", ClusterError::TornDownHost("map"));
            return;
        };

        self.notify_started();
        let config = self.options.clustering_config();
        let clustering = Clustering::new(config);

        let Some(projection) = map.projection() else {
            log::debug!("{}, clustering to an empty set", ClusterError::ProjectionUnavailable);
            self.apply_clusters(Vec::new());
            return;
        };

        if let Some(worker) = &self.worker {
            self.generation += 1;
            let generation = self.generation;
            let prepared = clustering.prepare(&self.points, projection.as_ref());
            match worker.submit(generation, prepared, config) {
                Ok(()) => {
                    self.outstanding = Some(generation);
                    return;
                }
                Err(err) => {
                    log::warn!("{}, clustering inline", err);
                    self.worker = None;
                }
            }
        }

        let clusters = clustering.join(clustering.prepare(&self.points, projection.as_ref()));
        self.apply_clusters(clusters);
    }

    /// Apply a finished background pass, if any. Returns `true` when a
    /// result was applied.
    pub fn poll(&mut self) -> bool {
        let Some(worker) = &self.worker else {
            return false;
        };

        let mut results = Vec::new();
        let mut worker_gone = false;
        loop {
            match worker.try_recv() {
                Ok(Some(result)) => results.push(result),
                Ok(None) => break,
                Err(err) => {
                    log::warn!("{}, clustering inline from now on", err);
                    worker_gone = true;
                    break;
                }
            }
        }

        let mut applied = false;
        for result in results {
            if self.outstanding != Some(result.generation) {
                log::debug!("discarding stale clustering result (generation {})", result.generation);
                continue;
            }
            self.outstanding = None;
            self.apply_clusters(result.clusters);
            applied = true;
        }

        if worker_gone {
            self.worker = None;
            // The pass the worker never answered reruns inline
            if self.outstanding.take().is_some() {
                self.update_clusters();
                applied = true;
            }
        }

        self.run_deferred();
        applied
    }

    fn apply_clusters(&mut self, clusters: Vec<Cluster<T>>) {
        self.notify_finished();
        log::debug!(
            "clustering pass produced {} clusters from {} points",
            clusters.len(),
            self.points.len()
        );

        let transitions = TransitionPlanner::plan(&self.clusters, &clusters);
        if transitions.is_empty() {
            self.install(clusters);
            return;
        }

        let now = self.clock.now_millis();
        self.remove_markers();
        if self.animation.animate(transitions, now) {
            self.pending = Some(clusters);
            self.debouncer.set_dirty(now);
        } else {
            self.install(clusters);
        }
    }

    /// Frame callback from the host
    pub fn on_frame(&mut self) -> FrameOutcome {
        self.poll();

        let outcome = self.animation.on_frame(self.clock.now_millis());
        if matches!(outcome, FrameOutcome::Finished | FrameOutcome::Abandoned) {
            self.finish_transition();
        }
        outcome
    }

    /// Stop the running transition and jump to the new cluster set.
    /// Returns `false` when nothing was animating.
    pub fn cancel_transition(&mut self) -> bool {
        if !self.animation.cancel() {
            return false;
        }
        self.finish_transition();
        true
    }

    fn finish_transition(&mut self) {
        if let Some(clusters) = self.pending.take() {
            self.install(clusters);
        }
        self.run_deferred();
    }

    fn run_deferred(&mut self) {
        if self.deferred && !self.is_animating() && !self.is_clustering() {
            self.deferred = false;
            log::debug!("running coalesced camera change");
            self.update_clusters();
        }
    }

    fn install(&mut self, clusters: Vec<Cluster<T>>) {
        self.remove_markers();
        if let Some(map) = self.map.try_get() {
            self.markers = clusters
                .iter()
                .map(|cluster| {
                    map.add_marker(
                        cluster.map_position(),
                        MarkerAppearance::for_cluster(cluster.size()),
                    )
                })
                .collect();
        }
        self.clusters = clusters;
    }

    fn remove_markers(&mut self) {
        let markers = std::mem::take(&mut self.markers);
        if let Some(map) = self.map.try_get() {
            for marker in markers {
                map.remove_marker(marker);
            }
        }
    }

    /// Move the camera to fit the members of the cluster at `index`
    pub fn zoom_to_bounds(&self, index: usize) -> bool {
        self.move_camera_to(index, |cluster, options| {
            (
                CameraTarget::Bounds {
                    bounds: cluster.bounds(),
                    padding: options.zoom_to_bounds_padding,
                },
                options.zoom_to_bounds_animation_duration_ms,
            )
        })
    }

    /// Center the camera on the cluster at `index` ahead of showing its
    /// info window
    pub fn show_info_window_for(&self, index: usize) -> bool {
        self.move_camera_to(index, |cluster, options| {
            (
                CameraTarget::Center(cluster.map_position()),
                options.show_info_window_animation_duration_ms,
            )
        })
    }

    fn move_camera_to<F>(&self, index: usize, target: F) -> bool
    where
        F: FnOnce(&Cluster<T>, &Options) -> (CameraTarget, u64),
    {
        let result = self
            .clusters
            .get(index)
            .ok_or_else(|| ClusterError::InvalidInput(format!("no cluster at index {}", index)))
            .and_then(|cluster| {
                let map = self.map.try_get().ok_or(ClusterError::TornDownHost("map"))?;
                let (camera, duration_ms) = target(cluster, &self.options);
                map.move_camera(camera, duration_ms);
                Ok(())
            });
        match result {
            Ok(()) => true,
            Err(err) => {
                log::debug!("camera move skipped: {}", err);
                false
            }
        }
    }

    /// Route a click on the marker of the cluster at `index`
    pub fn on_marker_click(&self, index: usize) -> ClickOutcome {
        let Some(cluster) = self.clusters.get(index) else {
            return ClickOutcome::Ignored;
        };
        let outcome = if cluster.is_single() {
            match self.options.single_point_click_behavior {
                SinglePointClickBehavior::ShowInfoWindow => ClickOutcome::ShowedInfoWindow,
                SinglePointClickBehavior::NoOp => ClickOutcome::Ignored,
            }
        } else {
            match self.options.cluster_click_behavior {
                ClusterClickBehavior::ZoomToBounds => ClickOutcome::ZoomedToBounds,
                ClusterClickBehavior::ShowInfoWindow => ClickOutcome::ShowedInfoWindow,
                ClusterClickBehavior::NoOp => ClickOutcome::Ignored,
            }
        };
        self.perform(index, outcome)
    }

    /// Route a click on the info window of the cluster at `index`
    pub fn on_info_window_click(&self, index: usize) -> ClickOutcome {
        let Some(cluster) = self.clusters.get(index) else {
            return ClickOutcome::Ignored;
        };
        let outcome = if cluster.is_single() {
            match self.options.single_point_info_window_click_behavior {
                SinglePointInfoWindowClickBehavior::HideInfoWindow => ClickOutcome::HideInfoWindow,
                SinglePointInfoWindowClickBehavior::NoOp => ClickOutcome::Ignored,
            }
        } else {
            match self.options.cluster_info_window_click_behavior {
                ClusterInfoWindowClickBehavior::ZoomToBounds => ClickOutcome::ZoomedToBounds,
                ClusterInfoWindowClickBehavior::HideInfoWindow => ClickOutcome::HideInfoWindow,
                ClusterInfoWindowClickBehavior::NoOp => ClickOutcome::Ignored,
            }
        };
        self.perform(index, outcome)
    }

    fn perform(&self, index: usize, outcome: ClickOutcome) -> ClickOutcome {
        let moved = match outcome {
            ClickOutcome::ZoomedToBounds => self.zoom_to_bounds(index),
            ClickOutcome::ShowedInfoWindow => self.show_info_window_for(index),
            ClickOutcome::HideInfoWindow | ClickOutcome::Ignored => true,
        };
        if moved {
            outcome
        } else {
            ClickOutcome::Ignored
        }
    }

    fn notify_started(&self) {
        if let Some(listener) = self.processing.try_get() {
            listener.on_clustering_started();
        }
    }

    fn notify_finished(&self) {
        if let Some(listener) = self.processing.try_get() {
            listener.on_clustering_finished();
        }
    }
}
