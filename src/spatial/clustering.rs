//! Greedy pixel-distance clustering
//!
//! Points are visited in input order. Each one joins the nearest already
//! formed cluster whose map position projects closer than the join distance,
//! or starts a new cluster of its own. A cluster's map position is the
//! position of its first point and never moves, so zooming in only splits
//! clusters and zooming out only merges them.

use crate::core::config::ClusteringConfig;
use crate::core::geo::{LatLng, LatLngBounds, Point};
use crate::traits::Projection;
use crate::{ClusterError, Result};
use std::sync::Arc;

/// Stable identifier of an input point: its index in the installed data set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(pub usize);

/// Identifier of a cluster within one clustering pass, in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(pub usize);

/// An immutable point supplied by the host, with an opaque payload
#[derive(Debug)]
pub struct InputPoint<T> {
    id: PointId,
    position: LatLng,
    payload: T,
}

impl<T> InputPoint<T> {
    /// Fails with [`ClusterError::InvalidInput`] when the position is outside
    /// the valid latitude/longitude range
    pub fn new(id: PointId, position: LatLng, payload: T) -> Result<Self> {
        if !position.is_valid() {
            return Err(ClusterError::InvalidInput(format!(
                "point {} at ({}, {})",
                id.0, position.lat, position.lng
            )));
        }
        Ok(Self {
            id,
            position,
            payload,
        })
    }

    pub fn id(&self) -> PointId {
        self.id
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }
}

/// A group of input points represented by one marker at a fixed position
#[derive(Debug)]
pub struct Cluster<T> {
    id: ClusterId,
    map_position: LatLng,
    points: Vec<Arc<InputPoint<T>>>,
}

impl<T> Cluster<T> {
    /// Build a cluster from points already grouped elsewhere. The first
    /// point fixes the map position; `None` for an empty list.
    pub fn from_points(id: ClusterId, points: Vec<Arc<InputPoint<T>>>) -> Option<Self> {
        let map_position = points.first()?.position();
        Some(Self {
            id,
            map_position,
            points,
        })
    }

    fn seeded(id: ClusterId, point: Arc<InputPoint<T>>) -> Self {
        Self {
            id,
            map_position: point.position(),
            points: vec![point],
        }
    }

    pub fn id(&self) -> ClusterId {
        self.id
    }

    /// Position of the first point admitted to the cluster
    pub fn map_position(&self) -> LatLng {
        self.map_position
    }

    /// Members in input order
    pub fn points(&self) -> &[Arc<InputPoint<T>>] {
        &self.points
    }

    /// Get the number of points in the cluster
    pub fn size(&self) -> usize {
        self.points.len()
    }

    /// Check if this is a single-point cluster
    pub fn is_single(&self) -> bool {
        self.points.len() == 1
    }

    pub fn contains(&self, id: PointId) -> bool {
        self.points.iter().any(|point| point.id() == id)
    }

    /// Geographic bounds of the members
    pub fn bounds(&self) -> LatLngBounds {
        let mut bounds = LatLngBounds::new(self.map_position, self.map_position);
        for point in &self.points {
            bounds.extend(&point.position());
        }
        bounds
    }
}

impl<T> Clone for Cluster<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            map_position: self.map_position,
            points: self.points.clone(),
        }
    }
}

/// An input point paired with its screen position for one pass
#[derive(Debug)]
pub struct ProjectedPoint<T> {
    pub point: Arc<InputPoint<T>>,
    pub pixel: Point,
}

/// Greedy clusterer
#[derive(Debug, Clone, Default)]
pub struct Clustering {
    config: ClusteringConfig,
}

impl Clustering {
    pub fn new(config: ClusteringConfig) -> Self {
        Self { config }
    }

    /// Run a full pass. Without a projection the result is empty.
    pub fn cluster<T>(
        &self,
        points: &[Arc<InputPoint<T>>],
        projection: Option<&dyn Projection>,
    ) -> Vec<Cluster<T>> {
        match projection {
            Some(projection) => self.join(self.prepare(points, projection)),
            None => {
                log::debug!("no projection available, clustering pass yields nothing");
                Vec::new()
            }
        }
    }

    /// Filter points to the expanded visible region and project them,
    /// preserving input order
    pub fn prepare<T>(
        &self,
        points: &[Arc<InputPoint<T>>],
        projection: &dyn Projection,
    ) -> Vec<ProjectedPoint<T>> {
        let region = projection
            .visible_region()
            .expanded(self.config.expand_bounds_factor);

        points
            .iter()
            .filter(|point| region.contains(&point.position()))
            .filter_map(|point| match projection.project(&point.position()) {
                Some(pixel) => Some(ProjectedPoint {
                    point: Arc::clone(point),
                    pixel,
                }),
                None => {
                    log::warn!("skipping point {} that failed to project", point.id().0);
                    None
                }
            })
            .collect()
    }

    /// Greedy join in pixel space. Pure; safe to run off the UI thread.
    pub fn join<T>(&self, projected: Vec<ProjectedPoint<T>>) -> Vec<Cluster<T>> {
        let threshold = self.config.pixel_distance_to_join_cluster;
        let mut clusters: Vec<Cluster<T>> = Vec::new();
        // Screen position of each cluster's map position, parallel to `clusters`
        let mut anchors: Vec<Point> = Vec::new();

        for ProjectedPoint { point, pixel } in projected {
            let mut nearest: Option<(usize, f64)> = None;
            for (index, anchor) in anchors.iter().enumerate() {
                let distance = anchor.distance_to(&pixel);
                if distance < threshold && nearest.map_or(true, |(_, best)| distance < best) {
                    nearest = Some((index, distance));
                }
            }

            match nearest {
                Some((index, _)) => clusters[index].points.push(point),
                None => {
                    let id = ClusterId(clusters.len());
                    clusters.push(Cluster::seeded(id, point));
                    anchors.push(pixel);
                }
            }
        }

        clusters
    }
}
