//! Planning the motion between two clustering passes
//!
//! Clusters carry no identity across passes, so transitions are paired by
//! membership: every input point of either pass ends up in exactly one
//! [`ClusterTransition`].

use crate::core::geo::LatLng;
use crate::prelude::{HashMap, HashSet};
use crate::spatial::clustering::{Cluster, ClusterId, InputPoint, PointId};
use std::sync::Arc;

/// What a transition does to its marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// Points move from a previous cluster into a new one
    Move,
    /// Points newly entered the clustered region; no motion
    Appear,
    /// Points left the clustered region; the marker is removed at the end
    Leave,
}

/// Motion of a group of points from an origin to a destination position
#[derive(Debug)]
pub struct ClusterTransition<T> {
    kind: TransitionKind,
    origin_cluster: Option<ClusterId>,
    destination_cluster: Option<ClusterId>,
    origin: LatLng,
    destination: LatLng,
    points: Vec<Arc<InputPoint<T>>>,
}

impl<T> ClusterTransition<T> {
    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    /// Cluster of the previous pass the points come from, `None` when
    /// appearing
    pub fn origin_cluster(&self) -> Option<ClusterId> {
        self.origin_cluster
    }

    /// Cluster of the new pass the points go to, `None` when leaving
    pub fn destination_cluster(&self) -> Option<ClusterId> {
        self.destination_cluster
    }

    pub fn origin(&self) -> LatLng {
        self.origin
    }

    pub fn destination(&self) -> LatLng {
        self.destination
    }

    /// Points carried by this transition, in input order
    pub fn points(&self) -> &[Arc<InputPoint<T>>] {
        &self.points
    }

    pub fn size(&self) -> usize {
        self.points.len()
    }

    /// Marker position at progress `v`, linear in latitude and longitude
    pub fn position_at(&self, v: f64) -> LatLng {
        self.origin.lerp(&self.destination, v)
    }

    pub fn is_stationary(&self) -> bool {
        self.origin == self.destination
    }
}

impl<T> Clone for ClusterTransition<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            origin_cluster: self.origin_cluster,
            destination_cluster: self.destination_cluster,
            origin: self.origin,
            destination: self.destination,
            points: self.points.clone(),
        }
    }
}

/// Diffs two clustering passes into transitions
pub struct TransitionPlanner;

impl TransitionPlanner {
    /// Transitions from `previous` to `next`.
    ///
    /// Ordering: `next` in creation order, and inside each new cluster one
    /// transition per origin in the order its first point appears; then the
    /// points that left, per previous cluster in creation order.
    pub fn plan<T>(previous: &[Cluster<T>], next: &[Cluster<T>]) -> Vec<ClusterTransition<T>> {
        let mut origin_of: HashMap<PointId, usize> = HashMap::default();
        for (index, cluster) in previous.iter().enumerate() {
            for point in cluster.points() {
                origin_of.insert(point.id(), index);
            }
        }

        let mut transitions = Vec::with_capacity(next.len());
        let mut arrived: HashSet<PointId> = HashSet::default();

        for destination in next {
            let mut partitions: Vec<(Option<usize>, Vec<Arc<InputPoint<T>>>)> = Vec::new();
            for point in destination.points() {
                arrived.insert(point.id());
                let origin = origin_of.get(&point.id()).copied();
                match partitions.iter_mut().find(|(key, _)| *key == origin) {
                    Some((_, members)) => members.push(Arc::clone(point)),
                    None => partitions.push((origin, vec![Arc::clone(point)])),
                }
            }

            for (origin, points) in partitions {
                let transition = match origin {
                    Some(index) => ClusterTransition {
                        kind: TransitionKind::Move,
                        origin_cluster: Some(previous[index].id()),
                        destination_cluster: Some(destination.id()),
                        origin: previous[index].map_position(),
                        destination: destination.map_position(),
                        points,
                    },
                    None => ClusterTransition {
                        kind: TransitionKind::Appear,
                        origin_cluster: None,
                        destination_cluster: Some(destination.id()),
                        origin: destination.map_position(),
                        destination: destination.map_position(),
                        points,
                    },
                };
                transitions.push(transition);
            }
        }

        for cluster in previous {
            let leavers: Vec<_> = cluster
                .points()
                .iter()
                .filter(|point| !arrived.contains(&point.id()))
                .cloned()
                .collect();
            if !leavers.is_empty() {
                transitions.push(ClusterTransition {
                    kind: TransitionKind::Leave,
                    origin_cluster: Some(cluster.id()),
                    destination_cluster: None,
                    origin: cluster.map_position(),
                    destination: cluster.map_position(),
                    points: leavers,
                });
            }
        }

        transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(id: usize, lat: f64, lng: f64) -> Arc<InputPoint<()>> {
        Arc::new(InputPoint::new(PointId(id), LatLng::new(lat, lng), ()).unwrap())
    }

    fn cluster(id: usize, points: &[&Arc<InputPoint<()>>]) -> Cluster<()> {
        Cluster::from_points(ClusterId(id), points.iter().map(|p| Arc::clone(p)).collect())
            .unwrap()
    }

    fn ids(transition: &ClusterTransition<()>) -> Vec<usize> {
        transition.points().iter().map(|p| p.id().0).collect()
    }

    #[test]
    fn test_merge_emits_one_transition_per_origin() {
        let a = point(0, 37.7749, -122.4194);
        let b = point(1, 37.7750, -122.4195);
        let previous = vec![cluster(0, &[&a]), cluster(1, &[&b])];
        let next = vec![cluster(0, &[&a, &b])];

        let transitions = TransitionPlanner::plan(&previous, &next);
        assert_eq!(transitions.len(), 2);

        assert_eq!(transitions[0].kind(), TransitionKind::Move);
        assert_eq!(ids(&transitions[0]), vec![0]);
        assert_eq!(transitions[0].origin(), a.position());
        assert_eq!(transitions[0].destination(), a.position());
        assert!(transitions[0].is_stationary());

        assert_eq!(ids(&transitions[1]), vec![1]);
        assert_eq!(transitions[1].origin(), b.position());
        assert_eq!(transitions[1].destination(), a.position());
        assert_eq!(transitions[1].origin_cluster(), Some(ClusterId(1)));
        assert_eq!(transitions[1].destination_cluster(), Some(ClusterId(0)));
    }

    #[test]
    fn test_split_moves_out_of_the_shared_origin() {
        let a = point(0, 0.0, 0.0);
        let b = point(1, 0.0, 1.0);
        let c = point(2, 0.0, 2.0);
        let previous = vec![cluster(0, &[&a, &b, &c])];
        let next = vec![cluster(0, &[&a, &c]), cluster(1, &[&b])];

        let transitions = TransitionPlanner::plan(&previous, &next);
        assert_eq!(transitions.len(), 2);
        assert_eq!(ids(&transitions[0]), vec![0, 2]);
        assert!(transitions[0].is_stationary());
        assert_eq!(ids(&transitions[1]), vec![1]);
        assert_eq!(transitions[1].origin(), a.position());
        assert_eq!(transitions[1].destination(), b.position());
    }

    #[test]
    fn test_empty_previous_appears_in_place() {
        let p = point(0, 12.0, 34.0);
        let transitions = TransitionPlanner::plan(&[], &[cluster(0, &[&p])]);
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].kind(), TransitionKind::Appear);
        assert_eq!(transitions[0].origin(), p.position());
        assert_eq!(transitions[0].destination(), p.position());
        assert_eq!(transitions[0].origin_cluster(), None);
    }

    #[test]
    fn test_leavers_come_last_and_stay_put() {
        let a = point(0, 0.0, 0.0);
        let b = point(1, 5.0, 5.0);
        let c = point(2, 9.0, 9.0);
        let previous = vec![cluster(0, &[&a, &b]), cluster(1, &[&c])];
        let next = vec![cluster(0, &[&b])];

        let transitions = TransitionPlanner::plan(&previous, &next);
        let kinds: Vec<_> = transitions.iter().map(ClusterTransition::kind).collect();
        assert_eq!(
            kinds,
            vec![
                TransitionKind::Move,
                TransitionKind::Leave,
                TransitionKind::Leave
            ]
        );
        assert_eq!(ids(&transitions[1]), vec![0]);
        assert_eq!(transitions[1].origin(), a.position());
        assert_eq!(transitions[1].destination(), a.position());
        assert_eq!(transitions[1].destination_cluster(), None);
        assert_eq!(ids(&transitions[2]), vec![2]);
    }

    #[test]
    fn test_everything_leaves_when_next_is_empty() {
        let a = point(0, 0.0, 0.0);
        let b = point(1, 1.0, 1.0);
        let transitions =
            TransitionPlanner::plan(&[cluster(0, &[&a, &b])], &Vec::<Cluster<()>>::new());
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].kind(), TransitionKind::Leave);
        assert_eq!(ids(&transitions[0]), vec![0, 1]);
    }

    #[test]
    fn test_membership_is_conserved() {
        // Deterministic shuffles of 40 points into clusterings with some
        // points absent from either side
        let all: Vec<_> = (0..40)
            .map(|i| point(i, (i % 7) as f64, (i % 11) as f64))
            .collect();

        for seed in 1..20usize {
            let group = |salt: usize, skip: usize| -> Vec<Cluster<()>> {
                let mut buckets: Vec<Vec<Arc<InputPoint<()>>>> = vec![Vec::new(); 1 + seed % 6];
                for p in &all {
                    let id = p.id().0;
                    if (id * salt + seed) % 9 == skip {
                        continue;
                    }
                    let bucket = (id * (seed + salt)) % buckets.len();
                    buckets[bucket].push(Arc::clone(p));
                }
                buckets
                    .into_iter()
                    .filter_map(|points| Cluster::from_points(ClusterId(0), points))
                    .enumerate()
                    .map(|(i, c)| Cluster::from_points(ClusterId(i), c.points().to_vec()).unwrap())
                    .collect()
            };
            let previous = group(3, 0);
            let next = group(5, 4);

            let transitions = TransitionPlanner::plan(&previous, &next);

            let mut expected: HashSet<usize> = HashSet::default();
            for c in previous.iter().chain(next.iter()) {
                expected.extend(c.points().iter().map(|p| p.id().0));
            }
            let mut seen: Vec<usize> = transitions
                .iter()
                .flat_map(|t| t.points().iter().map(|p| p.id().0))
                .collect();
            let total = seen.len();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), total, "a point appeared twice (seed {})", seed);
            assert_eq!(seen.into_iter().collect::<HashSet<_>>(), expected);
        }
    }

    #[test]
    fn test_position_at_endpoints_and_midpoint() {
        let a = point(0, 0.0, 0.0);
        let b = point(1, 10.0, 20.0);
        let transitions =
            TransitionPlanner::plan(&[cluster(0, &[&a]), cluster(1, &[&b])], &[cluster(0, &[&b, &a])]);
        let moving = transitions.iter().find(|t| !t.is_stationary()).unwrap();
        assert_eq!(moving.position_at(0.0), LatLng::new(0.0, 0.0));
        assert_eq!(moving.position_at(0.5), LatLng::new(5.0, 10.0));
        assert_eq!(moving.position_at(1.0), LatLng::new(10.0, 20.0));
    }
}
