//! Background clustering worker
//!
//! Keeps the greedy join off the UI thread. The UI thread prepares the
//! projected points (the projection belongs to the host) and submits them;
//! the worker answers with clusters tagged by the request generation so the
//! caller can discard results computed against an older baseline.

use crate::core::config::ClusteringConfig;
use crate::spatial::clustering::{Cluster, Clustering, ProjectedPoint};
use crate::{ClusterError, Result};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::JoinHandle;
use std::time::Duration;

struct ClusteringRequest<T> {
    generation: u64,
    points: Vec<ProjectedPoint<T>>,
    config: ClusteringConfig,
}

/// Clusters computed for one submitted generation
#[derive(Debug)]
pub struct ClusteringResult<T> {
    pub generation: u64,
    pub clusters: Vec<Cluster<T>>,
}

pub struct ClusteringWorker<T> {
    request_tx: Option<Sender<ClusteringRequest<T>>>,
    result_rx: Receiver<ClusteringResult<T>>,
    handle: Option<JoinHandle<()>>,
}

impl<T: Send + Sync + 'static> ClusteringWorker<T> {
    pub fn spawn() -> Result<Self> {
        let (request_tx, request_rx) = unbounded();
        let (result_tx, result_rx) = unbounded();

        let handle = std::thread::Builder::new()
            .name("cluster-worker".to_string())
            .spawn(move || Self::run(request_rx, result_tx))
            .map_err(|e| ClusterError::Worker(e.to_string()))?;

        Ok(Self {
            request_tx: Some(request_tx),
            result_rx,
            handle: Some(handle),
        })
    }

    fn run(request_rx: Receiver<ClusteringRequest<T>>, result_tx: Sender<ClusteringResult<T>>) {
        log::debug!("cluster worker started");

        while let Ok(mut request) = request_rx.recv() {
            // Only the newest queued request matters
            while let Ok(newer) = request_rx.try_recv() {
                log::debug!("cluster worker skipping generation {}", request.generation);
                request = newer;
            }

            let point_count = request.points.len();
            let clusters = Clustering::new(request.config).join(request.points);
            log::debug!(
                "cluster worker joined {} points into {} clusters (generation {})",
                point_count,
                clusters.len(),
                request.generation
            );

            let result = ClusteringResult {
                generation: request.generation,
                clusters,
            };
            if result_tx.send(result).is_err() {
                break;
            }
        }

        log::debug!("cluster worker exiting - channel disconnected");
    }

    pub fn submit(
        &self,
        generation: u64,
        points: Vec<ProjectedPoint<T>>,
        config: ClusteringConfig,
    ) -> Result<()> {
        let sender = self
            .request_tx
            .as_ref()
            .ok_or_else(|| ClusterError::Worker("worker is shut down".to_string()))?;
        sender
            .send(ClusteringRequest {
                generation,
                points,
                config,
            })
            .map_err(|_| ClusterError::Worker("worker thread has exited".to_string()))
    }

    /// A finished result, if one is ready. Fails once the worker thread
    /// has exited and every result has been drained.
    pub fn try_recv(&self) -> Result<Option<ClusteringResult<T>>> {
        match self.result_rx.try_recv() {
            Ok(result) => Ok(Some(result)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                Err(ClusterError::Worker("worker thread has exited".to_string()))
            }
        }
    }

    /// Wait up to `timeout` for a finished result
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ClusteringResult<T>> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!("cluster worker disconnected");
                None
            }
        }
    }
}

#[cfg(test)]
impl<T> ClusteringWorker<T> {
    /// A worker whose thread is already gone
    pub(crate) fn disconnected() -> Self {
        let (request_tx, _) = unbounded();
        let (_, result_rx) = unbounded();
        Self {
            request_tx: Some(request_tx),
            result_rx,
            handle: None,
        }
    }
}

impl<T> Drop for ClusteringWorker<T> {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop
        self.request_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("cluster worker panicked");
            }
        }
    }
}
