//! Configuration for clustering and transition behavior
//!
//! [`Options`] carries every recognized setting with its default. It can be
//! built in code with the `with_*` setters or deserialized from JSON, where
//! missing fields fall back to their defaults.

use crate::animation::interpolation::Interpolator;
use crate::core::constants::*;
use crate::{ClusterError, Result};
use serde::Deserialize;

/// The behavior when a cluster's marker is clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterClickBehavior {
    #[default]
    ZoomToBounds,
    ShowInfoWindow,
    NoOp,
}

/// The behavior when a cluster's info window is clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterInfoWindowClickBehavior {
    ZoomToBounds,
    #[default]
    HideInfoWindow,
    NoOp,
}

/// The behavior when a single point's marker is clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinglePointClickBehavior {
    #[default]
    ShowInfoWindow,
    NoOp,
}

/// The behavior when a single point's info window is clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinglePointInfoWindowClickBehavior {
    #[default]
    HideInfoWindow,
    NoOp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Options {
    pub cluster_click_behavior: ClusterClickBehavior,
    pub cluster_info_window_click_behavior: ClusterInfoWindowClickBehavior,
    pub single_point_click_behavior: SinglePointClickBehavior,
    pub single_point_info_window_click_behavior: SinglePointInfoWindowClickBehavior,
    /// Pixel distance under which a point joins a neighboring cluster.
    /// Scale it with screen density; the larger marker dimension plus a
    /// quarter is a good starting point.
    pub pixel_distance_to_join_cluster: u32,
    /// How much the visible region grows, per side, before points are
    /// filtered. Higher values let clusters slide in from off screen at the
    /// cost of clustering and drawing more markers.
    pub expand_bounds_factor: f64,
    pub transition_duration_ms: u64,
    pub show_info_window_animation_duration_ms: u64,
    pub zoom_to_bounds_animation_duration_ms: u64,
    pub zoom_to_bounds_padding: u32,
    /// Disable when the embedding application re-clusters on its own.
    pub enable_clustering_on_camera_change: bool,
    pub clustering_on_camera_change_listener_dirty_lifetime_millis: u64,
    pub transition_interpolator: Interpolator,
    /// Run the pixel-space join on a worker thread
    pub background_clustering: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            cluster_click_behavior: ClusterClickBehavior::default(),
            cluster_info_window_click_behavior: ClusterInfoWindowClickBehavior::default(),
            single_point_click_behavior: SinglePointClickBehavior::default(),
            single_point_info_window_click_behavior: SinglePointInfoWindowClickBehavior::default(),
            pixel_distance_to_join_cluster: DEFAULT_PIXEL_DISTANCE_TO_JOIN_CLUSTER,
            expand_bounds_factor: DEFAULT_EXPAND_BOUNDS_FACTOR,
            transition_duration_ms: DEFAULT_TRANSITION_DURATION_MS,
            show_info_window_animation_duration_ms: DEFAULT_SHOW_INFO_WINDOW_ANIMATION_DURATION_MS,
            zoom_to_bounds_animation_duration_ms: DEFAULT_ZOOM_TO_BOUNDS_ANIMATION_DURATION_MS,
            zoom_to_bounds_padding: DEFAULT_ZOOM_TO_BOUNDS_PADDING,
            enable_clustering_on_camera_change: true,
            clustering_on_camera_change_listener_dirty_lifetime_millis: DEFAULT_DIRTY_LIFETIME_MS,
            transition_interpolator: Interpolator::default(),
            background_clustering: false,
        }
    }
}

impl Options {
    /// Parse options from JSON, validating the result
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Options = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pixel_distance_to_join_cluster == 0 {
            return Err(ClusterError::InvalidOptions(
                "pixel_distance_to_join_cluster must be positive".to_string(),
            ));
        }
        if !(self.expand_bounds_factor >= 0.0) || !self.expand_bounds_factor.is_finite() {
            return Err(ClusterError::InvalidOptions(format!(
                "expand_bounds_factor must be a finite non-negative number, got {}",
                self.expand_bounds_factor
            )));
        }
        if self.transition_duration_ms == 0 {
            return Err(ClusterError::InvalidOptions(
                "transition_duration_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Settings consumed by a clustering pass
    pub fn clustering_config(&self) -> ClusteringConfig {
        ClusteringConfig {
            pixel_distance_to_join_cluster: self.pixel_distance_to_join_cluster as f64,
            expand_bounds_factor: self.expand_bounds_factor,
        }
    }

    pub fn with_cluster_click_behavior(mut self, behavior: ClusterClickBehavior) -> Self {
        self.cluster_click_behavior = behavior;
        self
    }

    pub fn with_cluster_info_window_click_behavior(
        mut self,
        behavior: ClusterInfoWindowClickBehavior,
    ) -> Self {
        self.cluster_info_window_click_behavior = behavior;
        self
    }

    pub fn with_single_point_click_behavior(mut self, behavior: SinglePointClickBehavior) -> Self {
        self.single_point_click_behavior = behavior;
        self
    }

    pub fn with_single_point_info_window_click_behavior(
        mut self,
        behavior: SinglePointInfoWindowClickBehavior,
    ) -> Self {
        self.single_point_info_window_click_behavior = behavior;
        self
    }

    pub fn with_pixel_distance_to_join_cluster(mut self, pixels: u32) -> Self {
        self.pixel_distance_to_join_cluster = pixels;
        self
    }

    pub fn with_expand_bounds_factor(mut self, factor: f64) -> Self {
        self.expand_bounds_factor = factor;
        self
    }

    pub fn with_transition_duration_ms(mut self, duration_ms: u64) -> Self {
        self.transition_duration_ms = duration_ms;
        self
    }

    pub fn with_show_info_window_animation_duration_ms(mut self, duration_ms: u64) -> Self {
        self.show_info_window_animation_duration_ms = duration_ms;
        self
    }

    pub fn with_zoom_to_bounds_animation_duration_ms(mut self, duration_ms: u64) -> Self {
        self.zoom_to_bounds_animation_duration_ms = duration_ms;
        self
    }

    pub fn with_zoom_to_bounds_padding(mut self, padding: u32) -> Self {
        self.zoom_to_bounds_padding = padding;
        self
    }

    pub fn with_clustering_on_camera_change(mut self, enabled: bool) -> Self {
        self.enable_clustering_on_camera_change = enabled;
        self
    }

    pub fn with_dirty_lifetime_millis(mut self, millis: u64) -> Self {
        self.clustering_on_camera_change_listener_dirty_lifetime_millis = millis;
        self
    }

    pub fn with_transition_interpolator(mut self, interpolator: impl Into<Interpolator>) -> Self {
        self.transition_interpolator = interpolator.into();
        self
    }

    pub fn with_background_clustering(mut self, enabled: bool) -> Self {
        self.background_clustering = enabled;
        self
    }
}

/// The subset of [`Options`] a clustering pass reads. Plain data so it can
/// travel to a worker thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusteringConfig {
    pub pixel_distance_to_join_cluster: f64,
    pub expand_bounds_factor: f64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Options::default().clustering_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::interpolation::EasingFunction;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.cluster_click_behavior, ClusterClickBehavior::ZoomToBounds);
        assert_eq!(
            options.cluster_info_window_click_behavior,
            ClusterInfoWindowClickBehavior::HideInfoWindow
        );
        assert_eq!(
            options.single_point_click_behavior,
            SinglePointClickBehavior::ShowInfoWindow
        );
        assert_eq!(options.pixel_distance_to_join_cluster, 150);
        assert_eq!(options.expand_bounds_factor, 0.0);
        assert_eq!(options.transition_duration_ms, 300);
        assert_eq!(options.zoom_to_bounds_padding, 75);
        assert!(options.enable_clustering_on_camera_change);
        assert_eq!(
            options.clustering_on_camera_change_listener_dirty_lifetime_millis,
            200
        );
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let options = Options::from_json(
            r#"{
                "pixel_distance_to_join_cluster": 90,
                "cluster_click_behavior": "no_op",
                "transition_interpolator": "ease_in_out_quad"
            }"#,
        )
        .unwrap();
        assert_eq!(options.pixel_distance_to_join_cluster, 90);
        assert_eq!(options.cluster_click_behavior, ClusterClickBehavior::NoOp);
        assert_eq!(options.transition_duration_ms, 300);
        assert!(matches!(
            options.transition_interpolator,
            Interpolator::Easing(EasingFunction::EaseInOutQuad)
        ));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(matches!(
            Options::from_json(r#"{"pixel_distance_to_join_cluster": 0}"#),
            Err(ClusterError::InvalidOptions(_))
        ));
        assert!(Options::default()
            .with_expand_bounds_factor(-0.5)
            .validate()
            .is_err());
        assert!(Options::default()
            .with_transition_duration_ms(0)
            .validate()
            .is_err());
        assert!(matches!(
            Options::from_json("{not json"),
            Err(ClusterError::Serialization(_))
        ));
    }
}
