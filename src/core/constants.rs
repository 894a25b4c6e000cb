//! Engine-wide defaults for clustering and transition timing.
//! Keeping them in a single place makes it easier to tweak the magic numbers.

/// Pixel distance under which a point joins an existing cluster.
pub const DEFAULT_PIXEL_DISTANCE_TO_JOIN_CLUSTER: u32 = 150;

/// Fraction of the visible span added on each side before filtering points.
pub const DEFAULT_EXPAND_BOUNDS_FACTOR: f64 = 0.0;

/// Length of the animated cluster transition.
pub const DEFAULT_TRANSITION_DURATION_MS: u64 = 300;

/// Camera animation length when centering on a marker's info window.
pub const DEFAULT_SHOW_INFO_WINDOW_ANIMATION_DURATION_MS: u64 = 300;

/// Camera animation length when zooming to a cluster's bounds.
pub const DEFAULT_ZOOM_TO_BOUNDS_ANIMATION_DURATION_MS: u64 = 300;

/// Pixels kept between the zoomed-to points and the map edge.
pub const DEFAULT_ZOOM_TO_BOUNDS_PADDING: u32 = 75;

/// Dirty window of the camera-change debouncer. Slightly shorter than the
/// transition so the next user gesture after a transition is honored.
pub const DEFAULT_DIRTY_LIFETIME_MS: u64 = 200;

/// Default square tile size in pixels, used by the Web Mercator viewport.
pub const TILE_SIZE: f64 = 256.0;

/// Mercator latitude limit.
pub const MAX_LATITUDE: f64 = 85.0511287798;
