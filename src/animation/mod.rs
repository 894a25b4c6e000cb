pub mod driver;
pub mod interpolation;
pub mod transitions;

// Re-export commonly used types for convenience
pub use driver::{AnimationPhase, ClusterTransitionsAnimation, FrameOutcome};
pub use interpolation::{EasingFunction, Interpolator};
pub use transitions::{ClusterTransition, TransitionKind, TransitionPlanner};
