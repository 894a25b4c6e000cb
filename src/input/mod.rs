pub mod debounce;

pub use debounce::CameraChangeDebouncer;
