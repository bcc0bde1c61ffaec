pub mod radius;
pub mod request;
pub mod session;
pub mod viewport;

pub use radius::{radius_for_zoom, DEFAULT_RADIUS_M};
pub use request::ScanRequest;
pub use session::{ScanSession, ScanSnapshot, ScanStatus};
pub use viewport::{
    MapSurface, SurfaceEvent, ViewportState, ViewportTracker, DEFAULT_QUIET_PERIOD,
};
