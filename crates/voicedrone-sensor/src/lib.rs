pub mod mapper;
pub mod registry;
pub mod sensor_trait;
pub mod simulated;
pub mod smoothing;
pub mod tracker;

pub use mapper::map_to_surface;
pub use registry::SensorRegistry;
pub use sensor_trait::{DepthProjection, SkeletonSensor};
pub use simulated::{PinholeProjection, SimulatedSensor};
pub use smoothing::JointFilter;
pub use tracker::SkeletonTracker;
