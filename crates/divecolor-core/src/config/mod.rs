pub mod performance;
pub mod store;

pub use performance::{PerformanceConfig, PerformanceUpdate, VideoCodec};
pub use store::{PerformanceInfo, PerformanceStore};
