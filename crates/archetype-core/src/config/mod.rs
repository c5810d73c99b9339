//! Configuration surface consumed by the detection engine and result cache.

pub mod cache_config;
pub mod detection_config;

pub use cache_config::{CacheConfig, InvalidationStrategy};
pub use detection_config::DetectionConfig;
