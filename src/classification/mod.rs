pub mod algorithm;
pub mod config;
pub mod ordering;

pub use algorithm::{classify_segment, classify_segments};
pub use config::TripConfig;
pub use ordering::order_trips;
