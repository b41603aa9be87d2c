pub mod timeline;
pub mod trips;

pub use timeline::TimelineSummary;
