mod connection;
pub mod helpers;
mod migrations;
pub mod models;
pub mod repositories;

pub use connection::Database;
pub use models::{Segment, TimelineExport, TransportMode, Trip};
pub use repositories::TimelineSummary;
