pub mod segment;
pub mod transport_mode;
pub mod trip;

pub use segment::{Activity, Segment, SegmentKind, TimelineExport};
pub use transport_mode::{ModeThreshold, TransportMode};
pub use trip::Trip;
