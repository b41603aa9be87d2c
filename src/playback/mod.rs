pub mod camera;
pub mod controller;
pub mod sink;
pub mod state;
pub mod trail;

pub use camera::{CameraMove, Easing};
pub use controller::PlaybackController;
pub use sink::{ArcDatum, CityMarker, JsonLinesSink, LogSink, MemorySink, RenderSink, TripInfo};
pub use state::{PlaybackState, PlaybackStatus};
