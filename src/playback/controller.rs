use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time::{self, Duration},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::db::models::Trip;

use super::{sink::RenderSink, trail::Trail, PlaybackState};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

struct Runner {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

/// Plays trips back one at a time on a [`RenderSink`].
///
/// Each run is a spawned task that walks the trip list, pausing for the
/// camera transition after every step. Only one run may be active; it can be
/// stopped at any point through [`PlaybackController::stop_playback`].
#[derive(Clone)]
pub struct PlaybackController {
    state: Arc<watch::Sender<PlaybackState>>,
    sink: Arc<dyn RenderSink>,
    runner: Arc<Mutex<Option<Runner>>>,
    seed: Option<u64>,
}

impl PlaybackController {
    pub fn new(sink: Arc<dyn RenderSink>) -> Self {
        let (state, _) = watch::channel(PlaybackState::new());
        Self {
            state: Arc::new(state),
            sink,
            runner: Arc::new(Mutex::new(None)),
            seed: None,
        }
    }

    /// Seed the altitude jitter so runs are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn get_state(&self) -> PlaybackState {
        self.state.borrow().clone()
    }

    pub async fn start_playback(&self, trips: Vec<Trip>) -> Result<PlaybackState> {
        if trips.is_empty() {
            bail!("no trips to play back");
        }

        // Held across the check and the spawn so two starts cannot interleave.
        let mut runner = self.runner.lock().await;
        if self.state.borrow().is_playing() {
            bail!("playback already active");
        }

        if let Some(previous) = runner.take() {
            self.join_runner(previous).await;
        }

        let session_id = Uuid::new_v4().to_string();
        let total = trips.len();
        self.state
            .send_modify(|state| state.begin(session_id.clone(), total, Utc::now()));

        self.sink.set_arcs(&[]);
        self.sink.set_markers(&[]);

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(playback_loop(
            trips,
            self.state.clone(),
            self.sink.clone(),
            cancel_token.clone(),
            rng,
        ));

        *runner = Some(Runner {
            handle,
            cancel_token,
        });

        log_info!("Playback {} started with {} trips", session_id, total);
        Ok(self.get_state())
    }

    /// Stop the active run. Does nothing when no run is active.
    pub async fn stop_playback(&self) -> Result<PlaybackState> {
        let runner = self.runner.lock().await.take();
        if let Some(runner) = runner {
            self.join_runner(runner).await;
        } else {
            log_warn!("Stop requested but no playback has been started");
        }
        Ok(self.get_state())
    }

    /// Resolve once the current run has finished or been cancelled.
    pub async fn wait(&self) -> PlaybackState {
        let mut updates = self.state.subscribe();
        let state = match updates.wait_for(|state| !state.is_playing()).await {
            Ok(state) => state.clone(),
            Err(_) => self.get_state(),
        };
        state
    }

    async fn join_runner(&self, runner: Runner) {
        runner.cancel_token.cancel();
        if let Err(err) = runner.handle.await {
            log_warn!("Playback task ended abnormally: {}", err);
            mark_cancelled(&self.state);
        }
    }
}

/// Move a run that is still marked as playing to `Cancelled`.
fn mark_cancelled(state: &watch::Sender<PlaybackState>) {
    state.send_if_modified(|state| {
        let was_playing = state.is_playing();
        state.cancel(Utc::now());
        was_playing
    });
}

/// Cancels the run on drop, so a panicking sink cannot leave the state
/// stuck at `Playing`.
struct PlayingGuard(Arc<watch::Sender<PlaybackState>>);

impl Drop for PlayingGuard {
    fn drop(&mut self) {
        mark_cancelled(&self.0);
    }
}

async fn playback_loop(
    trips: Vec<Trip>,
    state: Arc<watch::Sender<PlaybackState>>,
    sink: Arc<dyn RenderSink>,
    cancel_token: CancellationToken,
    mut rng: StdRng,
) {
    let _guard = PlayingGuard(state.clone());
    let mut trail = Trail::new();
    let total = trips.len();

    for (index, trip) in trips.iter().enumerate() {
        if cancel_token.is_cancelled() {
            break;
        }

        let frame = trail.advance(trip, &mut rng);
        state.send_modify(|state| state.enter_step(index));

        sink.show_trip_info(&frame.info);
        sink.move_camera(&frame.camera);
        sink.set_arcs(trail.arcs());
        if frame.new_markers > 0 {
            sink.set_markers(trail.markers());
        }

        log_debug!(
            "Step {}/{}: {} {} -> {}, altitude {:.2}, {} ms",
            index + 1,
            total,
            trip.mode,
            trip.start_city,
            trip.end_city,
            frame.camera.altitude,
            frame.camera.duration_ms
        );

        tokio::select! {
            _ = time::sleep(Duration::from_millis(frame.camera.duration_ms)) => {}
            _ = cancel_token.cancelled() => {}
        }
    }

    if cancel_token.is_cancelled() {
        let step = state.borrow().step;
        state.send_modify(|state| state.cancel(Utc::now()));
        log_info!("Playback cancelled at step {:?} of {}", step.map(|s| s + 1), total);
    } else {
        state.send_modify(|state| state.finish(Utc::now()));
        log_info!("Playback finished after {} trips", total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::TransportMode;
    use crate::geo::LatLng;
    use crate::playback::{MemorySink, PlaybackStatus};
    use chrono::DateTime;

    fn trips(count: usize) -> Vec<Trip> {
        let base = DateTime::parse_from_rfc3339("2025-04-01T08:00:00Z").unwrap();
        (0..count)
            .map(|i| {
                let offset = i as f64 * 3.0;
                Trip {
                    id: format!("trip-{i}"),
                    mode: TransportMode::InTrain,
                    start: LatLng::new(offset, offset),
                    end: LatLng::new(offset + 3.0, offset + 3.0),
                    start_time: base + chrono::Duration::days(i as i64),
                    end_time: base + chrono::Duration::days(i as i64) + chrono::Duration::hours(2),
                    distance_meters: 400_000.0,
                    probability: Some(0.8),
                    start_city: format!("City {i}"),
                    end_city: format!("City {}", i + 1),
                }
            })
            .collect()
    }

    fn controller() -> (PlaybackController, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let controller = PlaybackController::new(sink.clone()).with_seed(9);
        (controller, sink)
    }

    #[tokio::test(start_paused = true)]
    async fn plays_every_trip_then_finishes() {
        let (controller, sink) = controller();
        let started = controller.start_playback(trips(3)).await.unwrap();
        assert_eq!(started.status, PlaybackStatus::Playing);
        assert_eq!(started.total_steps, 3);

        let finished = controller.wait().await;
        assert_eq!(finished.status, PlaybackStatus::Finished);
        assert_eq!(finished.step, Some(2));

        let snapshot = sink.snapshot();
        assert_eq!(snapshot.arcs.len(), 3);
        assert_eq!(snapshot.markers.len(), 4);
        assert_eq!(snapshot.camera_moves.len(), 3);
        assert_eq!(snapshot.camera_moves[0].duration_ms, 500);
        assert_eq!(snapshot.trip_infos.len(), 3);
        // One clear at start plus one update per step.
        assert_eq!(snapshot.arc_updates, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_concurrent_start() {
        let (controller, _sink) = controller();
        controller.start_playback(trips(5)).await.unwrap();
        let err = controller.start_playback(trips(2)).await.unwrap_err();
        assert!(err.to_string().contains("already active"));
        controller.stop_playback().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_mid_sequence() {
        let (controller, sink) = controller();
        controller.start_playback(trips(10)).await.unwrap();

        // First transition is 500 ms, so at 600 ms the second trip is showing.
        time::sleep(Duration::from_millis(600)).await;
        let stopped = controller.stop_playback().await.unwrap();

        assert_eq!(stopped.status, PlaybackStatus::Cancelled);
        assert_eq!(stopped.step, Some(1));
        assert_eq!(sink.snapshot().arcs.len(), 2);

        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(sink.snapshot().arcs.len(), 2, "no updates after stop");
    }

    #[tokio::test(start_paused = true)]
    async fn can_restart_after_finishing() {
        let (controller, sink) = controller();
        controller.start_playback(trips(2)).await.unwrap();
        controller.wait().await;

        controller.start_playback(trips(1)).await.unwrap();
        let state = controller.wait().await;
        assert_eq!(state.status, PlaybackStatus::Finished);
        assert_eq!(sink.snapshot().arcs.len(), 1, "trail restarts empty");
    }

    struct PanickingSink;

    impl RenderSink for PanickingSink {
        fn set_arcs(&self, _arcs: &[crate::playback::ArcDatum]) {}
        fn set_markers(&self, _markers: &[crate::playback::CityMarker]) {}
        fn move_camera(&self, _camera: &crate::playback::CameraMove) {
            panic!("renderer went away");
        }
        fn show_trip_info(&self, _info: &crate::playback::TripInfo) {}
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_sink_ends_run_as_cancelled() {
        let controller = PlaybackController::new(Arc::new(PanickingSink)).with_seed(3);
        controller.start_playback(trips(3)).await.unwrap();

        let ended = controller.wait().await;
        assert_eq!(ended.status, PlaybackStatus::Cancelled);
        assert_eq!(ended.step, Some(0));

        let stopped = controller.stop_playback().await.unwrap();
        assert_eq!(stopped.status, PlaybackStatus::Cancelled);

        // The controller is usable again afterwards.
        let restarted = controller.start_playback(trips(1)).await.unwrap();
        assert_eq!(restarted.status, PlaybackStatus::Playing);
        assert_eq!(controller.wait().await.status, PlaybackStatus::Cancelled);
    }

    #[tokio::test]
    async fn empty_trip_list_is_rejected() {
        let (controller, _sink) = controller();
        assert!(controller.start_playback(Vec::new()).await.is_err());
        assert_eq!(controller.get_state().status, PlaybackStatus::Idle);
        assert_eq!(controller.stop_playback().await.unwrap().status, PlaybackStatus::Idle);
    }
}
