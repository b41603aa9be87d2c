use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Playing,
    Finished,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    pub session_id: Option<String>,
    /// Index of the trip currently on screen.
    pub step: Option<usize>,
    pub total_steps: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl PlaybackState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    pub fn begin(&mut self, session_id: String, total_steps: usize, started_at: DateTime<Utc>) {
        *self = Self {
            status: PlaybackStatus::Playing,
            session_id: Some(session_id),
            step: None,
            total_steps,
            started_at: Some(started_at),
            ended_at: None,
        };
    }

    pub fn enter_step(&mut self, step: usize) {
        if self.is_playing() {
            self.step = Some(step);
        }
    }

    pub fn finish(&mut self, ended_at: DateTime<Utc>) {
        if self.is_playing() {
            self.status = PlaybackStatus::Finished;
            self.ended_at = Some(ended_at);
        }
    }

    pub fn cancel(&mut self, ended_at: DateTime<Utc>) {
        if self.is_playing() {
            self.status = PlaybackStatus::Cancelled;
            self.ended_at = Some(ended_at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle() {
        let now = Utc::now();
        let mut state = PlaybackState::new();
        assert_eq!(state.status, PlaybackStatus::Idle);

        state.enter_step(3);
        assert_eq!(state.step, None, "idle state ignores steps");

        state.begin("session".into(), 4, now);
        state.enter_step(0);
        state.enter_step(1);
        assert_eq!(state.step, Some(1));
        assert!(state.is_playing());

        state.finish(now);
        assert_eq!(state.status, PlaybackStatus::Finished);

        state.cancel(now);
        assert_eq!(state.status, PlaybackStatus::Finished, "finished runs stay finished");
    }
}
