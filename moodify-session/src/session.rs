//! Mood session controller
//!
//! One task owns all session state and multiplexes three inputs: sampling
//! ticks, user commands, and completions of in-flight recommendation
//! fetches. Fetches overlap freely and are never cancelled; a completion is
//! applied only if its token is still the latest firing.

use chrono::Utc;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use moodify_common::events::{EventBus, MoodEvent};
use moodify_common::{Emotion, EmotionSample, Result, TrackResult};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::board::{BoardState, PreviewChange, PreviewError, ResultBoard};
use crate::fetcher::{FetchError, RecommendationFetcher};
use crate::sampler::FrameSampler;
use crate::schedule::Ticker;
use crate::tracker::{StabilityConfig, StabilityTracker};
use crate::trigger::{FiringToken, RecommendationRequest, RecommendationTrigger, TriggerError};

const COMMAND_BUFFER: usize = 32;

type FetchOutcome = (RecommendationRequest, std::result::Result<Vec<TrackResult>, FetchError>);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session has stopped")]
    Stopped,

    #[error(transparent)]
    Trigger(#[from] TriggerError),

    #[error(transparent)]
    Preview(#[from] PreviewError),
}

/// Point-in-time view of the session
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub classifier_ready: bool,
    pub stable_mood: Option<Emotion>,
    pub last_sample: Option<EmotionSample>,
    pub latest_token: Option<FiringToken>,
    pub board: BoardState,
    pub now_playing: Option<String>,
}

enum SessionCommand {
    Refresh(oneshot::Sender<std::result::Result<FiringToken, TriggerError>>),
    TogglePreview {
        track_id: String,
        reply: oneshot::Sender<std::result::Result<PreviewChange, PreviewError>>,
    },
    PreviewEnded(String),
    Snapshot(oneshot::Sender<SessionSnapshot>),
}

/// Cloneable control surface for a running session
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    cancel: CancellationToken,
}

impl SessionHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> std::result::Result<T, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(build(tx))
            .await
            .map_err(|_| SessionError::Stopped)?;
        rx.await.map_err(|_| SessionError::Stopped)
    }

    /// Ask for fresh recommendations now
    ///
    /// Returns the firing token, or [`TriggerError::NoMoodDetected`] when no
    /// mood has been seen yet.
    pub async fn refresh(&self) -> std::result::Result<FiringToken, SessionError> {
        Ok(self.request(SessionCommand::Refresh).await??)
    }

    pub async fn toggle_preview(
        &self,
        track_id: impl Into<String>,
    ) -> std::result::Result<PreviewChange, SessionError> {
        let track_id = track_id.into();
        Ok(self
            .request(|reply| SessionCommand::TogglePreview { track_id, reply })
            .await??)
    }

    pub async fn preview_ended(&self, track_id: impl Into<String>) -> std::result::Result<(), SessionError> {
        self.commands
            .send(SessionCommand::PreviewEnded(track_id.into()))
            .await
            .map_err(|_| SessionError::Stopped)
    }

    pub async fn snapshot(&self) -> std::result::Result<SessionSnapshot, SessionError> {
        self.request(SessionCommand::Snapshot).await
    }

    /// Stop the sampling loop; in-flight fetches are dropped
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

pub struct MoodSession {
    id: Uuid,
    sampler: FrameSampler,
    tracker: StabilityTracker,
    trigger: RecommendationTrigger,
    board: ResultBoard,
    fetcher: Arc<dyn RecommendationFetcher>,
    events: EventBus,
    classifier_ready: bool,
}

impl MoodSession {
    pub fn new(
        stability: StabilityConfig,
        sampler: FrameSampler,
        fetcher: Arc<dyn RecommendationFetcher>,
        events: EventBus,
    ) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            sampler,
            tracker: StabilityTracker::new(stability)?,
            trigger: RecommendationTrigger::new(),
            board: ResultBoard::new(),
            fetcher,
            events,
            classifier_ready: false,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Spawn the session loop on the current runtime
    pub fn start<T: Ticker + 'static>(self, ticker: T) -> (SessionHandle, JoinHandle<SessionSnapshot>) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let cancel = CancellationToken::new();
        let handle = SessionHandle {
            commands: tx,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(self.run(ticker, rx, cancel));
        (handle, task)
    }

    async fn run<T: Ticker>(
        mut self,
        mut ticker: T,
        mut commands: mpsc::Receiver<SessionCommand>,
        cancel: CancellationToken,
    ) -> SessionSnapshot {
        tracing::info!(session_id = %self.id, "Mood session started");
        let mut in_flight: FuturesUnordered<BoxFuture<'static, FetchOutcome>> = FuturesUnordered::new();
        let mut commands_open = true;

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tracing::info!(session_id = %self.id, "Mood session cancelled");
                    break;
                }

                Some((request, result)) = in_flight.next(), if !in_flight.is_empty() => {
                    self.on_fetch_complete(request, result);
                }

                command = commands.recv(), if commands_open => match command {
                    Some(command) => {
                        if let Some(request) = self.on_command(command) {
                            in_flight.push(self.dispatch(request));
                        }
                    }
                    None => commands_open = false,
                },

                ticked = ticker.tick() => {
                    if !ticked {
                        tracing::info!(session_id = %self.id, "Sampling schedule ended");
                        break;
                    }
                    if let Some(request) = self.on_tick().await {
                        in_flight.push(self.dispatch(request));
                    }
                }
            }
        }

        if !in_flight.is_empty() {
            tracing::debug!(pending = in_flight.len(), "Dropping in-flight fetches");
        }
        self.events.emit_lossy(MoodEvent::SessionStopped {
            timestamp: Utc::now(),
        });
        self.snapshot()
    }

    async fn on_tick(&mut self) -> Option<RecommendationRequest> {
        let ready = self.sampler.classifier_ready();
        if ready != self.classifier_ready {
            self.classifier_ready = ready;
            if ready {
                tracing::info!(session_id = %self.id, "Face detection ready");
            }
        }

        let sample = self.sampler.sample().await;
        if let Some(sample) = &sample {
            tracing::debug!(emotion = %sample.label, confidence = sample.confidence, "Mood sampled");
            self.events.emit_lossy(MoodEvent::MoodSampled {
                emotion: sample.label,
                confidence: sample.confidence,
                timestamp: sample.observed_at,
            });
        }

        let transition = self.tracker.observe(sample)?;
        self.events.emit_lossy(MoodEvent::StableMoodChanged {
            from: transition.from,
            to: transition.to,
            timestamp: Utc::now(),
        });
        Some(self.trigger.on_transition(&transition))
    }

    fn on_command(&mut self, command: SessionCommand) -> Option<RecommendationRequest> {
        match command {
            SessionCommand::Refresh(reply) => match self.trigger.refresh(&self.tracker) {
                Ok(request) => {
                    tracing::info!(emotion = %request.emotion, "Refreshing recommendations");
                    let _ = reply.send(Ok(request.token));
                    Some(request)
                }
                Err(e) => {
                    tracing::info!("Refresh requested with no mood detected");
                    self.board.show_no_mood();
                    self.events.emit_lossy(MoodEvent::NoMoodDetected {
                        timestamp: Utc::now(),
                    });
                    let _ = reply.send(Err(e));
                    None
                }
            },
            SessionCommand::TogglePreview { track_id, reply } => {
                let result = self.board.toggle_preview(&track_id);
                if let Err(e) = &result {
                    tracing::debug!(track_id = %track_id, "Preview toggle rejected: {}", e);
                }
                let _ = reply.send(result);
                None
            }
            SessionCommand::PreviewEnded(track_id) => {
                self.board.preview_ended(&track_id);
                None
            }
            SessionCommand::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
                None
            }
        }
    }

    /// Show the loading state and start the fetch
    fn dispatch(&mut self, request: RecommendationRequest) -> BoxFuture<'static, FetchOutcome> {
        self.board.show_loading(request.token, request.emotion);
        self.events.emit_lossy(MoodEvent::RecommendationsRequested {
            token: request.token.value(),
            emotion: request.emotion,
            reason: request.reason,
            timestamp: Utc::now(),
        });

        let fetcher = Arc::clone(&self.fetcher);
        async move {
            let result = fetcher.fetch(request.emotion).await;
            (request, result)
        }
        .boxed()
    }

    fn on_fetch_complete(
        &mut self,
        request: RecommendationRequest,
        result: std::result::Result<Vec<TrackResult>, FetchError>,
    ) {
        let RecommendationRequest { emotion, token, .. } = request;

        if !self.trigger.is_latest(token) {
            let latest = self.trigger.latest().map(FiringToken::value).unwrap_or_default();
            tracing::debug!(token = %token, latest, emotion = %emotion, "Discarding stale recommendations");
            self.events.emit_lossy(MoodEvent::StaleResponseDiscarded {
                token: token.value(),
                latest_token: latest,
                emotion,
                timestamp: Utc::now(),
            });
            return;
        }

        let timestamp = Utc::now();
        match result {
            Ok(tracks) if tracks.is_empty() => {
                tracing::info!(emotion = %emotion, "No recommendations found");
                self.board.show_tracks(token, emotion, tracks);
                self.events.emit_lossy(MoodEvent::RecommendationsEmpty {
                    token: token.value(),
                    emotion,
                    timestamp,
                });
            }
            Ok(tracks) => {
                let track_count = tracks.len();
                tracing::info!(emotion = %emotion, track_count, "Recommendations applied");
                self.board.show_tracks(token, emotion, tracks);
                self.events.emit_lossy(MoodEvent::RecommendationsApplied {
                    token: token.value(),
                    emotion,
                    track_count,
                    timestamp,
                });
            }
            Err(FetchError::Unavailable(message)) => {
                tracing::warn!(emotion = %emotion, "Recommendations unavailable: {}", message);
                self.board.show_unavailable(token, emotion, message.clone());
                self.events.emit_lossy(MoodEvent::RecommendationsUnavailable {
                    token: token.value(),
                    emotion,
                    message,
                    timestamp,
                });
            }
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            classifier_ready: self.classifier_ready,
            stable_mood: self.tracker.stable_mood(),
            last_sample: self.tracker.last_sample().cloned(),
            latest_token: self.trigger.latest(),
            board: self.board.state().clone(),
            now_playing: self.board.now_playing().map(str::to_string),
        }
    }
}
