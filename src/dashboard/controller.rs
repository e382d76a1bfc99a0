use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use log::info;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{
    history::ChartHistory,
    insight::{CompanionError, InsightOutcome, InsightProvider, InsightRequest, InsightService},
    media::{voice::VOICE_MEMO_PROMPT, EncodedImage, MediaError, VoiceMemo},
    models::{ReadingSet, SensorFrame},
    sensing::{DriftSource, RandomDrift, SensingController},
};

use super::{DashboardEvents, DashboardSnapshot, InsightState};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Ties the sensing loop, the chart history and the insight text together
/// and pushes every change to the event sink. Cheap to clone.
pub struct DashboardController<P, E> {
    inner: Arc<Shared<P, E>>,
}

impl<P, E> Clone for DashboardController<P, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Shared<P, E> {
    service: InsightService<P>,
    events: E,
    history: ChartHistory,
    frames: watch::Receiver<SensorFrame>,
    sensing: Mutex<SensingController>,
    insight: Mutex<InsightSlot>,
    relay: Mutex<Option<Relay>>,
}

/// `latest` numbers the newest request; only its answer is applied.
struct InsightSlot {
    state: InsightState,
    latest: u64,
}

struct Relay {
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
}

impl<P: InsightProvider, E: DashboardEvents> DashboardController<P, E> {
    pub fn new(service: InsightService<P>, events: E) -> Self {
        Self::with_sensing(
            service,
            events,
            SensingController::new(ReadingSet::initial(Utc::now())),
            ChartHistory::seeded(&mut rand::thread_rng()),
        )
    }

    pub fn with_sensing(
        service: InsightService<P>,
        events: E,
        sensing: SensingController,
        history: ChartHistory,
    ) -> Self {
        let frames = sensing.subscribe();
        Self {
            inner: Arc::new(Shared {
                service,
                events,
                history,
                frames,
                sensing: Mutex::new(sensing),
                insight: Mutex::new(InsightSlot {
                    state: InsightState::default(),
                    latest: 0,
                }),
                relay: Mutex::new(None),
            }),
        }
    }

    pub fn service(&self) -> &InsightService<P> {
        &self.inner.service
    }

    pub fn history(&self) -> &ChartHistory {
        &self.inner.history
    }

    pub async fn is_running(&self) -> bool {
        self.inner.relay.lock().await.is_some()
    }

    pub async fn start(&self) -> Result<()> {
        self.start_with(Box::new(RandomDrift::from_entropy())).await
    }

    pub async fn start_with(&self, drift: Box<dyn DriftSource>) -> Result<()> {
        let mut relay = self.inner.relay.lock().await;
        if relay.is_some() {
            bail!("dashboard already running");
        }

        let frames = {
            let mut sensing = self.inner.sensing.lock().await;
            sensing.start_sensing(drift)?;
            sensing.subscribe()
        };

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(relay_frames(
            Arc::clone(&self.inner),
            frames,
            cancel_token.clone(),
        ));
        *relay = Some(Relay {
            handle,
            cancel_token,
        });

        info!("Dashboard started");
        Ok(())
    }

    /// No-op when not running. The relay is cancelled even when the sensing
    /// task fails to join.
    pub async fn stop(&self) -> Result<()> {
        let relay = self.inner.relay.lock().await.take();
        let Some(relay) = relay else {
            return Ok(());
        };

        let sensing_result = self.inner.sensing.lock().await.stop_sensing().await;

        relay.cancel_token.cancel();
        let relay_result = relay
            .handle
            .await
            .context("dashboard relay task failed to join");

        sensing_result?;
        relay_result?;
        info!("Dashboard stopped");
        Ok(())
    }

    pub fn subscribe(&self) -> watch::Receiver<SensorFrame> {
        self.inner.frames.clone()
    }

    pub fn current_frame(&self) -> SensorFrame {
        self.inner.frames.borrow().clone()
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.inner.snapshot_of(self.current_frame()).await
    }

    pub async fn insight(&self) -> InsightState {
        self.inner.insight.lock().await.state.clone()
    }

    /// Asks for fresh advice about the current frame, optionally with a leaf
    /// photo. The frame is captured now; later ticks don't affect the prompt.
    /// Returns the insight state after this request settles, which may hold
    /// a newer request's text if one overtook this one.
    pub async fn request_insight(&self, image: Option<EncodedImage>) -> InsightState {
        let request = InsightRequest::from_frame(&self.current_frame(), image);
        let generation = self.inner.begin_refresh().await;
        let outcome = self.inner.service.plant_insight(&request).await;
        self.inner.settle(generation, outcome).await
    }

    /// Soul-session message. The reply replaces the shared insight text.
    pub async fn companion_reply(&self, thought: &str) -> Result<InsightState, CompanionError> {
        if thought.trim().is_empty() {
            return Err(CompanionError::EmptyThought);
        }
        let generation = self.inner.begin_refresh().await;
        let outcome = self.inner.service.companion_reply(thought).await?;
        Ok(self.inner.settle(generation, outcome).await)
    }

    /// Records a memo off the async runtime, then answers it like a typed
    /// thought. Nothing is sent when the recording fails.
    pub async fn voice_memo(&self, memo: VoiceMemo) -> Result<InsightState, MediaError> {
        log_debug!("recording voice memo (up to {:?})", memo.max_length());
        let clip = tokio::task::spawn_blocking(move || memo.record())
            .await
            .map_err(|err| MediaError::Capture(format!("recording task failed: {err}")))?
            .map_err(|err| {
                log_warn!("voice memo not recorded: {err}");
                err
            })?;
        log_info!(
            "voice memo recorded ({:?}, {} bytes of {})",
            clip.duration,
            clip.decoded_len(),
            clip.mime_type
        );

        self.companion_reply(VOICE_MEMO_PROMPT)
            .await
            .map_err(|err| MediaError::Capture(err.to_string()))
    }
}

impl<P: InsightProvider, E: DashboardEvents> Shared<P, E> {
    async fn snapshot_of(&self, frame: SensorFrame) -> DashboardSnapshot {
        let history = self.history.points().await;
        let insight = self.insight.lock().await.state.clone();
        DashboardSnapshot::new(frame, history, insight)
    }

    async fn begin_refresh(&self) -> u64 {
        let mut slot = self.insight.lock().await;
        slot.latest += 1;
        slot.state.is_refreshing = true;
        self.events.insight_changed(&slot.state);
        slot.latest
    }

    async fn settle(&self, generation: u64, outcome: InsightOutcome) -> InsightState {
        let mut slot = self.insight.lock().await;
        if generation != slot.latest {
            log_debug!(
                "dropping insight #{} ({:?}); #{} is newer",
                generation,
                outcome.source,
                slot.latest
            );
            return slot.state.clone();
        }
        slot.state.settle(outcome, Utc::now());
        self.events.insight_changed(&slot.state);
        slot.state.clone()
    }
}

async fn relay_frames<P: InsightProvider, E: DashboardEvents>(
    shared: Arc<Shared<P, E>>,
    mut frames: watch::Receiver<SensorFrame>,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            changed = frames.changed() => {
                if changed.is_err() {
                    log_info!("frame publisher dropped; relay exiting");
                    break;
                }
                let frame = frames.borrow_and_update().clone();
                shared.history.record(&frame.readings).await;
                let snapshot = shared.snapshot_of(frame).await;
                shared.events.readings_changed(&snapshot);
            }
            _ = cancel_token.cancelled() => {
                log_debug!("relay cancelled");
                break;
            }
        }
    }
}
