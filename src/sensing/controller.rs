use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::models::{ReadingSet, SensorFrame};

use super::loop_worker::{sensing_loop, SIMULATION_PERIOD};
use super::simulator::DriftSource;

/// Starts and stops the simulation task and hands out receivers for the
/// frames it publishes. The task is the only writer.
pub struct SensingController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
    frames_tx: watch::Sender<SensorFrame>,
    period: Duration,
}

impl SensingController {
    pub fn new(initial: ReadingSet) -> Self {
        Self::with_period(initial, SIMULATION_PERIOD)
    }

    pub(crate) fn with_period(initial: ReadingSet, period: Duration) -> Self {
        let (frames_tx, _) = watch::channel(SensorFrame::new(initial, 0));
        Self {
            handle: None,
            cancel_token: None,
            frames_tx,
            period,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SensorFrame> {
        self.frames_tx.subscribe()
    }

    /// Latest published frame, cloned out of the channel.
    pub fn current(&self) -> SensorFrame {
        self.frames_tx.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Resumes from whatever frame was last published.
    pub fn start_sensing(&mut self, drift: Box<dyn DriftSource>) -> Result<()> {
        if self.handle.is_some() {
            bail!("sensing already active");
        }

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        let initial = self.current();
        info!(
            "Starting sensing loop at tick {} every {:?}",
            initial.tick, self.period
        );

        let handle = tokio::spawn(sensing_loop(
            initial,
            drift,
            self.period,
            self.frames_tx.clone(),
            token_clone,
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop_sensing(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("sensing loop task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensing::simulator::testing::ScriptedDrift;
    use crate::sensing::simulator::SOIL_DECAY_PER_TICK;
    use chrono::Utc;

    #[tokio::test(start_paused = true)]
    async fn publishes_one_frame_per_period() {
        let mut controller = SensingController::new(ReadingSet::initial(Utc::now()));
        let mut rx = controller.subscribe();
        assert_eq!(rx.borrow_and_update().tick, 0);

        controller
            .start_sensing(Box::new(ScriptedDrift::new([])))
            .unwrap();

        // Nothing moves before the first full period.
        tokio::time::sleep(SIMULATION_PERIOD / 2).await;
        assert!(!rx.has_changed().unwrap());

        rx.changed().await.unwrap();
        let frame = rx.borrow_and_update().clone();
        assert_eq!(frame.tick, 1);
        assert!((frame.readings.soil_moisture - (65.0 - SOIL_DECAY_PER_TICK)).abs() < 1e-9);

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().tick, 2);

        controller.stop_sensing().await.unwrap();
        assert!(!controller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_is_rejected() {
        let mut controller = SensingController::new(ReadingSet::initial(Utc::now()));
        controller
            .start_sensing(Box::new(ScriptedDrift::new([])))
            .unwrap();
        assert!(controller
            .start_sensing(Box::new(ScriptedDrift::new([])))
            .is_err());
        controller.stop_sensing().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_without_start_is_a_no_op() {
        let mut controller = SensingController::new(ReadingSet::initial(Utc::now()));
        controller.stop_sensing().await.unwrap();
        assert_eq!(controller.current().tick, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_resumes_from_last_frame() {
        let mut controller = SensingController::new(ReadingSet::initial(Utc::now()));
        let mut rx = controller.subscribe();

        controller
            .start_sensing(Box::new(ScriptedDrift::new([])))
            .unwrap();
        rx.changed().await.unwrap();
        controller.stop_sensing().await.unwrap();
        let stopped_at = controller.current().tick;
        assert!(stopped_at >= 1);

        controller
            .start_sensing(Box::new(ScriptedDrift::new([])))
            .unwrap();
        rx.borrow_and_update();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().tick, stopped_at + 1);
        controller.stop_sensing().await.unwrap();
    }
}
