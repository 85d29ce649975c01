//! Async frame loop driving a [`GestureEngine`].
//!
//! The loop owns the engine for its whole lifetime. Commands reach it through
//! an mpsc queue and are applied between frames; diagnostics leave through a
//! watch channel. Stopping drops any in-flight estimate and hands the engine
//! back to the caller.

use std::time::Duration;

use airdraw_core::DiagnosticsSnapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::engine::{EngineCommand, GestureEngine};
use crate::estimator::{HandEstimator, VideoSource};

/// Capacity of the command queue.
pub const COMMAND_CAPACITY: usize = 64;

/// Frame loop settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameLoopConfig {
    /// Frames per second to pull from the video source.
    pub target_fps: u32,
}

impl Default for FrameLoopConfig {
    fn default() -> Self {
        Self { target_fps: 30 }
    }
}

impl FrameLoopConfig {
    /// Time between frames.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.target_fps.max(1)))
    }
}

/// Errors from the frame loop handle.
#[derive(Debug, Error)]
pub enum LoopError {
    /// The loop has exited.
    #[error("Frame loop is not running")]
    NotRunning,

    /// The command queue is full.
    #[error("Command queue is full")]
    QueueFull,

    /// The loop task panicked or was cancelled.
    #[error("Frame loop task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Handle to a running frame loop.
#[derive(Debug)]
pub struct FrameLoopHandle {
    commands: mpsc::Sender<EngineCommand>,
    diagnostics: watch::Receiver<Option<DiagnosticsSnapshot>>,
    exit: watch::Receiver<bool>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<GestureEngine>,
}

impl FrameLoopHandle {
    /// Queue a command for the next frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop has exited or the queue is full.
    pub fn send(&self, command: EngineCommand) -> Result<(), LoopError> {
        self.commands.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => LoopError::QueueFull,
            TrySendError::Closed(_) => LoopError::NotRunning,
        })
    }

    /// Latest published diagnostics.
    #[must_use]
    pub fn diagnostics(&self) -> Option<DiagnosticsSnapshot> {
        self.diagnostics.borrow().clone()
    }

    /// A receiver that outlives the handle.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<DiagnosticsSnapshot>> {
        self.diagnostics.clone()
    }

    /// Whether the back control has been activated.
    #[must_use]
    pub fn exit_requested(&self) -> bool {
        *self.exit.borrow()
    }

    /// A receiver for the back-control signal that outlives the handle.
    #[must_use]
    pub fn exit_signal(&self) -> watch::Receiver<bool> {
        self.exit.clone()
    }

    /// Whether the loop task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal shutdown and wait for the loop to hand the engine back.
    ///
    /// # Errors
    ///
    /// Returns an error if the loop task failed.
    pub async fn stop(mut self) -> Result<GestureEngine, LoopError> {
        if let Some(tx) = self.shutdown.take() {
            // The loop may already have exited on its own.
            let _ = tx.send(());
        }
        Ok(self.task.await?)
    }

    /// Wait for the loop to exit on its own (source exhausted).
    ///
    /// # Errors
    ///
    /// Returns an error if the loop task failed.
    pub async fn join(self) -> Result<GestureEngine, LoopError> {
        let Self { shutdown, task, .. } = self;
        let result = task.await;
        drop(shutdown);
        Ok(result?)
    }
}

/// Scheduler that pulls frames at a fixed rate and feeds the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameLoop {
    config: FrameLoopConfig,
}

impl FrameLoop {
    /// Create a scheduler.
    #[must_use]
    pub const fn new(config: FrameLoopConfig) -> Self {
        Self { config }
    }

    /// Scheduler settings.
    #[must_use]
    pub const fn config(&self) -> &FrameLoopConfig {
        &self.config
    }

    /// Spawn the loop on the current tokio runtime.
    ///
    /// Dropping the returned handle shuts the loop down.
    #[must_use = "dropping the handle stops the loop"]
    pub fn start<E, S>(self, engine: GestureEngine, estimator: E, source: S) -> FrameLoopHandle
    where
        E: HandEstimator + 'static,
        S: VideoSource + 'static,
    {
        spawn(engine, estimator, source, self.config)
    }
}

fn spawn<E, S>(
    engine: GestureEngine,
    estimator: E,
    source: S,
    config: FrameLoopConfig,
) -> FrameLoopHandle
where
    E: HandEstimator + 'static,
    S: VideoSource + 'static,
{
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
    let (command_tx, mut command_rx) = mpsc::channel(COMMAND_CAPACITY);
    let (diagnostics_tx, diagnostics_rx) = watch::channel(None);
    let (exit_tx, exit_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut engine = engine;
        let mut estimator = estimator;
        let mut source = source;

        let mut ticker = tokio::time::interval(config.frame_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!("Frame loop started at {} fps", config.target_fps);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown_rx => {
                    tracing::info!("Frame loop received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {}
            }

            while let Ok(command) = command_rx.try_recv() {
                engine.handle(command);
            }

            let next = tokio::select! {
                biased;
                _ = &mut shutdown_rx => {
                    tracing::info!("Frame loop shutdown while waiting for video");
                    break;
                }
                result = source.next_frame() => result,
            };
            let frame = match next {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    tracing::info!("Video source exhausted");
                    break;
                }
                Err(e) => {
                    if let Some(snapshot) = engine.report_camera_error(&e) {
                        diagnostics_tx.send_replace(Some(snapshot));
                    }
                    continue;
                }
            };

            let prepared = engine.prepare_frame(&frame);
            let estimate = tokio::select! {
                biased;
                _ = &mut shutdown_rx => {
                    tracing::info!("Frame loop shutdown, dropping in-flight estimate");
                    break;
                }
                result = estimator.estimate(&prepared) => result,
            };

            match engine.process_frame(frame.width(), frame.height(), estimate) {
                Ok(report) => {
                    if let Some(snapshot) = report.diagnostics {
                        diagnostics_tx.send_replace(Some(snapshot));
                    }
                    if report.exit_requested {
                        exit_tx.send_replace(true);
                    }
                }
                Err(e) => tracing::error!("Frame {} failed: {}", engine.frames(), e),
            }
        }

        estimator.close().await;
        engine.mark_stopped();
        let status = engine.status().clone();
        diagnostics_tx.send_modify(|latest| {
            if let Some(snapshot) = latest {
                snapshot.status = status;
            }
        });
        tracing::info!("Frame loop stopped after {} frames", engine.frames());
        engine
    });

    FrameLoopHandle {
        commands: command_tx,
        diagnostics: diagnostics_rx,
        exit: exit_rx,
        shutdown: Some(shutdown_tx),
        task,
    }
}
