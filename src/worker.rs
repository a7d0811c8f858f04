//! Engine worker thread.
//!
//! Runs a [`PoseEngine`] on its own thread. Control messages and pose messages
//! travel on separate channels; pending control messages are always applied
//! before the next pose is processed. Results are not queued: each processed
//! frame overwrites a single latest-result slot.

use crate::engine::PoseEngine;
use crate::protocol::{FrameResult, InboundMessage, PosePayload};
use crate::{Error, Result};
use crossbeam_channel::{select, unbounded, Receiver, Sender};
use log::{debug, info};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

/// Messages that pre-empt pending poses
#[derive(Debug, Clone, PartialEq)]
pub enum ControlMessage {
    SetExercise(String),
    Restart,
}

/// Handle to a running engine thread
pub struct EngineWorker {
    control_tx: Option<Sender<ControlMessage>>,
    pose_tx: Option<Sender<PosePayload>>,
    latest: Arc<Mutex<Option<FrameResult>>>,
    processed: Arc<AtomicU64>,
    worker_thread: Option<thread::JoinHandle<()>>,
}

impl EngineWorker {
    /// Move `engine` onto a new thread and start consuming messages
    pub fn start(engine: PoseEngine) -> Result<Self> {
        let (control_tx, control_rx) = unbounded();
        let (pose_tx, pose_rx) = unbounded();
        let latest = Arc::new(Mutex::new(None));
        let processed = Arc::new(AtomicU64::new(0));

        let latest_clone = Arc::clone(&latest);
        let processed_clone = Arc::clone(&processed);
        let worker_thread = thread::Builder::new()
            .name("pose-engine".to_string())
            .spawn(move || {
                Self::run(engine, &control_rx, &pose_rx, &latest_clone, &processed_clone);
            })?;

        info!("Engine worker started");

        Ok(Self {
            control_tx: Some(control_tx),
            pose_tx: Some(pose_tx),
            latest,
            processed,
            worker_thread: Some(worker_thread),
        })
    }

    /// Route an inbound protocol message to the worker
    pub fn send(&self, message: InboundMessage) -> Result<()> {
        match message {
            InboundMessage::Pose(payload) => self.submit_pose(payload),
            InboundMessage::SetExercise(payload) => self.control(ControlMessage::SetExercise(payload.exercise_id)),
        }
    }

    pub fn submit_pose(&self, payload: PosePayload) -> Result<()> {
        self.pose_tx
            .as_ref()
            .ok_or_else(|| Error::WorkerError("worker is shut down".to_string()))?
            .send(payload)
            .map_err(|_| Error::WorkerError("pose channel closed".to_string()))
    }

    pub fn control(&self, message: ControlMessage) -> Result<()> {
        self.control_tx
            .as_ref()
            .ok_or_else(|| Error::WorkerError("worker is shut down".to_string()))?
            .send(message)
            .map_err(|_| Error::WorkerError("control channel closed".to_string()))
    }

    /// Most recently produced result, if any
    #[must_use]
    pub fn latest(&self) -> Option<FrameResult> {
        self.latest.lock().clone()
    }

    /// Number of pose messages processed so far
    #[must_use]
    pub fn frames_processed(&self) -> u64 {
        self.processed.load(Ordering::Acquire)
    }

    /// Process everything already sent, stop the thread, and return the final result
    pub fn shutdown(mut self) -> Result<Option<FrameResult>> {
        self.stop()?;
        Ok(self.latest.lock().take())
    }

    fn stop(&mut self) -> Result<()> {
        self.control_tx.take();
        self.pose_tx.take();

        if let Some(handle) = self.worker_thread.take() {
            handle
                .join()
                .map_err(|_| Error::WorkerError("engine thread panicked".to_string()))?;
            info!("Engine worker stopped");
        }
        Ok(())
    }

    fn run(
        mut engine: PoseEngine,
        control_rx: &Receiver<ControlMessage>,
        pose_rx: &Receiver<PosePayload>,
        latest: &Mutex<Option<FrameResult>>,
        processed: &AtomicU64,
    ) {
        let process = |engine: &mut PoseEngine, payload: PosePayload| {
            let result = engine.process_pose(&payload.pose_frame, payload.timestamp);
            *latest.lock() = Some(result);
            processed.fetch_add(1, Ordering::Release);
        };

        loop {
            Self::drain_control(&mut engine, control_rx);

            select! {
                recv(control_rx) -> message => match message {
                    Ok(message) => Self::apply_control(&mut engine, message),
                    Err(_) => {
                        // No more control traffic; finish the remaining poses.
                        for payload in pose_rx.iter() {
                            process(&mut engine, payload);
                        }
                        return;
                    }
                },
                recv(pose_rx) -> payload => match payload {
                    Ok(payload) => {
                        Self::drain_control(&mut engine, control_rx);
                        process(&mut engine, payload);
                    }
                    Err(_) => return,
                },
            }
        }
    }

    fn drain_control(engine: &mut PoseEngine, control_rx: &Receiver<ControlMessage>) {
        while let Ok(message) = control_rx.try_recv() {
            Self::apply_control(engine, message);
        }
    }

    fn apply_control(engine: &mut PoseEngine, message: ControlMessage) {
        debug!("Worker control message: {message:?}");
        match message {
            ControlMessage::SetExercise(id) => {
                engine.set_exercise(&id);
            }
            ControlMessage::Restart => engine.restart(),
        }
    }
}

impl Drop for EngineWorker {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
