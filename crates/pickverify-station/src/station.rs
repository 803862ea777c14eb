//! Station dispatcher.
//!
//! All input funnels through one channel into one task that owns the scan
//! buffer and the state machine, so scan evaluations never race and every
//! buffer mutation (append, finalize, idle reset, escape) happens on that
//! task.
//!
//! ```text
//! ┌────────────┐
//! │ Keystrokes │──┐
//! └────────────┘  │      ┌─────────────┐      ┌──────────────┐  broadcast  ┌───────────┐
//! ┌────────────┐  ├─────►│ input (mpsc)│─────►│ Station Task │────────────►│ Feedback  │
//! │  Scanner   │──┤      └─────────────┘      │ buffer+state │             │ observers │
//! └────────────┘  │                           └──────────────┘             └───────────┘
//! ┌────────────┐  │                             ▲       │ watch
//! │ Operator UI│──┘              idle deadline ─┘       └──────► current state
//! └────────────┘
//! ```
//!
//! # Lifecycle
//!
//! Construction and start are separate: [`Station::new`] builds the
//! channels, [`Station::handle`] hands out senders (for the device session,
//! for instance) and [`Station::start`] spawns the task.
//!
//! # Examples
//!
//! ```
//! use pickverify_station::{Station, StationConfig, WorkflowState};
//!
//! #[tokio::main]
//! async fn main() -> pickverify_core::Result<()> {
//!     let (handle, task) = Station::new(&StationConfig::default()).start();
//!     let mut feedback = handle.subscribe();
//!
//!     handle.type_scan("5QCPCM0QW").await?;
//!     let signal = feedback.recv().await.unwrap();
//!     assert_eq!(signal.state, WorkflowState::Success);
//!
//!     handle.shutdown().await?;
//!     task.await.unwrap();
//!     Ok(())
//! }
//! ```

use pickverify_core::constants::TERMINATOR;
use pickverify_core::{Error, Result, ScanSource};
use pickverify_hardware::DecodedScan;
use pickverify_scan::{KeyEvent, PushOutcome, ScanBuffer, extract, strip_terminator};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::StationConfig;
use crate::feedback::FeedbackSignal;
use crate::state_machine::{StateMachine, WorkflowState};

/// Input to the station task.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StationEvent {
    /// One key-down event.
    Key(KeyEvent),

    /// A complete plain-digit scan decoded by the device.
    DeviceScan(String),

    /// The operator dismissed the completion notice.
    AcknowledgeCompletion,

    /// Stop the station task.
    Shutdown,
}

impl From<KeyEvent> for StationEvent {
    fn from(key: KeyEvent) -> Self {
        StationEvent::Key(key)
    }
}

impl From<DecodedScan> for StationEvent {
    fn from(scan: DecodedScan) -> Self {
        StationEvent::DeviceScan(scan.text)
    }
}

/// Cloneable handle to a station.
#[derive(Debug, Clone)]
pub struct StationHandle {
    event_tx: mpsc::Sender<StationEvent>,
    feedback_tx: broadcast::Sender<FeedbackSignal>,
    state_rx: watch::Receiver<WorkflowState>,
}

impl StationHandle {
    /// Send one event to the station.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StationStopped`] if the station task has exited.
    pub async fn send(&self, event: StationEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| Error::StationStopped)
    }

    /// Send one key-down event.
    pub async fn key(&self, key: KeyEvent) -> Result<()> {
        self.send(StationEvent::Key(key)).await
    }

    /// Type `text` followed by the terminator, as a wedge scanner would.
    pub async fn type_scan(&self, text: &str) -> Result<()> {
        for ch in text.chars().chain(std::iter::once(TERMINATOR)) {
            self.key(KeyEvent::Char(ch)).await?;
        }
        Ok(())
    }

    /// Press Escape.
    pub async fn escape(&self) -> Result<()> {
        self.key(KeyEvent::Escape).await
    }

    /// Dismiss the completion notice.
    pub async fn acknowledge_completion(&self) -> Result<()> {
        self.send(StationEvent::AcknowledgeCompletion).await
    }

    /// Ask the station task to stop.
    pub async fn shutdown(&self) -> Result<()> {
        self.send(StationEvent::Shutdown).await
    }

    /// Raw sender for producers such as the device session.
    pub fn sender(&self) -> mpsc::Sender<StationEvent> {
        self.event_tx.clone()
    }

    /// Subscribe to feedback signals published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<FeedbackSignal> {
        self.feedback_tx.subscribe()
    }

    /// Current workflow state.
    pub fn state(&self) -> WorkflowState {
        *self.state_rx.borrow()
    }

    /// Watch workflow state changes.
    pub fn watch_state(&self) -> watch::Receiver<WorkflowState> {
        self.state_rx.clone()
    }

    /// Returns `true` once the station task has exited.
    pub fn is_stopped(&self) -> bool {
        self.event_tx.is_closed()
    }
}

/// The pick-and-verify station.
#[derive(Debug)]
pub struct Station {
    task: StationTask,
    handle: StationHandle,
}

/// State owned by the running station task. Holds no event sender, so the
/// input channel closes once every [`StationHandle`] is dropped.
#[derive(Debug)]
struct StationTask {
    buffer: ScanBuffer,
    machine: StateMachine,
    event_rx: mpsc::Receiver<StationEvent>,
    state_tx: watch::Sender<WorkflowState>,
    feedback_tx: broadcast::Sender<FeedbackSignal>,
}

impl Station {
    /// Build a station from configuration. Nothing runs until [`start`](Self::start).
    pub fn new(config: &StationConfig) -> Self {
        let machine = StateMachine::builder()
            .with_codes(config.expected_codes())
            .build();
        Self::with_state_machine(config, machine)
    }

    /// Build a station around an existing state machine.
    pub fn with_state_machine(config: &StationConfig, machine: StateMachine) -> Self {
        let (event_tx, event_rx) = mpsc::channel(config.station.event_capacity);
        let (feedback_tx, _) = broadcast::channel(config.station.feedback_capacity);
        let (state_tx, state_rx) = watch::channel(machine.current_state());

        Self {
            task: StationTask {
                buffer: ScanBuffer::new(config.idle_timeout()),
                machine,
                event_rx,
                state_tx,
                feedback_tx: feedback_tx.clone(),
            },
            handle: StationHandle {
                event_tx,
                feedback_tx,
                state_rx,
            },
        }
    }

    /// Handle to the station, usable before it is started.
    pub fn handle(&self) -> StationHandle {
        self.handle.clone()
    }

    /// Spawn the station task.
    ///
    /// The task runs until [`StationHandle::shutdown`] or until every
    /// handle is dropped, and returns the state machine it owned.
    pub fn start(self) -> (StationHandle, JoinHandle<StateMachine>) {
        let task = tokio::spawn(self.task.run());
        (self.handle, task)
    }
}

impl StationTask {
    async fn run(mut self) -> StateMachine {
        info!(state = %self.machine.current_state(), "station started");

        loop {
            let deadline = self.buffer.deadline();

            tokio::select! {
                event = self.event_rx.recv() => match event {
                    Some(StationEvent::Shutdown) => break,
                    Some(event) => self.handle_event(event),
                    None => {
                        debug!("all station handles dropped");
                        break;
                    }
                },
                _ = idle(deadline) => {
                    self.buffer.on_idle_timeout();
                }
            }
        }

        info!(state = %self.machine.current_state(), "station stopped");
        self.machine
    }

    fn handle_event(&mut self, event: StationEvent) {
        match event {
            StationEvent::Key(key) if key.is_escape() => {
                let discarded = self.buffer.len();
                self.buffer.reset();
                debug!(discarded, "escape pressed");
                let signal = self.machine.reset();
                self.publish(signal);
            }
            StationEvent::Key(key) => {
                let Some(ch) = key.to_char() else {
                    return;
                };
                if let PushOutcome::Finalized(raw) = self.buffer.push(ch) {
                    self.evaluate(&raw, ScanSource::Keyboard);
                }
            }
            StationEvent::DeviceScan(text) => {
                self.evaluate(strip_terminator(&text), ScanSource::Device);
            }
            StationEvent::AcknowledgeCompletion => {
                if let Some(signal) = self.machine.acknowledge_completion() {
                    self.publish(signal);
                }
            }
            StationEvent::Shutdown => {}
        }
    }

    fn evaluate(&mut self, raw: &str, source: ScanSource) {
        let code = extract(raw);
        debug!(%source, raw = %raw.escape_debug(), code = ?code, "scan evaluated");

        if let Some(signal) = self.machine.accept(code.as_ref()) {
            self.publish(signal);
        }
    }

    fn publish(&self, signal: FeedbackSignal) {
        self.state_tx.send_replace(signal.state);
        // No subscribers is not an error
        let _ = self.feedback_tx.send(signal);
    }
}

/// Resolve at `deadline`, or never when no scan is in progress.
async fn idle(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
