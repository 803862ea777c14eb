//! Pick-and-verify station.
//!
//! This crate ties the scan pipeline together: keystrokes and decoded device
//! scans enter one serialized event channel, the station task turns them into
//! codes and drives the [`StateMachine`], and every accepted transition is
//! published as a [`FeedbackSignal`].
//!
//! # Modules
//!
//! - [`config`]: TOML configuration with defaults and validation
//! - [`feedback`]: visual themes, audio cues and the completion notice
//! - [`state_machine`]: the five-state verification workflow
//! - [`station`]: the dispatcher task and its handle

pub mod config;
pub mod feedback;
pub mod state_machine;
pub mod station;

pub use config::StationConfig;
pub use feedback::{AudioCue, COMPLETION_MESSAGE, FeedbackSignal, VisualTheme};
pub use state_machine::{
    ExpectedCodes, StateMachine, StateMachineBuilder, StateTransition, WorkflowState,
};
pub use station::{Station, StationEvent, StationHandle};
