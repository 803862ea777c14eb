//! Pick verification state machine.
//!
//! The machine evaluates extracted codes against the two expected codes of
//! the workflow and returns the feedback for every accepted transition.
//!
//! # States
//!
//! ```text
//!            identity                        box label
//!   ┌─────┐ ────────► ┌─────────┐ ──────────────────────► ┌───────────┐
//!   │ New │           │ Success │                          │ Completed │
//!   └─────┘           └─────────┘                          └───────────┘
//!      │                 ▲    │ other                         ▲    │
//!      │ other  identity │    ▼                     box label │    │ escape /
//!      ▼                 │  ┌────────────────┐ ───────────────┘    │ acknowledge
//!   ┌─────────┐ ─────────┘  │ SuccessInvalid │ ◄─┐ other           ▼
//!   │ Invalid │ ◄─┐ other   └────────────────┘ ──┘               New
//!   └─────────┘ ──┘
//! ```
//!
//! Escape resets any state to `New`. `Completed` ignores codes until it is
//! reset by escape or by acknowledging the completion notice.
//!
//! # Examples
//!
//! ```
//! use pickverify_core::ScanCode;
//! use pickverify_station::{AudioCue, StateMachine, WorkflowState};
//!
//! let mut machine = StateMachine::new();
//!
//! let signal = machine.accept(Some(&ScanCode::new("5QCPCM0QW"))).unwrap();
//! assert_eq!(signal.audio_cue, AudioCue::B);
//!
//! let signal = machine.accept(Some(&ScanCode::new("123456"))).unwrap();
//! assert_eq!(machine.current_state(), WorkflowState::Completed);
//! assert!(signal.completion_notice);
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;

use pickverify_core::constants::{BOX_LABEL_CODE, IDENTITY_CODE};
use pickverify_core::{Error, Result, ScanCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::feedback::FeedbackSignal;

/// Maximum number of state transitions to keep in history.
///
/// A complete pick is two or three transitions, so this covers the last few
/// dozen picks.
const MAX_HISTORY_SIZE: usize = 100;

/// States of the pick verification workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// Waiting for the identity code.
    New,

    /// Identity code accepted, waiting for the box label.
    Success,

    /// Wrong code while waiting for the identity code.
    Invalid,

    /// Wrong code while waiting for the box label.
    SuccessInvalid,

    /// Box label accepted, pick complete.
    Completed,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            WorkflowState::New => "New",
            WorkflowState::Success => "Success",
            WorkflowState::Invalid => "Invalid",
            WorkflowState::SuccessInvalid => "SuccessInvalid",
            WorkflowState::Completed => "Completed",
        };
        write!(f, "{}", state_str)
    }
}

impl WorkflowState {
    /// Check if a transition to `target` is valid from this state.
    ///
    /// Re-entrant transitions (`Invalid` to `Invalid`, `SuccessInvalid` to
    /// `SuccessInvalid`) are valid. The escape reset to `New` is not a
    /// transition rule; it is always available through [`StateMachine::reset`].
    ///
    /// # Examples
    ///
    /// ```
    /// use pickverify_station::WorkflowState;
    ///
    /// assert!(WorkflowState::New.can_transition_to(&WorkflowState::Success));
    /// assert!(WorkflowState::Invalid.can_transition_to(&WorkflowState::Invalid));
    /// assert!(!WorkflowState::New.can_transition_to(&WorkflowState::Completed));
    /// ```
    pub fn can_transition_to(&self, target: &WorkflowState) -> bool {
        matches!(
            (self, target),
            // Stage 1
            (
                WorkflowState::New | WorkflowState::Invalid,
                WorkflowState::Success | WorkflowState::Invalid
            )
            // Stage 2
            | (
                WorkflowState::Success | WorkflowState::SuccessInvalid,
                WorkflowState::Completed | WorkflowState::SuccessInvalid
            )
            // Acknowledged completion
            | (WorkflowState::Completed, WorkflowState::New)
        )
    }

    /// Returns `true` while the identity code is expected.
    pub fn awaits_identity(&self) -> bool {
        matches!(self, WorkflowState::New | WorkflowState::Invalid)
    }

    /// Returns `true` while the box label is expected.
    pub fn awaits_box_label(&self) -> bool {
        matches!(self, WorkflowState::Success | WorkflowState::SuccessInvalid)
    }
}

/// The two codes a pick must present, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedCodes {
    /// Stage-1 code.
    pub identity: String,

    /// Stage-2 code.
    pub box_label: String,
}

impl ExpectedCodes {
    /// Create a pair of expected codes.
    pub fn new(identity: impl Into<String>, box_label: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            box_label: box_label.into(),
        }
    }
}

impl Default for ExpectedCodes {
    fn default() -> Self {
        Self::new(IDENTITY_CODE, BOX_LABEL_CODE)
    }
}

/// Represents a single state transition with timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state transitioned from.
    pub from: WorkflowState,

    /// The state transitioned to.
    pub to: WorkflowState,

    /// When the transition occurred.
    ///
    /// Not serialized; set to the time of deserialization.
    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl StateTransition {
    /// Create a new state transition record with the current timestamp.
    pub fn new(from: WorkflowState, to: WorkflowState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }

    /// Returns `true` if the transition stayed in the same state.
    pub fn is_reentrant(&self) -> bool {
        self.from == self.to
    }
}

/// State machine for the pick verification workflow.
///
/// Not synchronized. The station owns it from a single task.
#[derive(Debug)]
pub struct StateMachine {
    /// Current workflow state.
    current_state: WorkflowState,

    /// History of state transitions (limited to MAX_HISTORY_SIZE).
    history: VecDeque<StateTransition>,

    /// Codes the workflow expects.
    codes: ExpectedCodes,
}

impl StateMachine {
    /// Create a new state machine in the `New` state with the default codes.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for a state machine with custom configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use pickverify_station::{ExpectedCodes, StateMachine, WorkflowState};
    ///
    /// let machine = StateMachine::builder()
    ///     .with_codes(ExpectedCodes::new("OPERATOR-7", "BOX-42"))
    ///     .with_initial_state(WorkflowState::Success)
    ///     .build();
    ///
    /// assert_eq!(machine.current_state(), WorkflowState::Success);
    /// assert_eq!(machine.codes().box_label, "BOX-42");
    /// ```
    pub fn builder() -> StateMachineBuilder {
        StateMachineBuilder::default()
    }

    /// Get the current state of the machine.
    pub fn current_state(&self) -> WorkflowState {
        self.current_state
    }

    /// Codes this machine verifies against.
    pub fn codes(&self) -> &ExpectedCodes {
        &self.codes
    }

    /// Get the state transition history, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Get the last `count` state transitions, oldest first.
    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition> {
        self.history
            .iter()
            .rev()
            .take(count)
            .rev()
            .cloned()
            .collect()
    }

    /// State a present code leads to from the current state.
    ///
    /// Returns `None` in `Completed`, which ignores codes.
    pub fn next_state(&self, code: &ScanCode) -> Option<WorkflowState> {
        let state = self.current_state;

        if state.awaits_identity() {
            if code.matches(&self.codes.identity) {
                Some(WorkflowState::Success)
            } else {
                Some(WorkflowState::Invalid)
            }
        } else if state.awaits_box_label() {
            if code.matches(&self.codes.box_label) {
                Some(WorkflowState::Completed)
            } else {
                Some(WorkflowState::SuccessInvalid)
            }
        } else {
            None
        }
    }

    /// Evaluate an extracted code.
    ///
    /// Returns the feedback for the accepted transition, or `None` when the
    /// code is absent or the machine is `Completed`. Re-entrant transitions
    /// are accepted and emit feedback each time.
    pub fn accept(&mut self, code: Option<&ScanCode>) -> Option<FeedbackSignal> {
        let Some(code) = code else {
            debug!(state = %self.current_state, "no code extracted, staying put");
            return None;
        };

        let Some(next) = self.next_state(code) else {
            debug!(state = %self.current_state, %code, "code ignored until reset");
            return None;
        };

        match self.transition_to(next) {
            Ok(transition) => {
                info!(from = %transition.from, to = %transition.to, %code, "transition accepted");
                Some(FeedbackSignal::entering(next))
            }
            Err(e) => {
                warn!(error = %e, %code, "transition rejected");
                None
            }
        }
    }

    /// Transition to a new state, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStateTransition`] if the transition is not
    /// valid from the current state.
    pub fn transition_to(&mut self, new_state: WorkflowState) -> Result<StateTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = StateTransition::new(self.current_state, new_state);
        self.perform_state_change(new_state, transition.clone());

        Ok(transition)
    }

    /// Reset to `New` from any state.
    ///
    /// This is the escape path. It always emits the `New` feedback, even when
    /// the machine is already in `New`.
    pub fn reset(&mut self) -> FeedbackSignal {
        let transition = StateTransition::new(self.current_state, WorkflowState::New);
        info!(from = %transition.from, "workflow reset");
        self.perform_state_change(WorkflowState::New, transition);
        FeedbackSignal::entering(WorkflowState::New)
    }

    /// Acknowledge the completion notice.
    ///
    /// Resets to `New` when the machine is `Completed`; ignored otherwise.
    pub fn acknowledge_completion(&mut self) -> Option<FeedbackSignal> {
        if self.current_state != WorkflowState::Completed {
            debug!(state = %self.current_state, "no completion to acknowledge");
            return None;
        }

        match self.transition_to(WorkflowState::New) {
            Ok(_) => {
                info!("completion acknowledged, workflow restarted");
                Some(FeedbackSignal::entering(WorkflowState::New))
            }
            Err(e) => {
                warn!(error = %e, "acknowledgment rejected");
                None
            }
        }
    }

    fn perform_state_change(&mut self, new_state: WorkflowState, transition: StateTransition) {
        self.current_state = new_state;
        self.add_to_history(transition);
    }

    fn add_to_history(&mut self, transition: StateTransition) {
        self.history.push_back(transition);
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing `StateMachine` instances.
#[derive(Debug)]
pub struct StateMachineBuilder {
    initial_state: WorkflowState,
    codes: ExpectedCodes,
}

impl StateMachineBuilder {
    /// Set the initial state for the machine.
    pub fn with_initial_state(mut self, state: WorkflowState) -> Self {
        self.initial_state = state;
        self
    }

    /// Set the codes the machine verifies against.
    pub fn with_codes(mut self, codes: ExpectedCodes) -> Self {
        self.codes = codes;
        self
    }

    /// Build the state machine.
    pub fn build(self) -> StateMachine {
        StateMachine {
            current_state: self.initial_state,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
            codes: self.codes,
        }
    }
}

impl Default for StateMachineBuilder {
    fn default() -> Self {
        Self {
            initial_state: WorkflowState::New,
            codes: ExpectedCodes::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::AudioCue;
    use rstest::rstest;

    fn code(value: &str) -> ScanCode {
        ScanCode::new(value)
    }

    fn machine_in(state: WorkflowState) -> StateMachine {
        StateMachine::builder().with_initial_state(state).build()
    }

    #[test]
    fn test_new_machine_starts_new() {
        let machine = StateMachine::new();
        assert_eq!(machine.current_state(), WorkflowState::New);
        assert!(machine.history().is_empty());
        assert_eq!(machine.codes(), &ExpectedCodes::default());
    }

    #[rstest]
    #[case(WorkflowState::New, "5QCPCM0QW", WorkflowState::Success, AudioCue::B)]
    #[case(WorkflowState::New, "WRONG", WorkflowState::Invalid, AudioCue::C)]
    #[case(WorkflowState::New, "123456", WorkflowState::Invalid, AudioCue::C)]
    #[case(WorkflowState::Invalid, "5QCPCM0QW", WorkflowState::Success, AudioCue::B)]
    #[case(WorkflowState::Invalid, "WRONG", WorkflowState::Invalid, AudioCue::C)]
    #[case(WorkflowState::Success, "123456", WorkflowState::Completed, AudioCue::D)]
    #[case(WorkflowState::Success, "000000", WorkflowState::SuccessInvalid, AudioCue::C)]
    #[case(WorkflowState::Success, "5QCPCM0QW", WorkflowState::SuccessInvalid, AudioCue::C)]
    #[case(WorkflowState::SuccessInvalid, "123456", WorkflowState::Completed, AudioCue::D)]
    #[case(WorkflowState::SuccessInvalid, "000000", WorkflowState::SuccessInvalid, AudioCue::C)]
    fn test_accept_transition_table(
        #[case] from: WorkflowState,
        #[case] scanned: &str,
        #[case] to: WorkflowState,
        #[case] cue: AudioCue,
    ) {
        let mut machine = machine_in(from);

        let signal = machine.accept(Some(&code(scanned))).unwrap();

        assert_eq!(machine.current_state(), to);
        assert_eq!(signal.state, to);
        assert_eq!(signal.audio_cue, cue);
    }

    #[rstest]
    #[case(WorkflowState::New)]
    #[case(WorkflowState::Invalid)]
    #[case(WorkflowState::Success)]
    #[case(WorkflowState::SuccessInvalid)]
    #[case(WorkflowState::Completed)]
    fn test_absent_code_is_no_transition(#[case] state: WorkflowState) {
        let mut machine = machine_in(state);

        assert!(machine.accept(None).is_none());
        assert_eq!(machine.current_state(), state);
        assert!(machine.history().is_empty());
    }

    #[rstest]
    #[case("5QCPCM0QW")]
    #[case("123456")]
    #[case("anything")]
    fn test_completed_ignores_codes(#[case] scanned: &str) {
        let mut machine = machine_in(WorkflowState::Completed);

        assert!(machine.accept(Some(&code(scanned))).is_none());
        assert_eq!(machine.current_state(), WorkflowState::Completed);
    }

    #[test]
    fn test_full_pick_emits_completion_notice_once() {
        let mut machine = StateMachine::new();

        let first = machine.accept(Some(&code("5QCPCM0QW"))).unwrap();
        assert!(!first.completion_notice);

        let done = machine.accept(Some(&code("123456"))).unwrap();
        assert_eq!(done.audio_cue, AudioCue::D);
        assert!(done.completion_notice);

        // Further scans do not surface the notice again
        assert!(machine.accept(Some(&code("123456"))).is_none());
    }

    #[test]
    fn test_reentrant_invalid_emits_each_time() {
        let mut machine = machine_in(WorkflowState::Success);

        let first = machine.accept(Some(&code("000000"))).unwrap();
        let second = machine.accept(Some(&code("000000"))).unwrap();

        assert_eq!(first.audio_cue, AudioCue::C);
        assert_eq!(second.audio_cue, AudioCue::C);
        assert_eq!(machine.current_state(), WorkflowState::SuccessInvalid);
        assert!(machine.history()[1].is_reentrant());
    }

    #[test]
    fn test_empty_code_is_a_wrong_code() {
        let mut machine = StateMachine::new();
        let signal = machine.accept(Some(&code(""))).unwrap();
        assert_eq!(signal.state, WorkflowState::Invalid);
    }

    #[rstest]
    #[case(WorkflowState::New)]
    #[case(WorkflowState::Invalid)]
    #[case(WorkflowState::Success)]
    #[case(WorkflowState::SuccessInvalid)]
    #[case(WorkflowState::Completed)]
    fn test_reset_from_any_state(#[case] state: WorkflowState) {
        let mut machine = machine_in(state);

        let signal = machine.reset();

        assert_eq!(machine.current_state(), WorkflowState::New);
        assert_eq!(signal.audio_cue, AudioCue::A);
        assert_eq!(machine.history().back().unwrap().from, state);
    }

    #[test]
    fn test_acknowledge_completion_restarts() {
        let mut machine = machine_in(WorkflowState::Completed);

        let signal = machine.acknowledge_completion().unwrap();

        assert_eq!(signal.state, WorkflowState::New);
        assert_eq!(signal.audio_cue, AudioCue::A);
        assert_eq!(machine.current_state(), WorkflowState::New);
    }

    #[rstest]
    #[case(WorkflowState::New)]
    #[case(WorkflowState::Invalid)]
    #[case(WorkflowState::Success)]
    #[case(WorkflowState::SuccessInvalid)]
    fn test_acknowledge_outside_completed_is_ignored(#[case] state: WorkflowState) {
        let mut machine = machine_in(state);

        assert!(machine.acknowledge_completion().is_none());
        assert_eq!(machine.current_state(), state);
    }

    #[test]
    fn test_invalid_transition_is_rejected() {
        let mut machine = StateMachine::new();

        let result = machine.transition_to(WorkflowState::Completed);

        assert!(matches!(result, Err(Error::InvalidStateTransition { .. })));
        assert_eq!(machine.current_state(), WorkflowState::New);
    }

    #[test]
    fn test_custom_codes() {
        let mut machine = StateMachine::builder()
            .with_codes(ExpectedCodes::new("OP-1", "BOX-9"))
            .build();

        assert_eq!(
            machine.accept(Some(&code("5QCPCM0QW"))).unwrap().state,
            WorkflowState::Invalid
        );
        assert_eq!(
            machine.accept(Some(&code("OP-1"))).unwrap().state,
            WorkflowState::Success
        );
        assert_eq!(
            machine.accept(Some(&code("BOX-9"))).unwrap().state,
            WorkflowState::Completed
        );
    }

    #[test]
    fn test_history_is_bounded() {
        let mut machine = machine_in(WorkflowState::Invalid);

        for _ in 0..(MAX_HISTORY_SIZE + 20) {
            machine.accept(Some(&code("WRONG")));
        }

        assert_eq!(machine.history().len(), MAX_HISTORY_SIZE);
        assert_eq!(machine.last_transitions(3).len(), 3);
    }

    #[test]
    fn test_history_records_transitions_in_order() {
        let mut machine = StateMachine::new();
        machine.accept(Some(&code("WRONG")));
        machine.accept(Some(&code("5QCPCM0QW")));
        machine.accept(Some(&code("123456")));

        let states: Vec<_> = machine.history().iter().map(|t| t.to).collect();
        assert_eq!(
            states,
            vec![
                WorkflowState::Invalid,
                WorkflowState::Success,
                WorkflowState::Completed
            ]
        );
    }

    #[test]
    fn test_workflow_state_display() {
        assert_eq!(WorkflowState::SuccessInvalid.to_string(), "SuccessInvalid");
        assert_eq!(
            serde_json::to_string(&WorkflowState::SuccessInvalid).unwrap(),
            "\"success_invalid\""
        );
    }
}
