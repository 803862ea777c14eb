//! Operator feedback published on every accepted transition.
//!
//! Each workflow state has exactly one visual theme and one audio cue. The
//! station publishes a [`FeedbackSignal`] whenever a transition is accepted;
//! UI and audio surfaces only receive it.
//!
//! | State | Visual theme | Audio cue |
//! |-------|--------------|-----------|
//! | `New` | [`VisualTheme::Ready`] | A |
//! | `Success` | [`VisualTheme::StageOneConfirmed`] | B |
//! | `Invalid` | [`VisualTheme::AllError`] | C |
//! | `SuccessInvalid` | [`VisualTheme::StageTwoError`] | C |
//! | `Completed` | [`VisualTheme::StageOneConfirmed`] + notice | D |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state_machine::WorkflowState;

/// Text of the one-time notice shown when a pick is completed.
pub const COMPLETION_MESSAGE: &str = "Picking Simulation is Completed.";

/// Visual theme of the station display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualTheme {
    /// All sections neutral, waiting for the identity code.
    Ready,

    /// Stage 1 confirmed.
    StageOneConfirmed,

    /// All sections in error.
    AllError,

    /// Stage 1 confirmed, stage 2 in error.
    StageTwoError,
}

impl fmt::Display for VisualTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let theme = match self {
            VisualTheme::Ready => "ready",
            VisualTheme::StageOneConfirmed => "stage-1 confirmed",
            VisualTheme::AllError => "all error",
            VisualTheme::StageTwoError => "stage-1 confirmed, stage-2 error",
        };
        f.write_str(theme)
    }
}

/// Audio cue played on a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    /// Cue A: workflow (re)started.
    A,
    /// Cue B: identity code accepted.
    B,
    /// Cue C: wrong code.
    C,
    /// Cue D: pick completed.
    D,
}

impl AudioCue {
    /// Sound asset played for this cue.
    ///
    /// # Examples
    ///
    /// ```
    /// use pickverify_station::AudioCue;
    ///
    /// assert_eq!(AudioCue::B.asset(), "coins.mp3");
    /// ```
    pub fn asset(&self) -> &'static str {
        match self {
            AudioCue::A => "arpeggio.mp3",
            AudioCue::B => "coins.mp3",
            AudioCue::C => "surprise-on-a-spring.mp3",
            AudioCue::D => "what-friends-are-for.mp3",
        }
    }
}

impl fmt::Display for AudioCue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            AudioCue::A => "A",
            AudioCue::B => "B",
            AudioCue::C => "C",
            AudioCue::D => "D",
        };
        write!(f, "cue {letter}")
    }
}

/// Feedback for one accepted transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSignal {
    /// State that was entered.
    pub state: WorkflowState,

    /// Theme to display.
    pub visual_theme: VisualTheme,

    /// Cue to play.
    pub audio_cue: AudioCue,

    /// Show the completion notice. Set only on entering `Completed`.
    pub completion_notice: bool,
}

impl FeedbackSignal {
    /// Feedback for entering `state`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pickverify_station::{AudioCue, FeedbackSignal, VisualTheme, WorkflowState};
    ///
    /// let signal = FeedbackSignal::entering(WorkflowState::Completed);
    /// assert_eq!(signal.visual_theme, VisualTheme::StageOneConfirmed);
    /// assert_eq!(signal.audio_cue, AudioCue::D);
    /// assert!(signal.completion_notice);
    /// ```
    pub fn entering(state: WorkflowState) -> Self {
        let (visual_theme, audio_cue) = match state {
            WorkflowState::New => (VisualTheme::Ready, AudioCue::A),
            WorkflowState::Success => (VisualTheme::StageOneConfirmed, AudioCue::B),
            WorkflowState::Invalid => (VisualTheme::AllError, AudioCue::C),
            WorkflowState::SuccessInvalid => (VisualTheme::StageTwoError, AudioCue::C),
            WorkflowState::Completed => (VisualTheme::StageOneConfirmed, AudioCue::D),
        };

        Self {
            state,
            visual_theme,
            audio_cue,
            completion_notice: state == WorkflowState::Completed,
        }
    }
}

impl fmt::Display for FeedbackSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} ({})",
            self.state,
            self.visual_theme,
            self.audio_cue,
            self.audio_cue.asset()
        )?;
        if self.completion_notice {
            write!(f, " - {COMPLETION_MESSAGE}")?;
        }
        Ok(())
    }
}
