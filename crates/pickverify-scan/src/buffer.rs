//! Scan buffer with terminator detection and idle reset.
//!
//! The buffer accumulates the characters of one in-progress scan. It is a
//! plain data structure: it records the idle deadline but owns no timer, so
//! the task that owns it decides when to check the deadline. Keeping every
//! mutation on that one task makes appends, finalization and idle resets
//! mutually exclusive.
//!
//! # Lifecycle
//!
//! ```text
//! ┌───────┐  append(ch)   ┌───────────┐  TERMINATOR      ┌──────────────┐
//! │ Empty │──────────────>│ Receiving │─────────────────>│ raw returned │
//! └───────┘               └───────────┘   finalize()     └──────────────┘
//!     ^                     │   │                               │
//!     │                     │   │ idle deadline passed          │
//!     │                     │   │ on_idle_timeout()             │
//!     │                     │   │ (partial scan discarded)      │
//!     │                     │   v                               │
//!     └─────────────────────┴───┴───────────────────────────────┘
//!                  reset() (Escape)
//! ```
//!
//! Every character, the terminator included, restarts the idle deadline.
//! Finalizing stops it.
//!
//! # Example
//!
//! ```
//! use pickverify_scan::{PushOutcome, ScanBuffer};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut buffer = ScanBuffer::new(Duration::from_secs(1));
//!
//! for ch in "123456".chars() {
//!     assert_eq!(buffer.push(ch), PushOutcome::Buffered);
//! }
//!
//! assert_eq!(buffer.push('\r'), PushOutcome::Finalized("123456".to_string()));
//! assert!(buffer.is_empty());
//! assert!(buffer.deadline().is_none());
//! # }
//! ```

use std::time::Duration;

use pickverify_core::constants::TERMINATOR;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Safety cap on the UTF-8 size of one pending scan, in bytes.
///
/// Real labels are a few dozen bytes and never get near it. Only a stuck key
/// or a runaway input source without a terminator does, and its buffer is
/// discarded like an idle one.
pub const MAX_BUFFER_BYTES: usize = 4 * 1024;

/// Initial capacity, enough for typical labels without reallocation.
const INITIAL_BUFFER_CAPACITY: usize = 64;

/// Observable buffer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// No characters pending.
    Empty,

    /// Characters pending, idle deadline armed.
    Receiving,
}

/// Result of feeding one character into the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The character was appended; the scan continues.
    Buffered,

    /// The terminator was seen; the accumulated raw scan is returned.
    ///
    /// The terminator itself is not part of the returned string.
    Finalized(String),

    /// The buffer exceeded its size limit and was discarded.
    Overflow,
}

/// Accumulates characters of one scan.
#[derive(Debug)]
pub struct ScanBuffer {
    /// Characters received since the last finalize/reset.
    chars: String,

    /// Idle interval after which a partial scan is discarded.
    idle_timeout: Duration,

    /// When the current partial scan expires, if one is in progress.
    deadline: Option<Instant>,
}

impl ScanBuffer {
    /// Create an empty buffer with the given idle interval.
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            chars: String::with_capacity(INITIAL_BUFFER_CAPACITY),
            idle_timeout,
            deadline: None,
        }
    }

    /// Feed one character, finalizing on the terminator.
    ///
    /// This is the entry point for keystroke input: ordinary characters are
    /// appended, the terminator finalizes the scan. A partial scan whose idle
    /// deadline already passed is discarded before the character is taken.
    pub fn push(&mut self, ch: char) -> PushOutcome {
        // The owner may not have observed the deadline yet
        if self.is_expired(Instant::now()) {
            self.on_idle_timeout();
        }
        self.restart_deadline();

        if ch == TERMINATOR {
            return PushOutcome::Finalized(self.finalize());
        }

        if self.chars.len() + ch.len_utf8() > MAX_BUFFER_BYTES {
            warn!(
                len = self.chars.len(),
                "scan buffer exceeded {MAX_BUFFER_BYTES} bytes without terminator, discarding"
            );
            self.reset();
            return PushOutcome::Overflow;
        }

        self.append(ch);
        PushOutcome::Buffered
    }

    /// Append one character and restart the idle deadline.
    pub fn append(&mut self, ch: char) {
        self.chars.push(ch);
        self.restart_deadline();
    }

    /// Return the buffered contents, clear the buffer and stop the deadline.
    pub fn finalize(&mut self) -> String {
        self.deadline = None;
        let raw = std::mem::take(&mut self.chars);
        debug!(len = raw.len(), "scan finalized");
        raw
    }

    /// Discard a partial scan after the idle interval elapsed.
    ///
    /// Returns the number of characters discarded. No code is produced.
    pub fn on_idle_timeout(&mut self) -> usize {
        let discarded = self.chars.chars().count();
        if discarded > 0 {
            debug!(discarded, "idle timeout, partial scan discarded");
        }
        self.reset();
        discarded
    }

    /// Clear the buffer and stop the deadline without producing a scan.
    pub fn reset(&mut self) {
        self.chars.clear();
        self.deadline = None;
    }

    /// Instant at which the pending scan expires, if the deadline is armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` if the deadline is armed and has passed at `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Current buffer state.
    pub fn state(&self) -> BufferState {
        if self.chars.is_empty() {
            BufferState::Empty
        } else {
            BufferState::Receiving
        }
    }

    /// Characters buffered so far.
    pub fn contents(&self) -> &str {
        &self.chars
    }

    /// Number of characters buffered.
    pub fn len(&self) -> usize {
        self.chars.chars().count()
    }

    /// Returns `true` if no characters are buffered.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Configured idle interval.
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    fn restart_deadline(&mut self) {
        self.deadline = Some(Instant::now() + self.idle_timeout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE: Duration = Duration::from_secs(1);

    #[tokio::test(start_paused = true)]
    async fn test_new_buffer_is_empty() {
        let buffer = ScanBuffer::new(IDLE);
        assert_eq!(buffer.state(), BufferState::Empty);
        assert!(buffer.deadline().is_none());
        assert_eq!(buffer.idle_timeout(), IDLE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_accumulates_until_terminator() {
        let mut buffer = ScanBuffer::new(IDLE);

        for ch in "5QCPCM0QW".chars() {
            assert_eq!(buffer.push(ch), PushOutcome::Buffered);
        }
        assert_eq!(buffer.state(), BufferState::Receiving);
        assert_eq!(buffer.contents(), "5QCPCM0QW");

        let outcome = buffer.push('\r');
        assert_eq!(outcome, PushOutcome::Finalized("5QCPCM0QW".to_string()));
        assert_eq!(buffer.state(), BufferState::Empty);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminator_on_empty_buffer_finalizes_empty() {
        let mut buffer = ScanBuffer::new(IDLE);
        assert_eq!(buffer.push('\r'), PushOutcome::Finalized(String::new()));
        assert!(buffer.deadline().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_character_restarts_deadline() {
        let mut buffer = ScanBuffer::new(IDLE);

        buffer.push('1');
        let first = buffer.deadline().unwrap();

        tokio::time::advance(Duration::from_millis(600)).await;
        buffer.push('2');
        let second = buffer.deadline().unwrap();

        assert_eq!(second - first, Duration::from_millis(600));
        assert!(!buffer.is_expired(Instant::now() + Duration::from_millis(500)));
        assert!(buffer.is_expired(Instant::now() + IDLE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_finalize_stops_deadline() {
        let mut buffer = ScanBuffer::new(IDLE);
        buffer.push('1');
        assert!(buffer.deadline().is_some());

        buffer.push('\r');
        assert!(buffer.deadline().is_none());
        assert!(!buffer.is_expired(Instant::now() + IDLE * 10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timeout_discards_partial_scan() {
        let mut buffer = ScanBuffer::new(IDLE);
        for ch in "1234".chars() {
            buffer.push(ch);
        }

        tokio::time::advance(IDLE).await;
        assert!(buffer.is_expired(Instant::now()));

        assert_eq!(buffer.on_idle_timeout(), 4);
        assert!(buffer.is_empty());
        assert!(buffer.deadline().is_none());

        // The next scan starts clean
        for ch in "123456\r".chars() {
            if let PushOutcome::Finalized(raw) = buffer.push(ch) {
                assert_eq!(raw, "123456");
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_discards_without_finalizing() {
        let mut buffer = ScanBuffer::new(IDLE);
        buffer.push('A');
        buffer.push('B');

        buffer.reset();

        assert!(buffer.is_empty());
        assert!(buffer.deadline().is_none());
        assert_eq!(buffer.push('\r'), PushOutcome::Finalized(String::new()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_control_characters_are_buffered() {
        let mut buffer = ScanBuffer::new(IDLE);
        buffer.push('\0');
        buffer.push(';');
        buffer.push('\u{3}');
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.contents(), "\0;\u{3}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_overflow_discards_buffer() {
        let mut buffer = ScanBuffer::new(IDLE);
        for _ in 0..MAX_BUFFER_BYTES {
            assert_eq!(buffer.push('9'), PushOutcome::Buffered);
        }

        assert_eq!(buffer.push('9'), PushOutcome::Overflow);
        assert!(buffer.is_empty());
        assert!(buffer.deadline().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overflow_limit_counts_bytes() {
        let mut buffer = ScanBuffer::new(IDLE);
        for _ in 0..MAX_BUFFER_BYTES / 2 {
            assert_eq!(buffer.push('é'), PushOutcome::Buffered);
        }
        assert_eq!(buffer.contents().len(), MAX_BUFFER_BYTES);
        assert_eq!(buffer.len(), MAX_BUFFER_BYTES / 2);

        assert_eq!(buffer.push('é'), PushOutcome::Overflow);
        assert!(buffer.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_after_missed_deadline_starts_new_scan() {
        let mut buffer = ScanBuffer::new(IDLE);
        for ch in "5QCPCM".chars() {
            buffer.push(ch);
        }

        // Nobody called on_idle_timeout while the deadline passed
        tokio::time::advance(IDLE + Duration::from_millis(100)).await;

        for ch in "0QW".chars() {
            assert_eq!(buffer.push(ch), PushOutcome::Buffered);
        }
        assert_eq!(buffer.contents(), "0QW");
        assert_eq!(buffer.push('\r'), PushOutcome::Finalized("0QW".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminator_after_missed_deadline_finalizes_empty() {
        let mut buffer = ScanBuffer::new(IDLE);
        buffer.push('1');
        tokio::time::advance(IDLE).await;

        assert_eq!(buffer.push('\r'), PushOutcome::Finalized(String::new()));
    }
}
