//! # Capture Policy
//!
//! Decides *when* the editor's state is snapshotted, independently of the history
//! stacks. A capture is requested when:
//!
//! - enough characters were typed since the last capture, or
//! - any input arrives after the capture interval has passed,
//! - a boundary key is pressed (space, `. ! ? , ; :`, Enter, Tab),
//! - the editing surface loses focus, or gains it with an empty history.
//!
//! Requests are not executed here. Deferred ones go through a [`Debouncer`], which keeps
//! at most one pending task: scheduling again replaces the pending task and invalidates
//! its token, so bursts of requests collapse into a single capture.
//!
//! Time is passed in as `Instant`s, never read from the clock, so the whole policy is
//! deterministic under test.

use std::time::{Duration, Instant};

use crate::config::EditorConfig;

/// Identifies one scheduled task. Stale once the task fires, is cancelled or replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskToken(u64);

#[derive(Debug)]
struct Pending<T> {
    token: TaskToken,
    due: Instant,
    payload: T,
}

/// A single replaceable delayed task carrying a payload.
#[derive(Debug)]
pub struct Debouncer<T> {
    next_token: u64,
    pending: Option<Pending<T>>,
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self {
            next_token: 0,
            pending: None,
        }
    }
}

impl<T> Debouncer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `payload` to fire `delay` after `now`, replacing any pending task.
    pub fn schedule(&mut self, now: Instant, delay: Duration, payload: T) -> TaskToken {
        self.next_token += 1;
        let token = TaskToken(self.next_token);
        self.pending = Some(Pending {
            token,
            due: now + delay,
            payload,
        });
        token
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.payload)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_current(&self, token: TaskToken) -> bool {
        self.pending.as_ref().is_some_and(|p| p.token == token)
    }

    pub fn due_at(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    pub fn payload_mut(&mut self) -> Option<&mut T> {
        self.pending.as_mut().map(|p| &mut p.payload)
    }

    /// Takes the pending payload if it is due at `now`.
    pub fn fire(&mut self, now: Instant) -> Option<T> {
        let due = self.pending.as_ref().is_some_and(|p| p.due <= now);
        if due {
            self.cancel()
        } else {
            None
        }
    }
}

/// Keys the editing surface reports on keydown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    Char(char),
    Enter,
    Tab,
    Other,
}

impl EditorKey {
    pub fn is_boundary(self) -> bool {
        matches!(
            self,
            EditorKey::Char(' ' | '.' | '!' | '?' | ',' | ';' | ':')
                | EditorKey::Enter
                | EditorKey::Tab
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureRequest {
    /// Capture once the delay has passed, through the debouncer.
    After(Duration),
    /// Capture synchronously.
    Immediately,
}

#[derive(Debug, Clone)]
pub struct CapturePolicy {
    char_threshold: usize,
    interval: Duration,
    debounce: Duration,
    chars_since_capture: usize,
    last_capture: Instant,
}

impl CapturePolicy {
    pub fn new(config: &EditorConfig, now: Instant) -> Self {
        Self {
            char_threshold: config.capture_char_threshold,
            interval: config.capture_interval(),
            debounce: config.capture_debounce(),
            chars_since_capture: 0,
            last_capture: now,
        }
    }

    /// One input event. No new request while a capture is already pending.
    pub fn on_input(&mut self, now: Instant, capture_pending: bool) -> Option<CaptureRequest> {
        self.chars_since_capture += 1;
        if capture_pending {
            return None;
        }
        let elapsed = now.saturating_duration_since(self.last_capture);
        if self.chars_since_capture >= self.char_threshold || elapsed > self.interval {
            Some(CaptureRequest::After(self.debounce))
        } else {
            None
        }
    }

    pub fn on_key_down(&mut self, key: EditorKey) -> Option<CaptureRequest> {
        if !key.is_boundary() {
            return None;
        }
        self.chars_since_capture = 0;
        Some(CaptureRequest::After(Duration::ZERO))
    }

    pub fn on_blur(&mut self) -> CaptureRequest {
        self.chars_since_capture = 0;
        CaptureRequest::Immediately
    }

    pub fn on_focus(&self, history_empty: bool) -> Option<CaptureRequest> {
        history_empty.then_some(CaptureRequest::Immediately)
    }

    /// Records that a capture ran at `now`.
    pub fn captured(&mut self, now: Instant) {
        self.chars_since_capture = 0;
        self.last_capture = now;
    }

    pub fn chars_since_capture(&self) -> usize {
        self.chars_since_capture
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_debouncer_replaces_and_invalidates() {
        let t0 = Instant::now();
        let mut timer = Debouncer::new();
        let first = timer.schedule(t0, ms(50), "first");
        let second = timer.schedule(t0, ms(10), "second");
        assert!(!timer.is_current(first));
        assert!(timer.is_current(second));

        assert_eq!(timer.fire(t0 + ms(5)), None);
        assert_eq!(timer.fire(t0 + ms(10)), Some("second"));
        assert_eq!(timer.fire(t0 + ms(100)), None);
        assert!(!timer.is_current(second));
    }

    #[test]
    fn test_debouncer_cancel() {
        let t0 = Instant::now();
        let mut timer = Debouncer::new();
        timer.schedule(t0, Duration::ZERO, 1);
        assert_eq!(timer.cancel(), Some(1));
        assert_eq!(timer.fire(t0 + ms(1)), None);
    }

    #[test]
    fn test_threshold_triggers_after_five_chars() {
        let t0 = Instant::now();
        let mut policy = CapturePolicy::new(&EditorConfig::default(), t0);
        for _ in 0..4 {
            assert_eq!(policy.on_input(t0 + ms(10), false), None);
        }
        assert_eq!(
            policy.on_input(t0 + ms(10), false),
            Some(CaptureRequest::After(ms(50)))
        );
    }

    #[test]
    fn test_interval_triggers_on_slow_typing() {
        let t0 = Instant::now();
        let mut policy = CapturePolicy::new(&EditorConfig::default(), t0);
        assert_eq!(policy.on_input(t0 + ms(2000), false), None);
        assert_eq!(
            policy.on_input(t0 + ms(2001), false),
            Some(CaptureRequest::After(ms(50)))
        );
    }

    #[test]
    fn test_pending_capture_suppresses_new_request() {
        let t0 = Instant::now();
        let mut policy = CapturePolicy::new(&EditorConfig::default(), t0);
        for _ in 0..10 {
            assert_eq!(policy.on_input(t0, true), None);
        }
        assert_eq!(policy.chars_since_capture(), 10);
        policy.captured(t0);
        assert_eq!(policy.chars_since_capture(), 0);
    }

    #[test]
    fn test_boundary_keys() {
        let t0 = Instant::now();
        let mut policy = CapturePolicy::new(&EditorConfig::default(), t0);
        policy.on_input(t0, false);
        for key in [
            EditorKey::Char(' '),
            EditorKey::Char('.'),
            EditorKey::Char(';'),
            EditorKey::Enter,
            EditorKey::Tab,
        ] {
            assert_eq!(
                policy.on_key_down(key),
                Some(CaptureRequest::After(Duration::ZERO))
            );
        }
        assert_eq!(policy.chars_since_capture(), 0);
        assert_eq!(policy.on_key_down(EditorKey::Char('a')), None);
        assert_eq!(policy.on_key_down(EditorKey::Other), None);
    }

    #[test]
    fn test_blur_and_focus() {
        let t0 = Instant::now();
        let mut policy = CapturePolicy::new(&EditorConfig::default(), t0);
        policy.on_input(t0, false);
        assert_eq!(policy.on_blur(), CaptureRequest::Immediately);
        assert_eq!(policy.chars_since_capture(), 0);
        assert_eq!(policy.on_focus(true), Some(CaptureRequest::Immediately));
        assert_eq!(policy.on_focus(false), None);
    }
}
