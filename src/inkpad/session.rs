//! # Editor Session
//!
//! The explicit context the editing surface drives. It owns everything that was
//! mutable editor state: the active note, the live `{content, title}`, the history,
//! the capture policy and three debounced timers (capture, autosave, status revert).
//!
//! The surface forwards its events (`input`, `key_down`, `blur`, ...) with the current
//! `Instant`, applies [`EditorSession::live`] back onto itself after undo/redo, and calls
//! [`EditorSession::tick`] from its timer to run whatever became due. Persisting a note
//! is left to the caller: due saves come back as [`SessionEffect::Save`].

use std::time::{Duration, Instant};

use tracing::debug;

use crate::capture::{CapturePolicy, CaptureRequest, Debouncer, EditorKey};
use crate::config::EditorConfig;
use crate::error::Result;
use crate::history::{CaptureOrigin, CaptureOutcome, History, Snapshot};
use crate::model::Note;

pub const STATUS_UNSAVED: &str = "Unsaved changes";
pub const STATUS_SAVED: &str = "All changes saved";
pub const STATUS_UNDONE: &str = "Undid last change";
pub const STATUS_REDONE: &str = "Redid last change";

/// "Undid last change" only flashes briefly.
const UNDO_STATUS_REVERT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    /// The note should be persisted.
    Save(Note),
}

/// The status message, with an optional scheduled revert.
#[derive(Debug, Default)]
pub struct StatusLine {
    message: String,
    revert: Debouncer<String>,
}

impl StatusLine {
    pub fn message(&self) -> &str {
        &self.message
    }

    fn set(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.revert.cancel();
    }

    fn flash(
        &mut self,
        message: impl Into<String>,
        then: impl Into<String>,
        now: Instant,
        after: Duration,
    ) {
        self.message = message.into();
        self.revert.schedule(now, after, then.into());
    }

    fn tick(&mut self, now: Instant) {
        if let Some(message) = self.revert.fire(now) {
            self.message = message;
        }
    }
}

#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    note: Note,
    live: Snapshot,
    saved: bool,
    history: History,
    policy: CapturePolicy,
    capture_timer: Debouncer<CaptureOrigin>,
    save_timer: Debouncer<()>,
    status: StatusLine,
}

impl EditorSession {
    pub fn new(config: EditorConfig, note: Note, now: Instant) -> Self {
        let mut status = StatusLine::default();
        status.set(STATUS_SAVED);
        Self {
            live: Snapshot::new(note.content.clone(), note.title.clone()),
            history: History::new(config.history_limit),
            policy: CapturePolicy::new(&config, now),
            capture_timer: Debouncer::new(),
            save_timer: Debouncer::new(),
            saved: true,
            status,
            note,
            config,
        }
    }

    pub fn note(&self) -> &Note {
        &self.note
    }

    /// The state the editing surface should show.
    pub fn live(&self) -> &Snapshot {
        &self.live
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn status(&self) -> &str {
        self.status.message()
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    /// Makes `note` the active note. History starts over; an unsaved current note is
    /// flushed first.
    pub fn open_note(&mut self, note: Note, now: Instant) -> Vec<SessionEffect> {
        let mut effects = Vec::new();
        if !self.saved {
            effects.push(self.save_now());
        }
        debug!(note = %note.id, "switching note");
        self.live = Snapshot::new(note.content.clone(), note.title.clone());
        self.note = note;
        self.history.reset();
        self.capture_timer.cancel();
        self.save_timer.cancel();
        self.policy = CapturePolicy::new(&self.config, now);
        self.saved = true;
        self.status.set(STATUS_SAVED);
        effects
    }

    pub fn new_note(&mut self, now: Instant) -> Vec<SessionEffect> {
        self.open_note(Note::untitled(), now)
    }

    /// One input event on the body; `content` is the body's markup afterwards.
    pub fn input(&mut self, content: impl Into<String>, now: Instant) {
        self.live.content = content.into();
        self.mark_dirty(now);

        // Typing ends any replay window opened by undo/redo.
        if let Some(origin) = self.capture_timer.payload_mut() {
            *origin = CaptureOrigin::Edit;
        }
        let pending = self.capture_timer.is_pending();
        if let Some(request) = self.policy.on_input(now, pending) {
            self.request_capture(request, now);
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>, now: Instant) {
        self.live.title = title.into();
        self.mark_dirty(now);
    }

    pub fn key_down(&mut self, key: EditorKey, now: Instant) {
        if let Some(request) = self.policy.on_key_down(key) {
            self.request_capture(request, now);
        }
    }

    pub fn blur(&mut self, now: Instant) {
        let request = self.policy.on_blur();
        self.request_capture(request, now);
    }

    pub fn focus(&mut self, now: Instant) {
        if let Some(request) = self.policy.on_focus(!self.history.can_undo()) {
            self.request_capture(request, now);
        }
    }

    /// Snapshot right away, e.g. after a formatting command.
    pub fn capture_now(&mut self, now: Instant) -> CaptureOutcome {
        self.capture_timer.cancel();
        self.capture(CaptureOrigin::Edit, now)
    }

    pub fn undo(&mut self, now: Instant) -> Result<()> {
        match self.history.undo(self.live.clone()) {
            Ok(previous) => {
                self.apply_replay(previous, now);
                self.status
                    .flash(STATUS_UNDONE, STATUS_UNSAVED, now, UNDO_STATUS_REVERT);
                Ok(())
            }
            Err(err) => {
                self.flash_failure(err.to_string(), now);
                Err(err)
            }
        }
    }

    pub fn redo(&mut self, now: Instant) -> Result<()> {
        match self.history.redo(self.live.clone()) {
            Ok(next) => {
                self.apply_replay(next, now);
                self.status.flash(
                    STATUS_REDONE,
                    STATUS_UNSAVED,
                    now,
                    self.config.status_revert(),
                );
                Ok(())
            }
            Err(err) => {
                self.flash_failure(err.to_string(), now);
                Err(err)
            }
        }
    }

    /// Stores the live state into the note and reports it for persistence.
    pub fn save_now(&mut self) -> SessionEffect {
        self.note.save(&self.live.title, &self.live.content);
        self.save_timer.cancel();
        self.saved = true;
        self.status.set(STATUS_SAVED);
        SessionEffect::Save(self.note.clone())
    }

    /// Runs every timer due at `now`.
    pub fn tick(&mut self, now: Instant) -> Vec<SessionEffect> {
        let mut effects = Vec::new();
        if let Some(origin) = self.capture_timer.fire(now) {
            self.capture(origin, now);
        }
        if self.save_timer.fire(now).is_some() {
            effects.push(self.save_now());
        }
        self.status.tick(now);
        effects
    }

    /// Earliest instant at which `tick` has something to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.capture_timer.due_at(),
            self.save_timer.due_at(),
            self.status.revert.due_at(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    fn request_capture(&mut self, request: CaptureRequest, now: Instant) {
        match request {
            CaptureRequest::After(delay) => {
                self.capture_timer.schedule(now, delay, CaptureOrigin::Edit);
            }
            CaptureRequest::Immediately => {
                self.capture_now(now);
            }
        }
    }

    fn capture(&mut self, origin: CaptureOrigin, now: Instant) -> CaptureOutcome {
        self.policy.captured(now);
        self.history.capture(self.live.clone(), origin)
    }

    fn apply_replay(&mut self, snapshot: Snapshot, now: Instant) {
        self.live = snapshot;
        // A capture already on its way observes the replayed state.
        if let Some(origin) = self.capture_timer.payload_mut() {
            *origin = CaptureOrigin::Replay;
        }
        self.saved = false;
        self.save_timer.schedule(now, self.config.autosave_delay(), ());
    }

    fn mark_dirty(&mut self, now: Instant) {
        self.saved = false;
        self.status.set(STATUS_UNSAVED);
        self.save_timer.schedule(now, self.config.autosave_delay(), ());
    }

    fn flash_failure(&mut self, message: String, now: Instant) {
        let back = if self.saved {
            STATUS_SAVED
        } else {
            STATUS_UNSAVED
        };
        self.status.flash(message, back, now, self.config.status_revert());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InkpadError;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn session(t0: Instant) -> EditorSession {
        EditorSession::new(EditorConfig::default(), Note::new("Draft", ""), t0)
    }

    fn type_text(session: &mut EditorSession, text: &str, at: Instant) {
        let mut body = String::from("<p>");
        for ch in text.chars() {
            body.push(ch);
            session.input(format!("{body}</p>"), at);
        }
    }

    #[test]
    fn test_five_characters_capture_after_debounce() {
        let t0 = Instant::now();
        let mut s = session(t0);
        type_text(&mut s, "hello", t0);
        assert_eq!(s.history().undo_len(), 0);

        s.tick(t0 + ms(49));
        assert_eq!(s.history().undo_len(), 0);
        s.tick(t0 + ms(50));
        assert_eq!(s.history().undo_len(), 1);
        assert_eq!(
            s.history().undo_stack().last().map(|snap| snap.content.as_str()),
            Some("<p>hello</p>")
        );
    }

    #[test]
    fn test_capture_sees_state_when_it_runs() {
        let t0 = Instant::now();
        let mut s = session(t0);
        type_text(&mut s, "hello world", t0 + ms(10));
        s.tick(t0 + ms(100));
        // Only one capture despite more input after the threshold was hit.
        assert_eq!(s.history().undo_len(), 1);
        assert_eq!(
            s.history().undo_stack().last().map(|snap| snap.content.as_str()),
            Some("<p>hello world</p>")
        );
    }

    #[test]
    fn test_boundary_key_collapses_pending_request() {
        let t0 = Instant::now();
        let mut s = session(t0);
        type_text(&mut s, "hello", t0);
        s.key_down(EditorKey::Char(' '), t0 + ms(1));
        s.key_down(EditorKey::Char('.'), t0 + ms(2));
        s.tick(t0 + ms(200));
        assert_eq!(s.history().undo_len(), 1);
    }

    #[test]
    fn test_blur_captures_immediately() {
        let t0 = Instant::now();
        let mut s = session(t0);
        s.input("<p>a</p>", t0);
        s.blur(t0);
        assert_eq!(s.history().undo_len(), 1);
    }

    #[test]
    fn test_focus_captures_only_with_empty_history() {
        let t0 = Instant::now();
        let mut s = EditorSession::new(EditorConfig::default(), Note::new("N", "<p>x</p>"), t0);
        s.focus(t0);
        assert_eq!(s.history().undo_len(), 1);
        s.input("<p>xy</p>", t0);
        s.focus(t0);
        assert_eq!(s.history().undo_len(), 1);
    }

    #[test]
    fn test_undo_then_redo() {
        let t0 = Instant::now();
        let mut s = session(t0);
        s.input("<p>zero</p>", t0);
        s.blur(t0);
        s.input("<p>one</p>", t0 + ms(10));

        s.undo(t0 + ms(20)).unwrap();
        assert_eq!(s.live().content, "<p>zero</p>");
        assert_eq!(s.status(), STATUS_UNDONE);
        assert_eq!(s.history().redo_len(), 1);
        s.tick(t0 + ms(120));
        assert_eq!(s.status(), STATUS_UNSAVED);

        s.redo(t0 + ms(130)).unwrap();
        assert_eq!(s.live().content, "<p>one</p>");
        assert_eq!(s.status(), STATUS_REDONE);
        assert_eq!(s.history().redo_len(), 0);
    }

    #[test]
    fn test_nothing_to_undo_reports_and_reverts() {
        let t0 = Instant::now();
        let mut s = session(t0);
        let err = s.undo(t0).unwrap_err();
        assert!(matches!(err, InkpadError::NothingToUndo));
        assert_eq!(s.status(), "Nothing to undo");
        s.tick(t0 + ms(1500));
        assert_eq!(s.status(), STATUS_SAVED);

        let err = s.redo(t0).unwrap_err();
        assert!(matches!(err, InkpadError::NothingToRedo));
        assert_eq!(s.status(), "Nothing to redo");
    }

    #[test]
    fn test_pending_capture_after_undo_keeps_redo() {
        let t0 = Instant::now();
        let mut s = session(t0);
        s.input("<p>a</p>", t0);
        s.blur(t0);
        s.input("<p>ab</p>", t0);
        s.key_down(EditorKey::Enter, t0 + ms(5));
        s.undo(t0 + ms(5)).unwrap();
        assert_eq!(s.live().content, "<p>a</p>");

        s.tick(t0 + ms(10));
        assert_eq!(s.history().undo_len(), 1);
        assert_eq!(s.history().redo_len(), 1);
    }

    #[test]
    fn test_edit_after_undo_clears_redo() {
        let t0 = Instant::now();
        let mut s = session(t0);
        s.input("<p>a</p>", t0);
        s.blur(t0);
        s.input("<p>ab</p>", t0);
        s.undo(t0).unwrap();
        assert_eq!(s.history().redo_len(), 1);

        s.input("<p>ac</p>", t0 + ms(10));
        s.blur(t0 + ms(10));
        assert_eq!(s.history().redo_len(), 0);
    }

    #[test]
    fn test_autosave_after_delay() {
        let t0 = Instant::now();
        let mut s = session(t0);
        s.set_title("", t0);
        s.input("<p>body</p>", t0 + ms(500));
        assert!(s.tick(t0 + ms(1000)).is_empty());

        let effects = s.tick(t0 + ms(1500));
        assert_eq!(effects.len(), 1);
        let SessionEffect::Save(note) = &effects[0];
        assert_eq!(note.title, "Untitled Note");
        assert_eq!(note.content, "<p>body</p>");
        assert!(s.is_saved());
        assert_eq!(s.status(), STATUS_SAVED);
    }

    #[test]
    fn test_switching_note_resets_history_and_flushes() {
        let t0 = Instant::now();
        let mut s = session(t0);
        s.input("<p>a</p>", t0);
        s.blur(t0);
        assert!(s.history().can_undo());

        let effects = s.open_note(Note::new("Other", "<p>o</p>"), t0);
        assert_eq!(effects.len(), 1);
        assert!(!s.history().can_undo());
        assert!(!s.history().can_redo());
        assert_eq!(s.live().title, "Other");
        assert_eq!(s.next_deadline(), None);

        let effects = s.new_note(t0);
        assert!(effects.is_empty());
        assert_eq!(s.note().title, "Untitled Note");
    }
}
