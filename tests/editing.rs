use inkpad::api::InkpadApi;
use inkpad::capture::EditorKey;
use inkpad::config::EditorConfig;
use inkpad::model::Note;
use inkpad::session::{SessionEffect, STATUS_SAVED};
use std::time::{Duration, Instant};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn api() -> InkpadApi {
    InkpadApi::with_config("unused", EditorConfig::default())
}

#[test]
fn test_history_is_capped_at_thirty() {
    let t0 = Instant::now();
    let mut session = api().open_session(Note::untitled(), t0);
    for i in 0..35u64 {
        let at = t0 + ms(i * 10);
        session.input(format!("<p>edit {i}</p>"), at);
        session.blur(at);
    }
    assert_eq!(session.history().undo_len(), 30);
    let oldest = session.history().undo_stack().next().map(|s| s.content.clone());
    assert_eq!(oldest.as_deref(), Some("<p>edit 5</p>"));
}

#[test]
fn test_typing_session_undo_redo_and_autosave() {
    let t0 = Instant::now();
    let mut session = api().open_session(Note::new("Trip", ""), t0);

    let mut body = String::new();
    for (i, ch) in "pack bags".chars().enumerate() {
        let at = t0 + ms(i as u64 * 20);
        if ch == ' ' {
            session.key_down(EditorKey::Char(' '), at);
        }
        body.push(ch);
        session.input(format!("<p>{body}</p>"), at);
        session.tick(at);
    }
    // Settle pending timers.
    let effects = session.tick(t0 + ms(5000));
    assert_eq!(effects.len(), 1);
    let SessionEffect::Save(note) = &effects[0];
    assert_eq!(note.content, "<p>pack bags</p>");
    assert_eq!(session.status(), STATUS_SAVED);

    let captured = session.history().undo_len();
    assert!(captured >= 1);

    session.undo(t0 + ms(6000)).unwrap();
    assert_ne!(session.live().content, "<p>pack bags</p>");
    session.redo(t0 + ms(6100)).unwrap();
    assert_eq!(session.live().content, "<p>pack bags</p>");
    assert_eq!(session.history().undo_len(), captured);
}

#[test]
fn test_import_starts_fresh_history() {
    let t0 = Instant::now();
    let api = api();
    let mut session = api.open_session(Note::untitled(), t0);
    session.input("<p>old</p>", t0);
    session.blur(t0);

    let imported = api.import_note("fresh.txt", "new body").unwrap();
    let effects = session.open_note(imported.notes[0].clone(), t0 + ms(10));
    assert_eq!(effects.len(), 1);
    assert!(!session.history().can_undo());
    assert_eq!(session.live().title, "fresh");
    assert_eq!(session.live().content, "new body");
}
