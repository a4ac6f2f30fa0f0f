use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

const NOTE: &str =
    "<h1>Title</h1><p>Some <strong>bold</strong> text.</p><ul><li>one</li><li>two</li></ul>";

fn inkpad(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("inkpad").unwrap();
    cmd.current_dir(dir)
        .arg("--config")
        .arg(dir.join("config"))
        .env_remove("INKPAD_LOG");
    cmd
}

#[test]
fn test_export_markdown_to_default_file_name() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("note.html"), NOTE).unwrap();

    inkpad(temp_dir.path())
        .args(["export", "note.html", "--format", "md", "--title", "Weekly Plan!"])
        .assert()
        .success()
        .stdout(predicate::str::contains("weekly_plan_.md"));

    let written = fs::read_to_string(temp_dir.path().join("weekly_plan_.md")).unwrap();
    assert!(written.starts_with("# Title"));
    assert!(written.contains("Some **bold** text."));
    assert!(written.contains("- one\n- two"));
}

#[test]
fn test_export_text_to_explicit_path() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("note.html"), NOTE).unwrap();
    let out = temp_dir.path().join("out.txt");

    inkpad(temp_dir.path())
        .args(["export", "note.html", "--format", "txt", "--out"])
        .arg(&out)
        .assert()
        .success();

    let text = fs::read_to_string(out).unwrap();
    assert!(!text.contains('<'));
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    assert_eq!(lines, ["Title", "Some bold text.", "one", "two"]);
}

#[test]
fn test_export_rtf_uses_input_stem_as_title() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("Groceries.html"), NOTE).unwrap();

    inkpad(temp_dir.path())
        .args(["export", "Groceries.html", "--format", "rtf", "--no-images"])
        .assert()
        .success();

    let rtf = fs::read_to_string(temp_dir.path().join("groceries.rtf")).unwrap();
    assert!(rtf.starts_with("{\\rtf1"));
    assert!(rtf.contains("Groceries"));
}

#[test]
fn test_export_unknown_format_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("note.html"), NOTE).unwrap();

    inkpad(temp_dir.path())
        .args(["export", "note.html", "--format", "docx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Unsupported format: docx"));
}

#[test]
fn test_export_missing_input_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    inkpad(temp_dir.path())
        .args(["export", "absent.html"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: IO error"));
}

#[test]
fn test_import_markdown_prints_markup() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join("todo.md"),
        "# Todo\n\nSome **bold** text.\n\n- one\n- two",
    )
    .unwrap();

    inkpad(temp_dir.path())
        .args(["import", "todo.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<h1>Todo</h1>"))
        .stdout(predicate::str::contains("<ul><li>one</li><li>two</li></ul>"));
}

#[test]
fn test_import_text_writes_note_json() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("scratch.txt"), "a < b\nc").unwrap();
    let out = temp_dir.path().join("note.json");

    inkpad(temp_dir.path())
        .args(["import", "scratch.txt", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported scratch.txt"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
    assert_eq!(json["title"], "scratch");
    assert_eq!(json["content"], "a &lt; b<br>c");
}

#[test]
fn test_config_set_and_show() {
    let temp_dir = tempfile::tempdir().unwrap();

    inkpad(temp_dir.path())
        .args(["config", "history_limit", "12"])
        .assert()
        .success()
        .stdout(predicate::str::contains("history_limit set to 12"));

    inkpad(temp_dir.path())
        .args(["config", "history_limit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("12"));

    inkpad(temp_dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"history_limit\": 12"))
        .stdout(predicate::str::contains("\"hex_line_width\": 128"));
}

#[test]
fn test_config_rejects_unknown_key() {
    let temp_dir = tempfile::tempdir().unwrap();
    inkpad(temp_dir.path())
        .args(["config", "colour", "blue"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unknown config key: colour"))
        .stdout(predicate::str::contains("set to").not());
}
