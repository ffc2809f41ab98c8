use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

fn photorank() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("photorank"));
    cmd.env_remove("OPENAI_API_KEY").env_remove("RUST_LOG");
    cmd
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn help_lists_all_flags() {
    let output = photorank().arg("--help").output().expect("--help runs");

    assert!(output.status.success());
    let text = stdout_of(&output);
    for flag in [
        "--output",
        "--captions",
        "--top",
        "--no-duplicates",
        "--openai-api-key",
        "--ollama-url",
    ] {
        assert!(text.contains(flag), "help text missing {flag}: {text}");
    }
}

#[test]
fn missing_folder_is_reported_not_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let output = photorank()
        .arg(temp_dir.path().join("no-such-shoot"))
        .output()
        .expect("photorank runs");

    assert!(output.status.success());
    let text = stdout_of(&output);
    assert!(text.contains("does not exist"), "unexpected output: {text}");
    assert!(text.contains("No results to display"), "unexpected output: {text}");
}

#[test]
fn folder_without_images_writes_empty_results() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("notes.txt"), b"shot list").unwrap();
    let results = temp_dir.path().join("results.json");

    let output = photorank()
        .arg(temp_dir.path())
        .arg("--no-duplicates")
        .arg("-o")
        .arg(&results)
        .output()
        .expect("photorank runs");

    assert!(output.status.success());
    let text = stdout_of(&output);
    assert!(text.contains("Duplicate detection disabled"), "unexpected output: {text}");
    assert!(text.contains("No image files found"), "unexpected output: {text}");

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&results).unwrap()).unwrap();
    assert_eq!(written, serde_json::json!([]));
}
