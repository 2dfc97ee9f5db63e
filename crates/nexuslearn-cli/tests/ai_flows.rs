//! `explain` and `recommend` against a mocked OpenAI-compatible endpoint.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EXPLANATION: &str = r#"{
  "explanation": "Velocity is speed in a given direction.",
  "quiz": [
    {"question": "Is velocity a vector?", "options": ["Yes", "No"], "answer": "Yes", "explanation": "It has a direction."},
    {"question": "SI unit of velocity?", "options": ["m/s", "kg"], "answer": "m/s", "explanation": "Distance over time."},
    {"question": "Can velocity be negative?", "options": ["Yes", "No"], "answer": "Yes", "explanation": "The sign gives the direction."}
  ],
  "furtherExploration": "Read about acceleration next."
}"#;

fn chat_reply(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}, "index": 0}],
        "model": "gpt-4.1",
        "usage": {"prompt_tokens": 100, "completion_tokens": 80, "total_tokens": 180}
    })
}

fn write_config(dir: &Path, base_url: &str) {
    std::fs::write(
        dir.join("nexuslearn.toml"),
        format!(
            r#"
default_provider = "openai"
default_model = "gpt-4.1"
grade_level = 9

[providers.openai]
type = "openai"
api_key = "sk-test"
base_url = "{base_url}"
"#
        ),
    )
    .unwrap();
}

/// Runs the binary off the async runtime so the mock server keeps serving.
async fn run(dir: &Path, args: &[&str], stdin: &str) -> assert_cmd::assert::Assert {
    let dir = dir.to_path_buf();
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let stdin = stdin.to_string();
    tokio::task::spawn_blocking(move || {
        #[allow(deprecated)]
        Command::cargo_bin("nexuslearn")
            .unwrap()
            .current_dir(&dir)
            .env("HOME", &dir)
            .env_remove("NEXUSLEARN_ANTHROPIC_KEY")
            .env_remove("NEXUSLEARN_OPENAI_KEY")
            .arg("--data-dir")
            .arg(dir.join("data"))
            .args(&args)
            .write_stdin(stdin)
            .assert()
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn explain_prints_all_sections() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("velocity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(EXPLANATION)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_config(dir.path(), &server.uri());

    run(dir.path(), &["explain", "--topic", "velocity"], "")
        .await
        .success()
        .stdout(predicate::str::contains("Velocity is speed in a given direction."))
        .stdout(predicate::str::contains("1. Is velocity a vector?"))
        .stdout(predicate::str::contains("Read about acceleration next."));
}

#[tokio::test]
async fn explain_practice_plays_generated_quiz_without_saving() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(EXPLANATION)))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_config(dir.path(), &server.uri());

    run(
        dir.path(),
        &["explain", "--topic", "velocity", "--practice"],
        "1\n1\n2\n",
    )
    .await
    .success()
    .stdout(predicate::str::contains("Practice: velocity"))
    .stdout(predicate::str::contains("You scored 2 / 3. That's 67%!"));

    assert!(!dir.path().join("data/quizScores.json").exists());
}

#[tokio::test]
async fn explain_transport_failure_apologizes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_config(dir.path(), &server.uri());

    run(dir.path(), &["explain", "--topic", "velocity"], "")
        .await
        .failure()
        .stderr(predicate::str::contains(
            "Sorry, we couldn't explain that topic. Please try another one.",
        ));
}

#[tokio::test]
async fn explain_rejects_short_quiz() {
    let short = r#"{
      "explanation": "Short.",
      "quiz": [{"question": "Q?", "options": ["a", "b"], "answer": "a", "explanation": "e"}],
      "furtherExploration": "More."
    }"#;

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(short)))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_config(dir.path(), &server.uri());

    run(dir.path(), &["explain", "--topic", "velocity"], "")
        .await
        .failure()
        .stderr(predicate::str::contains("couldn't explain that topic"))
        .stdout(predicate::str::contains("Short.").not());
}

#[tokio::test]
async fn recommend_uses_stored_scores() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("Physics: 100%, Chemistry: 0%, Math: 0%"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(
            r#"{"recommendations": "Spend this week on chemistry and math."}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_config(dir.path(), &server.uri());
    std::fs::create_dir_all(dir.path().join("data")).unwrap();
    std::fs::write(
        dir.path().join("data/quizScores.json"),
        r#"{"physics": 100}"#,
    )
    .unwrap();

    run(dir.path(), &["recommend"], "")
        .await
        .success()
        .stdout(predicate::str::contains("Spend this week on chemistry and math."));
}

#[tokio::test]
async fn recommend_falls_back_on_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_config(dir.path(), &server.uri());

    run(dir.path(), &["recommend"], "")
        .await
        .success()
        .stdout(predicate::str::contains("Physics: 70%, Chemistry: 50%, Math: 90%"))
        .stdout(predicate::str::contains(
            "Sorry, I was unable to generate recommendations at this time.",
        ));
}
