use assert_cmd::Command;

#[test]
fn cli_help_runs() {
    let mut cmd = Command::cargo_bin("aspect-eval").expect("binary exists");
    cmd.arg("--help").assert().success();
}

#[test]
fn evaluate_help_lists_threshold() {
    let mut cmd = Command::cargo_bin("aspect-eval").expect("binary exists");
    let output = cmd.args(["evaluate", "--help"]).output().expect("runs");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--threshold"));
    assert!(stdout.contains("--literal-none"));
}

#[test]
fn unknown_command_fails() {
    let mut cmd = Command::cargo_bin("aspect-eval").expect("binary exists");
    cmd.arg("train").assert().failure();
}

#[test]
fn evaluate_without_api_key_fails_before_loading_anything() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut cmd = Command::cargo_bin("aspect-eval").expect("binary exists");
    let output = cmd
        .current_dir(dir.path())
        .env_remove("OPENAI_API_KEY")
        .env("EMBEDDING_CACHE_DIR", dir.path().join("models"))
        .args(["evaluate", "--input"])
        .arg(dir.path().join("missing.csv"))
        .output()
        .expect("runs");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("OPENAI_API_KEY"), "{stderr}");
    assert!(!stderr.contains("embedding model"), "{stderr}");
    assert!(!dir.path().join("models").exists());
}

#[test]
fn evaluate_with_missing_csv_fails_before_embedding_model_loads() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut cmd = Command::cargo_bin("aspect-eval").expect("binary exists");
    let output = cmd
        .current_dir(dir.path())
        .env("OPENAI_API_KEY", "sk-test")
        .env("EMBEDDING_CACHE_DIR", dir.path().join("models"))
        .args(["evaluate", "--input"])
        .arg(dir.path().join("missing.csv"))
        .output()
        .expect("runs");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("loading review from"), "{stderr}");
    assert!(!stderr.contains("embedding model"), "{stderr}");
    assert!(!dir.path().join("models").exists());
}

#[test]
fn default_log_filter_keeps_dependencies_at_warn() {
    use aspect_eval::logging::DEFAULT_FILTER;

    assert_eq!(DEFAULT_FILTER, "warn,aspect_eval=info");
    assert!(tracing_subscriber::EnvFilter::try_new(DEFAULT_FILTER).is_ok());
}
