//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

fn pgsandbox() -> Command {
    let mut cmd = Command::cargo_bin("pgsandbox").unwrap();
    cmd.env_remove("DATABASE_URL").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_services() {
    pgsandbox()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("count"))
        .stdout(predicate::str::contains("hello"))
        .stdout(predicate::str::contains("query"));
}

#[test]
fn test_count_help() {
    pgsandbox()
        .args(["count", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--in-memory"))
        .stdout(predicate::str::contains("--store-timeout-ms"));
}

#[test]
fn test_query_help() {
    pgsandbox()
        .args(["query", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--database-url"));
}

#[test]
fn test_completions_bash() {
    pgsandbox()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pgsandbox"));
}

#[test]
fn test_unreachable_database_fails_after_retries() {
    pgsandbox()
        .args([
            "query",
            "--db-host",
            "127.0.0.1",
            "--db-port",
            "1",
            "--connect-attempts",
            "2",
            "--connect-delay-ms",
            "10",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to connect"));
}

#[test]
fn test_invalid_bind_address() {
    pgsandbox()
        .args(["count", "--in-memory", "--bind", "not-an-address"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
