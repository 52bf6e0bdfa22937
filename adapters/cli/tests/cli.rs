use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_town-defence"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to launch the town-defence binary")
}

#[test]
fn zero_duration_reports_an_undecided_session() {
    let output = run(&["--duration", "0", "--seed", "3"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|line| line == "outcome: undecided"));
    assert!(stdout.lines().any(|line| line == "town health: 10"));
    assert!(!stdout.contains("next scene:"));
}

#[test]
fn unrepresentable_duration_is_refused() {
    let output = run(&["--duration", "1e20"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--duration"));
}

#[test]
fn zero_tick_is_refused() {
    let output = run(&["--tick-ms", "0"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--tick-ms"));
}
