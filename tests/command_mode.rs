//! Integration tests for command mode (-c/--command flag) and batch edits

use std::path::PathBuf;
use std::process::Command;

fn run_command(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .arg("run")
        .arg("-q")
        .arg("--")
        // Tests must be deterministic and not depend on a user's ~/.config/sheetcalc/config.toml.
        .arg("--no-config")
        .args(args)
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn temp_path(label: &str, ext: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "sheetcalc_cli_{}_{}_{}.{}",
        label,
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos(),
        ext,
    ))
}

#[test]
fn test_basic_arithmetic() {
    let (stdout, _, code) = run_command(&["-c", "=5+3"]);
    assert_eq!(stdout.trim(), "8");
    assert_eq!(code, 0);
}

#[test]
fn test_left_to_right_evaluation() {
    let (stdout, _, code) = run_command(&["-c", "=2+3*4"]);
    assert_eq!(stdout.trim(), "20");
    assert_eq!(code, 0);
}

#[test]
fn test_command_without_equals_sign() {
    let (stdout, _, code) = run_command(&["-c", "10/4"]);
    assert_eq!(stdout.trim(), "2.5");
    assert_eq!(code, 0);
}

#[test]
fn test_text_concatenation() {
    let (stdout, _, code) = run_command(&["-c", "=foo+bar+10"]);
    assert_eq!(stdout.trim(), "FOOBAR10");
    assert_eq!(code, 0);
}

#[test]
fn test_division_by_zero_is_infinity() {
    let (stdout, _, code) = run_command(&["-c", "=1/0"]);
    assert_eq!(stdout.trim(), "Infinity");
    assert_eq!(code, 0);
}

#[test]
fn test_command_reads_cells() {
    let (stdout, _, code) = run_command(&["--set", "A1=10", "--set", "A2==A1*3", "-c", "=A2+1"]);
    assert_eq!(stdout.trim(), "31");
    assert_eq!(code, 0);
}

#[test]
fn test_text_multiplication_fails() {
    let (stdout, stderr, code) = run_command(&["--set", "A1=abc", "-c", "=A1*2"]);
    assert!(stdout.trim().is_empty());
    assert!(stderr.contains("Error"), "stderr was: {}", stderr);
    assert_ne!(code, 0);
}

#[test]
fn test_set_chain_prints_cells() {
    let (stdout, _, code) = run_command(&["--set", "A1=2", "--set", "B1==A1*5", "--set", "C1==B1-A1"]);
    assert_eq!(stdout, "A1\t2\nB1\t10\nC1\t8\n");
    assert_eq!(code, 0);
}

#[test]
fn test_cycle_cells_are_marked() {
    let (stdout, _, code) = run_command(&["--set", "A1==B1+1", "--set", "B1==A1+1", "--set", "C1=5"]);
    assert_eq!(
        stdout,
        "A1\t#CYCLE! (cycle)\nB1\t#CYCLE! (cycle)\nC1\t5\n"
    );
    assert_eq!(code, 0);
}

#[test]
fn test_invalid_location_fails() {
    let (_, stderr, code) = run_command(&["--set", "1A=5"]);
    assert!(stderr.contains("Invalid cell reference"), "stderr was: {}", stderr);
    assert_ne!(code, 0);
}

#[test]
fn test_location_outside_grid_fails() {
    let (_, stderr, code) = run_command(&["--columns", "2", "--rows", "2", "--set", "C1=5"]);
    assert!(stderr.contains("C1"), "stderr was: {}", stderr);
    assert_ne!(code, 0);
}

#[test]
fn test_save_then_reload_and_clear() {
    let path = temp_path("save", "grd");
    let path_str = path.to_str().unwrap();

    let (_, _, code) = run_command(&["--set", "A1=4", "--set", "A2==A1*A1", "--save", path_str]);
    assert_eq!(code, 0);

    let (stdout, _, code) = run_command(&[path_str]);
    assert_eq!(stdout, "A1\t4\nA2\t16\n");
    assert_eq!(code, 0);

    // The dependent keeps reading A1, which is now empty text.
    let (stdout, _, code) = run_command(&[path_str, "--clear", "A1"]);
    assert_eq!(stdout, "A2\t#VALUE!\n");
    assert_eq!(code, 0);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_markdown_export() {
    let path = temp_path("export", "md");
    let path_str = path.to_str().unwrap();

    let (stdout, _, code) = run_command(&["--set", "B2=7", "-o", path_str]);
    assert!(stdout.contains("Exported to"));
    assert_eq!(code, 0);

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("| 2 | 7 |"));

    let _ = std::fs::remove_file(&path);
}
